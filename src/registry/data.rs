//! Registry data file format.
//!
//! ```json
//! {
//!   "bands": ["specialized", "generic"],
//!   "fallback": ["default"],
//!   "routes": [
//!     { "band": "specialized", "readers": ["czi"], "extensions": ["czi"] },
//!     { "band": "generic", "readers": ["bioformats"], "extensions": ["czi", "lif"] }
//!   ]
//! }
//! ```
//!
//! Adding format support means editing this file; resolution logic is
//! untouched.

use serde::Deserialize;

use super::builder::{BandPolicy, PriorityBand, RegistryBuilder};
use super::kind::ReaderKind;
use super::FormatRegistry;
use crate::error::RegistryError;
use crate::format::ExtensionKey;

/// Registry data shipped with the crate.
pub const BUILTIN_REGISTRY_JSON: &str = include_str!("../../data/formats.json");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RegistryData {
    bands: Vec<PriorityBand>,
    #[serde(default = "default_fallback")]
    fallback: Vec<ReaderKind>,
    routes: Vec<RouteData>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteData {
    band: PriorityBand,
    readers: Vec<ReaderKind>,
    extensions: Vec<ExtensionKey>,
}

fn default_fallback() -> Vec<ReaderKind> {
    vec![ReaderKind::Default]
}

impl RegistryData {
    pub(crate) fn parse(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::Parse(e.to_string()))
    }

    pub(crate) fn build(self, policy: BandPolicy) -> Result<FormatRegistry, RegistryError> {
        let mut builder = RegistryBuilder::new(self.bands)?.policy(policy)?;
        for route in self.routes {
            builder.add_route(route.band, route.extensions, &route.readers)?;
        }
        builder.fallback(&self.fallback);
        builder.build()
    }
}
