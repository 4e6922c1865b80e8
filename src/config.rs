//! Command-line and environment configuration.
//!
//! Every subcommand shares [`RegistryArgs`], so the same registry override,
//! band policy and disabled install groups apply whether inputs are resolved,
//! explained or the registry is merely listed.
//!
//! # Environment Variables
//!
//! - `BIR_REGISTRY` - Registry data file replacing the built-in table
//! - `BIR_BAND_ORDER` - Comma-separated band order (e.g. `generic,specialized`)
//! - `BIR_PREFER` - Comma-separated readers moved to the front of their band
//! - `BIR_DISABLE_GROUPS` - Comma-separated install groups treated as missing
//! - `BIR_CHECK_TIMEOUT_MS` - Per-check timeout in milliseconds (default: 2000, 0 disables)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::error::RegistryError;
use crate::readers::ReaderSet;
use crate::registry::{
    BandPolicy, DependencyAdvisor, FormatRegistry, InstallGroup, PriorityBand, ReaderKind,
};
use crate::resolve::Resolver;

// =============================================================================
// Default Values
// =============================================================================

/// Default capability-check timeout in milliseconds.
pub const DEFAULT_CHECK_TIMEOUT_MS: u64 = 2000;

/// Upper bound accepted for `--check-timeout-ms` (10 minutes).
const MAX_CHECK_TIMEOUT_MS: u64 = 600_000;

// =============================================================================
// CLI
// =============================================================================

/// Bioimage Resolver - pick the reader for a microscopy or medical image file.
#[derive(Parser, Debug, Clone)]
#[command(name = "bioimage-resolver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve files to the first reader that accepts them.
    Resolve(ResolveConfig),

    /// Show the candidate readers for files without reading them.
    Explain(ExplainConfig),

    /// List registered extensions and their candidate readers.
    Formats(FormatsConfig),

    /// Validate the registry and report reader availability.
    Check(CheckConfig),
}

// =============================================================================
// Shared registry options
// =============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Registry data file to use instead of the built-in table.
    #[arg(long, env = "BIR_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Band order, highest priority first.
    ///
    /// Overrides the order declared in the registry data.
    #[arg(long, env = "BIR_BAND_ORDER", value_delimiter = ',')]
    pub band_order: Vec<PriorityBand>,

    /// Readers moved to the front of their band for every extension.
    #[arg(long, env = "BIR_PREFER", value_delimiter = ',')]
    pub prefer: Vec<ReaderKind>,

    /// Install groups to treat as not installed.
    #[arg(long = "disable-group", env = "BIR_DISABLE_GROUPS", value_delimiter = ',')]
    pub disable_groups: Vec<InstallGroup>,
}

impl RegistryArgs {
    pub fn validate(&self) -> Result<(), String> {
        for (i, band) in self.band_order.iter().enumerate() {
            if self.band_order[..i].contains(band) {
                return Err(format!("band '{}' appears more than once in --band-order", band));
            }
        }

        if let Some(ref path) = self.registry {
            if !path.is_file() {
                return Err(format!(
                    "registry file {} does not exist. Set --registry or BIR_REGISTRY to a JSON file",
                    path.display()
                ));
            }
        }

        Ok(())
    }

    /// Tie-break policy from `--band-order` and `--prefer`.
    pub fn band_policy(&self) -> BandPolicy {
        let policy = if self.band_order.is_empty() {
            BandPolicy::default()
        } else {
            BandPolicy::default().with_order(self.band_order.clone())
        };
        self.prefer
            .iter()
            .fold(policy, |policy, reader| policy.with_preferred(*reader))
    }

    /// Load the configured registry.
    pub fn load_registry(&self) -> Result<FormatRegistry, RegistryError> {
        let policy = self.band_policy();
        match self.registry {
            Some(ref path) => FormatRegistry::from_path(path, policy),
            None if policy == BandPolicy::default() => Ok(FormatRegistry::builtin()?.clone()),
            None => FormatRegistry::from_json_str(crate::registry::BUILTIN_REGISTRY_JSON, policy),
        }
    }

    /// Built-in install hints with `--disable-group` applied.
    pub fn advisor(&self) -> DependencyAdvisor {
        self.disable_groups
            .iter()
            .fold(DependencyAdvisor::builtin(), |advisor, group| {
                advisor.with_unavailable(*group)
            })
    }

    /// Resolver over the configured registry and every compiled reader.
    pub fn build_resolver(&self) -> Result<Resolver, RegistryError> {
        Ok(Resolver::new(
            self.load_registry()?,
            ReaderSet::builtin(),
            self.advisor(),
        ))
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ResolveConfig {
    /// Files to resolve.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Timeout for a single capability check in milliseconds (0 disables).
    #[arg(long, default_value_t = DEFAULT_CHECK_TIMEOUT_MS, env = "BIR_CHECK_TIMEOUT_MS")]
    pub check_timeout_ms: u64,

    /// Print results as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ResolveConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.registry.validate()?;

        if self.check_timeout_ms > MAX_CHECK_TIMEOUT_MS {
            return Err(format!(
                "check_timeout_ms must be at most {} (got {})",
                MAX_CHECK_TIMEOUT_MS, self.check_timeout_ms
            ));
        }

        Ok(())
    }

    /// `None` when checks run unbounded.
    pub fn check_timeout(&self) -> Option<Duration> {
        match self.check_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn build_resolver(&self) -> Result<Resolver, RegistryError> {
        let resolver = self.registry.build_resolver()?;
        Ok(match self.check_timeout() {
            Some(timeout) => resolver.with_check_timeout(timeout),
            None => resolver,
        })
    }
}

// =============================================================================
// Explain Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ExplainConfig {
    /// File names to explain. They do not need to exist.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Print the plans as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Formats Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct FormatsConfig {
    /// Only show this extension (leading dot and case are ignored).
    #[arg(short, long)]
    pub extension: Option<String>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Print the table as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl FormatsConfig {
    /// `--extension` in registry key form (`.OME.TIF` -> `ome.tif`).
    pub fn extension_key(&self) -> Option<String> {
        self.extension
            .as_deref()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
    }
}

// =============================================================================
// Check Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
