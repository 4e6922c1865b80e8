//! Bioimage Resolver - command-line front end.
//!
//! Thin caller of the library: every decision is made by [`Resolver`].

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bioimage_resolver::{
    config::{CheckConfig, Cli, Command, ExplainConfig, FormatsConfig, ResolveConfig},
    ExtensionKey, InputDescriptor, InstallGroup, Plan, PlannedCandidate, ReaderKind, ReaderSet,
    Resolution, ResolveError, Resolver,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Resolve(config) => run_resolve(config).await,
        Command::Explain(config) => run_explain(config),
        Command::Formats(config) => run_formats(config),
        Command::Check(config) => run_check(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bioimage_resolver=debug"
    } else {
        "bioimage_resolver=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Pretty-print `value` to stdout. Returns false if serialization failed.
fn print_json(value: &serde_json::Value) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            false
        }
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

async fn run_resolve(config: ResolveConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let resolver = match config.build_resolver() {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to load registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Open every file first; resolution of the ones that opened runs concurrently
    let mut opened = Vec::new();
    let mut outcomes: Vec<Option<Result<Resolution, String>>> = Vec::new();
    for path in &config.paths {
        match InputDescriptor::open(path).await {
            Ok(input) => {
                opened.push((outcomes.len(), input));
                outcomes.push(None);
            }
            Err(e) => outcomes.push(Some(Err(e.to_string()))),
        }
    }

    let (indices, inputs): (Vec<_>, Vec<_>) = opened.into_iter().unzip();
    let results = resolver.resolve_all(inputs).await;
    let mut failures = Vec::new();
    for (index, result) in indices.into_iter().zip(results) {
        outcomes[index] = Some(result.map_err(|e| {
            let message = e.to_string();
            failures.push(e);
            message
        }));
    }

    let mut ok = true;
    let mut rows = Vec::new();
    for (path, outcome) in config.paths.iter().zip(outcomes) {
        let path = path.display().to_string();
        match outcome {
            Some(Ok(resolution)) => {
                if config.json {
                    rows.push(serde_json::json!({ "path": path, "resolution": resolution }));
                } else {
                    print_resolution(&path, &resolution);
                }
            }
            Some(Err(message)) => {
                ok = false;
                if config.json {
                    rows.push(serde_json::json!({ "path": path, "error": message }));
                } else {
                    println!("✗ {}: {}", path, message);
                }
            }
            None => {}
        }
    }

    if config.json {
        ok &= print_json(&serde_json::Value::Array(rows));
    } else {
        print_install_hints(failures.iter());
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_resolution(path: &str, resolution: &Resolution) {
    println!("✓ {}: {}", path, resolution.reader);
    for attempt in &resolution.skipped {
        println!("    skipped {}", attempt);
    }
}

fn print_install_hints<'a>(errors: impl Iterator<Item = &'a ResolveError>) {
    let mut groups: Vec<InstallGroup> = Vec::new();
    for group in errors.flat_map(ResolveError::install_groups) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    if groups.is_empty() {
        return;
    }

    println!();
    println!("Enable these install groups (cargo features) for more readers:");
    for group in groups {
        println!("  --features {}", group);
    }
}

// =============================================================================
// Explain Command
// =============================================================================

fn run_explain(config: ExplainConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.registry.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let resolver = match config.registry.build_resolver() {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to load registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut ok = true;
    let mut rows = Vec::new();
    for path in &config.paths {
        let name = path.display().to_string();
        // Planning only looks at the name, so an empty buffer stands in for the file
        let input = InputDescriptor::from_bytes(name.clone(), Vec::<u8>::new());

        match resolver.plan(&input) {
            Ok(plan) => {
                if config.json {
                    rows.push(serde_json::json!({ "path": name, "plan": plan }));
                } else {
                    print_plan(&name, &plan);
                }
            }
            Err(e) => {
                ok = false;
                if config.json {
                    rows.push(serde_json::json!({ "path": name, "error": e.to_string() }));
                } else {
                    println!("✗ {}: {}", name, e);
                }
            }
        }
    }

    if config.json {
        ok &= print_json(&serde_json::Value::Array(rows));
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_plan(name: &str, plan: &Plan) {
    println!("{} (route: {})", name, plan.route);
    for (i, candidate) in plan.candidates.iter().enumerate() {
        println!("{}", plan_line(i + 1, candidate));
    }
}

/// One padded row of the explain output; notes follow in brackets.
fn plan_line(position: usize, candidate: &PlannedCandidate) -> String {
    let mut notes = Vec::new();
    if let Some(group) = candidate.install_group {
        notes.push(group.to_string());
    }
    if !candidate.available {
        notes.push("not installed".to_string());
    }
    if !candidate.has_backend {
        notes.push("no backend".to_string());
    }

    let line = format!("  {}. {:<18}", position, candidate.reader.name());
    if notes.is_empty() {
        line.trim_end().to_string()
    } else {
        format!("{} [{}]", line, notes.join(", "))
    }
}

// =============================================================================
// Formats Command
// =============================================================================

fn run_formats(config: FormatsConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.registry.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let registry = match config.registry.load_registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to load registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let routes: Vec<_> = match config.extension_key() {
        Some(ext) => {
            let found = ExtensionKey::new(ext.clone())
                .ok()
                .and_then(|key| registry.lookup(&key).map(|list| (key, list)));
            match found {
                Some(route) => vec![route],
                None => {
                    println!("✗ No readers registered for extension '{}'", ext);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => registry
            .iter()
            .map(|(key, list)| (key.clone(), list))
            .collect(),
    };
    debug!(count = routes.len(), "Listing routes");

    if config.json {
        let map: serde_json::Map<_, _> = routes
            .iter()
            .map(|(key, list)| {
                let readers = list.iter().map(|r| r.id().into()).collect();
                (key.to_string(), serde_json::Value::Array(readers))
            })
            .collect();
        return if print_json(&serde_json::Value::Object(map)) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    for (key, list) in &routes {
        println!("{:<12} {}", key, list);
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Bioimage Resolver Registry Check");
    println!("════════════════════════════════");
    println!();

    if let Err(e) = config.registry.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let source = match config.registry.registry {
        Some(ref path) => path.display().to_string(),
        None => "built-in".to_string(),
    };

    let registry = match config.registry.load_registry() {
        Ok(registry) => {
            println!("✓ Registry ({}): {} extensions", source, registry.len());
            registry
        }
        Err(e) => {
            println!("✗ Registry ({}): {}", source, e);
            return ExitCode::FAILURE;
        }
    };

    let bands: Vec<_> = registry.bands().iter().map(ToString::to_string).collect();
    println!("✓ Bands: {}", bands.join(" > "));
    match registry.fallback() {
        Some(list) => println!("✓ No-extension fallback: {}", list),
        None => println!("  No-extension fallback: none (extensionless inputs are unsupported)"),
    }
    println!();

    let advisor = config.registry.advisor();
    let readers = ReaderSet::builtin();

    println!("Readers:");
    println!("────────");
    for kind in ReaderKind::ALL {
        let group = match kind.install_group() {
            Some(group) => format!(" [{}]", group),
            None => String::new(),
        };
        let status = if !advisor.is_available(kind) {
            "✗ not installed"
        } else if !readers.contains(kind) {
            "✗ no backend"
        } else {
            "✓ available"
        };
        println!("  {:<18}{:<16} {}", kind.name(), group, status);
    }

    let routed = registry.readers();
    let unrouted: Vec<_> = ReaderKind::ALL
        .into_iter()
        .filter(|kind| !routed.contains(kind))
        .map(|kind| kind.name())
        .collect();
    if !unrouted.is_empty() {
        println!();
        println!("  Never routed to: {}", unrouted.join(", "));
    }

    // A quick end-to-end probe through the same resolver the resolve command uses
    let resolver = Resolver::new(registry, readers, advisor);
    let sample = InputDescriptor::from_bytes("probe.tif", Vec::<u8>::new());
    if let Ok(plan) = resolver.plan(&sample) {
        let order: Vec<_> = plan.candidates.iter().map(|c| c.reader.name()).collect();
        println!();
        println!("✓ .tif candidates: {}", order.join(" -> "));
    }

    ExitCode::SUCCESS
}
