//! Command-line entry point: build a catalog from one or more roots.
use docgen::{to_json, BuildConfig, PathFs, Pipeline, ValidationConfig};
use facet::Facet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Build, validate and optionally export a code example catalog.
#[derive(Debug, Facet)]
struct Args {
    /// Tributary roots, most authoritative first.
    #[facet(positional)]
    roots: Vec<String>,

    /// Exit non-zero when any error-severity diagnostic is found.
    #[facet(named, short = 's')]
    strict: bool,

    /// Apply the strict title rules to every root.
    #[facet(named)]
    strict_titles: bool,

    /// Log at debug level.
    #[facet(named, short = 'v')]
    verbose: bool,

    /// Write the catalog as JSON to this file.
    #[facet(named, short = 'e', default)]
    export: Option<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "docgen=debug" } else { "docgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Args = match facet_args::from_std_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    init_logging(args.verbose);

    let validation = if args.strict_titles {
        ValidationConfig::strict()
    } else {
        ValidationConfig::default()
    };
    let config = BuildConfig {
        validation,
        config_dir: None,
    };
    let roots: Vec<PathBuf> = args.roots.iter().map(PathBuf::from).collect();
    let build = Pipeline::new(&PathFs, config).build(&roots);

    for diagnostic in &build.diagnostics {
        println!("{diagnostic}");
    }
    println!("{}", build.catalog.stats());
    println!(
        "{} errors, {} warnings",
        build.diagnostics.error_count(),
        build.diagnostics.warning_count()
    );

    if let Some(path) = args.export.as_deref().filter(|p| !p.is_empty()) {
        if let Err(e) = std::fs::write(path, to_json(&build.catalog)) {
            eprintln!("could not write {path}: {e}");
            return ExitCode::FAILURE;
        }
        tracing::info!(path, "wrote catalog export");
    }

    if args.strict && build.diagnostics.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
