//! Command-line interface for manifest-stamp
//!
//! Flag names follow the camelCase spelling deployment scripts already use
//! (`--searchPatterns`, `--versionFile`, ...); kebab-case aliases are accepted too.

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod utils;

use crate::domain::{RunOptions, DEFAULT_SEARCH_PATTERNS, DEFAULT_VERSION_FILE};
use crate::pipeline::Pipeline;
use self::utils::parse_csv;

/// Stamp versions, replicas, resources and string overrides into Kubernetes manifests
#[derive(Parser, Debug)]
#[command(name = "manifest-stamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Glob patterns selecting the manifests to rewrite (comma-separated, `!` excludes)
    #[arg(
        long = "searchPatterns",
        visible_alias = "search-patterns",
        value_name = "GLOBS",
        default_value = DEFAULT_SEARCH_PATTERNS
    )]
    search_patterns: String,

    /// Config files to merge, later files winning (comma-separated)
    #[arg(
        long = "versionFile",
        visible_alias = "version-file",
        value_name = "FILES",
        default_value = DEFAULT_VERSION_FILE
    )]
    version_file: String,

    /// package.json whose name/version seeds a version entry
    #[arg(long, value_name = "PATH")]
    package: Option<PathBuf>,

    /// Collect versions from every package.json under the root (node_modules excluded)
    #[arg(long = "scanPackage", visible_alias = "scan-package")]
    scan_package: bool,

    /// Log at DEBUG level and write `<file>.debug` copies instead of overwriting
    #[arg(long)]
    debug: bool,

    /// Report changes without writing any file
    #[arg(long = "noupdate", visible_alias = "no-update")]
    no_update: bool,

    /// Directory that patterns and package scanning are relative to
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        RunOptions {
            root: self.root,
            search_patterns: parse_csv(&self.search_patterns),
            version_files: parse_csv(&self.version_file).into_iter().map(PathBuf::from).collect(),
            package: self.package,
            scan_package: self.scan_package,
            debug: self.debug,
            update: !self.no_update,
        }
    }
}

pub fn run() -> Result<()> {
    // Usage errors exit with 1 rather than clap's default 2; --help/--version still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    // RUST_LOG in the environment always takes precedence; --debug falls back to DEBUG.
    let filter = if cli.debug {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let options = cli.into_options();
    println!("{}", style("Running with options:").green());
    println!("{}", serde_json::to_string_pretty(&options)?);

    let pipeline = Pipeline::new(options)?;
    let summary = pipeline.run()?;
    if !summary.is_success() {
        anyhow::bail!("{} manifest(s) failed to process", summary.failed.len());
    }

    tracing::debug!("DONE");
    Ok(())
}
