//! package-binary CLI - the CI step entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use package_binary::ops::{package_binary as run_packaging, PackageOptions};
use package_binary::toolchain::Toolchain;
use package_binary::util::{Config, Diagnostic, GitHubActions, Reporter, SystemExecutor};

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut reporter = GitHubActions::from_env();

    if let Err(e) = run(cli, &mut reporter) {
        let diag = Diagnostic::from_error(&e);
        reporter.error(&diag.title, &diag.detail());
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("package_binary=debug")
        } else {
            EnvFilter::new("package_binary=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli, reporter: &mut dyn Reporter) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = Config::resolve(cli.config.as_deref(), &cwd)?;

    let toolchain = Toolchain::detect(&config.toolchain);
    let opts = PackageOptions::with_config(cli.package, cli.target, &config);

    run_packaging(&opts, &toolchain, &SystemExecutor, reporter)?;
    Ok(())
}
