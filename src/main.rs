//! mitamae-provisioner — install mitamae on a remote machine and apply a recipe

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mitamae_provisioner::cli::Cli;
use mitamae_provisioner::output::OutputContext;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let errors = OutputContext::new(cli.no_color, cli.quiet);

    if let Err(e) = cli.run().await {
        errors.error(&format!("Error: {e:#}"));
        std::process::exit(1);
    }
}

/// Initialise tracing on stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
