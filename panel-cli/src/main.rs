//! # Panel
//!
//! Layout compiler command line.

use clap::Parser;
use panel_cli::{CliArgs, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = CliConfig::from(CliArgs::parse());
    tracing::debug!(options = ?config.options, "starting panel");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    panel_cli::run(&config, &mut out)
}

/// Logs go to stderr so compiled documents can be piped from stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,panel_compiler=debug".into());
    let json = std::env::var("PANEL_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
