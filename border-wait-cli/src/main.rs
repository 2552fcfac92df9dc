//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use border_wait_cli::CliError;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    match border_wait_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("border-wait: {err}");
            std::process::exit(1);
        }
    }
}

/// Log to stderr so stdout stays machine-readable; `RUST_LOG` overrides the
/// default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        eprintln!("border-wait: logging already initialised");
    }
}
