use std::process::ExitCode;

use claywork::cli::{self, Cli, EXIT_FAILURE};
use claywork::ui::output;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Log to stderr; `--debug` lowers the default level, `RUST_LOG` overrides.
fn init_tracing(debug: bool) {
    let default = if debug { "claywork=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
