use std::process::ExitCode;

use fabrica::{cli, settings};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match settings::load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("fabrica: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match cli::build(settings).run() {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("fabrica: {err:#}");
            ExitCode::FAILURE
        }
    }
}
