use std::env;
use std::process::ExitCode;

use tracing::{error, info};

use entry_mapping::config::Config;
use entry_mapping::error::{ErrorResponse, MappingError};
use entry_mapping::services::MetadataResolver;

fn main() -> anyhow::Result<ExitCode> {
    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(file) = env::args().nth(1) {
        config = config.with_mapping_file(file);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_ansi(config.logging.style != "never")
        .with_writer(std::io::stderr)
        .init();

    let definition = config.load_definition()?;
    info!(
        "Resolving mapping {} with {} declared field(s)",
        definition.name.as_deref().unwrap_or("<unnamed>"),
        definition.fields.len()
    );

    match MetadataResolver::resolve(&definition) {
        Ok(mapping) => {
            let output = if config.mapping.pretty {
                serde_json::to_string_pretty(&mapping)?
            } else {
                serde_json::to_string(&mapping)?
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!("Failed to resolve mapping: {}", err);
            print_error(&err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_error(err: &MappingError) -> anyhow::Result<()> {
    let response = ErrorResponse::from(err);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
