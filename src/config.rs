use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;

use crate::models::MappingDefinition;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mapping: MappingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    /// Path of the mapping definition (JSON) to resolve
    pub file: Option<String>,
    /// Pretty-print the resolved mapping
    pub pretty: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub style: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let mut builder = config::Config::builder()
            .set_default("mapping.pretty", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.style", "auto")?;

        // Load from environment variables
        if let Ok(file) = env::var("MAPPING_FILE") {
            builder = builder.set_override("mapping.file", Some(file))?;
        }

        if let Ok(pretty) = env::var("MAPPING_PRETTY") {
            builder = builder.set_override("mapping.pretty", pretty.parse::<bool>().unwrap_or(true))?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        if let Ok(log_style) = env::var("RUST_LOG_STYLE") {
            builder = builder.set_override("logging.style", log_style)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Override the mapping file, e.g. from the command line
    pub fn with_mapping_file(mut self, file: impl Into<String>) -> Self {
        self.mapping.file = Some(file.into());
        self
    }

    /// Read and parse the configured mapping definition
    pub fn load_definition(&self) -> anyhow::Result<MappingDefinition> {
        let path = self
            .mapping
            .file
            .as_deref()
            .context("No mapping file configured; pass a path or set MAPPING_FILE")?;

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping file {}", path))?;

        MappingDefinition::from_json(&text)
            .with_context(|| format!("Failed to parse mapping file {}", path))
    }
}
