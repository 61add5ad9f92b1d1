//! CLI command definitions and dispatch.

pub mod config;
pub mod render;
pub mod time_ago;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use fieldops_core::config::AppConfig;
use fieldops_core::error::AppError;

/// FieldOps field-staff location tracking
#[derive(Debug, Parser)]
#[command(name = "fieldops", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Configuration management
    Config(config::ConfigArgs),
    /// Print the "last update" label for an age in seconds
    TimeAgo(time_ago::TimeAgoArgs),
    /// Run one tracking initialization and render the map
    Render(render::RenderArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
            Commands::TimeAgo(args) => time_ago::execute(args, self.format),
            Commands::Render(args) => render::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path, None)
}
