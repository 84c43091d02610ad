pub mod local_storage;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "contract-split")]
#[command(about = "Split a storage interface into domain contracts and check implementation coverage")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "contract-split.toml")]
    pub config: String,

    /// Override the project root from the config file
    #[arg(long)]
    pub root: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    /// Analyze and print the coverage report without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Override generator.checked_factory from the config file
    #[arg(long)]
    pub checked_factory: Option<bool>,
}
