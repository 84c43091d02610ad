pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{local_storage::LocalStorage, toml_config::TomlConfig};

pub use core::{engine::PartitionEngine, pipeline::PartitionPipeline};
pub use utils::error::{PartitionError, Result};
