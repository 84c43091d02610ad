pub mod contracts;
pub mod coverage;
pub mod engine;
pub mod facade;
pub mod pipeline;
pub mod scanner;
pub mod sections;
pub mod vocabulary;

pub use crate::domain::model::{PartitionResult, SourceSet};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
