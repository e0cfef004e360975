pub mod config;
pub mod runner;

pub use config::{LlmSettings, PipelineConfig};
pub use runner::{Pipeline, RunReport};
