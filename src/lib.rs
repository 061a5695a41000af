pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::update, engine::UpdateEngine, pipeline::ArxivPipeline};
pub use domain::model::{Publication, RenderedFragment, RunReport, UpdateOutcome};
pub use utils::error::{Result, UpdateError};
