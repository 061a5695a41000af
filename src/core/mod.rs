pub mod arxiv;
pub mod engine;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{Publication, RenderedFragment, UpdateOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
