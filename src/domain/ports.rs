use crate::domain::model::{Publication, RenderedFragment, UpdateOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// `Ok(None)` when the file does not exist yet.
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn author(&self) -> &str;
    fn max_results(&self) -> usize;
    fn timeout_seconds(&self) -> u64;
    fn retry_attempts(&self) -> u32;
    fn retry_delay_seconds(&self) -> u64;
    fn user_agent(&self) -> &str;
    fn highlight_author(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn allow_empty(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Publication>>;
    async fn transform(&self, publications: Vec<Publication>) -> Result<RenderedFragment>;
    async fn load(&self, fragment: RenderedFragment) -> Result<UpdateOutcome>;
}
