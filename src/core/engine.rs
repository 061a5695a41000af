use crate::config::cli::LocalStorage;
use crate::core::pipeline::ArxivPipeline;
use crate::core::{ConfigProvider, Pipeline, RenderedFragment, UpdateOutcome};
use crate::utils::error::Result;

pub struct UpdateEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> UpdateEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Fetch, render and, only if the content changed, write.
    ///
    /// Any error returns before `load`, so a failed fetch never touches the output file.
    pub async fn run(&self) -> Result<UpdateOutcome> {
        let fragment = self.render_only().await?;

        tracing::info!("Comparing with existing output...");
        let outcome = self.pipeline.load(fragment).await?;

        match &outcome {
            UpdateOutcome::Changed { path, bytes, .. } => {
                tracing::info!("Updated {} ({} bytes)", path.display(), bytes)
            }
            UpdateOutcome::Unchanged { path, .. } => {
                tracing::info!("{} unchanged, nothing written", path.display())
            }
        }

        Ok(outcome)
    }

    pub async fn render_only(&self) -> Result<RenderedFragment> {
        tracing::info!("Fetching publications...");
        let publications = self.pipeline.extract().await?;
        tracing::info!("Fetched {} publications", publications.len());

        tracing::info!("Rendering fragment...");
        let fragment = self.pipeline.transform(publications).await?;
        tracing::debug!("Rendered {} bytes", fragment.html.len());

        Ok(fragment)
    }
}

/// Runs one update against the local filesystem, paths relative to the working directory.
pub async fn update<C: ConfigProvider>(config: C) -> Result<UpdateOutcome> {
    let pipeline = ArxivPipeline::new(LocalStorage::new("."), config)?;
    UpdateEngine::new(pipeline).run().await
}
