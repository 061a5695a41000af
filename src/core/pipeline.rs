use crate::core::arxiv::ArxivClient;
use crate::core::render::render_fragment;
use crate::core::{ConfigProvider, Pipeline, Publication, RenderedFragment, Storage, UpdateOutcome};
use crate::utils::error::{Result, UpdateError};
use std::path::PathBuf;

pub struct ArxivPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: ArxivClient,
}

impl<S: Storage, C: ConfigProvider> ArxivPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = ArxivClient::from_config(&config)?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ArxivPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Publication>> {
        let publications = self.client.fetch_publications().await?;

        // Zero results from a successful call still must not wipe a good page.
        if publications.is_empty() && !self.config.allow_empty() {
            return Err(UpdateError::EmptyFeedError {
                author: self.client.author().to_string(),
            });
        }

        Ok(publications)
    }

    async fn transform(&self, publications: Vec<Publication>) -> Result<RenderedFragment> {
        Ok(render_fragment(
            &publications,
            self.config.highlight_author(),
        ))
    }

    async fn load(&self, fragment: RenderedFragment) -> Result<UpdateOutcome> {
        let output_path = self.config.output_path();
        let path = PathBuf::from(output_path);

        let existing = self.storage.read_file(output_path).await?;
        if existing.as_deref() == Some(fragment.html.as_bytes()) {
            tracing::debug!("{} already up to date", output_path);
            return Ok(UpdateOutcome::Unchanged {
                path,
                publications: fragment.publication_count,
            });
        }

        tracing::debug!(
            "Writing {} bytes to {} (previous: {})",
            fragment.html.len(),
            output_path,
            existing
                .as_ref()
                .map(|d| format!("{} bytes", d.len()))
                .unwrap_or_else(|| "none".to_string())
        );
        self.storage
            .write_file(output_path, fragment.html.as_bytes())
            .await?;

        Ok(UpdateOutcome::Changed {
            path,
            bytes: fragment.html.len(),
            publications: fragment.publication_count,
        })
    }
}
