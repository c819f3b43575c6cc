use std::fmt;
use std::sync::Arc;
use el_core::{Result, SharedEmbedder, SharedExtractor};
use tokio::sync::OnceCell;

use crate::config::{EmbedderKind, ExtractorKind, ModelConfig};

pub mod dummy;
pub mod heuristic;
pub mod openai;
pub mod token_classification;

pub use dummy::DummyModel;
pub use heuristic::HeuristicExtractor;
pub use openai::OpenAiEmbedder;
pub use token_classification::TokenClassificationExtractor;

pub fn create_embedder(config: &ModelConfig) -> Result<SharedEmbedder> {
    match config.embedder {
        EmbedderKind::Dummy => Ok(Arc::new(DummyModel::new(config.dimensions))),
        EmbedderKind::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(config)?)),
    }
}

pub fn create_extractor(config: &ModelConfig) -> Result<SharedExtractor> {
    match config.extractor {
        ExtractorKind::Heuristic => Ok(Arc::new(HeuristicExtractor::new())),
        ExtractorKind::Http => Ok(Arc::new(TokenClassificationExtractor::new(config)?)),
    }
}

/// Process-wide model instances, built on first use and shared read-only afterwards.
pub struct ModelRegistry {
    config: ModelConfig,
    embedder: OnceCell<SharedEmbedder>,
    extractor: OnceCell<SharedExtractor>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("embedder", &self.config.embedder)
            .field("extractor", &self.config.extractor)
            .field("embedder_loaded", &self.embedder.initialized())
            .field("extractor_loaded", &self.extractor.initialized())
            .finish()
    }
}

impl ModelRegistry {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            embedder: OnceCell::new(),
            extractor: OnceCell::new(),
        }
    }

    /// A registry with already-built models, used when the caller owns the instances.
    pub fn with_models(embedder: SharedEmbedder, extractor: SharedExtractor) -> Self {
        Self {
            config: ModelConfig::default(),
            embedder: OnceCell::new_with(Some(embedder)),
            extractor: OnceCell::new_with(Some(extractor)),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub async fn embedder(&self) -> Result<SharedEmbedder> {
        self.embedder
            .get_or_try_init(|| async {
                let embedder = create_embedder(&self.config)?;
                tracing::info!("🧠 Embedder loaded (using {})", embedder.name());
                Ok::<_, el_core::Error>(embedder)
            })
            .await
            .cloned()
    }

    pub async fn extractor(&self) -> Result<SharedExtractor> {
        self.extractor
            .get_or_try_init(|| async {
                let extractor = create_extractor(&self.config)?;
                tracing::info!("🏷️ Entity extractor loaded (using {})", extractor.name());
                Ok::<_, el_core::Error>(extractor)
            })
            .await
            .cloned()
    }
}
