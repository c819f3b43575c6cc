use async_trait::async_trait;
use std::sync::Arc;
use crate::types::ExtractedEntity;
use crate::Result;

/// A sentence encoder mapping text to fixed-size vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the name of the backend
    fn name(&self) -> &str;

    /// Length of every vector this embedder produces
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for several texts, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// A named-entity tagger.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Returns the name of the backend
    fn name(&self) -> &str;

    /// Tag the entities found in `text`
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>>;

    /// Like `extract`, but a failing tagger yields no entities instead of an error.
    async fn extract_or_empty(&self, text: &str) -> Vec<ExtractedEntity> {
        match self.extract(text).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!("Entity extraction with {} failed: {}", self.name(), e);
                Vec::new()
            }
        }
    }
}

pub type SharedEmbedder = Arc<dyn Embedder>;
pub type SharedExtractor = Arc<dyn EntityExtractor>;
