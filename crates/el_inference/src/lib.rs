pub mod config;
pub mod mapping;
pub mod models;
pub mod ranking;
pub mod summary;
mod threshold;

pub use config::{
    AnalysisConfig, EmbedderKind, ExtractorKind, ModelConfig, RankingConfig, SummaryConfig,
    DEFAULT_DIMENSIONS,
};
pub use mapping::{CooccurrenceGraph, GraphRenderer, GraphStyle, Physics, RenderedGraph};
pub use models::{create_embedder, create_extractor, ModelRegistry};
pub use ranking::EntityRanker;
pub use summary::Summarizer;

pub mod prelude {
    pub use super::{AnalysisConfig, ModelConfig, ModelRegistry};
    pub use super::{EntityRanker, Summarizer, CooccurrenceGraph, GraphRenderer};
    pub use el_core::{Article, Embedder, EntityExtractor, Error, Result};
}
