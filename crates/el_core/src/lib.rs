pub mod error;
pub mod models;
pub mod similarity;
pub mod text;
pub mod types;

pub use error::Error;
pub use models::{Embedder, EntityExtractor, SharedEmbedder, SharedExtractor};
pub use similarity::{cosine_similarity, manhattan_distance, normalized_manhattan_distance};
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;
