use el_core::{Error, Result, ScoringMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::mapping::GraphStyle;

pub const DEFAULT_DIMENSIONS: usize = 384;
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Deterministic in-process embedder, no network.
    #[default]
    Dummy,
    /// Any OpenAI-compatible `/embeddings` endpoint (OpenAI, Ollama, vLLM...).
    OpenAi,
}

impl FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dummy" => Ok(EmbedderKind::Dummy),
            "openai" | "ollama" => Ok(EmbedderKind::OpenAi),
            other => Err(format!("Unknown embedder: {}. Available embedders: dummy, openai", other)),
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderKind::Dummy => write!(f, "dummy"),
            EmbedderKind::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Capitalisation-based tagger, no network.
    #[default]
    Heuristic,
    /// Remote token-classification endpoint.
    Http,
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heuristic" => Ok(ExtractorKind::Heuristic),
            "http" => Ok(ExtractorKind::Http),
            other => Err(format!("Unknown extractor: {}. Available extractors: heuristic, http", other)),
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorKind::Heuristic => write!(f, "heuristic"),
            ExtractorKind::Http => write!(f, "http"),
        }
    }
}

/// Which model backends to build and how to reach them.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub embedder: EmbedderKind,
    pub embedding_url: Option<String>,
    pub embedding_model: Option<String>,
    pub api_key: Option<String>,
    pub dimensions: usize,
    pub extractor: ExtractorKind,
    pub ner_url: Option<String>,
    pub ner_api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::default(),
            embedding_url: None,
            embedding_model: None,
            api_key: None,
            dimensions: DEFAULT_DIMENSIONS,
            extractor: ExtractorKind::default(),
            ner_url: None,
            ner_api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ModelConfig {
    pub fn embedding_url(&self) -> Result<Url> {
        let raw = self.embedding_url.as_deref().unwrap_or(DEFAULT_EMBEDDING_URL);
        parse_endpoint(raw)
    }

    pub fn embedding_model(&self) -> &str {
        self.embedding_model.as_deref().unwrap_or(DEFAULT_EMBEDDING_MODEL)
    }

    pub fn ner_url(&self) -> Result<Url> {
        let raw = self
            .ner_url
            .as_deref()
            .ok_or_else(|| Error::Config("The http extractor needs a NER endpoint URL".to_string()))?;
        parse_endpoint(raw)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Config(format!("Invalid endpoint URL {}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Config(format!("Unsupported endpoint scheme: {}", scheme))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub mode: ScoringMode,
    pub cosine_threshold: f32,
    pub cosine_fallback: f32,
    pub max_distance: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Cosine,
            cosine_threshold: 0.7,
            cosine_fallback: 0.6,
            max_distance: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub threshold: f32,
    pub fallback: f32,
    /// Articles with at most this many sentences are returned whole.
    pub short_article_sentences: usize,
    pub focus_delimiter: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            fallback: 0.6,
            short_article_sentences: 3,
            focus_delimiter: ", ".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub ranking: RankingConfig,
    pub summary: SummaryConfig,
    /// How many feed entries are analysed per request.
    pub max_articles: usize,
    /// How many ranked entities are handed to the relationship mapper.
    pub graph_top_n: usize,
    pub graph_style: GraphStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            summary: SummaryConfig::default(),
            max_articles: 3,
            graph_top_n: 10,
            graph_style: GraphStyle::default(),
        }
    }
}
