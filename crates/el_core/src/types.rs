use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single feed entry, as read from an RSS or Atom document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Entry body. Usually carries HTML markup.
    pub description: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// The publication date exactly as it appeared in the feed.
    pub published: String,
    /// The feed URL this entry came from.
    pub source: String,
}

impl Article {
    pub const UNTITLED: &'static str = "No Title";
    pub const UNKNOWN_DATE: &'static str = "Unknown date";

    /// Builds an article from free text that did not come from a feed.
    pub fn from_text(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            link: String::new(),
            published_at: None,
            published: Self::UNKNOWN_DATE.to_string(),
            source: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub text: String,
    pub label: String,
    pub confidence: f32,
}

/// Collapses extracted entities to candidate names: surface text, first occurrence wins.
pub fn candidate_names(entities: &[ExtractedEntity]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for entity in entities {
        if !names.iter().any(|n| n == &entity.text) {
            names.push(entity.text.clone());
        }
    }
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Cosine similarity, higher is more relevant.
    #[default]
    Cosine,
    /// Normalized Manhattan distance, lower is more relevant.
    Distance,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Cosine => write!(f, "cosine"),
            ScoringMode::Distance => write!(f, "distance"),
        }
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(ScoringMode::Cosine),
            "distance" | "manhattan" => Ok(ScoringMode::Distance),
            other => Err(format!("Unknown scoring mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub name: String,
    /// Cosine similarity or normalized distance, depending on the ranking mode.
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub mode: ScoringMode,
    /// The cut-off that produced `entities`. `None` when nothing was ranked.
    pub threshold_used: Option<f32>,
    pub entities: Vec<RankedEntity>,
}

impl Ranking {
    pub fn empty(mode: ScoringMode) -> Self {
        Self {
            mode,
            threshold_used: None,
            entities: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.name.clone()).collect()
    }

    pub fn top_names(&self, n: usize) -> Vec<String> {
        self.entities.iter().take(n).map(|e| e.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySentence {
    pub text: String,
    pub index: usize,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
    pub sentence_count: usize,
    pub threshold_used: Option<f32>,
    pub selected_scores: Vec<f32>,
}

/// An undirected co-occurrence edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub article: Article,
    pub entities: Vec<ExtractedEntity>,
    pub ranking: Ranking,
    pub summary: Summary,
    pub relationships: Vec<Relationship>,
    /// Self-contained HTML document, absent when fewer than two entities were mapped.
    pub graph_html: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ArticleOutcome {
    Analysed(Box<ArticleAnalysis>),
    Failed { article: Article, error: String },
}

impl ArticleOutcome {
    pub fn article(&self) -> &Article {
        match self {
            ArticleOutcome::Analysed(analysis) => &analysis.article,
            ArticleOutcome::Failed { article, .. } => article,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ArticleOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedReport {
    pub feed_url: String,
    /// Number of entries the feed returned, before the article cap.
    pub fetched: usize,
    pub outcomes: Vec<ArticleOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(text: &str) -> ExtractedEntity {
        ExtractedEntity {
            text: text.to_string(),
            label: "ORG".to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_candidate_names_keep_first_occurrence() {
        let entities = vec![entity("Apple"), entity("Google"), entity("Apple"), entity("apple")];
        assert_eq!(candidate_names(&entities), vec!["Apple", "Google", "apple"]);
    }

    #[test]
    fn test_scoring_mode_parse() {
        assert_eq!("cosine".parse::<ScoringMode>().unwrap(), ScoringMode::Cosine);
        assert_eq!("Distance".parse::<ScoringMode>().unwrap(), ScoringMode::Distance);
        assert!("euclid".parse::<ScoringMode>().is_err());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ArticleOutcome::Failed {
            article: Article::from_text("t", "d"),
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }
}
