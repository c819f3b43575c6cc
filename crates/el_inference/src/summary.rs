//! Extractive summaries focused on the ranked entities.

use std::fmt;
use el_core::text::{clean_html, split_sentences};
use el_core::{cosine_similarity, Error, RankedEntity, Result, SharedEmbedder, Summary, SummarySentence};

use crate::config::SummaryConfig;
use crate::threshold::{self, ScoreOrder, ThresholdPolicy};

pub struct Summarizer {
    embedder: SharedEmbedder,
    config: SummaryConfig,
}

impl fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summarizer")
            .field("embedder", &self.embedder.name())
            .field("config", &self.config)
            .finish()
    }
}

fn round3(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}

impl Summarizer {
    pub fn new(embedder: SharedEmbedder, config: SummaryConfig) -> Self {
        Self { embedder, config }
    }

    pub async fn summarize(&self, article_text: &str, ranked: &[RankedEntity]) -> Result<Summary> {
        let clean_text = clean_html(article_text);
        let sentences = split_sentences(&clean_text);

        if sentences.len() <= self.config.short_article_sentences {
            return Ok(Summary {
                summary: clean_text,
                sentence_count: sentences.len(),
                threshold_used: None,
                selected_scores: Vec::new(),
            });
        }

        if ranked.is_empty() {
            tracing::debug!("No ranked entities, summarizing with the leading sentences");
            let lead: Vec<String> = sentences
                .into_iter()
                .take(self.config.short_article_sentences)
                .collect();
            return Ok(Summary {
                summary: lead.join(" "),
                sentence_count: lead.len(),
                threshold_used: None,
                selected_scores: Vec::new(),
            });
        }

        let focus = ranked
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(&self.config.focus_delimiter);
        let focus_vector = self.embedder.embed(&focus).await?;

        let sentence_refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let sentence_vectors = self.embedder.embed_batch(&sentence_refs).await?;
        if sentence_vectors.len() != sentences.len() {
            return Err(Error::Inference(format!(
                "Embedder returned {} vectors for {} sentences",
                sentence_vectors.len(),
                sentences.len()
            )));
        }

        let scored: Vec<SummarySentence> = sentences
            .into_iter()
            .zip(&sentence_vectors)
            .enumerate()
            .map(|(index, (text, vector))| SummarySentence {
                text,
                index,
                score: cosine_similarity(vector, &focus_vector),
            })
            .collect();

        let policy = ThresholdPolicy {
            primary: self.config.threshold,
            fallback: Some(self.config.fallback),
            order: ScoreOrder::HigherIsBetter,
        };
        let total = scored.len();
        let selection = threshold::select(scored, |s| s.score, policy)
            .ok_or_else(|| Error::Inference("No sentences to summarize".to_string()))?;

        let mut selected = selection.items;
        selected.sort_by_key(|s| s.index);

        tracing::debug!(
            "Selected {} of {} sentences at threshold {:.3}",
            selected.len(),
            total,
            selection.threshold
        );

        Ok(Summary {
            summary: selected.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" "),
            sentence_count: selected.len(),
            threshold_used: Some(selection.threshold),
            selected_scores: selected.iter().map(|s| round3(s.score)).collect(),
        })
    }
}
