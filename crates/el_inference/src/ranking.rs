//! Entity ranking by embedding-space relevance to the article.

use std::fmt;
use el_core::text::clean_html;
use el_core::{
    cosine_similarity, normalized_manhattan_distance, Error, RankedEntity, Ranking, Result,
    ScoringMode, SharedEmbedder,
};

use crate::config::RankingConfig;
use crate::threshold::{self, ScoreOrder, ThresholdPolicy};

pub struct EntityRanker {
    embedder: SharedEmbedder,
    config: RankingConfig,
}

impl fmt::Debug for EntityRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRanker")
            .field("embedder", &self.embedder.name())
            .field("config", &self.config)
            .finish()
    }
}

impl EntityRanker {
    pub fn new(embedder: SharedEmbedder, config: RankingConfig) -> Self {
        Self { embedder, config }
    }

    pub fn mode(&self) -> ScoringMode {
        self.config.mode
    }

    /// Ranks candidate names against the article text.
    ///
    /// Duplicate names are dropped, keeping the first occurrence. An empty candidate list
    /// returns an empty ranking without touching the embedder; any other input returns at
    /// least one entity.
    pub async fn rank(&self, article_text: &str, candidates: &[String]) -> Result<Ranking> {
        let mut names: Vec<&str> = Vec::new();
        for candidate in candidates {
            if !names.contains(&candidate.as_str()) {
                names.push(candidate.as_str());
            }
        }
        if names.is_empty() {
            return Ok(Ranking::empty(self.config.mode));
        }

        let article_vector = self.embedder.embed(&clean_html(article_text)).await?;
        let entity_vectors = self.embedder.embed_batch(&names).await?;
        if entity_vectors.len() != names.len() {
            return Err(Error::Inference(format!(
                "Embedder returned {} vectors for {} entities",
                entity_vectors.len(),
                names.len()
            )));
        }

        let scored: Vec<RankedEntity> = names
            .iter()
            .zip(&entity_vectors)
            .map(|(name, vector)| RankedEntity {
                name: name.to_string(),
                score: self.score(vector, &article_vector),
            })
            .collect();

        let Some(selection) = threshold::select(scored, |e| e.score, self.policy()) else {
            return Ok(Ranking::empty(self.config.mode));
        };

        let mut entities = selection.items;
        match self.config.mode {
            ScoringMode::Cosine => entities.sort_by(|a, b| b.score.total_cmp(&a.score)),
            ScoringMode::Distance => entities.sort_by(|a, b| a.score.total_cmp(&b.score)),
        }

        tracing::debug!(
            "Ranked {} of {} entities ({} mode, threshold {:.3})",
            entities.len(),
            names.len(),
            self.config.mode,
            selection.threshold
        );

        Ok(Ranking {
            mode: self.config.mode,
            threshold_used: Some(selection.threshold),
            entities,
        })
    }

    fn score(&self, entity: &[f32], article: &[f32]) -> f32 {
        match self.config.mode {
            ScoringMode::Cosine => cosine_similarity(entity, article),
            ScoringMode::Distance => normalized_manhattan_distance(entity, article),
        }
    }

    fn policy(&self) -> ThresholdPolicy {
        match self.config.mode {
            ScoringMode::Cosine => ThresholdPolicy {
                primary: self.config.cosine_threshold,
                fallback: Some(self.config.cosine_fallback),
                order: ScoreOrder::HigherIsBetter,
            },
            ScoringMode::Distance => ThresholdPolicy {
                primary: self.config.max_distance,
                fallback: None,
                order: ScoreOrder::LowerIsBetter,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DummyModel;
    use async_trait::async_trait;
    use el_core::Embedder;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns fixed vectors per text and counts calls.
    struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn new(pairs: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn name(&self) -> &str {
            "fixed"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Inference(format!("no vector for {}", text)))
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn cosine_config() -> RankingConfig {
        RankingConfig::default()
    }

    fn distance_config() -> RankingConfig {
        RankingConfig {
            mode: ScoringMode::Distance,
            ..Default::default()
        }
    }

    // Unit vectors at a given cosine to the article vector [1, 0].
    fn at_cosine(c: f32) -> Vec<f32> {
        vec![c, (1.0 - c * c).sqrt()]
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_embedder() {
        let embedder = Arc::new(FixedEmbedder::new(&[]));
        let ranker = EntityRanker::new(embedder.clone(), cosine_config());
        let ranking = ranker.rank("anything", &[]).await.unwrap();
        assert!(ranking.is_empty());
        assert!(ranking.threshold_used.is_none());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cosine_keeps_above_threshold_descending() {
        let embedder = Arc::new(FixedEmbedder::new(&[
            ("article", vec![1.0, 0.0]),
            ("A", at_cosine(0.75)),
            ("B", at_cosine(0.95)),
            ("C", at_cosine(0.2)),
        ]));
        let ranker = EntityRanker::new(embedder, cosine_config());
        let ranking = ranker.rank("article", &names(&["A", "B", "C", "A"])).await.unwrap();
        assert_eq!(ranking.names(), vec!["B", "A"]);
        assert_eq!(ranking.threshold_used, Some(0.7));
        assert!(ranking.entities.iter().all(|e| (-1.0..=1.0).contains(&e.score)));
    }

    #[tokio::test]
    async fn test_cosine_fallback_then_best_single() {
        let embedder = Arc::new(FixedEmbedder::new(&[
            ("article", vec![1.0, 0.0]),
            ("A", at_cosine(0.65)),
            ("B", at_cosine(0.3)),
        ]));
        let ranker = EntityRanker::new(embedder, cosine_config());
        let ranking = ranker.rank("article", &names(&["B", "A"])).await.unwrap();
        assert_eq!(ranking.names(), vec!["A"]);
        assert_eq!(ranking.threshold_used, Some(0.6));

        let embedder = Arc::new(FixedEmbedder::new(&[
            ("article", vec![1.0, 0.0]),
            ("A", at_cosine(0.1)),
            ("B", at_cosine(0.4)),
        ]));
        let ranker = EntityRanker::new(embedder, cosine_config());
        let ranking = ranker.rank("article", &names(&["A", "B"])).await.unwrap();
        assert_eq!(ranking.names(), vec!["B"]);
        let threshold = ranking.threshold_used.unwrap();
        assert!((threshold - 0.4).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_distance_mode_ascending_with_single_fallback() {
        let embedder = Arc::new(FixedEmbedder::new(&[
            ("article", vec![1.0, 0.0]),
            ("near", vec![0.9, 0.1]),
            ("nearer", vec![1.0, 0.05]),
            ("far", vec![-1.0, 0.0]),
        ]));
        let ranker = EntityRanker::new(embedder, distance_config());
        let ranking = ranker.rank("article", &names(&["far", "near", "nearer"])).await.unwrap();
        assert_eq!(ranking.mode, ScoringMode::Distance);
        assert_eq!(ranking.names(), vec!["nearer", "near"]);
        assert!(ranking.entities.iter().all(|e| (0.0..=1.0).contains(&e.score)));

        let embedder = Arc::new(FixedEmbedder::new(&[
            ("article", vec![1.0, 0.0]),
            ("far", vec![-1.0, 0.0]),
            ("farther", vec![-1.0, -1.0]),
        ]));
        let ranker = EntityRanker::new(embedder, distance_config());
        let ranking = ranker.rank("article", &names(&["farther", "far"])).await.unwrap();
        assert_eq!(ranking.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_text_scores() {
        let embedder: SharedEmbedder = Arc::new(DummyModel::new(384));
        let text = "Apple Park";

        let cosine = EntityRanker::new(embedder.clone(), cosine_config());
        let ranking = cosine.rank(text, &names(&[text])).await.unwrap();
        assert!((ranking.entities[0].score - 1.0).abs() < 1e-5);

        let distance = EntityRanker::new(embedder, distance_config());
        let ranking = distance.rank(text, &names(&[text])).await.unwrap();
        assert!(ranking.entities[0].score.abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_never_empty_for_non_empty_input() {
        let embedder: SharedEmbedder = Arc::new(DummyModel::new(384));
        let ranker = EntityRanker::new(embedder, cosine_config());
        let ranking = ranker
            .rank("Completely unrelated prose about weather.", &names(&["Zanzibar", "Quux"]))
            .await
            .unwrap();
        assert!(!ranking.is_empty());
    }

    #[tokio::test]
    async fn test_embedder_errors_propagate() {
        let embedder = Arc::new(FixedEmbedder::new(&[("article", vec![1.0, 0.0])]));
        let ranker = EntityRanker::new(embedder, cosine_config());
        assert!(ranker.rank("article", &names(&["missing"])).await.is_err());
    }
}
