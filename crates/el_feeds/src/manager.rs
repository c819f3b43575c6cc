use std::sync::Arc;
use el_core::{
    candidate_names, Article, ArticleAnalysis, ArticleOutcome, ExtractedEntity, FeedReport,
    Relationship, Result,
};
use el_inference::{
    AnalysisConfig, CooccurrenceGraph, EntityRanker, GraphRenderer, ModelRegistry, RenderedGraph,
    Summarizer,
};

use crate::feed::{FeedClient, DEFAULT_TIMEOUT};
use crate::logging::Logger;

/// Relationships between entities plus the rendered graph, when there was one to draw.
#[derive(Debug, Clone, Default)]
pub struct RelationshipMap {
    pub relationships: Vec<Relationship>,
    pub graph: Option<RenderedGraph>,
}

/// Runs the analysis pipeline (extract, rank, summarize, map) over feeds and ad-hoc text.
pub struct AnalysisManager {
    registry: Arc<ModelRegistry>,
    feeds: FeedClient,
    config: AnalysisConfig,
    renderer: GraphRenderer,
}

impl AnalysisManager {
    pub fn new(registry: Arc<ModelRegistry>, config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            registry,
            feeds: FeedClient::new(DEFAULT_TIMEOUT)?,
            renderer: GraphRenderer::new(config.graph_style.clone()),
            config,
        })
    }

    pub fn with_feed_client(mut self, feeds: FeedClient) -> Self {
        self.feeds = feeds;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Named entities in `text`. A failing extractor yields an empty list.
    pub async fn extract_entities(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        let extractor = self.registry.extractor().await?;
        Ok(extractor.extract_or_empty(text).await)
    }

    /// Co-occurrence relationships among `names`, rendered when at least two are distinct.
    pub fn map_relationships(&self, text: &str, names: &[String]) -> RelationshipMap {
        match CooccurrenceGraph::build(text, names) {
            Some(graph) => RelationshipMap {
                relationships: graph.relationships(),
                graph: Some(self.renderer.render(&graph)),
            },
            None => RelationshipMap::default(),
        }
    }

    /// Fetches a feed and analyses its first `max_articles` entries.
    ///
    /// Each article is isolated: a failure is recorded in its outcome and the rest still run.
    /// Only model loading errors abort the whole report.
    pub async fn analyze_feed(&self, url: &str) -> Result<FeedReport> {
        let articles = self.feeds.fetch_articles(url).await;
        let fetched = articles.len();
        let mut report = FeedReport {
            feed_url: url.to_string(),
            fetched,
            outcomes: Vec::new(),
        };
        if fetched == 0 {
            tracing::warn!("⚠️ No articles found in {}", url);
            return Ok(report);
        }

        // Load both models up front so a misconfiguration fails the request once.
        self.registry.embedder().await?;
        self.registry.extractor().await?;

        let selected: Vec<Article> = articles.into_iter().take(self.config.max_articles).collect();
        let total = selected.len();
        tracing::info!("🦗 Analysing {} of {} articles from {}", total, fetched, url);

        for (i, article) in selected.into_iter().enumerate() {
            let logger = Logger::new().with_prefix(format!("[{}/{}]", i + 1, total));
            match self.analyze_article(&article, &logger).await {
                Ok(analysis) => report.outcomes.push(ArticleOutcome::Analysed(Box::new(analysis))),
                Err(e) => {
                    logger.error(&format!("❌ Analysis failed: {}", e));
                    report.outcomes.push(ArticleOutcome::Failed {
                        article,
                        error: e.to_string(),
                    });
                }
            }
        }

        let failed = report.outcomes.iter().filter(|o| o.is_failed()).count();
        tracing::info!("✅ Feed analysis completed ({} analysed, {} failed)", total - failed, failed);
        Ok(report)
    }

    /// Runs the per-article pipeline on text that did not come from a feed.
    pub async fn analyze_text(&self, title: Option<&str>, text: &str) -> Result<ArticleAnalysis> {
        let article = Article::from_text(title.unwrap_or(Article::UNTITLED), text);
        let logger = Logger::new().with_prefix("[text]");
        self.analyze_article(&article, &logger).await
    }

    pub async fn analyze_article(&self, article: &Article, logger: &Logger) -> Result<ArticleAnalysis> {
        logger.info(&format!("📰 Processing article: {}", article.title));
        let embedder = self.registry.embedder().await?;
        let extractor = self.registry.extractor().await?;
        let text = article.description.as_str();

        logger.debug("🔎 Extracting entities");
        let entities = extractor.extract_or_empty(text).await;
        let candidates = candidate_names(&entities);
        logger.info(&format!(
            "✨ Found {} entities ({} distinct)",
            entities.len(),
            candidates.len()
        ));

        let ranker = EntityRanker::new(embedder.clone(), self.config.ranking.clone());
        let ranking = ranker.rank(text, &candidates).await?;
        logger.info(&format!("📊 Ranked {} entities ({} mode)", ranking.entities.len(), ranking.mode));

        let summarizer = Summarizer::new(embedder, self.config.summary.clone());
        let summary = summarizer.summarize(text, &ranking.entities).await?;
        logger.info(&format!("📝 Summary uses {} sentences", summary.sentence_count));

        let top = ranking.top_names(self.config.graph_top_n);
        let map = self.map_relationships(text, &top);
        match &map.graph {
            Some(_) => logger.info(&format!("🕸️ Mapped {} relationships", map.relationships.len())),
            None => logger.info("🕸️ Not enough entities to map relationships"),
        }

        Ok(ArticleAnalysis {
            article: article.clone(),
            entities,
            ranking,
            summary,
            relationships: map.relationships,
            graph_html: map.graph.map(|g| g.html),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use el_core::{Embedder, Error};
    use el_inference::models::HeuristicExtractor;
    use el_inference::ModelConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Every text maps to the same vector, except text mentioning "boom".
    struct FlatEmbedder;

    #[async_trait]
    impl Embedder for FlatEmbedder {
        fn name(&self) -> &str {
            "flat"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.to_lowercase().contains("boom") {
                return Err(Error::Inference("embedding service unavailable".to_string()));
            }
            Ok(vec![1.0, 0.0])
        }
    }

    fn flat_manager(config: AnalysisConfig) -> AnalysisManager {
        let registry = ModelRegistry::with_models(Arc::new(FlatEmbedder), Arc::new(HeuristicExtractor::new()));
        AnalysisManager::new(Arc::new(registry), config).unwrap()
    }

    fn feed_file(items: &[(&str, &str)]) -> NamedTempFile {
        let body: String = items
            .iter()
            .map(|(title, description)| {
                format!("<item><title>{}</title><description>{}</description></item>", title, description)
            })
            .collect();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<rss version=\"2.0\"><channel>{}</channel></rss>", body).unwrap();
        file
    }

    #[tokio::test]
    async fn test_analyze_text_with_default_models() {
        let registry = Arc::new(ModelRegistry::new(ModelConfig::default()));
        let manager = AnalysisManager::new(registry, AnalysisConfig::default()).unwrap();
        let text = "Apple was founded by Steve Jobs. Microsoft competes with Apple.";
        let analysis = manager.analyze_text(None, text).await.unwrap();

        assert_eq!(analysis.article.title, Article::UNTITLED);
        assert_eq!(analysis.entities.len(), 4);
        assert!(!analysis.ranking.is_empty());
        assert_eq!(analysis.summary.summary, text);
        assert_eq!(analysis.summary.sentence_count, 2);
    }

    #[tokio::test]
    async fn test_graph_built_from_top_entities() {
        let manager = flat_manager(AnalysisConfig::default());
        let analysis = manager
            .analyze_text(Some("Apple"), "Apple was founded by Steve Jobs. Microsoft competes with Apple.")
            .await
            .unwrap();

        assert_eq!(analysis.ranking.entities.len(), 3);
        assert_eq!(analysis.relationships.len(), 2);
        assert!(analysis.graph_html.unwrap().contains("Steve Jobs"));
    }

    #[tokio::test]
    async fn test_graph_top_n_limits_mapping() {
        let config = AnalysisConfig {
            graph_top_n: 1,
            ..Default::default()
        };
        let manager = flat_manager(config);
        let analysis = manager
            .analyze_text(None, "Apple was founded by Steve Jobs. Microsoft competes with Apple.")
            .await
            .unwrap();
        assert!(analysis.relationships.is_empty());
        assert!(analysis.graph_html.is_none());
    }

    #[tokio::test]
    async fn test_failed_article_does_not_stop_the_feed() {
        let file = feed_file(&[
            ("First", "Apple was founded by Steve Jobs."),
            ("Second", "Boom Corp reported boom times."),
            ("Third", "Microsoft competes with Apple."),
        ]);
        let manager = flat_manager(AnalysisConfig::default());
        let report = manager.analyze_feed(file.path().to_str().unwrap()).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.outcomes[0].is_failed());
        assert!(report.outcomes[1].is_failed());
        assert!(!report.outcomes[2].is_failed());
        assert_eq!(report.outcomes[1].article().title, "Second");
        match &report.outcomes[1] {
            ArticleOutcome::Failed { error, .. } => assert!(error.contains("unavailable")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_max_articles_caps_the_report() {
        let file = feed_file(&[
            ("One", "Alpha met Beta."),
            ("Two", "Gamma met Delta."),
            ("Three", "Epsilon met Zeta."),
            ("Four", "Eta met Theta."),
        ]);
        let manager = flat_manager(AnalysisConfig::default());
        let report = manager.analyze_feed(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(report.fetched, 4);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[2].article().title, "Three");
    }

    #[tokio::test]
    async fn test_unreachable_feed_gives_empty_report() {
        let manager = flat_manager(AnalysisConfig::default());
        let report = manager.analyze_feed("/no/such/feed.xml").await.unwrap();
        assert_eq!(report.fetched, 0);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_map_relationships_needs_two_names() {
        let manager = flat_manager(AnalysisConfig::default());
        let map = manager.map_relationships("Apple rose.", &["Apple".to_string()]);
        assert!(map.graph.is_none());
        assert!(map.relationships.is_empty());
    }
}
