use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use el_core::{ArticleOutcome, FeedReport, ScoringMode};
use el_feeds::{init_logging, AnalysisManager};
use el_inference::{
    AnalysisConfig, EmbedderKind, ExtractorKind, ModelConfig, ModelRegistry, RankingConfig,
    DEFAULT_DIMENSIONS,
};
use el_web::page::NO_GRAPH_MESSAGE;
use el_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "el", author, version, about = "Entity analytics for news feeds", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, default_value = "dummy", help = "Embedding backend. Available embedders: dummy (default), openai")]
    embedder: EmbedderKind,
    /// Base URL of an OpenAI-compatible embeddings API
    #[arg(long, global = true, env = "EL_EMBEDDING_URL")]
    embedding_url: Option<String>,
    #[arg(long, global = true, env = "EL_EMBEDDING_MODEL")]
    embedding_model: Option<String>,
    #[arg(long, global = true, env = "EL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, global = true, default_value_t = DEFAULT_DIMENSIONS)]
    dimensions: usize,
    #[arg(long, global = true, default_value = "heuristic", help = "Entity extractor. Available extractors: heuristic (default), http")]
    ner: ExtractorKind,
    /// Token-classification endpoint used by the http extractor
    #[arg(long, global = true, env = "EL_NER_URL")]
    ner_url: Option<String>,
    #[arg(long, global = true, env = "EL_NER_API_KEY", hide_env_values = true)]
    ner_api_key: Option<String>,
    /// Model request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,
    #[arg(long, global = true, default_value = "cosine", help = "Entity ranking. Available modes: cosine (default), distance")]
    scoring: ScoringMode,
    /// Feed entries analysed per request
    #[arg(long, global = true, default_value_t = 3)]
    max_articles: usize,
    /// Ranked entities handed to the relationship map
    #[arg(long, global = true, default_value_t = 10)]
    graph_top_n: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the web interface and JSON API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Analyse the first entries of an RSS or Atom feed
    Analyze {
        /// Feed URL, file:// URL or path
        feed_url: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the named entities found in a text
    Entities {
        text: String,
    },
    /// Map how the given entities co-occur in a text and write the graph as HTML
    Graph {
        #[arg(long)]
        text: String,
        #[arg(long = "entity", required = true)]
        entities: Vec<String>,
        #[arg(long, default_value = "entity_connection_map.html")]
        output: PathBuf,
    },
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            embedder: self.embedder,
            embedding_url: self.embedding_url.clone(),
            embedding_model: self.embedding_model.clone(),
            api_key: self.api_key.clone(),
            dimensions: self.dimensions,
            extractor: self.ner,
            ner_url: self.ner_url.clone(),
            ner_api_key: self.ner_api_key.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }

    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            ranking: RankingConfig {
                mode: self.scoring,
                ..Default::default()
            },
            max_articles: self.max_articles,
            graph_top_n: self.graph_top_n,
            ..Default::default()
        }
    }
}

fn print_report(report: &FeedReport) {
    if report.outcomes.is_empty() {
        println!("No articles found in {}", report.feed_url);
        return;
    }
    println!(
        "Analysed {} of {} articles from {}",
        report.outcomes.len(),
        report.fetched,
        report.feed_url
    );

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let article = outcome.article();
        println!("\n{}. {}", i + 1, article.title);
        println!("   Published: {}", article.published);
        if !article.link.is_empty() {
            println!("   Link: {}", article.link);
        }

        match outcome {
            ArticleOutcome::Failed { error, .. } => println!("   Analysis failed: {}", error),
            ArticleOutcome::Analysed(analysis) => {
                println!("   Summary: {}", analysis.summary.summary);
                println!("   Top entities ({}):", analysis.ranking.mode);
                for entity in &analysis.ranking.entities {
                    println!("     - {}: {:.4}", entity.name, entity.score);
                }
                if analysis.relationships.is_empty() {
                    println!("   {}", NO_GRAPH_MESSAGE);
                } else {
                    println!("   Connections:");
                    for r in &analysis.relationships {
                        println!("     - {} <-> {} ({})", r.source, r.target, r.weight);
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");
    let cli = Cli::parse();

    let registry = Arc::new(ModelRegistry::new(cli.model_config()));
    let manager = AnalysisManager::new(registry, cli.analysis_config())?;
    info!(
        "🧠 Models configured (embedder: {}, extractor: {}, scoring: {})",
        cli.embedder, cli.ner, cli.scoring
    );

    match cli.command {
        Commands::Serve { addr } => {
            let app = el_web::create_app(AppState::new(manager));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("🚀 Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Analyze { feed_url, json } => {
            let report = manager.analyze_feed(&feed_url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Entities { text } => {
            let entities = manager.extract_entities(&text).await?;
            if entities.is_empty() {
                println!("No entities found.");
            }
            for entity in entities {
                println!("- {} [{}] (Confidence: {:.2})", entity.text, entity.label, entity.confidence);
            }
        }
        Commands::Graph { text, entities, output } => {
            let map = manager.map_relationships(&text, &entities);
            match map.graph {
                Some(graph) => {
                    tokio::fs::write(&output, graph.html).await?;
                    for r in &map.relationships {
                        println!("- {} <-> {} ({})", r.source, r.target, r.weight);
                    }
                    println!("Graph saved to {}", output.display());
                }
                None => println!("{}", NO_GRAPH_MESSAGE),
            }
        }
    }

    Ok(())
}
