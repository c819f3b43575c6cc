pub mod feed;
pub mod logging;
pub mod manager;

pub use feed::{parse_feed, FeedClient, ParsedFeed};
pub use logging::{init_logging, Logger};
pub use manager::{AnalysisManager, RelationshipMap};

pub mod prelude {
    pub use super::{AnalysisManager, FeedClient};
    pub use el_core::{Article, ArticleAnalysis, ArticleOutcome, Error, FeedReport, Result};
}
