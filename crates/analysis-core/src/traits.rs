use async_trait::async_trait;
use crate::{AnalysisError, NewsArticle, SentimentReport};

/// Source of recent news headlines for a search keyword
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, keyword: &str) -> Result<Vec<NewsArticle>, AnalysisError>;
}

/// Sentiment collaborator consulted by the decision layer.
///
/// Implementations never fail: an unreachable source degrades to
/// [`SentimentReport::neutral`].
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn sentiment(&self, symbol: &str) -> SentimentReport;
}
