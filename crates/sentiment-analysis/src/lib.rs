//! News sentiment for a symbol: fetch headlines, score each one and label
//! the mean polarity.

use analysis_core::stats::round_to;
use analysis_core::{NewsArticle, NewsItem, NewsSource, SentimentLabel, SentimentProvider, SentimentReport};
use async_trait::async_trait;

pub mod lexicon;
pub mod news;
pub mod symbols;

pub use lexicon::{LexiconScorer, PolarityScorer};
pub use news::{NewsDataClient, NewsError, DEFAULT_NEWS_API_URL};
pub use symbols::search_keyword;

/// Decimal places kept on per-article and aggregate scores.
const SCORE_DECIMALS: i32 = 3;

pub struct SentimentAnalysisEngine<S, P = LexiconScorer> {
    source: S,
    scorer: P,
}

impl<S: NewsSource> SentimentAnalysisEngine<S> {
    pub fn new(source: S) -> Self {
        Self::with_scorer(source, LexiconScorer::new())
    }
}

impl<S: NewsSource, P: PolarityScorer> SentimentAnalysisEngine<S, P> {
    pub fn with_scorer(source: S, scorer: P) -> Self {
        Self { source, scorer }
    }

    /// Fetch and score news for `symbol`. Any collaborator failure degrades
    /// to a neutral report.
    pub async fn analyze(&self, symbol: &str) -> SentimentReport {
        let keyword = search_keyword(symbol);
        match self.source.fetch(&keyword).await {
            Ok(articles) => self.score_articles(symbol, &articles),
            Err(e) => {
                tracing::warn!("Sentiment for {} unavailable, using neutral: {}", symbol, e);
                SentimentReport::neutral(symbol)
            }
        }
    }

    /// Mean polarity of `title + " " + description` over all articles.
    pub fn score_articles(&self, symbol: &str, articles: &[NewsArticle]) -> SentimentReport {
        if articles.is_empty() {
            tracing::debug!("No news articles for {}", symbol);
            return SentimentReport::neutral(symbol);
        }

        let mut total: f64 = 0.0;
        let news: Vec<NewsItem> = articles
            .iter()
            .map(|article| {
                let description = article.description.clone().unwrap_or_default();
                let polarity = self
                    .scorer
                    .polarity(&format!("{} {}", article.title, description));
                total += polarity;
                NewsItem {
                    title: article.title.clone(),
                    description,
                    published_date: article.published_date.clone().unwrap_or_default(),
                    sentiment_score: round_to(polarity, SCORE_DECIMALS),
                }
            })
            .collect();

        let score = total / articles.len() as f64;
        let label = SentimentLabel::from_score(score);
        tracing::info!(
            "Sentiment {}: {} ({:.3}) from {} articles",
            symbol,
            label,
            score,
            news.len()
        );

        SentimentReport {
            symbol: symbol.to_string(),
            score: round_to(score, SCORE_DECIMALS),
            label,
            news,
        }
    }
}

#[async_trait]
impl<S: NewsSource, P: PolarityScorer> SentimentProvider for SentimentAnalysisEngine<S, P> {
    async fn sentiment(&self, symbol: &str) -> SentimentReport {
        self.analyze(symbol).await
    }
}
