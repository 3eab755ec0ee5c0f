//! newsdata.io headline search client.

use analysis_core::{AnalysisError, NewsArticle, NewsSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsdata.io/api/1/news";

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("News API returned status {0}")]
    Status(u16),

    #[error("News API key not configured")]
    MissingApiKey,
}

impl From<NewsError> for AnalysisError {
    fn from(e: NewsError) -> Self {
        AnalysisError::Collaborator(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    results: Option<Vec<NewsDataArticle>>,
}

#[derive(Debug, Deserialize)]
struct NewsDataArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "pubDate")]
    published_date: Option<String>,
}

impl From<NewsDataArticle> for NewsArticle {
    fn from(a: NewsDataArticle) -> Self {
        NewsArticle {
            title: a.title.unwrap_or_default(),
            description: a.description,
            published_date: a.published_date,
        }
    }
}

#[derive(Clone)]
pub struct NewsDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsDataClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// English-language Indian headlines matching `keyword`.
    pub async fn search(&self, keyword: &str) -> Result<Vec<NewsArticle>, NewsError> {
        let api_key = self.api_key.as_deref().ok_or(NewsError::MissingApiKey)?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apikey", api_key),
                ("q", keyword),
                ("language", "en"),
                ("country", "in"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsError::Status(response.status().as_u16()));
        }

        let body = response.json::<NewsDataResponse>().await?;
        let articles: Vec<NewsArticle> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(NewsArticle::from)
            .collect();

        tracing::debug!("Fetched {} articles for '{}'", articles.len(), keyword);
        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for NewsDataClient {
    async fn fetch(&self, keyword: &str) -> Result<Vec<NewsArticle>, AnalysisError> {
        Ok(self.search(keyword).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_newsdata_payload() {
        let body = r#"{
            "status": "success",
            "totalResults": 2,
            "results": [
                {"title": "Wipro wins large deal", "description": "Order book grows", "pubDate": "2024-06-01 10:00:00"},
                {"title": "Wipro shares slip", "description": null}
            ]
        }"#;
        let parsed: NewsDataResponse = serde_json::from_str(body).unwrap();
        let articles: Vec<NewsArticle> = parsed
            .results
            .unwrap()
            .into_iter()
            .map(NewsArticle::from)
            .collect();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].published_date.as_deref(), Some("2024-06-01 10:00:00"));
        assert!(articles[1].description.is_none());
        assert!(articles[1].published_date.is_none());
    }

    #[test]
    fn test_missing_results_is_empty() {
        let parsed: NewsDataResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(parsed.results.is_none());
    }

    #[test]
    fn test_error_payload_is_rejected() {
        let body = r#"{"status": "error", "results": {"message": "API key invalid"}}"#;
        assert!(serde_json::from_str::<NewsDataResponse>(body).is_err());

        let err: AnalysisError = NewsError::Status(401).into();
        assert_eq!(
            err,
            AnalysisError::Collaborator("News API returned status 401".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = NewsDataClient::new(
            "http://127.0.0.1:9".to_string(),
            Some("  ".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!client.has_api_key());
        let err = client.fetch("Wipro").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Collaborator(_)));
    }
}
