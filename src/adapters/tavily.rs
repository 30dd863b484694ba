use crate::domain::model::SearchResult;
use crate::domain::ports::SearchProvider;
use crate::utils::error::{Result, VerifyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Tavily web search client.
pub struct TavilySearch {
    api_key: String,
    endpoint: String,
    max_results: usize,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

// url 可能缺漏，保留為無 URL 的紀錄交給 selector 略過；其餘欄位不使用
#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: Option<String>,
}

impl From<TavilyResult> for SearchResult {
    fn from(r: TavilyResult) -> Self {
        SearchResult {
            url: r.url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_TAVILY_ENDPOINT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        debug!(query = %query, max_results = self.max_results, "Tavily search");

        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VerifyError::SearchError {
                message: format!("Tavily API error {}: {}", status, body),
            });
        }

        let body = response.text().await?;
        let parsed: TavilyResponse =
            serde_json::from_str(&body).map_err(|e| VerifyError::SearchError {
                message: format!("Failed to parse Tavily response: {}", e),
            })?;

        Ok(parsed
            .results
            .into_iter()
            .take(self.max_results)
            .map(SearchResult::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> TavilySearch {
        TavilySearch::new("tvly-test", Duration::from_secs(5))
            .unwrap()
            .with_endpoint(server.url("/search"))
    }

    #[tokio::test]
    async fn test_search_sends_query_and_parses_results() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(POST).path("/search").json_body(serde_json::json!({
                "api_key": "tvly-test",
                "query": "site:acme.com Acme blender has a 1200W motor",
                "max_results": 3
            }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "query": "site:acme.com Acme blender has a 1200W motor",
                    "results": [
                        {"title": "Blender", "url": "https://acme.com/blender", "content": "1200W", "score": 0.91},
                        {"title": "Broken", "content": "no url here", "score": 0.4},
                        {"title": "Review", "url": "https://reviews.test/acme", "content": "...", "score": 0.3}
                    ]
                }));
        });

        let results = client(&server)
            .search("site:acme.com Acme blender has a 1200W motor")
            .await
            .unwrap();

        search_mock.assert();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].url.as_deref(), Some("https://acme.com/blender"));
        assert_eq!(results[1].url, None);
        assert_eq!(results[2].url.as_deref(), Some("https://reviews.test/acme"));
    }

    #[tokio::test]
    async fn test_search_caps_result_count() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200).json_body(serde_json::json!({
                "results": [
                    {"url": "https://a.test"},
                    {"url": "https://b.test"},
                    {"url": "https://c.test"}
                ]
            }));
        });

        let results = client(&server)
            .with_max_results(2)
            .search("anything")
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(401).body("invalid api key");
        });

        let err = client(&server).search("anything").await.unwrap_err();
        assert!(matches!(err, VerifyError::SearchError { .. }));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_search_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200).body("<html>not json</html>");
        });

        let err = client(&server).search("anything").await.unwrap_err();
        assert!(matches!(err, VerifyError::SearchError { .. }));
    }
}
