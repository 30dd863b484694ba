use crate::domain::model::{SearchResult, Tone, Verdict};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Retrieves a page and returns its visible text.
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Returns ranked search results for a query. The provider decides how many.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Decides whether `source_text` supports `claim`.
#[async_trait]
pub trait JudgmentOracle: Send + Sync {
    async fn judge(&self, claim: &str, source_text: &str) -> Result<Verdict>;
}

/// Rewrites a claim into a short, focused search query.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, claim: &str) -> Result<String>;
}

#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    async fn extract(&self, page_text: &str) -> Result<Vec<String>>;
}

#[async_trait]
pub trait CopyWriter: Send + Sync {
    async fn write(&self, verified_claims: &[String], tone: Tone) -> Result<String>;
}
