use crate::core::domain_resolver;
use crate::core::result_selector;
use crate::domain::model::{DomainSet, Stage, VerificationOutcome};
use crate::domain::ports::{JudgmentOracle, QueryRewriter, SearchProvider, TextFetcher};
use crate::utils::error::{Result, VerifyError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SOURCE_TEXT_LIMIT: usize = 15_000;

#[derive(Debug, Clone)]
pub struct VerifierSettings {
    /// 每一次外部呼叫 (search / fetch / judge / rewrite) 的上限時間
    pub call_timeout: Duration,
    /// 交給 oracle 的原文最多幾個字元
    pub source_text_limit: usize,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            source_text_limit: DEFAULT_SOURCE_TEXT_LIMIT,
        }
    }
}

/// Drives the three verification stages for a single claim.
///
/// 1. search restricted to the official domain (when one can be resolved)
/// 2. search with the raw claim text
/// 3. search with a rewritten query
///
/// A stage only succeeds when the oracle confirms the claim against text fetched
/// from the selected URL. Every collaborator failure is logged and treated as a
/// stage miss, so `verify` never returns an error.
pub struct ClaimVerifier {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn TextFetcher>,
    oracle: Arc<dyn JudgmentOracle>,
    rewriter: Arc<dyn QueryRewriter>,
    settings: VerifierSettings,
}

impl ClaimVerifier {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn TextFetcher>,
        oracle: Arc<dyn JudgmentOracle>,
        rewriter: Arc<dyn QueryRewriter>,
    ) -> Self {
        Self {
            search,
            fetcher,
            oracle,
            rewriter,
            settings: VerifierSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: VerifierSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Returns the URL of a source that confirms `claim`, or `None`.
    pub async fn verify(&self, claim: &str, product_url: Option<&str>) -> Option<String> {
        match domain_resolver::resolve(claim, product_url) {
            Some(domain) => {
                let query = format!("site:{} {}", domain, claim);
                debug!(domain = %domain, query = %query, "Trying official site search");
                let preferred = DomainSet::single(&domain);
                if let Some(url) = self
                    .attempt(Stage::OfficialDomain, claim, &query, &preferred)
                    .await
                {
                    return Some(url);
                }
            }
            None => debug!(claim = %claim, "No official domain could be resolved"),
        }

        debug!("Falling back to global web search");
        if let Some(url) = self
            .attempt(Stage::DirectQuery, claim, claim, &DomainSet::empty())
            .await
        {
            return Some(url);
        }

        match self.bounded("query rewrite", self.rewriter.rewrite(claim)).await {
            Ok(query) => {
                let query = query.trim();
                if query.is_empty() {
                    debug!(claim = %claim, "Query rewriter returned an empty query");
                } else if let Some(url) = self
                    .attempt(Stage::SmartQuery, claim, query, &DomainSet::empty())
                    .await
                {
                    return Some(url);
                }
            }
            Err(e) => warn!(stage = %Stage::SmartQuery, error = %e, "Smart query generation failed"),
        }

        info!(claim = %claim, "Claim could not be verified");
        None
    }

    pub async fn verify_outcome(&self, claim: &str, product_url: Option<&str>) -> VerificationOutcome {
        VerificationOutcome::from_source(self.verify(claim, product_url).await)
    }

    async fn attempt(
        &self,
        stage: Stage,
        claim: &str,
        query: &str,
        preferred: &DomainSet,
    ) -> Option<String> {
        match self.search_and_judge(claim, query, preferred).await {
            Ok(Some(url)) => {
                info!(stage = %stage, url = %url, "Claim verified");
                Some(url)
            }
            Ok(None) => {
                debug!(stage = %stage, query = %query, "Stage produced no confirmation");
                None
            }
            Err(e) if e.is_transient() => {
                warn!(stage = %stage, query = %query, error = %e, "Verification stage failed");
                None
            }
            // 非暫時性錯誤通常是設定問題 (API key、格式)，重試也不會好
            Err(e) => {
                error!(
                    stage = %stage,
                    query = %query,
                    error = %e,
                    category = ?e.category(),
                    "Verification stage failed with a non-retryable error"
                );
                None
            }
        }
    }

    async fn search_and_judge(
        &self,
        claim: &str,
        query: &str,
        preferred: &DomainSet,
    ) -> Result<Option<String>> {
        let results = self.bounded("search", self.search.search(query)).await?;
        let Some(source_url) = result_selector::select(&results, preferred) else {
            debug!(query = %query, results = results.len(), "No usable search result");
            return Ok(None);
        };

        let text = self
            .bounded("page fetch", self.fetcher.fetch(&source_url))
            .await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let excerpt = truncate_chars(&text, self.settings.source_text_limit);
        let verdict = self
            .bounded("judgment", self.oracle.judge(claim, excerpt))
            .await?;
        debug!(url = %source_url, verdict = ?verdict, "Oracle verdict");

        Ok(verdict.is_confirmed().then_some(source_url))
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(VerifyError::TimeoutError {
                operation: operation.to_string(),
                seconds: self.settings.call_timeout.as_secs(),
            }),
        }
    }
}

/// First `limit` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
