use crate::core::verifier::ClaimVerifier;
use crate::domain::model::{ClaimOutcome, VerificationOutcome};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 5;

/// Bounded pool that verifies a batch of claims in parallel.
///
/// Each claim runs as its own tokio task holding one semaphore permit, so at most
/// `width` verifications are in flight; the rest wait in FIFO order. The batch
/// call is a barrier: it returns once every claim has an outcome, in input order.
pub struct VerificationPool {
    verifier: Arc<ClaimVerifier>,
    permits: Arc<Semaphore>,
    width: usize,
}

impl VerificationPool {
    pub fn new(verifier: ClaimVerifier, width: usize) -> Self {
        let width = width.max(1);
        info!("🧵 Verification pool started with {} workers", width);
        Self {
            verifier: Arc::new(verifier),
            permits: Arc::new(Semaphore::new(width)),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn verifier(&self) -> &ClaimVerifier {
        &self.verifier
    }

    /// 關閉後送進來的 claim 一律回傳 Unverified，不會呼叫任何外部服務
    pub fn shutdown(&self) {
        if !self.permits.is_closed() {
            info!("🧵 Verification pool shut down");
            self.permits.close();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }

    pub async fn verify_batch<S: AsRef<str>>(
        &self,
        claims: &[S],
        product_url: Option<&str>,
    ) -> Vec<ClaimOutcome> {
        info!(
            "🔎 Verifying {} claims ({} workers)",
            claims.len(),
            self.width
        );
        let product_url = product_url.map(str::to_string);

        let handles: Vec<_> = claims
            .iter()
            .enumerate()
            .map(|(index, claim)| {
                let claim = claim.as_ref().to_string();
                let verifier = Arc::clone(&self.verifier);
                let permits = Arc::clone(&self.permits);
                let product_url = product_url.clone();

                tokio::spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        warn!(index, "Verification pool is shut down, claim skipped");
                        return VerificationOutcome::Unverified;
                    };
                    debug!(index, claim = %claim, "Worker picked up claim");
                    verifier
                        .verify_outcome(&claim, product_url.as_deref())
                        .await
                })
            })
            .collect();

        // join_all 保留輸入順序，與完成順序無關
        let joined = join_all(handles).await;

        let outcomes: Vec<ClaimOutcome> = claims
            .iter()
            .zip(joined)
            .enumerate()
            .map(|(index, (claim, result))| {
                let outcome = result.unwrap_or_else(|e| {
                    warn!(index, error = %e, "Verification task aborted");
                    VerificationOutcome::Unverified
                });
                ClaimOutcome {
                    claim: claim.as_ref().to_string(),
                    outcome,
                }
            })
            .collect();

        let verified = outcomes.iter().filter(|o| o.outcome.is_verified()).count();
        info!("✅ {}/{} claims verified", verified, outcomes.len());
        outcomes
    }
}

impl Drop for VerificationPool {
    fn drop(&mut self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{SearchResult, Verdict};
    use crate::domain::ports::{JudgmentOracle, QueryRewriter, SearchProvider, TextFetcher};
    use crate::utils::error::{Result, VerifyError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 每個 claim 對應一個 URL；查詢時間依 claim 內容決定
    #[derive(Default)]
    struct DelayedSearch {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for DelayedSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = if query.contains("slow") { 150 } else { 20 };
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![SearchResult::with_url(format!(
                "https://evidence.test/{}",
                query.replace(' ', "-")
            ))])
        }
    }

    struct EchoFetcher;

    #[async_trait]
    impl TextFetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            Ok(format!("page for {}", url))
        }
    }

    /// "unknown" 不確定，"boom" 直接 panic，其餘確認
    struct PickyOracle;

    #[async_trait]
    impl JudgmentOracle for PickyOracle {
        async fn judge(&self, claim: &str, _source_text: &str) -> Result<Verdict> {
            if claim.contains("boom") {
                panic!("oracle crashed");
            }
            if claim.contains("unknown") {
                return Ok(Verdict::Indeterminate);
            }
            Ok(Verdict::Confirmed)
        }
    }

    struct NoRewrite;

    #[async_trait]
    impl QueryRewriter for NoRewrite {
        async fn rewrite(&self, _claim: &str) -> Result<String> {
            Err(VerifyError::RewriteError {
                message: "disabled".to_string(),
            })
        }
    }

    fn pool(search: Arc<DelayedSearch>, width: usize) -> VerificationPool {
        let verifier = ClaimVerifier::new(
            search,
            Arc::new(EchoFetcher),
            Arc::new(PickyOracle),
            Arc::new(NoRewrite),
        );
        VerificationPool::new(verifier, width)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_batch_preserves_input_order() {
        let search = Arc::new(DelayedSearch::default());
        let pool = pool(search, 3);

        let claims = ["claim one", "claim two slow", "claim three"];
        let outcomes = pool.verify_batch(&claims, None).await;

        assert_eq!(outcomes.len(), 3);
        for (outcome, claim) in outcomes.iter().zip(claims) {
            assert_eq!(outcome.claim, claim);
            let expected = format!("https://evidence.test/{}", claim.replace(' ', "-"));
            assert_eq!(outcome.outcome.source_url(), Some(expected.as_str()));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_width_bounds_in_flight_verifications() {
        let search = Arc::new(DelayedSearch::default());
        let pool = pool(search.clone(), 2);

        let claims: Vec<String> = (0..8).map(|i| format!("claim number {}", i)).collect();
        let outcomes = pool.verify_batch(&claims, None).await;

        assert_eq!(outcomes.len(), 8);
        assert!(outcomes.iter().all(|o| o.outcome.is_verified()));
        let max = search.max_in_flight.load(Ordering::SeqCst);
        assert!(max >= 1 && max <= 2, "max in flight was {}", max);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_claims_do_not_affect_others() {
        let search = Arc::new(DelayedSearch::default());
        let pool = pool(search, 5);

        let claims = ["first claim", "unknown claim", "boom claim", "last claim"];
        let outcomes = pool.verify_batch(&claims, None).await;

        let verified: Vec<bool> = outcomes.iter().map(|o| o.outcome.is_verified()).collect();
        assert_eq!(verified, vec![true, false, false, true]);
        assert_eq!(outcomes[2].claim, "boom claim");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let pool = pool(Arc::new(DelayedSearch::default()), 5);
        let claims: Vec<String> = Vec::new();
        assert!(pool.verify_batch(&claims, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_pool_skips_collaborators() {
        let search = Arc::new(DelayedSearch::default());
        let pool = pool(search.clone(), 2);
        pool.shutdown();

        let outcomes = pool.verify_batch(&["a claim", "another claim"], None).await;

        assert!(pool.is_shut_down());
        assert!(outcomes.iter().all(|o| !o.outcome.is_verified()));
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_width_is_clamped() {
        let pool = pool(Arc::new(DelayedSearch::default()), 0);
        assert_eq!(pool.width(), 1);
    }
}
