use crate::core::worker_pool::VerificationPool;
use crate::domain::model::{CopyReport, CopyRequest};
use crate::domain::ports::{ClaimExtractor, CopyWriter, TextFetcher};
use crate::utils::error::{Result, VerifyError};
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use std::sync::Arc;

/// Product page -> claims -> verified claims -> ad copy.
pub struct AdCopyPipeline {
    fetcher: Arc<dyn TextFetcher>,
    extractor: Arc<dyn ClaimExtractor>,
    writer: Arc<dyn CopyWriter>,
    pool: VerificationPool,
    monitor: SystemMonitor,
}

impl AdCopyPipeline {
    pub fn new(
        fetcher: Arc<dyn TextFetcher>,
        extractor: Arc<dyn ClaimExtractor>,
        writer: Arc<dyn CopyWriter>,
        pool: VerificationPool,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            writer,
            pool,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub fn pool(&self) -> &VerificationPool {
        &self.pool
    }

    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    pub async fn extract_claims(&self, product_url: &str) -> Result<Vec<String>> {
        let page_text = self.fetcher.fetch(product_url).await?;
        tracing::debug!("Product page text: {} chars", page_text.len());

        let claims = self.extractor.extract(&page_text).await?;
        if claims.is_empty() {
            return Err(VerifyError::ProcessingError {
                message: format!("No claims extracted from {}", product_url),
            });
        }
        Ok(claims)
    }

    pub async fn run(&self, request: &CopyRequest) -> Result<CopyReport> {
        tracing::info!("📝 Step 1 of 3 - Extracting claims from {}", request.product_url);
        let mut claims = self.extract_claims(&request.product_url).await?;
        tracing::info!("Extracted {} claims", claims.len());

        if let Some(limit) = request.extract_limit {
            claims.truncate(limit);
        }
        // 超過驗證數量的 claim 不驗證，也不列入報告
        if let Some(limit) = request.verify_limit {
            claims.truncate(limit);
        }
        self.monitor.log_phase("Extraction");

        tracing::info!("🔎 Step 2 of 3 - Verifying {} claims", claims.len());
        // 不帶商品頁網址：官方網域只從 claim 的品牌推得，避免用商品頁證明自己
        let outcomes = self.pool.verify_batch(&claims, None).await;
        self.monitor.log_phase("Verification");

        let verified: Vec<String> = outcomes
            .iter()
            .filter(|o| o.outcome.is_verified())
            .map(|o| o.claim.clone())
            .collect();

        tracing::info!("✍️ Step 3 of 3 - Generating ad copy ({} tone)", request.tone);
        let ad_copy = if verified.is_empty() {
            tracing::warn!("No verified claims, skipping copy generation");
            None
        } else {
            match self.writer.write(&verified, request.tone).await {
                Ok(copy) => Some(copy),
                Err(e) => {
                    tracing::error!("❌ Copy generation failed: {}", e);
                    None
                }
            }
        };
        self.monitor.log_phase("Copywriting");
        self.monitor.log_final_stats();

        Ok(CopyReport {
            product_url: request.product_url.clone(),
            tone: request.tone,
            outcomes,
            ad_copy,
            generated_at: Utc::now(),
        })
    }
}
