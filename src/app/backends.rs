use crate::adapters::{HttpTextFetcher, OpenAiClient, TavilySearch};
use crate::config::toml_config::AppConfig;
use crate::core::pipeline::AdCopyPipeline;
use crate::core::verifier::ClaimVerifier;
use crate::core::worker_pool::VerificationPool;
use crate::utils::error::{Result, VerifyError};
use std::sync::Arc;

/// Production HTTP backends built from one `AppConfig`.
///
/// The OpenAI client is shared by the oracle, the rewriter, the extractor and
/// the copy writer.
pub struct Backends {
    pub search: Arc<TavilySearch>,
    pub fetcher: Arc<HttpTextFetcher>,
    pub llm: Arc<OpenAiClient>,
}

impl Backends {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate_credentials()?;
        let search_key = required_key("search.api_key", &config.search.api_key)?;
        let llm_key = required_key("llm.api_key", &config.llm.api_key)?;

        let search = TavilySearch::new(search_key, config.search_timeout())?
            .with_endpoint(config.search.endpoint.clone())
            .with_max_results(config.search.max_results);

        let fetcher = HttpTextFetcher::new(config.fetch_timeout(), &config.fetch.user_agent)?;

        let llm = OpenAiClient::new(llm_key, config.llm_timeout())?
            .with_base_url(config.llm.base_url.clone())
            .with_model(config.llm.model.clone())
            .with_copy_temperature(config.llm.copy_temperature)
            .with_max_input_chars(config.verification.source_text_limit);

        tracing::debug!(
            "Backends ready: search={}, model={}",
            config.search.endpoint,
            llm.model()
        );

        Ok(Self {
            search: Arc::new(search),
            fetcher: Arc::new(fetcher),
            llm: Arc::new(llm),
        })
    }

    pub fn verifier(&self, config: &AppConfig) -> ClaimVerifier {
        ClaimVerifier::new(
            self.search.clone(),
            self.fetcher.clone(),
            self.llm.clone(),
            self.llm.clone(),
        )
        .with_settings(config.verifier_settings())
    }

    pub fn verification_pool(&self, config: &AppConfig) -> VerificationPool {
        VerificationPool::new(self.verifier(config), config.workers())
    }

    pub fn pipeline(&self, config: &AppConfig) -> AdCopyPipeline {
        AdCopyPipeline::new(
            self.fetcher.clone(),
            self.llm.clone(),
            self.llm.clone(),
            self.verification_pool(config),
        )
    }
}

fn required_key<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| VerifyError::MissingConfigError {
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys() -> AppConfig {
        let mut config = AppConfig::default();
        config.search.api_key = Some("tvly-test".to_string());
        config.llm.api_key = Some("sk-test".to_string());
        config.verification.workers = 3;
        config
    }

    #[test]
    fn test_builds_pool_from_config() {
        let config = config_with_keys();
        let backends = Backends::from_config(&config).unwrap();

        let pool = backends.verification_pool(&config);
        assert_eq!(pool.width(), 3);
        assert_eq!(
            pool.verifier().settings().call_timeout,
            config.verifier_settings().call_timeout
        );
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut config = config_with_keys();
        config.llm.api_key = None;

        assert!(matches!(
            Backends::from_config(&config),
            Err(VerifyError::MissingConfigError { .. })
        ));
    }
}
