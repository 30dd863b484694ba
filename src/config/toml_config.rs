use crate::adapters::openai::{DEFAULT_COPY_TEMPERATURE, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL};
use crate::adapters::fetcher::DEFAULT_USER_AGENT;
use crate::adapters::tavily::{DEFAULT_MAX_RESULTS, DEFAULT_TAVILY_ENDPOINT};
use crate::core::verifier::{VerifierSettings, DEFAULT_CALL_TIMEOUT, DEFAULT_SOURCE_TEXT_LIMIT};
use crate::core::worker_pool::DEFAULT_WORKERS;
use crate::utils::error::{Result, VerifyError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// 所有欄位都有預設值，空檔案也是合法設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub fetch: FetchConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_results: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub copy_temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub workers: usize,
    /// 單次外部呼叫 (含 LLM 判斷) 的上限秒數
    pub call_timeout_seconds: u64,
    pub source_text_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TAVILY_ENDPOINT.to_string(),
            api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
            timeout_seconds: 10,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            copy_temperature: DEFAULT_COPY_TEMPERATURE,
            timeout_seconds: 30,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            call_timeout_seconds: DEFAULT_CALL_TIMEOUT.as_secs(),
            source_text_limit: DEFAULT_SOURCE_TEXT_LIMIT,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(VerifyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未設定的 API key 改用環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: AppConfig =
            toml::from_str(&processed_content).map_err(|e| VerifyError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.apply_env_fallbacks();
        Ok(config)
    }

    /// 預設配置 + 環境變數中的 API key
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_fallbacks();
        config
    }

    /// 替換 `${VAR}`；找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn apply_env_fallbacks(&mut self) {
        if self.search.api_key.is_none() {
            self.search.api_key = std::env::var(TAVILY_API_KEY_ENV).ok();
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var(OPENAI_API_KEY_ENV).ok();
        }
    }

    /// Both API keys must be present before any backend is built.
    pub fn validate_credentials(&self) -> Result<()> {
        validation::validate_api_key("search.api_key", &self.search.api_key)?;
        validation::validate_api_key("llm.api_key", &self.llm.api_key)?;
        Ok(())
    }

    pub fn verifier_settings(&self) -> VerifierSettings {
        VerifierSettings {
            call_timeout: Duration::from_secs(self.verification.call_timeout_seconds),
            source_text_limit: self.verification.source_text_limit,
        }
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_seconds)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_seconds)
    }

    pub fn workers(&self) -> usize {
        self.verification.workers
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("search.endpoint", &self.search.endpoint)?;
        validation::validate_range("search.max_results", self.search.max_results, 1, 20)?;
        validation::validate_positive_number(
            "search.timeout_seconds",
            self.search.timeout_seconds as usize,
            1,
        )?;

        validation::validate_url("llm.base_url", &self.llm.base_url)?;
        validation::validate_non_empty_string("llm.model", &self.llm.model)?;
        validation::validate_range("llm.copy_temperature", self.llm.copy_temperature, 0.0, 2.0)?;
        validation::validate_positive_number(
            "llm.timeout_seconds",
            self.llm.timeout_seconds as usize,
            1,
        )?;

        validation::validate_positive_number(
            "fetch.timeout_seconds",
            self.fetch.timeout_seconds as usize,
            1,
        )?;
        validation::validate_non_empty_string("fetch.user_agent", &self.fetch.user_agent)?;

        validation::validate_range("verification.workers", self.verification.workers, 1, 64)?;
        validation::validate_positive_number(
            "verification.call_timeout_seconds",
            self.verification.call_timeout_seconds as usize,
            1,
        )?;
        validation::validate_positive_number(
            "verification.source_text_limit",
            self.verification.source_text_limit,
            100,
        )?;

        Ok(())
    }
}
