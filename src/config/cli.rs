use crate::config::toml_config::AppConfig;
use crate::domain::model::{CopyRequest, Tone};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

pub const MAX_EXTRACT_COUNT: usize = 20;
pub const MAX_VERIFY_COUNT: usize = 10;

#[derive(Debug, Clone, Parser)]
#[command(name = "verified-copy")]
#[command(about = "Extracts product claims, fact-checks them on the web and writes ad copy from the verified ones")]
pub struct CliConfig {
    /// Product page URL
    #[arg(long)]
    pub url: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value_t = Tone::Professional)]
    pub tone: Tone,

    /// Number of claims to keep after extraction
    #[arg(long, default_value = "5")]
    pub extract_count: usize,

    /// Keep every extracted claim (ignores --extract-count)
    #[arg(long)]
    pub extract_all: bool,

    /// Number of claims to verify
    #[arg(long, default_value = "5")]
    pub verify_count: usize,

    /// Verify every kept claim (ignores --verify-count)
    #[arg(long)]
    pub verify_all: bool,

    /// Override the verification worker count from the config file
    #[arg(long)]
    pub workers: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the verification report as CSV
    #[arg(long)]
    pub report_csv: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage after each phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// 載入設定檔 (沒有就用預設值)，再套用命令列覆蓋
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env(),
        };

        if let Some(workers) = self.workers {
            tracing::info!("🔧 Worker count overridden to: {}", workers);
            config.verification.workers = workers;
        }

        Ok(config)
    }

    pub fn copy_request(&self) -> CopyRequest {
        CopyRequest {
            product_url: self.url.clone(),
            tone: self.tone,
            extract_limit: (!self.extract_all).then_some(self.extract_count),
            verify_limit: (!self.verify_all).then_some(self.verify_count),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("url", &self.url)?;
        if !self.extract_all {
            validation::validate_range("extract_count", self.extract_count, 1, MAX_EXTRACT_COUNT)?;
        }
        if !self.verify_all {
            validation::validate_range("verify_count", self.verify_count, 1, MAX_VERIFY_COUNT)?;
        }
        if let Some(workers) = self.workers {
            validation::validate_range("workers", workers, 1, 64)?;
        }
        if let Some(path) = &self.report_csv {
            validation::validate_non_empty_string("report_csv", path)?;
        }
        Ok(())
    }
}
