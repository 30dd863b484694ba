use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Search failed: {message}")]
    SearchError { message: String },

    #[error("Could not fetch {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("Judgment oracle failed: {message}")]
    OracleError { message: String },

    #[error("Query rewrite failed: {message}")]
    RewriteError { message: String },

    #[error("Claim extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("Copy generation failed: {message}")]
    CopyError { message: String },

    #[error("{operation} timed out after {seconds}s")]
    TimeoutError { operation: String, seconds: u64 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Collaborator,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl VerifyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VerifyError::HttpError(_)
            | VerifyError::FetchError { .. }
            | VerifyError::TimeoutError { .. } => ErrorCategory::Network,
            VerifyError::ConfigError { .. }
            | VerifyError::MissingConfigError { .. }
            | VerifyError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            VerifyError::SearchError { .. }
            | VerifyError::OracleError { .. }
            | VerifyError::RewriteError { .. }
            | VerifyError::ExtractionError { .. }
            | VerifyError::CopyError { .. } => ErrorCategory::Collaborator,
            VerifyError::CsvError(_)
            | VerifyError::SerializationError(_)
            | VerifyError::ProcessingError { .. }
            | VerifyError::ValidationError { .. } => ErrorCategory::Data,
            VerifyError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Collaborator => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 暫時性錯誤：重試可能成功
    pub fn is_transient(&self) -> bool {
        match self {
            VerifyError::HttpError(e) => e.is_timeout() || e.is_connect(),
            VerifyError::TimeoutError { .. }
            | VerifyError::FetchError { .. }
            | VerifyError::SearchError { .. }
            | VerifyError::OracleError { .. }
            | VerifyError::RewriteError { .. } => true,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            VerifyError::HttpError(_) | VerifyError::TimeoutError { .. } => {
                "Check your network connection or raise the timeout in the config file"
            }
            VerifyError::FetchError { .. } => {
                "Make sure the product page is publicly reachable and serves HTML"
            }
            VerifyError::MissingConfigError { .. } => {
                "Set the missing value in the config file or export the matching environment variable"
            }
            VerifyError::ConfigError { .. } | VerifyError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
            VerifyError::SearchError { .. } => "Check the search API key and quota",
            VerifyError::OracleError { .. }
            | VerifyError::RewriteError { .. }
            | VerifyError::ExtractionError { .. }
            | VerifyError::CopyError { .. } => "Check the LLM API key, model name and quota",
            VerifyError::ProcessingError { .. } | VerifyError::ValidationError { .. } => {
                "Try another product page; this one may not contain verifiable claims"
            }
            VerifyError::CsvError(_) | VerifyError::SerializationError(_) => {
                "Check that the output location is writable"
            }
            VerifyError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            VerifyError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            VerifyError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            VerifyError::FetchError { url, .. } => format!("Could not read the page at {}", url),
            VerifyError::TimeoutError { operation, .. } => {
                format!("The {} took too long to respond", operation)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
