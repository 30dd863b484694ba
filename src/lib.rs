pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::Backends;
pub use config::AppConfig;
pub use crate::core::pipeline::AdCopyPipeline;
pub use crate::core::verifier::ClaimVerifier;
pub use crate::core::worker_pool::VerificationPool;
pub use utils::error::{Result, VerifyError};
