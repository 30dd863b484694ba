pub mod domain_resolver;
pub mod pipeline;
pub mod report;
pub mod result_selector;
pub mod verifier;
pub mod worker_pool;

pub use crate::domain::model::{ClaimOutcome, CopyReport, CopyRequest, VerificationOutcome};
pub use crate::domain::ports::{
    ClaimExtractor, CopyWriter, JudgmentOracle, QueryRewriter, SearchProvider, TextFetcher,
};
pub use crate::utils::error::Result;
