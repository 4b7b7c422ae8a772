//! Judgment service boundary.
//!
//! The reasoning step that turns evidence into a score is an opaque
//! external collaborator. This module pins down its interface — a
//! bounded prompt in, a structured report out — so providers can be
//! swapped without touching the pipeline.

pub mod prompt;
pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::AuditReport;

/// Errors from the judgment provider.
#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("failed to parse judgment response: {0}")]
    ParseError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM-backed audit judgment.
///
/// Implementations handle client construction, the completion call,
/// and response parsing. The returned report's score is already
/// clamped to [0, 100].
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    /// Run one judgment over a prepared prompt pair.
    async fn judge(&self, system_prompt: &str, user_prompt: &str)
    -> Result<AuditReport, JudgeError>;
}
