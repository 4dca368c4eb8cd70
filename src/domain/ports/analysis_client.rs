//! Analysis service client port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::analysis::{AnalysisSummary, OccurrenceInfo, ScanOccurrence};

/// HTTP status meaning a retryable internal failure on the service side.
pub const STATUS_INTERNAL_ERROR: u16 = 500;
/// HTTP status meaning a retryable gateway timeout on the service side.
pub const STATUS_GATEWAY_TIMEOUT: u16 = 504;

/// Error type for remote analysis service calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-2xx response from the service.
    #[error("service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// 2xx response whose body did not match the documented shape.
    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
}

impl ServiceError {
    /// Returns true for the two documented server-side transient codes.
    ///
    /// Only these are retried inside a phase; every other failure is
    /// fatal immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http {
                status: STATUS_INTERNAL_ERROR | STATUS_GATEWAY_TIMEOUT,
                ..
            }
        )
    }
}

/// Client interface for the remote dynamic analysis service.
///
/// This trait defines the remote calls the review loop drives, one per
/// phase plus the submission call that precedes polling. Implementations
/// map transport failures onto [`ServiceError`]; retry and deadline policy
/// live with the caller.
#[async_trait]
pub trait AnalysisServiceClient: Send + Sync {
    /// Look up a dynamic analysis by its configured name.
    async fn analysis_by_name(&self, name: &str) -> Result<AnalysisSummary, ServiceError>;

    /// Start a new occurrence of an existing analysis.
    ///
    /// Precedes the review workflow; the review itself never calls this.
    async fn resubmit_analysis(
        &self,
        analysis_id: &str,
        max_duration_hours: u32,
    ) -> Result<(), ServiceError>;

    /// Latest state of an occurrence, or `None` while the occurrence is
    /// not yet visible on the service side.
    async fn latest_occurrence(
        &self,
        occurrence_id: &str,
    ) -> Result<Option<OccurrenceInfo>, ServiceError>;

    /// Scan occurrences linked to an analysis occurrence.
    ///
    /// The service contract allows zero or one element; callers treat more
    /// than one as fatal.
    async fn scan_occurrences(
        &self,
        occurrence_id: &str,
    ) -> Result<Vec<ScanOccurrence>, ServiceError>;

    /// Build info XML for a linked application build.
    async fn build_info(&self, app_id: &str, build_id: &str) -> Result<String, ServiceError>;

    /// Detailed findings report XML for a build.
    async fn detailed_report(&self, build_id: &str) -> Result<String, ServiceError>;
}
