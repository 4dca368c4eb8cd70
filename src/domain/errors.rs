//! Domain errors for the review workflow.

use thiserror::Error;

use crate::domain::models::analysis::Phase;
use crate::domain::ports::analysis_client::ServiceError;

/// Everything that can end a review without a populated scan record.
///
/// The review service never lets one of these escape to the caller: each
/// is logged at the point of detection and converted into an empty record
/// with `success = false`. The variants exist so that logs and callers can
/// tell a timeout from a terminal analysis failure from a broken report.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Bad input detected before any network call; never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A non-transient service failure during a phase.
    #[error("service error during {}: {source}", .phase.as_str())]
    Service {
        phase: Phase,
        #[source]
        source: ServiceError,
    },

    /// Too many consecutive transient failures within a single phase.
    #[error(
        "aborted {} after {attempts} consecutive transient service errors: {source}",
        .phase.as_str()
    )]
    TransientBudgetExhausted {
        phase: Phase,
        attempts: u32,
        #[source]
        source: ServiceError,
    },

    /// The remote analysis ended in an explicit non-success terminal state.
    #[error("analysis occurrence ended with terminal status {status}")]
    TerminalAnalysisFailure { status: String },

    /// More than one scan occurrence was linked to the analysis occurrence.
    #[error("ambiguous link: {count} scan occurrences returned, expected at most one")]
    AmbiguousLink { count: usize },

    /// The scan occurrence carries no linked application id.
    #[error("scan occurrence is not linked to any application")]
    UnlinkedApplication,

    /// The wall-clock budget ran out while still waiting in a phase.
    #[error("wait budget exhausted during {}", .phase.as_str())]
    Timeout { phase: Phase },

    /// The detailed report (or build info document) could not be parsed.
    #[error("malformed report: {0}")]
    MalformedReport(String),
}

impl ReviewError {
    /// Short classification tag used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Service { .. } => "service_error",
            Self::TransientBudgetExhausted { .. } => "transient_budget_exhausted",
            Self::TerminalAnalysisFailure { .. } => "terminal_analysis_failure",
            Self::AmbiguousLink { .. } => "ambiguous_link",
            Self::UnlinkedApplication => "unlinked_application",
            Self::Timeout { .. } => "timeout",
            Self::MalformedReport(_) => "malformed_report",
        }
    }

    /// Whether this failure is the documented timeout outcome, as opposed
    /// to an error. Callers log the two differently.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type ReviewResult<T> = Result<T, ReviewError>;
