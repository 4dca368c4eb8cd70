//! Remote analysis DTOs and the review phase enum.
//!
//! Wire shapes returned by the analysis service, plus the explicit phase
//! sequence the review loop drives them through.

use serde::{Deserialize, Serialize};

/// Build status text meaning the linked build's results can be fetched.
pub const BUILD_RESULTS_READY: &str = "Results Ready";

/// Summary of a named dynamic analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub analysis_id: String,
    /// Occurrence id of the most recent run; empty when the analysis has
    /// never run.
    #[serde(default)]
    pub latest_occurrence_id: String,
    #[serde(default)]
    pub status_info: String,
}

/// Status of one occurrence of a dynamic analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OccurrenceStatus {
    /// Terminal success: the occurrence finished and results are available.
    FinishedResultsAvailable,
    VerificationFailed,
    Stopped,
    StoppedTimeExceeded,
    StoppedTimeExceededVerifying,
    StoppedTechnicalIssue,
    StoppedVerifyingByUser,
    StoppedVerifying,
    /// Any other wire value (queued, running, verifying, …): keep waiting.
    Other(String),
}

impl OccurrenceStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "FINISHED_RESULTS_AVAILABLE" => Self::FinishedResultsAvailable,
            "VERIFICATION_FAILED" => Self::VerificationFailed,
            "STOPPED" => Self::Stopped,
            "STOPPED_TIME_EXCEEDED" => Self::StoppedTimeExceeded,
            "STOPPED_TIME_EXCEEDED_VERIFYING" => Self::StoppedTimeExceededVerifying,
            "STOPPED_TECHNICAL_ISSUE" => Self::StoppedTechnicalIssue,
            "STOPPED_VERIFYING_BY_USER" => Self::StoppedVerifyingByUser,
            "STOPPED_VERIFYING" => Self::StoppedVerifying,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::FinishedResultsAvailable => "FINISHED_RESULTS_AVAILABLE",
            Self::VerificationFailed => "VERIFICATION_FAILED",
            Self::Stopped => "STOPPED",
            Self::StoppedTimeExceeded => "STOPPED_TIME_EXCEEDED",
            Self::StoppedTimeExceededVerifying => "STOPPED_TIME_EXCEEDED_VERIFYING",
            Self::StoppedTechnicalIssue => "STOPPED_TECHNICAL_ISSUE",
            Self::StoppedVerifyingByUser => "STOPPED_VERIFYING_BY_USER",
            Self::StoppedVerifying => "STOPPED_VERIFYING",
            Self::Other(value) => value,
        }
    }

    /// Terminal success state.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::FinishedResultsAvailable)
    }

    /// Terminal non-success state; aborts the review without retry.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::VerificationFailed
                | Self::Stopped
                | Self::StoppedTimeExceeded
                | Self::StoppedTimeExceededVerifying
                | Self::StoppedTechnicalIssue
                | Self::StoppedVerifyingByUser
                | Self::StoppedVerifying
        )
    }
}

impl From<String> for OccurrenceStatus {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<OccurrenceStatus> for String {
    fn from(status: OccurrenceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Latest state of one analysis occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceInfo {
    #[serde(default)]
    pub occurrence_id: String,
    pub status: OccurrenceStatus,
}

/// Link between an analysis occurrence and an application build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOccurrence {
    #[serde(default)]
    pub linked_app_id: String,
    #[serde(default)]
    pub linked_app_name: String,
    /// Empty until the service finishes linking results to a build.
    #[serde(default)]
    pub linked_build_id: String,
}

/// Parsed build info for a linked application build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub build_id: String,
    pub analysis_unit_status: String,
}

impl BuildInfo {
    pub fn results_ready(&self) -> bool {
        self.analysis_unit_status == BUILD_RESULTS_READY
    }
}

/// The strictly ordered phases of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Find the occurrence created by the submission step.
    DiscoverOccurrence,
    /// Wait for the occurrence to reach a terminal state.
    AwaitCompletion,
    /// Wait for results to be linked to exactly one application build.
    AwaitLinking,
    /// Wait for the linked build's results to become ready.
    AwaitBuildReady,
    /// Fetch and parse the detailed report.
    FetchAndParse,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DiscoverOccurrence => "discover_occurrence",
            Self::AwaitCompletion => "await_completion",
            Self::AwaitLinking => "await_linking",
            Self::AwaitBuildReady => "await_build_ready",
            Self::FetchAndParse => "fetch_and_parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_wire_constants() {
        for wire in [
            "FINISHED_RESULTS_AVAILABLE",
            "VERIFICATION_FAILED",
            "STOPPED",
            "STOPPED_TIME_EXCEEDED",
            "STOPPED_TIME_EXCEEDED_VERIFYING",
            "STOPPED_TECHNICAL_ISSUE",
            "STOPPED_VERIFYING_BY_USER",
            "STOPPED_VERIFYING",
        ] {
            assert_eq!(OccurrenceStatus::from_wire(wire).as_str(), wire);
        }
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let status = OccurrenceStatus::from_wire("RUNNING");
        assert_eq!(status, OccurrenceStatus::Other("RUNNING".to_string()));
        assert!(!status.is_ready());
        assert!(!status.is_terminal_failure());
    }

    #[test]
    fn test_stopped_variants_are_terminal_failures() {
        assert!(OccurrenceStatus::Stopped.is_terminal_failure());
        assert!(OccurrenceStatus::StoppedVerifying.is_terminal_failure());
        assert!(!OccurrenceStatus::FinishedResultsAvailable.is_terminal_failure());
    }

    #[test]
    fn test_build_info_ready_requires_exact_text() {
        let ready = BuildInfo {
            build_id: "b1".to_string(),
            analysis_unit_status: "Results Ready".to_string(),
        };
        let pending = BuildInfo {
            build_id: "b1".to_string(),
            analysis_unit_status: "Scan In Process".to_string(),
        };
        assert!(ready.results_ready());
        assert!(!pending.results_ready());
    }
}
