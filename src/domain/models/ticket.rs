//! Review ticket: the state handed from the submit step to the review step.
//!
//! The submission pipeline step writes this small JSON document after
//! starting a scan; `review` reads it to know which analysis to watch and
//! which occurrence id predates the submission.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ReviewError;

/// Persisted intermediate state between submit and review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTicket {
    /// Name of the dynamic analysis to review. Must be non-empty.
    #[serde(default)]
    pub analysis_name: String,
    /// Occurrence id that existed before submission; empty when the
    /// analysis had never run. The review must discover a different id.
    #[serde(default)]
    pub previous_occurrence_id: String,
}

impl ReviewTicket {
    pub fn new(analysis_name: impl Into<String>, previous_occurrence_id: impl Into<String>) -> Self {
        Self {
            analysis_name: analysis_name.into(),
            previous_occurrence_id: previous_occurrence_id.into(),
        }
    }

    /// Load a ticket from the JSON file written by the submit step.
    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ReviewError::InvalidInput(format!(
                "cannot read review ticket {}: {err}",
                path.display()
            ))
        })?;
        let ticket: Self = serde_json::from_str(&raw).map_err(|err| {
            ReviewError::InvalidInput(format!(
                "malformed review ticket {}: {err}",
                path.display()
            ))
        })?;
        ticket.validate()?;
        Ok(ticket)
    }

    /// Input validation performed before any network call.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.analysis_name.trim().is_empty() {
            return Err(ReviewError::InvalidInput(
                "analysis name is missing or empty".to_string(),
            ));
        }
        Ok(())
    }
}
