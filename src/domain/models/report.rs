//! Raw facts extracted from a detailed findings report.
//!
//! These are the parser's output: pure per-build observations with no
//! history applied. The reconciler combines them with prior builds'
//! records to produce the final [`super::scan_record::ScanRecord`].

use serde::{Deserialize, Serialize};

use super::severity::SEVERITY_LEVELS;

/// Per-component facts as reported, before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFact {
    pub name: String,
    pub blacklisted: bool,
    pub is_new: bool,
    pub violates_policy: bool,
}

/// Software composition facts, present only when the report carries the
/// composition section (the account is subscribed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaFacts {
    pub counts: [u32; SEVERITY_LEVELS],
    pub mitigated: [bool; SEVERITY_LEVELS],
    /// Maximum CVSS score across components; −1.0 when no component
    /// carries a score.
    pub max_cvss_score: f64,
    pub blacklisted_count: u32,
    pub components: Vec<ComponentFact>,
}

impl ScaFacts {
    /// Sum of active vulnerability counts across severities.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}

/// Everything the parser reads out of one detailed report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFacts {
    pub account_id: String,
    pub app_id: String,
    pub build_id: String,
    pub policy_name: String,
    pub policy_compliance_status: String,
    pub assurance_level: String,
    pub score: i64,
    pub scan_overdue: bool,
    /// Active findings per severity (fixed and accepted-mitigation
    /// findings excluded).
    pub counts: [u32; SEVERITY_LEVELS],
    /// Severity has at least one accepted mitigation.
    pub mitigated: [bool; SEVERITY_LEVELS],
    /// Severity has at least one finding affecting policy compliance.
    pub policy_affected: [bool; SEVERITY_LEVELS],
    /// Per-severity change attributes from the report summary node.
    /// Severity 0 is never emitted upstream and stays 0.
    pub net_changes: [i64; SEVERITY_LEVELS],
    pub sca: Option<ScaFacts>,
}

impl RawFacts {
    /// Sum of active finding counts across severities.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}
