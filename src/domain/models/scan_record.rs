//! Scan record domain model.
//!
//! A [`ScanRecord`] is the immutable result of one review: parsed report
//! facts reconciled against the build history. It is written exactly once
//! per build and read back by later builds as reconciliation input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::severity::{empty_severity_table, FindingCounts, SEVERITY_LEVELS};

/// Policy compliance status string meaning the build passed policy.
pub const POLICY_PASS: &str = "Pass";

/// Maximum number of samples kept in a trend window.
pub const TREND_CAPACITY: usize = 8;

/// One point of the charting trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSample {
    pub timestamp: DateTime<Utc>,
    pub count: u64,
}

/// Capped rolling series of historical finding totals.
///
/// Holds at most [`TREND_CAPACITY`] samples; appending beyond that evicts
/// the oldest sample first. The window feeds charting only and plays no
/// part in new/net computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendWindow {
    samples: Vec<TrendSample>,
}

impl TrendWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, evicting the oldest when the cap is exceeded.
    pub fn push(&mut self, timestamp: DateTime<Utc>, count: u64) {
        self.samples.push(TrendSample { timestamp, count });
        if self.samples.len() > TREND_CAPACITY {
            self.samples.remove(0);
        }
    }

    pub fn samples(&self) -> &[TrendSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-component facts from the software composition section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,
    pub blacklisted: bool,
    pub is_new: bool,
    pub violates_policy: bool,
}

/// Software composition (third-party component) slice of a scan record.
///
/// Present with `subscribed = false` when the account is not subscribed to
/// composition analysis; the per-severity table and trend are still carried
/// so charting stays uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaRecord {
    pub subscribed: bool,
    /// Maximum CVSS score across components; −1.0 when no component
    /// carries a score.
    pub max_cvss_score: f64,
    pub blacklisted_count: u32,
    pub findings: [FindingCounts; SEVERITY_LEVELS],
    pub trend: TrendWindow,
    pub components: Vec<ComponentRecord>,
}

/// The immutable data model produced by one review of one build.
///
/// `has_data` distinguishes a real parsed record from the documented
/// "no data available" state written when a review fails at any phase.
/// Empty records are valid, renderable, and skipped by ancestor lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub has_data: bool,
    pub account_id: String,
    pub app_id: String,
    pub build_id: String,
    pub policy_name: String,
    pub policy_compliance_status: String,
    pub assurance_level: String,
    pub score: i64,
    pub scan_overdue: bool,
    pub total_count: u64,
    pub findings: [FindingCounts; SEVERITY_LEVELS],
    pub policy_affected: [bool; SEVERITY_LEVELS],
    pub net_changes: [i64; SEVERITY_LEVELS],
    pub trend: TrendWindow,
    pub sca: Option<ScaRecord>,
    pub recorded_at: DateTime<Utc>,
}

impl ScanRecord {
    /// The documented "no data available" record.
    pub fn empty() -> Self {
        Self {
            has_data: false,
            account_id: String::new(),
            app_id: String::new(),
            build_id: String::new(),
            policy_name: String::new(),
            policy_compliance_status: String::new(),
            assurance_level: String::new(),
            score: 0,
            scan_overdue: false,
            total_count: 0,
            findings: empty_severity_table(),
            policy_affected: [false; SEVERITY_LEVELS],
            net_changes: [0; SEVERITY_LEVELS],
            trend: TrendWindow::new(),
            sca: None,
            recorded_at: Utc::now(),
        }
    }

    /// Whether the build passed the configured security policy.
    pub fn policy_passed(&self) -> bool {
        self.policy_compliance_status == POLICY_PASS
    }
}
