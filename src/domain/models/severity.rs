//! Severity scale and per-severity finding counters.
//!
//! The remote service grades every finding on a six-step scale from
//! informational (0) to very high (5). Counts are always carried in
//! fixed-size arrays indexed by a validated [`Severity`], never by raw
//! integers.

use serde::{Deserialize, Serialize};

/// Number of severity levels on the scale.
pub const SEVERITY_LEVELS: usize = 6;

/// A validated severity level (0–5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Informational = 0,
    VeryLow = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    VeryHigh = 5,
}

impl Severity {
    /// All levels, lowest first.
    pub const ALL: [Severity; SEVERITY_LEVELS] = [
        Self::Informational,
        Self::VeryLow,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::VeryHigh,
    ];

    /// Parse a raw level as reported by the remote service.
    ///
    /// Returns `None` for anything outside 0–5; callers decide whether
    /// that skips a single finding or rejects the whole input.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Informational),
            1 => Some(Self::VeryLow),
            2 => Some(Self::Low),
            3 => Some(Self::Medium),
            4 => Some(Self::High),
            5 => Some(Self::VeryHigh),
            _ => None,
        }
    }

    /// Numeric level as used on the wire.
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Array index for this level.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Informational => "Informational",
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

/// Per-severity finding counters for a single build.
///
/// `count` excludes findings that were verified fixed or whose mitigation
/// was accepted; `mitigated` records that at least one accepted mitigation
/// exists at this severity. `net` is the change against the nearest
/// ancestor build with data and may be negative; `new` clamps it at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    pub severity: Severity,
    pub count: u32,
    pub new: u32,
    pub net: i64,
    pub mitigated: bool,
}

impl FindingCounts {
    /// Counters for a severity with no findings at all.
    pub fn zero(severity: Severity) -> Self {
        Self {
            severity,
            count: 0,
            new: 0,
            net: 0,
            mitigated: false,
        }
    }
}

/// Build a full severity table from a per-level closure.
pub fn severity_table<F>(mut entry: F) -> [FindingCounts; SEVERITY_LEVELS]
where
    F: FnMut(Severity) -> FindingCounts,
{
    Severity::ALL.map(&mut entry)
}

/// An all-zero severity table.
pub fn empty_severity_table() -> [FindingCounts; SEVERITY_LEVELS] {
    severity_table(FindingCounts::zero)
}
