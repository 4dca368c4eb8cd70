//! Build history port.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::models::scan_record::ScanRecord;

/// Reference to one build in the host pipeline's build chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildRef {
    pub number: u64,
}

impl BuildRef {
    pub fn new(number: u64) -> Self {
        Self { number }
    }
}

impl fmt::Display for BuildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.number)
    }
}

/// Read access to prior builds' scan records.
///
/// The reconciler walks the chain backward through this port; any backing
/// store works (in-memory map, file store, host API). Implementations are
/// read-only from the reconciler's perspective: lookups never mutate
/// prior builds.
pub trait BuildHistoryProvider: Send + Sync {
    /// Immediate predecessor of a build, or `None` at the chain's start.
    fn previous_build(&self, build: &BuildRef) -> Option<BuildRef>;

    /// Scan record attached to a build, or `None` when that build never
    /// recorded one.
    fn scan_record(&self, build: &BuildRef) -> Option<ScanRecord>;
}

/// In-memory history chain, used by tests and as the simplest provider.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: BTreeMap<u64, ScanRecord>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a record to a build number.
    pub fn insert(&mut self, build: BuildRef, record: ScanRecord) {
        self.records.insert(build.number, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BuildHistoryProvider for MemoryHistory {
    fn previous_build(&self, build: &BuildRef) -> Option<BuildRef> {
        self.records
            .range(..build.number)
            .next_back()
            .map(|(&number, _)| BuildRef::new(number))
    }

    fn scan_record(&self, build: &BuildRef) -> Option<ScanRecord> {
        self.records.get(&build.number).cloned()
    }
}
