//! History reconciliation.
//!
//! Combines the parsed facts of the current build with the nearest prior
//! build that recorded data, producing per-severity new/net deltas and the
//! capped trend window. A missing ancestor is not an error: it is the
//! documented initial-scan state where new == net == count.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::models::report::RawFacts;
use crate::domain::models::scan_record::{ComponentRecord, ScaRecord, ScanRecord, TrendWindow};
use crate::domain::models::severity::{severity_table, FindingCounts, SEVERITY_LEVELS};
use crate::domain::ports::build_history::{BuildHistoryProvider, BuildRef};

/// Upper bound on the backward chain walk, capping cost on long-lived jobs.
pub const ANCESTOR_SEARCH_LIMIT: usize = 60;

/// Reconcile the current build's facts against the build history and
/// assemble the final scan record.
pub fn reconcile(
    facts: &RawFacts,
    history: &dyn BuildHistoryProvider,
    current_build: &BuildRef,
    now: DateTime<Utc>,
) -> ScanRecord {
    let ancestor = nearest_ancestor(history, current_build);
    match &ancestor {
        Some(record) => debug!(
            ancestor_build_id = %record.build_id,
            "reconciling against nearest ancestor with data"
        ),
        None => debug!("no ancestor with data within bound, treating as initial scan"),
    }

    let (findings, trend) = reconcile_series(
        &facts.counts,
        &facts.mitigated,
        ancestor.as_ref().map(|record| &record.findings),
        ancestor.as_ref().map(|record| &record.trend),
        facts.total(),
        now,
    );

    let sca = facts.sca.as_ref().map(|sca_facts| {
        // Reuses whichever ancestor was already found; its composition
        // sub-record applies only if that build was subscribed.
        let ancestor_sca = ancestor
            .as_ref()
            .and_then(|record| record.sca.as_ref())
            .filter(|sca| sca.subscribed);
        let (sca_findings, sca_trend) = reconcile_series(
            &sca_facts.counts,
            &sca_facts.mitigated,
            ancestor_sca.map(|sca| &sca.findings),
            ancestor_sca.map(|sca| &sca.trend),
            sca_facts.total(),
            now,
        );
        ScaRecord {
            subscribed: true,
            max_cvss_score: sca_facts.max_cvss_score,
            blacklisted_count: sca_facts.blacklisted_count,
            findings: sca_findings,
            trend: sca_trend,
            components: sca_facts
                .components
                .iter()
                .map(|component| ComponentRecord {
                    name: component.name.clone(),
                    blacklisted: component.blacklisted,
                    is_new: component.is_new,
                    violates_policy: component.violates_policy,
                })
                .collect(),
        }
    });

    ScanRecord {
        has_data: true,
        account_id: facts.account_id.clone(),
        app_id: facts.app_id.clone(),
        build_id: facts.build_id.clone(),
        policy_name: facts.policy_name.clone(),
        policy_compliance_status: facts.policy_compliance_status.clone(),
        assurance_level: facts.assurance_level.clone(),
        score: facts.score,
        scan_overdue: facts.scan_overdue,
        total_count: facts.total(),
        findings,
        policy_affected: facts.policy_affected,
        net_changes: facts.net_changes,
        trend,
        sca,
        recorded_at: now,
    }
}

/// Walk backward from the current build's predecessor, returning the first
/// record that actually carries data, bounded by
/// [`ANCESTOR_SEARCH_LIMIT`] prior builds.
fn nearest_ancestor(
    history: &dyn BuildHistoryProvider,
    current_build: &BuildRef,
) -> Option<ScanRecord> {
    let mut cursor = history.previous_build(current_build);
    let mut visited = 0usize;
    while let Some(build) = cursor {
        if visited >= ANCESTOR_SEARCH_LIMIT {
            return None;
        }
        visited += 1;
        if let Some(record) = history.scan_record(&build) {
            if record.has_data {
                return Some(record);
            }
        }
        cursor = history.previous_build(&build);
    }
    None
}

/// Compute one per-severity table plus its trend window.
///
/// Shared between the flaw series and the composition series; the two
/// differ only in which ancestor sub-record supplies prior counts.
fn reconcile_series(
    counts: &[u32; SEVERITY_LEVELS],
    mitigated: &[bool; SEVERITY_LEVELS],
    prior: Option<&[FindingCounts; SEVERITY_LEVELS]>,
    prior_trend: Option<&TrendWindow>,
    total: u64,
    now: DateTime<Utc>,
) -> ([FindingCounts; SEVERITY_LEVELS], TrendWindow) {
    let findings = severity_table(|severity| {
        let index = severity.index();
        let count = counts[index];
        let net = match prior {
            Some(table) => i64::from(count) - i64::from(table[index].count),
            None => i64::from(count),
        };
        FindingCounts {
            severity,
            count,
            net,
            new: u32::try_from(net.max(0)).unwrap_or(u32::MAX),
            mitigated: mitigated[index],
        }
    });

    // The window is rebuilt from the ancestor's samples plus the current
    // one, never mutated on a shared record.
    let mut trend = prior_trend.cloned().unwrap_or_default();
    trend.push(now, total);

    (findings, trend)
}
