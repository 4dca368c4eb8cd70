//! Review service: the polling state machine.
//!
//! Drives a submitted dynamic analysis through its remote workflow —
//! occurrence discovery, completion, linking, build readiness — then
//! fetches and reconciles the detailed report. Every phase runs under one
//! uniform retry wrapper owning the absolute deadline, the fixed poll
//! interval, and the consecutive-transient-error budget.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::ReviewError;
use crate::domain::models::analysis::Phase;
use crate::domain::models::config::PollingConfig;
use crate::domain::models::scan_record::ScanRecord;
use crate::domain::ports::analysis_client::{AnalysisServiceClient, ServiceError};
use crate::domain::ports::build_history::{BuildHistoryProvider, BuildRef};
use crate::services::reconciler::reconcile;
use crate::services::report_parser::{parse_build_info, parse_detailed_report};

/// Input to one review, assembled from the ticket and CLI flags.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub analysis_name: String,
    /// Occurrence id that predates the submission; discovery must return a
    /// different id.
    pub previous_occurrence_id: String,
    /// Wall-clock budget for the whole review.
    pub wait_budget_hours: u32,
    /// Whether a policy violation alone fails the review.
    pub fail_on_policy_violation: bool,
}

/// What a review hands back to the caller.
///
/// `record` is always present: empty (no data) on any failure. `failure`
/// carries the classified cause so callers can log a timeout differently
/// from an error; it never needs to be handled for control flow.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub record: ScanRecord,
    pub success: bool,
    pub failure: Option<ReviewError>,
}

/// Outcome of a single poll attempt within a phase.
enum PhaseStep<T> {
    /// Phase success condition observed.
    Ready(T),
    /// Not there yet; sleep and poll again.
    Wait,
    /// Non-retryable condition; abort the review.
    Fail(ReviewError),
}

/// The polling orchestrator.
pub struct ReviewService<C> {
    client: C,
    poll_interval: Duration,
    transient_budget: u32,
}

impl<C: AnalysisServiceClient> ReviewService<C> {
    pub fn new(client: C, polling: &PollingConfig) -> Self {
        Self {
            client,
            poll_interval: Duration::from_secs(polling.interval_secs),
            transient_budget: polling.transient_error_budget,
        }
    }

    /// Review a previously submitted dynamic analysis.
    ///
    /// Blocks (on sleeps and remote round-trips) until the remote workflow
    /// reaches a terminal ready state, a fatal condition is observed, or
    /// the wall-clock budget runs out. Never returns an error: any fatal
    /// condition is logged here and converted into an empty record with
    /// `success = false`.
    pub async fn review(
        &self,
        request: &ReviewRequest,
        history: &dyn BuildHistoryProvider,
        current_build: &BuildRef,
    ) -> ReviewOutcome {
        let review_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "review",
            %review_id,
            analysis = %request.analysis_name,
            build = %current_build,
        );
        self.run(request, history, current_build)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        request: &ReviewRequest,
        history: &dyn BuildHistoryProvider,
        current_build: &BuildRef,
    ) -> ReviewOutcome {
        match self.drive_phases(request, history, current_build).await {
            Ok(record) => {
                let success = record.policy_passed() || !request.fail_on_policy_violation;
                info!(
                    policy_status = %record.policy_compliance_status,
                    total_findings = record.total_count,
                    success,
                    "review complete"
                );
                ReviewOutcome {
                    record,
                    success,
                    failure: None,
                }
            }
            Err(failure) => {
                if failure.is_timeout() {
                    warn!(kind = failure.kind(), error = %failure, "review timed out");
                } else {
                    error!(kind = failure.kind(), error = %failure, "review failed");
                }
                ReviewOutcome {
                    record: ScanRecord::empty(),
                    success: false,
                    failure: Some(failure),
                }
            }
        }
    }

    async fn drive_phases(
        &self,
        request: &ReviewRequest,
        history: &dyn BuildHistoryProvider,
        current_build: &BuildRef,
    ) -> Result<ScanRecord, ReviewError> {
        if request.analysis_name.trim().is_empty() {
            return Err(ReviewError::InvalidInput(
                "analysis name is missing or empty".to_string(),
            ));
        }

        let deadline = Utc::now() + chrono::Duration::hours(i64::from(request.wait_budget_hours));
        let client = &self.client;
        let name = request.analysis_name.as_str();
        let previous = request.previous_occurrence_id.as_str();

        let occurrence_id = self
            .run_phase(Phase::DiscoverOccurrence, deadline, || async move {
                let summary = client.analysis_by_name(name).await?;
                let id = summary.latest_occurrence_id;
                if id.is_empty() || id == previous {
                    Ok(PhaseStep::Wait)
                } else {
                    Ok(PhaseStep::Ready(id))
                }
            })
            .await?;
        info!(occurrence_id = %occurrence_id, "discovered new analysis occurrence");

        let occurrence = occurrence_id.as_str();
        self.run_phase(Phase::AwaitCompletion, deadline, || async move {
            match client.latest_occurrence(occurrence).await? {
                None => Ok(PhaseStep::Wait),
                Some(latest) if latest.status.is_ready() => Ok(PhaseStep::Ready(())),
                Some(latest) if latest.status.is_terminal_failure() => {
                    Ok(PhaseStep::Fail(ReviewError::TerminalAnalysisFailure {
                        status: latest.status.as_str().to_string(),
                    }))
                }
                Some(latest) => {
                    debug!(status = latest.status.as_str(), "occurrence still running");
                    Ok(PhaseStep::Wait)
                }
            }
        })
        .await?;
        info!("analysis occurrence finished with results available");

        let link = self
            .run_phase(Phase::AwaitLinking, deadline, || async move {
                let occurrences = client.scan_occurrences(occurrence).await?;
                if occurrences.len() > 1 {
                    return Ok(PhaseStep::Fail(ReviewError::AmbiguousLink {
                        count: occurrences.len(),
                    }));
                }
                match occurrences.into_iter().next() {
                    None => Ok(PhaseStep::Wait),
                    Some(scan) if scan.linked_app_id.is_empty() => {
                        Ok(PhaseStep::Fail(ReviewError::UnlinkedApplication))
                    }
                    Some(scan) if scan.linked_build_id.is_empty() => Ok(PhaseStep::Wait),
                    Some(scan) => Ok(PhaseStep::Ready(scan)),
                }
            })
            .await?;
        info!(
            app_id = %link.linked_app_id,
            app_name = %link.linked_app_name,
            build_id = %link.linked_build_id,
            "scan linked to application build"
        );

        let app_id = link.linked_app_id.as_str();
        let build_id = link.linked_build_id.as_str();
        self.run_phase(Phase::AwaitBuildReady, deadline, || async move {
            let xml = client.build_info(app_id, build_id).await?;
            let build = match parse_build_info(&xml) {
                Ok(build) => build,
                Err(err) => return Ok(PhaseStep::Fail(err)),
            };
            if build.results_ready() {
                Ok(PhaseStep::Ready(()))
            } else {
                debug!(status = %build.analysis_unit_status, "build results not ready");
                Ok(PhaseStep::Wait)
            }
        })
        .await?;
        info!("linked build results ready, fetching detailed report");

        let report = client.detailed_report(build_id).await.map_err(|source| {
            ReviewError::Service {
                phase: Phase::FetchAndParse,
                source,
            }
        })?;
        let facts = parse_detailed_report(&report)?;
        Ok(reconcile(&facts, history, current_build, Utc::now()))
    }

    /// Run one phase body under the uniform retry/deadline wrapper.
    ///
    /// The attempt closure is polled until it reports `Ready` or `Fail`,
    /// the consecutive-transient budget is spent, or the deadline passes.
    /// The transient counter resets on any successful call; the deadline
    /// is re-checked after every attempt, successful or not.
    async fn run_phase<T, F, Fut>(
        &self,
        phase: Phase,
        deadline: DateTime<Utc>,
        mut attempt: F,
    ) -> Result<T, ReviewError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<PhaseStep<T>, ServiceError>>,
    {
        let mut consecutive_transient: u32 = 0;
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match attempt().await {
                Ok(PhaseStep::Ready(value)) => {
                    debug!(phase = phase.as_str(), attempts, "phase complete");
                    return Ok(value);
                }
                Ok(PhaseStep::Fail(err)) => return Err(err),
                Ok(PhaseStep::Wait) => {
                    consecutive_transient = 0;
                }
                Err(err) if err.is_transient() => {
                    consecutive_transient += 1;
                    warn!(
                        phase = phase.as_str(),
                        attempts,
                        consecutive_transient,
                        error = %err,
                        "transient service error, will retry"
                    );
                    if consecutive_transient >= self.transient_budget {
                        return Err(ReviewError::TransientBudgetExhausted {
                            phase,
                            attempts: consecutive_transient,
                            source: err,
                        });
                    }
                }
                Err(err) => {
                    return Err(ReviewError::Service { phase, source: err });
                }
            }
            if Utc::now() >= deadline {
                return Err(ReviewError::Timeout { phase });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
