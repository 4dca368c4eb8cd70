//! `vigil review` — the core command.

use anyhow::{anyhow, Result};
use tracing::error;

use crate::cli::{output, ReviewArgs};
use crate::domain::models::config::Config;
use crate::domain::models::scan_record::ScanRecord;
use crate::domain::models::ticket::ReviewTicket;
use crate::domain::ports::build_history::BuildRef;
use crate::domain::ports::version_info::CrateVersion;
use crate::infrastructure::history::store::FileHistoryStore;
use crate::infrastructure::rest::client::RestAnalysisClient;
use crate::services::review::{ReviewRequest, ReviewService};

pub async fn execute(args: ReviewArgs, json: bool, config: &Config) -> Result<()> {
    let build = BuildRef::new(args.build_number);
    let store = FileHistoryStore::new(&config.history.dir);

    let request = match build_request(&args, config) {
        Ok(request) => request,
        Err(err) => {
            // Bad input still records the documented empty state for this
            // build before failing the step.
            error!(error = %err, "review input invalid");
            store.store_record(&build, &ScanRecord::empty())?;
            return Err(err);
        }
    };

    let client = RestAnalysisClient::new(&config.api, &CrateVersion)
        .map_err(|err| anyhow!("failed to construct service client: {err}"))?;
    let service = ReviewService::new(client, &config.polling);

    let outcome = service.review(&request, &store, &build).await;
    store.store_record(&build, &outcome.record)?;
    output::render_record(&outcome.record, json)?;

    if outcome.success {
        Ok(())
    } else {
        match outcome.failure {
            Some(failure) => Err(anyhow!("review did not succeed: {failure}")),
            None => Err(anyhow!(
                "policy violation: status is {:?}",
                outcome.record.policy_compliance_status
            )),
        }
    }
}

fn build_request(args: &ReviewArgs, config: &Config) -> Result<ReviewRequest> {
    if config.api.id.trim().is_empty() || config.api.key.trim().is_empty() {
        return Err(anyhow!(
            "API credentials are missing: set api.id/api.key or VIGIL_API__ID/VIGIL_API__KEY"
        ));
    }

    let ticket = match &args.analysis_name {
        Some(name) => ReviewTicket::new(
            name.clone(),
            args.previous_occurrence.clone().unwrap_or_default(),
        ),
        None => ReviewTicket::load(&args.ticket)?,
    };
    ticket.validate()?;

    Ok(ReviewRequest {
        analysis_name: ticket.analysis_name,
        previous_occurrence_id: args
            .previous_occurrence
            .clone()
            .unwrap_or(ticket.previous_occurrence_id),
        wait_budget_hours: args.budget_hours,
        fail_on_policy_violation: !args.no_fail_on_violation,
    })
}
