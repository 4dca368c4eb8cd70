//! Common test utilities for integration tests
//!
//! Provides a scripted analysis service client and fixture builders used
//! across multiple integration test files.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use vigil::domain::models::analysis::{
    AnalysisSummary, OccurrenceInfo, OccurrenceStatus, ScanOccurrence,
};
use vigil::domain::models::config::PollingConfig;
use vigil::domain::ports::analysis_client::{AnalysisServiceClient, ServiceError};

type Script<T> = Mutex<VecDeque<Result<T, ServiceError>>>;

/// Analysis service client that replays scripted responses per endpoint.
///
/// Each call pops the next scripted response; running past the script is
/// a test bug and panics with the endpoint name.
#[derive(Default)]
pub struct ScriptedClient {
    analyses: Script<AnalysisSummary>,
    occurrences: Script<Option<OccurrenceInfo>>,
    scans: Script<Vec<ScanOccurrence>>,
    build_infos: Script<String>,
    reports: Script<String>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_analysis(&self, response: Result<AnalysisSummary, ServiceError>) {
        self.analyses.lock().unwrap().push_back(response);
    }

    pub fn push_occurrence(&self, response: Result<Option<OccurrenceInfo>, ServiceError>) {
        self.occurrences.lock().unwrap().push_back(response);
    }

    pub fn push_scans(&self, response: Result<Vec<ScanOccurrence>, ServiceError>) {
        self.scans.lock().unwrap().push_back(response);
    }

    pub fn push_build_info(&self, response: Result<String, ServiceError>) {
        self.build_infos.lock().unwrap().push_back(response);
    }

    pub fn push_report(&self, response: Result<String, ServiceError>) {
        self.reports.lock().unwrap().push_back(response);
    }

    fn next<T>(script: &Script<T>, endpoint: &str) -> Result<T, ServiceError> {
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("script exhausted for {endpoint}"))
    }
}

#[async_trait]
impl AnalysisServiceClient for ScriptedClient {
    async fn analysis_by_name(&self, _name: &str) -> Result<AnalysisSummary, ServiceError> {
        Self::next(&self.analyses, "analysis_by_name")
    }

    async fn resubmit_analysis(
        &self,
        _analysis_id: &str,
        _max_duration_hours: u32,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn latest_occurrence(
        &self,
        _occurrence_id: &str,
    ) -> Result<Option<OccurrenceInfo>, ServiceError> {
        Self::next(&self.occurrences, "latest_occurrence")
    }

    async fn scan_occurrences(
        &self,
        _occurrence_id: &str,
    ) -> Result<Vec<ScanOccurrence>, ServiceError> {
        Self::next(&self.scans, "scan_occurrences")
    }

    async fn build_info(&self, _app_id: &str, _build_id: &str) -> Result<String, ServiceError> {
        Self::next(&self.build_infos, "build_info")
    }

    async fn detailed_report(&self, _build_id: &str) -> Result<String, ServiceError> {
        Self::next(&self.reports, "detailed_report")
    }
}

/// Polling configuration with no sleeping, for fast tests.
#[allow(dead_code)]
pub fn fast_polling() -> PollingConfig {
    PollingConfig {
        interval_secs: 0,
        transient_error_budget: 5,
    }
}

#[allow(dead_code)]
pub fn http_error(status: u16) -> ServiceError {
    ServiceError::Http {
        status,
        message: "scripted failure".to_string(),
    }
}

#[allow(dead_code)]
pub fn summary(occurrence_id: &str) -> AnalysisSummary {
    AnalysisSummary {
        analysis_id: "analysis-1".to_string(),
        latest_occurrence_id: occurrence_id.to_string(),
        status_info: String::new(),
    }
}

#[allow(dead_code)]
pub fn occurrence(status: &str) -> Option<OccurrenceInfo> {
    Some(OccurrenceInfo {
        occurrence_id: "occ-2".to_string(),
        status: OccurrenceStatus::from_wire(status),
    })
}

#[allow(dead_code)]
pub fn link(app_id: &str, build_id: &str) -> Vec<ScanOccurrence> {
    vec![ScanOccurrence {
        linked_app_id: app_id.to_string(),
        linked_app_name: "storefront".to_string(),
        linked_build_id: build_id.to_string(),
    }]
}

#[allow(dead_code)]
pub fn build_info_xml(status: &str) -> String {
    format!(
        r#"<buildinfo><build build_id="b-42">
             <analysis_unit analysis_type="Dynamic" status="{status}"/>
           </build></buildinfo>"#
    )
}

/// Detailed report with `open` severity-3 flaws and the given policy status.
#[allow(dead_code)]
pub fn report_xml(policy_status: &str, open_sev3_flaws: usize) -> String {
    let flaws = r#"<flaw severity="3" mitigation_status="none" remediation_status="Open"/>"#
        .repeat(open_sev3_flaws);
    format!(
        r#"<detailedreport account_id="acct-1" app_id="app-9" build_id="b-42"
             policy_name="Corporate Baseline" policy_compliance_status="{policy_status}"
             assurance_level="AL4" score="88" scan_overdue="false">
             <severity level="3"><category><cwe><dynamicflaws>{flaws}</dynamicflaws></cwe></category></severity>
           </detailedreport>"#
    )
}
