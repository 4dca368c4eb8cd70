//! Wire tests for the REST analysis client.

use mockito::Matcher;

use vigil::domain::models::analysis::OccurrenceStatus;
use vigil::domain::models::config::ApiConfig;
use vigil::domain::ports::analysis_client::{AnalysisServiceClient, ServiceError};
use vigil::domain::ports::version_info::CrateVersion;
use vigil::infrastructure::rest::client::RestAnalysisClient;

fn api_config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        id: "api-id".to_string(),
        key: "api-key".to_string(),
        timeout_secs: 5,
        proxy: None,
    }
}

fn client_for(server: &mockito::ServerGuard) -> RestAnalysisClient {
    RestAnalysisClient::new(&api_config(server.url()), &CrateVersion).unwrap()
}

#[tokio::test]
async fn analysis_by_name_sends_credentials_and_parses_summary() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/analyses")
        .match_query(Matcher::UrlEncoded("name".into(), "nightly-dast".into()))
        .match_header("X-Api-Id", "api-id")
        .match_header("X-Api-Key", "api-key")
        .match_header("User-Agent", Matcher::Regex("^vigil/".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"analysis_id": "analysis-1", "latest_occurrence_id": "occ-2", "status_info": "ok"}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let summary = client.analysis_by_name("nightly-dast").await.unwrap();

    mock.assert_async().await;
    assert_eq!(summary.analysis_id, "analysis-1");
    assert_eq!(summary.latest_occurrence_id, "occ-2");
}

#[tokio::test]
async fn latest_occurrence_maps_not_found_to_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/analysis_occurrences/occ-2")
        .with_status(404)
        .create_async()
        .await;

    let client = client_for(&server);
    let latest = client.latest_occurrence("occ-2").await.unwrap();
    assert!(latest.is_none());
}

#[tokio::test]
async fn latest_occurrence_parses_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/analysis_occurrences/occ-2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"occurrence_id": "occ-2", "status": "FINISHED_RESULTS_AVAILABLE"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let latest = client.latest_occurrence("occ-2").await.unwrap().unwrap();
    assert_eq!(latest.status, OccurrenceStatus::FinishedResultsAvailable);
    assert!(latest.status.is_ready());
}

#[tokio::test]
async fn server_errors_surface_with_their_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/analyses")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.analysis_by_name("nightly-dast").await.unwrap_err();
    match &err {
        ServiceError::Http { status, .. } => assert_eq!(*status, 500),
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn client_errors_are_not_transient() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/analyses")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.analysis_by_name("nightly-dast").await.unwrap_err();
    assert!(!err.is_transient());
}

#[tokio::test]
async fn scan_occurrences_parses_array() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/analysis_occurrences/occ-2/scan_occurrences")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"linked_app_id": "app-9", "linked_app_name": "storefront", "linked_build_id": "b-42"}]"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let occurrences = client.scan_occurrences("occ-2").await.unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].linked_app_id, "app-9");
    assert_eq!(occurrences[0].linked_build_id, "b-42");
}

#[tokio::test]
async fn document_endpoints_return_raw_xml() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/buildinfo")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("app_id".into(), "app-9".into()),
            Matcher::UrlEncoded("build_id".into(), "b-42".into()),
        ]))
        .with_status(200)
        .with_body("<buildinfo/>")
        .create_async()
        .await;
    server
        .mock("GET", "/detailedreport")
        .match_query(Matcher::UrlEncoded("build_id".into(), "b-42".into()))
        .with_status(200)
        .with_body("<detailedreport/>")
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.build_info("app-9", "b-42").await.unwrap(), "<buildinfo/>");
    assert_eq!(
        client.detailed_report("b-42").await.unwrap(),
        "<detailedreport/>"
    );
}

#[tokio::test]
async fn invalid_json_payload_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/analyses")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.analysis_by_name("nightly-dast").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidPayload(_)));
}
