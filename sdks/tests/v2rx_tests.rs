// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use ekacare_sdk::{EkaCareClient, EkaCareError, PollOptions, TemplateStatus};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;

fn client_for(server: &ServerGuard) -> EkaCareClient {
    EkaCareClient::builder("test-client", "test-secret")
        .base_url(server.url())
        .access_token("token")
        .build()
        .unwrap()
}

fn status_body(status: &str) -> String {
    json!({
        "data": {
            "output": [{
                "template_id": "clinical_notes_template",
                "name": "Clinical Notes",
                "status": status,
                "errors": [],
                "warnings": [],
                "value": "eyJub3RlcyI6ICJoZWFkYWNoZSJ9",
                "type": "json"
            }]
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_session_in_progress() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/voice/api/v3/status/txn-1")
        .match_query(Matcher::UrlEncoded("action".into(), "ekascribe".into()))
        .match_header("authorization", "Bearer token")
        .with_status(202)
        .with_body(status_body("in-progress"))
        .create_async()
        .await;

    let client = client_for(&server);
    let status = client
        .v2rx()
        .get_session_status("txn-1", "ekascribe")
        .await
        .unwrap();

    assert_eq!(status.http_status, 202);
    assert_eq!(status.output[0].status, TemplateStatus::InProgress);
    assert!(!status.is_complete());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_complete() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/voice/api/v3/status/txn-1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(status_body("success"))
        .create_async()
        .await;

    let client = client_for(&server);
    let status = client
        .v2rx()
        .wait_for_session(
            "txn-1",
            "ekascribe",
            PollOptions {
                interval: Duration::from_millis(10),
                timeout: Duration::from_secs(1),
            },
        )
        .await
        .unwrap();

    let notes = status.template("clinical_notes_template").unwrap();
    assert_eq!(notes.status, TemplateStatus::Success);
    assert_eq!(notes.name.as_deref(), Some("Clinical Notes"));
    assert_eq!(status.raw["data"]["output"][0]["type"], "json");
}

#[tokio::test]
async fn test_wait_times_out() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/voice/api/v3/status/txn-slow")
        .match_query(Matcher::Any)
        .with_status(202)
        .with_body(status_body("in-progress"))
        .expect_at_least(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .v2rx()
        .wait_for_session(
            "txn-slow",
            "ekascribe",
            PollOptions {
                interval: Duration::from_millis(20),
                timeout: Duration::from_millis(100),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EkaCareError::Timeout(ref msg) if msg.contains("txn-slow")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_wait_with_unbounded_durations() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/voice/api/v3/status/txn-max")
        .match_query(Matcher::Any)
        .with_status(202)
        .with_body(status_body("in-progress"))
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .v2rx()
        .wait_for_session(
            "txn-max",
            "ekascribe",
            PollOptions {
                interval: Duration::MAX,
                timeout: Duration::MAX,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EkaCareError::Timeout(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/voice/api/v3/status/nope")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": "txn not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .v2rx()
        .get_session_status("nope", "ekascribe")
        .await
        .unwrap_err();

    assert!(matches!(err, EkaCareError::NotFound(_)));
}
