// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route tests.
//!
//! Requests go through the full router with `oneshot`, backed by a mock
//! Strava and a temporary cache folder.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{activity_json, mount_activity_list, mount_any_streams, setup};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let env = setup().await;

    let (status, body) = get(env.router(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_path_is_json_not_found() {
    let env = setup().await;

    let (status, body) = get(env.router(), "/api/athlete").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["details"], "No route for /api/athlete");
}

#[tokio::test]
async fn test_stream_rejects_non_numeric_id() {
    let env = setup().await;

    let (status, body) = get(env.router(), "/api/activities/stream/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_activities_rejects_bad_date() {
    let env = setup().await;

    let (status, body) = get(env.router(), "/api/activities?after=last-tuesday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Invalid 'after' date format"));
}

#[tokio::test]
async fn test_activities_rejects_inverted_range() {
    let env = setup().await;

    let (status, body) = get(
        env.router(),
        "/api/activities?after=2024-03-01T00:00:00Z&before=2024-02-01T00:00:00Z",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        "'before' date must be after 'after' date"
    );
}

#[tokio::test]
async fn test_activities_listing_and_filter() {
    let env = setup().await;
    mount_activity_list(
        &env.server,
        json!([
            activity_json(1, "Run", "2024-01-01T00:00:00Z"),
            activity_json(2, "Ride", "2024-03-15T00:00:00Z"),
        ]),
    )
    .await;
    mount_any_streams(&env.server).await;

    let (status, body) = get(env.router(), "/api/activities?after=2023-12-01T00:00:00Z").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(body[0]["type"], "Ride");

    let (status, body) = get(
        env.router(),
        "/api/activities/ride?after=2023-12-01T00:00:00Z",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 1);
}

#[tokio::test]
async fn test_refresh_reports_counts() {
    let env = setup().await;
    mount_activity_list(
        &env.server,
        json!([activity_json(1, "Run", "2024-01-01T00:00:00Z")]),
    )
    .await;
    mount_any_streams(&env.server).await;

    let (status, body) = get(env.router(), "/api/activities/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "refreshed");
    assert_eq!(body["new_activities"], 1);
    assert_eq!(body["new_streams"], 1);
}

#[tokio::test]
async fn test_stream_endpoint() {
    let env = setup().await;
    common::mount_streams(&env.server, 11, common::simple_streams(), 1).await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/v3/activities/11"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_json(activity_json(
                11,
                "Ride",
                "2024-04-01T00:00:00Z",
            )),
        )
        .mount(&env.server)
        .await;

    let (status, body) = get(env.router(), "/api/activities/stream/11").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activity_id"], "11");
    // Index 1 has no power.
    assert_eq!(body["streams"].as_array().unwrap().len(), 2);
    assert_eq!(body["streams"][1]["watts"], 170.0);
}

#[tokio::test]
async fn test_missing_credential_is_server_error() {
    let env = common::setup_without_credential().await;

    let (status, body) = get(env.router(), "/api/activities").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "credential_error");
    assert!(body.get("details").is_none());
}
