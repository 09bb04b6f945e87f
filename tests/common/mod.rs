// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::{json, Value};
use std::sync::Arc;
use strava_mirror::config::Config;
use strava_mirror::db::CredentialStore;
use strava_mirror::models::Credential;
use strava_mirror::routes::create_router;
use strava_mirror::AppState;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Strava plus a temporary data folder wired into an `AppState`.
#[allow(dead_code)]
pub struct TestEnv {
    pub server: MockServer,
    pub dir: TempDir,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.state.config.credential_path())
    }
}

/// Create a test environment with a valid (unexpired) credential on disk.
#[allow(dead_code)]
pub async fn setup() -> TestEnv {
    let env = setup_without_credential().await;
    env.credential_store()
        .save(&valid_credential())
        .await
        .expect("Failed to write test credential");
    env
}

/// Create a test environment with no credential file.
#[allow(dead_code)]
pub async fn setup_without_credential() -> TestEnv {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::test_default(dir.path(), &server.uri());
    let state = Arc::new(AppState::from_config(config).expect("Failed to build state"));
    TestEnv { server, dir, state }
}

#[allow(dead_code)]
pub fn valid_credential() -> Credential {
    Credential {
        token_type: Some("Bearer".to_string()),
        access_token: "test_access".to_string(),
        refresh_token: "test_refresh".to_string(),
        expires_at: chrono::Utc::now().timestamp() + 3600,
        expires_in: Some(3600),
        athlete: None,
        extra: Default::default(),
    }
}

/// Minimal Strava summary activity.
#[allow(dead_code)]
pub fn activity_json(id: u64, activity_type: &str, start_date: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {}", id),
        "type": activity_type,
        "start_date": start_date,
        "distance": 1000.0 * id as f64,
    })
}

/// Serve `activities` as page 1 of the activity list; later pages are empty.
#[allow(dead_code)]
pub async fn mount_activity_list(server: &MockServer, activities: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(activities))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Serve `body` as the streams of activity `id`, expecting exactly `calls` fetches.
#[allow(dead_code)]
pub async fn mount_streams(server: &MockServer, id: u64, body: Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v3/activities/{}/streams", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serve the same small stream set for every activity.
#[allow(dead_code)]
pub async fn mount_any_streams(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v3/activities/\d+/streams$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simple_streams()))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn simple_streams() -> Value {
    json!({
        "time": {"data": [0, 1, 2]},
        "heartrate": {"data": [100, 101, 102]},
        "watts": {"data": [150, null, 170]},
        "cadence": {"data": [80, 81, 82]}
    })
}
