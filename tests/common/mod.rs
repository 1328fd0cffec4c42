#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use contacts_gate::AccessGate;
use contacts_gate::db::ContactsStorage;
use contacts_gate::router::{ContactsState, contacts_router};
use std::{
    fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Router over a throwaway SQLite file, removed on drop.
pub struct TestApp {
    pub app: Router,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
    }
}

pub async fn spawn_app(gate: AccessGate) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "contacts-gate-{}-{}-{}.sqlite",
        std::process::id(),
        nanos,
        DB_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let storage = ContactsStorage::connect(&database_url)
        .await
        .expect("failed to open test database");
    let state = ContactsState::new(storage, Arc::new(gate));

    TestApp {
        app: contacts_router(state),
        db_path,
    }
}

/// Send one request and return status plus body text.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_owned())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let text = String::from_utf8(bytes.to_vec()).expect("response body was not utf-8");
    (status, text)
}

/// Create a contact (POST is exempt under the default policy) and return its id.
pub async fn create(app: &Router, headers: &[(&str, &str)], name: &str, phone: &str) -> i64 {
    let payload = serde_json::json!({ "name": name, "phone": phone }).to_string();
    let (status, body) = send(app, "POST", "/api/contacts", headers, Some(payload.as_str())).await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    let value: serde_json::Value = serde_json::from_str(&body).expect("create returned non-json");
    value["id"].as_i64().expect("created contact has no id")
}
