//! Fake PostgREST endpoint
//!
//! Serves `GET /rest/v1/{table}` the way Supabase does: rows as a JSON
//! array, or a JSON error body with a non-2xx status. Every request is
//! recorded so tests can assert on headers and query parameters.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use invite_schema::Record;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub table: String,
    pub params: HashMap<String, String>,
    pub apikey: Option<String>,
    pub authorization: Option<String>,
    pub accept_profile: Option<String>,
}

#[derive(Clone, Default)]
struct FakeState {
    rows: Arc<HashMap<String, Vec<Record>>>,
    missing: Arc<Vec<String>>,
    denied: Arc<Vec<String>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Fake server instance. When dropped, the server shuts down.
pub struct FakePostgrest {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: FakeState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

async fn handle_table(
    State(state): State<FakeState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let profile = header(&headers, "accept-profile").unwrap_or_else(|| "public".to_string());
    state.requests.lock().unwrap().push(RecordedRequest {
        table: table.clone(),
        params: params.clone(),
        apikey: header(&headers, "apikey"),
        authorization: header(&headers, "authorization"),
        accept_profile: header(&headers, "accept-profile"),
    });

    if state.missing.contains(&table) {
        let body = json!({
            "code": "42P01",
            "details": null,
            "hint": null,
            "message": format!("relation \"{}.{}\" does not exist", profile, table),
        });
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }
    if state.denied.contains(&table) {
        let body = json!({
            "code": "42501",
            "details": null,
            "hint": "Check the row level security policies",
            "message": format!("permission denied for table {}", table),
        });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let mut rows = state.rows.get(&table).cloned().unwrap_or_default();
    if let Some(limit) = params.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }
    Json(rows).into_response()
}

#[allow(dead_code)]
impl FakePostgrest {
    /// Spawns the fake endpoint on a random port.
    ///
    /// `missing` tables answer 404 with code 42P01, `denied` tables answer
    /// 401 with code 42501.
    pub async fn spawn(
        rows: HashMap<String, Vec<Record>>,
        missing: &[&str],
        denied: &[&str],
    ) -> Self {
        let state = FakeState {
            rows: Arc::new(rows),
            missing: Arc::new(missing.iter().map(|t| t.to_string()).collect()),
            denied: Arc::new(denied.iter().map(|t| t.to_string()).collect()),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/rest/v1/{table}", get(handle_table))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake server");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake server failed");
        });

        Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for FakePostgrest {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
