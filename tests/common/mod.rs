//! Shared test fixtures for the expense tracker SDK integration tests.
//!
//! Provides `MockBackend::start()`, which runs an in-process backend (an axum
//! router on its own Tokio runtime) seeded with a couple of expenses, one
//! income record and two categories. Every request it receives is recorded so
//! tests can assert on exactly which calls were made.

#![allow(dead_code)]

use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use expense_tracker_sdk::ExpenseTracker;
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";
pub const PRIMARY_RECEIPT_BYTES: &[u8] = b"%PDF-1.4 primary";
pub const FALLBACK_RECEIPT_BYTES: &[u8] = b"\x89PNG fallback";

// ---------------------------------------------------------------------------
// Recorded requests and backend state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Multipart text fields, in order.
    pub fields: Vec<(String, String)>,
    /// Multipart file parts as (field name, file name, size).
    pub files: Vec<(String, String, usize)>,
    pub json: Option<Value>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct MockState {
    pub expenses: Vec<Value>,
    pub income: Vec<Value>,
    pub categories: Value,
    pub next_id: u64,
    pub requests: Vec<RecordedRequest>,
    pub fail_list: bool,
    pub fail_mutations: bool,
    pub primary_receipt_ok: bool,
    pub fallback_receipt_ok: bool,
    pub session_valid: bool,
    pub refresh_ok: bool,
    pub taken_emails: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            expenses: vec![
                json!({
                    "id": 1,
                    "description": "Rent",
                    "amount": "900",
                    "expense_date": "2024-01-05",
                    "category": {"name": "Housing"},
                    "is_recurrent": true,
                    "start_date": "2024-01-01",
                    "end_date": "2024-12-31",
                    "receipt_id": null
                }),
                json!({
                    "id": 2,
                    "name": "Coffee",
                    "amount": 3.5,
                    "date": "2024-02-01",
                    "category_name": "Food",
                    "isRecurrent": false,
                    "receiptId": "r-2"
                }),
            ],
            income: vec![json!({
                "id": 10,
                "description": "Salary",
                "amount": "2000",
                "date": "2024-02-01",
                "source": "Employer"
            })],
            categories: json!({"data": [
                {"id": 1, "name": "Housing"},
                {"id": 2, "name": "Food"}
            ]}),
            next_id: 100,
            requests: Vec::new(),
            fail_list: false,
            fail_mutations: false,
            primary_receipt_ok: true,
            fallback_receipt_ok: true,
            session_valid: true,
            refresh_ok: true,
            taken_emails: vec!["taken@example.com".to_string()],
        }
    }
}

type Shared = Arc<Mutex<MockState>>;

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    /// Start a backend on an ephemeral local port.
    pub fn start() -> Self {
        init_tracing();
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = router(state.clone());

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().unwrap();

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn request_count(&self) -> usize {
        self.with_state(|s| s.requests.len())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.with_state(|s| s.requests.clone())
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// A tracker authenticated with [`TOKEN`], saving receipts into `download_dir`.
    pub fn tracker(&self, download_dir: &std::path::Path) -> ExpenseTracker {
        ExpenseTracker::builder()
            .base_url(&self.base_url)
            .credential(TOKEN)
            .download_dir(download_dir)
            .build()
            .unwrap()
    }

    /// A tracker with no credential at all.
    pub fn anonymous_tracker(&self) -> ExpenseTracker {
        ExpenseTracker::builder()
            .base_url(&self.base_url)
            .build()
            .unwrap()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/expenses", get(list_expenses).post(create_expense))
        .route("/api/expenses/{id}", put(update_expense).delete(delete_expense))
        .route("/api/expenses/{id}/receipt", get(primary_receipt))
        .route("/api/receipts/{id}", get(fallback_receipt))
        .route("/api/income", get(list_income))
        .route("/api/categories", get(list_categories))
        .route("/api/auth/me", get(me))
        .route("/api/auth/refreshlogin", post(refresh_login))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/user/change-password", post(change_password))
        .with_state(state)
}

fn record(
    state: &mut MockState,
    method: Method,
    path: String,
    query: Option<String>,
    headers: &HeaderMap,
) -> usize {
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path,
        query,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        fields: Vec::new(),
        files: Vec::new(),
        json: None,
    });
    state.requests.len() - 1
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(header::AUTHORIZATION).is_some()
}

async fn list_expenses(
    State(state): State<Shared>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::GET, "/api/expenses".into(), query, &headers);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if s.fail_list {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    Json(Value::Array(s.expenses.clone())).into_response()
}

async fn list_income(
    State(state): State<Shared>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::GET, "/api/income".into(), query, &headers);
    Json(json!({"data": s.income.clone()})).into_response()
}

async fn list_categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::GET, "/api/categories".into(), None, &headers);
    Json(s.categories.clone()).into_response()
}

type Parts = (Vec<(String, String)>, Vec<(String, String, usize)>);

async fn read_multipart(mut multipart: Multipart) -> Parts {
    let mut fields = Vec::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let size = field.bytes().await.unwrap().len();
                files.push((name, file_name, size));
            }
            None => fields.push((name, field.text().await.unwrap())),
        }
    }
    (fields, files)
}

/// Store a record the way the real backend does: snake_case persistence
/// fields, the amount as a decimal string, the category as an object.
fn apply_form(state: &MockState, record: &mut Value, fields: &[(String, String)], has_file: bool) {
    let get = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    record["description"] = json!(get("description"));
    record["amount"] = json!(get("amount"));
    record["expense_date"] = json!(get("date"));
    record["is_recurrent"] = json!(get("type").as_deref() == Some("recurring"));
    record["startDate"] = json!(get("startDate"));
    record["endDate"] = json!(get("endDate"));
    if let Some(category_id) = get("categoryId") {
        let name = state.categories["data"]
            .as_array()
            .and_then(|cats| {
                cats.iter()
                    .find(|c| c["id"].to_string() == category_id)
                    .and_then(|c| c["name"].as_str())
            })
            .map(str::to_string);
        record["category"] = json!({"name": name});
    }
    if has_file {
        record["receipt_id"] = json!(format!("r-{}", record["id"]));
    }
}

async fn create_expense(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (fields, files) = read_multipart(multipart).await;
    let mut s = state.lock().unwrap();
    let idx = record(&mut s, Method::POST, "/api/expenses".into(), None, &headers);
    s.requests[idx].fields = fields.clone();
    s.requests[idx].files = files.clone();
    if s.fail_mutations {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write failed").into_response();
    }
    let id = s.next_id;
    s.next_id += 1;
    let mut created = json!({"id": id});
    apply_form(&s, &mut created, &fields, !files.is_empty());
    s.expenses.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_expense(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (fields, files) = read_multipart(multipart).await;
    let mut s = state.lock().unwrap();
    let idx = record(&mut s, Method::PUT, format!("/api/expenses/{id}"), None, &headers);
    s.requests[idx].fields = fields.clone();
    s.requests[idx].files = files.clone();
    if s.fail_mutations {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write failed").into_response();
    }
    let Some(pos) = s.expenses.iter().position(|e| e["id"].to_string() == id) else {
        return (StatusCode::NOT_FOUND, "no such expense").into_response();
    };
    let mut updated = s.expenses[pos].clone();
    apply_form(&s, &mut updated, &fields, !files.is_empty());
    s.expenses[pos] = updated.clone();
    Json(updated).into_response()
}

async fn delete_expense(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::DELETE, format!("/api/expenses/{id}"), None, &headers);
    if s.fail_mutations {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write failed").into_response();
    }
    let before = s.expenses.len();
    s.expenses.retain(|e| e["id"].to_string() != id);
    if s.expenses.len() == before {
        return (StatusCode::NOT_FOUND, "no such expense").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn primary_receipt(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::GET, format!("/api/expenses/{id}/receipt"), None, &headers);
    if !s.primary_receipt_ok {
        return (StatusCode::NOT_FOUND, "receipt not found").into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"march.pdf\""),
        ],
        PRIMARY_RECEIPT_BYTES,
    )
        .into_response()
}

async fn fallback_receipt(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::GET, format!("/api/receipts/{id}"), None, &headers);
    if !s.fallback_receipt_ok {
        return (StatusCode::INTERNAL_SERVER_ERROR, "storage offline").into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], FALLBACK_RECEIPT_BYTES).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::GET, "/api/auth/me".into(), None, &headers);
    if s.session_valid && authorized(&headers) {
        Json(json!({"email": "user@example.com"})).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn refresh_login(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = state.lock().unwrap();
    record(&mut s, Method::POST, "/api/auth/refreshlogin".into(), None, &headers);
    if s.refresh_ok {
        StatusCode::OK.into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn sign_up(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    let idx = record(&mut s, Method::POST, "/api/auth/signup".into(), None, &headers);
    s.requests[idx].json = Some(body.clone());
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if s.taken_emails.contains(&email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Email already registered"})),
        )
            .into_response();
    }
    s.taken_emails.push(email);
    (StatusCode::CREATED, Json(json!({"ok": true}))).into_response()
}

async fn change_password(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    let idx = record(&mut s, Method::POST, "/api/user/change-password".into(), None, &headers);
    s.requests[idx].json = Some(body.clone());
    if body["oldPassword"] == "old-pass" {
        Json(json!({"ok": true})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Current password is incorrect"})),
        )
            .into_response()
    }
}
