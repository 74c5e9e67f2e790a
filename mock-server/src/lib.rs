use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    pub reference: Uuid,
    pub amount: i64,
    pub description: String,
}

#[derive(Deserialize)]
pub struct CreateInvoice {
    pub amount: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    invoices: BTreeMap<u64, Invoice>,
}

pub type Db = Arc<RwLock<Store>>;

/// Headers echoed back by `/echo`.
const ECHOED_HEADERS: &[&str] = &[
    "accept",
    "authorization",
    "x-api-key",
    "content-type",
    "x-trace",
];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/billing/v1/invoices", get(list_invoices).post(create_invoice))
        .route("/billing/v1/invoices/{id}", get(get_invoice).delete(delete_invoice))
        .route("/echo/{*rest}", any(echo))
        .route("/broken/v1/malformed", get(malformed))
        .route("/broken/v1/failure", get(failure))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    bearer || headers.contains_key("x-api-key")
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "missing credentials"}))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "invoice not found"}))).into_response()
}

async fn list_invoices(State(db): State<Db>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let store = db.read().await;
    Json(store.invoices.values().cloned().collect::<Vec<_>>()).into_response()
}

async fn create_invoice(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateInvoice>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    store.next_id += 1;
    let invoice = Invoice {
        id: store.next_id,
        reference: Uuid::new_v4(),
        amount: input.amount,
        description: input.description,
    };
    store.invoices.insert(invoice.id, invoice.clone());
    debug!(id = invoice.id, "created invoice");
    (StatusCode::CREATED, Json(invoice)).into_response()
}

async fn get_invoice(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let store = db.read().await;
    match store.invoices.get(&id) {
        Some(invoice) => Json(invoice.clone()).into_response(),
        None => not_found(),
    }
}

async fn delete_invoice(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    match store.invoices.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

/// Reflect what the client actually sent.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let echoed: BTreeMap<&str, &str> = ECHOED_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()).map(|v| (*name, v)))
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": echoed,
        "body": body,
    }))
}

async fn malformed() -> &'static str {
    "this is not json"
}

async fn failure() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream exploded</html>")
}
