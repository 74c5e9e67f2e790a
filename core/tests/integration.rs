//! Service client lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `FabraicClient` and
//! `ServiceClient` over real HTTP through `UreqTransport`. Validates request
//! composition, auth headers, query encoding and error mapping end to end.
#![cfg(feature = "ureq")]

use std::net::SocketAddr;

use fabraic_sdk::{ClientConfig, Error, FabraicClient, RequestOptions, Transport, UreqTransport};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct Invoice {
    id: u64,
    amount: i64,
    description: String,
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, config: ClientConfig) -> FabraicClient {
    FabraicClient::new(
        config
            .base_url(format!("http://{addr}/"))
            .transport(UreqTransport::new()),
    )
    .unwrap()
}

#[test]
fn invoice_lifecycle() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().api_key("test-key"));
    let billing = client.service("/billing/", None).unwrap();

    // Step 1: list, should be empty.
    let list = billing.get("invoices", RequestOptions::new()).unwrap();
    assert_eq!(list, json!([]));

    // Step 2: create.
    let opts = RequestOptions::new()
        .json(&json!({"amount": 1999, "description": "Pro plan"}))
        .unwrap();
    let created = billing.post("/invoices", opts).unwrap();
    assert_eq!(created["amount"], 1999);
    let id = created["id"].as_u64().unwrap();

    // Step 3: fetch through a path template, typed.
    let fetched: Invoice = billing
        .request_as(
            fabraic_sdk::HttpMethod::Get,
            "/invoices/{id}",
            RequestOptions::new().path_param("id", id),
        )
        .unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.amount, 1999);
    assert_eq!(fetched.description, "Pro plan");

    // Step 4: delete, 204 with empty body decodes to null.
    let deleted = billing
        .delete("/invoices/{id}", RequestOptions::new().path_param("id", id))
        .unwrap();
    assert_eq!(deleted, Value::Null);

    // Step 5: fetch after delete, 404 with the server's JSON body.
    let err = billing
        .get("/invoices/{id}", RequestOptions::new().path_param("id", id))
        .unwrap_err();
    match err {
        Error::Request { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, json!({"error": "invoice not found"}));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn echo_shows_composed_request() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().api_key("key").access_token("tok"));
    let echo = client.service("echo", Some("v2")).unwrap();

    let opts = RequestOptions::new()
        .query("tags", vec!["x", "y"])
        .query("page", None::<u32>)
        .header("X-Trace", "abc")
        .path_param("name", "a b")
        .body(json!({"n": 1}));
    let reply = echo.put("//things/{name}", opts).unwrap();

    assert_eq!(reply["method"], "PUT");
    assert_eq!(reply["path"], "/echo/v2/things/a%20b");
    assert_eq!(reply["query"], "tags=x&tags=y");
    assert_eq!(reply["headers"]["accept"], "application/json");
    assert_eq!(reply["headers"]["authorization"], "Bearer tok");
    assert!(reply["headers"].get("x-api-key").is_none());
    assert_eq!(reply["headers"]["content-type"], "application/json");
    assert_eq!(reply["headers"]["x-trace"], "abc");
    assert_eq!(reply["body"], json!({"n": 1}));
}

#[test]
fn get_without_body_sends_no_content_type() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().api_key("key"));

    let reply = client.request("echo/v1/ping", RequestOptions::new()).unwrap();
    assert_eq!(reply["method"], "GET");
    assert_eq!(reply["headers"]["x-api-key"], "key");
    assert!(reply["headers"].get("content-type").is_none());
    assert!(reply["body"].is_null());
}

#[test]
fn transport_returns_status_headers_and_raw_body() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().api_key("key"));
    let billing = client.service("billing", None).unwrap();

    let request = billing
        .build_request("/invoices/{id}", &RequestOptions::new().path_param("id", 99))
        .unwrap();
    let response = UreqTransport::new().send(&request).unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.body, r#"{"error":"invoice not found"}"#);
}

#[test]
fn missing_auth_override_surfaces_401() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().access_token("tok"));
    let billing = client.service("billing", None).unwrap();

    let opts = RequestOptions::new().header("Authorization", "Basic nope");
    let err = billing.get("/invoices", opts).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn malformed_success_body_is_decoding_error() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().api_key("key"));
    let broken = client.service("broken", None).unwrap();

    let err = broken.get("/malformed", RequestOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Decoding(_)));
}

#[test]
fn non_json_error_body_is_null() {
    let addr = start_server();
    let client = client(addr, ClientConfig::new().api_key("key"));
    let broken = client.service("broken", None).unwrap();

    let err = broken.get("/failure", RequestOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Request { status: 500, body: Value::Null }));
}

#[test]
fn unreachable_host_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let client = client(addr, ClientConfig::new().api_key("key"));

    let err = client.request("/anything", RequestOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
