//! End-to-end tests: `StatelessQueryAdapter` over `HttpConnector` against a
//! local axum server.
//!
//! The server runs on its own runtime in a background thread, because the
//! adapter under test is blocking and drives its own runtime.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapter::StatelessQueryAdapter;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http_transport::{HttpConnector, HttpTransportConfig};
use qmodel::{
    CorrelationId, FailureCause, PageIndex, Query, QueryAdapter, QueryTimeout, ServiceError,
};
use serde_json::{json, Value};

const QUERY_ID: &str = "0f8e2b1c-5a4d-4e3f-9a2b-112233445566";

// ---------------------------------------------------------------------------
// Test server
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct ServerState {
    requested_pages: Arc<Mutex<Vec<u64>>>,
    /// Page whose first request is answered only after a delay.
    stall_page_once: Arc<Mutex<Option<u64>>>,
}

async fn submit(Json(query): Json<Value>) -> Response {
    if query.get("reject").is_some() {
        return (StatusCode::BAD_REQUEST, "query rejected").into_response();
    }
    Json(json!({ "id": QUERY_ID })).into_response()
}

async fn results(State(state): State<ServerState>, Json(request): Json<Value>) -> Response {
    let page = request["page"].as_u64().unwrap_or(u64::MAX);
    state.requested_pages.lock().unwrap().push(page);

    if request["id"] != json!(QUERY_ID) {
        return (StatusCode::NOT_FOUND, "unknown query id").into_response();
    }

    let stall = {
        let mut stall_page = state.stall_page_once.lock().unwrap();
        if *stall_page == Some(page) {
            *stall_page = None;
            true
        } else {
            false
        }
    };
    if stall {
        tokio::time::sleep(Duration::from_millis(2500)).await;
    }

    Json(json!({
        "page": page,
        "rows": [[page * 10, "a"], [page * 10 + 1, "b"]],
        "last": page >= 2,
    }))
    .into_response()
}

async fn garbage() -> &'static str {
    "this is not json"
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/query", post(submit))
        .route("/results", post(results))
        .route("/garbage", post(garbage))
        .with_state(state)
}

fn start_server() -> (SocketAddr, ServerState) {
    let state = ServerState::default();
    let app = router(state.clone());
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    (rx.recv().unwrap(), state)
}

/// Answers a single request with a 500 whose body is cut off before its
/// declared length, then closes the connection.
fn start_truncating_server() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        stream
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  Content-Type: text/plain\r\n\
                  Content-Length: 100\r\n\
                  \r\n\
                  short",
            )
            .unwrap();
        stream.flush().unwrap();
    });

    addr
}

/// Consumes the request head and its `Content-Length` body.
fn read_request(stream: &mut TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
}

fn secs(secs: u32) -> QueryTimeout {
    QueryTimeout::from_secs(secs)
}

fn query() -> Query {
    Query::new(json!({ "table": "events" }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_query_and_pages_over_http() {
    let (addr, state) = start_server();
    let mut adapter = StatelessQueryAdapter::new(addr.to_string(), HttpConnector::default());

    let id = adapter.query(query(), secs(5)).unwrap();
    assert_eq!(id.to_string(), QUERY_ID);

    for expected in 0..3u64 {
        let frame = adapter.get_results(id, secs(5)).unwrap();
        assert_eq!(frame.as_value()["page"], json!(expected));
    }

    assert_eq!(*state.requested_pages.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(adapter.page_cursor(), PageIndex::new(3));
}

#[test]
fn test_remote_rejection_is_query_failure() {
    let (addr, _state) = start_server();
    let mut adapter = StatelessQueryAdapter::new(addr.to_string(), HttpConnector::default());

    let err = adapter
        .query(Query::new(json!({ "reject": true })), secs(5))
        .unwrap_err();

    match err.cause() {
        FailureCause::Remote(ServiceError::Rejected { status, message }) => {
            assert_eq!(*status, 400);
            assert_eq!(message, "query rejected");
        }
        other => panic!("unexpected cause: {other:?}"),
    }
}

#[test]
fn test_unknown_correlation_id_keeps_cursor() {
    let (addr, state) = start_server();
    let mut adapter = StatelessQueryAdapter::new(addr.to_string(), HttpConnector::default());

    let err = adapter
        .get_results(CorrelationId::new_random(), secs(5))
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        FailureCause::Remote(ServiceError::Rejected { status: 404, .. })
    ));
    assert_eq!(adapter.page_cursor(), PageIndex::FIRST);
    assert_eq!(*state.requested_pages.lock().unwrap(), vec![0]);
}

#[test]
fn test_unreadable_error_body_is_reported() {
    let addr = start_truncating_server();
    let mut adapter = StatelessQueryAdapter::new(addr.to_string(), HttpConnector::default());

    let err = adapter.query(query(), secs(5)).unwrap_err();

    match err.cause() {
        FailureCause::Remote(ServiceError::Rejected { status, message }) => {
            assert_eq!(*status, 500);
            assert!(
                message.starts_with("<unreadable error body"),
                "unexpected message: {message:?}"
            );
        }
        other => panic!("unexpected cause: {other:?}"),
    }
}

#[test]
fn test_slow_page_times_out_and_is_requested_again() {
    let (addr, state) = start_server();
    *state.stall_page_once.lock().unwrap() = Some(1);
    let mut adapter = StatelessQueryAdapter::new(addr.to_string(), HttpConnector::default());

    let id = adapter.query(query(), secs(5)).unwrap();
    adapter.get_results(id, secs(5)).unwrap();

    let err = adapter.get_results(id, secs(1)).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(adapter.page_cursor(), PageIndex::new(1));

    let frame = adapter.get_results(id, secs(5)).unwrap();
    assert_eq!(frame.as_value()["page"], json!(1));
    assert_eq!(*state.requested_pages.lock().unwrap(), vec![0, 1, 1]);
}

#[test]
fn test_undecodable_response_is_protocol_error() {
    let (addr, _state) = start_server();
    let config = HttpTransportConfig {
        results_path: "garbage".to_string(),
        ..HttpTransportConfig::default()
    };
    let mut adapter =
        StatelessQueryAdapter::new(addr.to_string(), HttpConnector::new(config).unwrap());

    let id = adapter.query(query(), secs(5)).unwrap();
    let err = adapter.get_results(id, secs(5)).unwrap_err();

    assert!(matches!(
        err.cause(),
        FailureCause::Remote(ServiceError::Protocol { .. })
    ));
    assert_eq!(adapter.page_cursor(), PageIndex::FIRST);
}

#[test]
fn test_unreachable_endpoint_is_transport_error() {
    // Bind and release a port so that nothing is listening on it.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut adapter = StatelessQueryAdapter::new(addr.to_string(), HttpConnector::default());

    let err = adapter.query(query(), secs(5)).unwrap_err();

    assert!(matches!(
        err.cause(),
        FailureCause::Remote(ServiceError::Transport { .. })
    ));
    assert!(adapter.is_connected());
}

#[test]
fn test_malformed_endpoint_fails_before_any_request() {
    let mut adapter = StatelessQueryAdapter::new("svc:notaport", HttpConnector::default());

    let err = adapter.query(query(), secs(5)).unwrap_err();

    assert!(matches!(
        err.cause(),
        FailureCause::Connect(ServiceError::Connect { .. })
    ));
    assert!(!adapter.is_connected());
}
