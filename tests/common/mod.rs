// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process stand-in for the Cyclocity API, with per-endpoint call counts.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use velov_proxy::config::Config;
use velov_proxy::routes::create_router;
use velov_proxy::AppState;

pub const CLIENT_KEY: &str = "test_client_key";
pub const CLIENT_TOKEN: &str = "client-token-abc";
pub const AUTH_CODE: &str = "auth-code-123";
pub const USER_ACCESS_TOKEN: &str = "user-access-xyz";
pub const USER_ID_TOKEN: &str = "user-id-xyz";

/// Upstream detail that must never reach API clients.
pub const UPSTREAM_SECRET_DETAIL: &str = "keycloak-node-7 stack trace";

/// Which upstream step should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum FailAt {
    Nothing,
    ClientToken,
    Login,
    TokenExchange,
    Trips,
}

/// What the trips endpoint saw on its last call.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct TripsRequest {
    pub contract: String,
    pub account: String,
    pub authorization: Option<String>,
    pub identity: Option<String>,
    pub accept: Option<String>,
}

#[derive(Default)]
pub struct Calls {
    pub client_token: AtomicUsize,
    pub login: AtomicUsize,
    pub token_exchange: AtomicUsize,
    pub trips: AtomicUsize,
}

#[allow(dead_code)]
impl Calls {
    pub fn total(&self) -> usize {
        self.client_token.load(Ordering::SeqCst)
            + self.login.load(Ordering::SeqCst)
            + self.token_exchange.load(Ordering::SeqCst)
            + self.trips.load(Ordering::SeqCst)
    }

    /// Counts in call order: client token, login, exchange, trips.
    pub fn snapshot(&self) -> [usize; 4] {
        [
            self.client_token.load(Ordering::SeqCst),
            self.login.load(Ordering::SeqCst),
            self.token_exchange.load(Ordering::SeqCst),
            self.trips.load(Ordering::SeqCst),
        ]
    }
}

/// How the stub's trips endpoint answers a successful call.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum TripsReply {
    Json(Value),
    Raw(StatusCode, &'static str),
}

struct StubState {
    fail_at: FailAt,
    trips: TripsReply,
    calls: Arc<Calls>,
    last_trips_request: Arc<Mutex<Option<TripsRequest>>>,
}

/// Handle to a running stub server.
pub struct StubCyclocity {
    pub base_url: String,
    pub calls: Arc<Calls>,
    last_trips_request: Arc<Mutex<Option<TripsRequest>>>,
}

#[allow(dead_code)]
impl StubCyclocity {
    pub fn last_trips_request(&self) -> Option<TripsRequest> {
        self.last_trips_request.lock().unwrap().clone()
    }
}

fn upstream_failure(status: StatusCode) -> Response {
    (status, Json(json!({ "message": UPSTREAM_SECRET_DETAIL }))).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenBody {
    client_code: String,
    client_key: String,
}

async fn client_tokens(
    State(stub): State<Arc<StubState>>,
    Json(body): Json<ClientTokenBody>,
) -> Response {
    stub.calls.client_token.fetch_add(1, Ordering::SeqCst);
    if stub.fail_at == FailAt::ClientToken
        || body.client_key != CLIENT_KEY
        || body.client_code.is_empty()
    {
        return upstream_failure(StatusCode::SERVICE_UNAVAILABLE);
    }
    Json(json!({ "accessToken": CLIENT_TOKEN })).into_response()
}

#[derive(Deserialize)]
struct LoginQuery {
    takn: String,
    email: String,
    password: String,
}

async fn login(State(stub): State<Arc<StubState>>, Query(query): Query<LoginQuery>) -> Response {
    stub.calls.login.fetch_add(1, Ordering::SeqCst);
    if stub.fail_at == FailAt::Login
        || query.takn != CLIENT_TOKEN
        || query.email.is_empty()
        || query.password.is_empty()
    {
        return upstream_failure(StatusCode::UNAUTHORIZED);
    }
    Json(json!({ "authorizationCode": AUTH_CODE })).into_response()
}

async fn token_exchange(State(stub): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    stub.calls.token_exchange.fetch_add(1, Ordering::SeqCst);
    if stub.fail_at == FailAt::TokenExchange
        || body["code"] != AUTH_CODE
        || body["clientKey"] != CLIENT_KEY
    {
        return upstream_failure(StatusCode::BAD_REQUEST);
    }
    Json(json!({
        "accessToken": USER_ACCESS_TOKEN,
        "idToken": USER_ID_TOKEN,
        "refreshToken": "user-refresh-xyz"
    }))
    .into_response()
}

async fn trips(
    State(stub): State<Arc<StubState>>,
    Path((contract, account)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    stub.calls.trips.fetch_add(1, Ordering::SeqCst);

    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    *stub.last_trips_request.lock().unwrap() = Some(TripsRequest {
        contract,
        account,
        authorization: header_str("authorization"),
        identity: header_str("identity"),
        accept: header_str("accept"),
    });

    if stub.fail_at == FailAt::Trips {
        return upstream_failure(StatusCode::FORBIDDEN);
    }
    match &stub.trips {
        TripsReply::Json(body) => Json(body.clone()).into_response(),
        TripsReply::Raw(status, body) => (*status, *body).into_response(),
    }
}

/// Start a stub Cyclocity API on an ephemeral port.
pub async fn start_stub(fail_at: FailAt, trips_body: Value) -> StubCyclocity {
    start_stub_with_reply(fail_at, TripsReply::Json(trips_body)).await
}

/// Start a stub whose trips endpoint answers with `reply`.
pub async fn start_stub_with_reply(fail_at: FailAt, reply: TripsReply) -> StubCyclocity {
    let calls = Arc::new(Calls::default());
    let last_trips_request = Arc::new(Mutex::new(None));

    let state = Arc::new(StubState {
        fail_at,
        trips: reply,
        calls: calls.clone(),
        last_trips_request: last_trips_request.clone(),
    });

    let app = Router::new()
        .route("/auth/environments/PRD/client_tokens", post(client_tokens))
        .route("/identities/users/login", get(login))
        .route("/identities/token", post(token_exchange))
        .route("/contracts/{contract}/accounts/{account}/trips", get(trips))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubCyclocity {
        base_url: format!("http://{}", addr),
        calls,
        last_trips_request,
    }
}

/// Config pointing at the stub.
pub fn test_config(stub: &StubCyclocity) -> Config {
    Config {
        api_url: stub.base_url.clone(),
        client_key: Some(CLIENT_KEY.to_string()),
        ..Config::default()
    }
}

/// Create a test app backed by the given config.
pub fn create_test_app(config: Config) -> axum::Router {
    create_router(Arc::new(AppState::new(config)))
}

/// A single complete trip in Cyclocity's format.
#[allow(dead_code)]
pub fn sample_trips() -> Value {
    json!([
        {
            "id": "t1",
            "startTime": "2025-03-01T08:00:00Z",
            "endTime": "2025-03-01T08:10:00Z",
            "duration": 600,
            "bikeType": "MECHANICAL",
            "startStation": {"id": 2010, "name": "A", "position": {"lat": 45.7, "lng": 4.8}},
            "endStation": {"id": 3082, "name": "B", "position": {"lat": 45.8, "lng": 4.9}}
        },
        {
            "id": "t2",
            "duration": 300,
            "startStation": {"id": 2010, "name": "A", "position": {"lat": 45.7, "lng": 4.8}},
            "endStation": {"name": "Unknown"}
        }
    ])
}

/// POST a JSON body and return status plus parsed JSON (Null if empty).
#[allow(dead_code)]
pub async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    read_json(response).await
}

/// Read a response into status plus parsed JSON (Null if empty).
pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
