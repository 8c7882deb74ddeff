//! Scripted HTTP backend for integration tests.
//!
//! Every request is recorded; responses are looked up by `"METHOD /path"`
//! and default to `404` with an empty body.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use tutorhub_gateway::{ClientOptions, Credentials, TutoringClient};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl Recorded {
    /// `"METHOD /path"`.
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Clone, Default)]
pub struct MockBackend {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    /// Answers `route` with `status` and a JSON body.
    pub fn on_json(&self, route: &str, status: u16, body: &Value) -> &Self {
        self.on_text(route, status, &body.to_string())
    }

    /// Answers `route` with `status` and a raw body.
    pub fn on_text(&self, route: &str, status: u16, body: &str) -> &Self {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(route.to_string(), (status, body.to_string()));
        self
    }

    /// Every recorded request, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Recorded requests to one route.
    pub fn requests_to(&self, route: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.route() == route)
            .collect()
    }

    /// Starts serving on an ephemeral port; returns the base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");

        let router = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });

        format!("http://{addr}")
    }
}

async fn handle(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        user_id: header("x-user-id"),
        authorization: header("authorization"),
        body: serde_json::from_slice(&body).ok(),
    };
    let route = recorded.route();
    mock.requests.lock().expect("requests lock").push(recorded);

    let reply = mock.routes.lock().expect("routes lock").get(&route).cloned();
    match reply {
        Some((status, body)) => {
            let status = StatusCode::from_u16(status).expect("valid status");
            (status, [("content-type", "application/json")], body).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Client for a mock backend, with basic-auth credentials.
pub fn client(base_url: &str) -> TutoringClient {
    let options = ClientOptions::new(base_url).with_credentials(Credentials::new("alice", "s3cret"));
    TutoringClient::new(options).expect("Failed to build client")
}
