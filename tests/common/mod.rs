//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;

use route_facade::handler::middleware::MiddlewareResult;
use route_facade::Middleware;

/// Drive `router` with one request and collect status, headers and body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let res = router.oneshot(request).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let (status, _, body) = send(router, Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, body)
}

/// Ordered record of events shared between middleware and handlers.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Middleware that records `name` and continues.
pub fn recording(log: &EventLog, name: &'static str) -> Middleware {
    let log = log.clone();
    Middleware::from_fn(move |req: Request<Body>, next: Next| {
        let log = log.clone();
        async move {
            log.push(name);
            let res: MiddlewareResult = Ok(next.run(req).await);
            res
        }
    })
    .named(name)
}

/// Serve `router` on an ephemeral local port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
