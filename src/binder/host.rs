//! Host router seam.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::handler::{Continuation, Middleware};
use crate::routing::HttpMethod;

/// Final invocable installed for a route: the generated adapter.
///
/// The host supplies the continuation for each call.
pub type Endpoint =
    Arc<dyn Fn(Request<Body>, Continuation) -> BoxFuture<'static, Response> + Send + Sync>;

/// A framework router that accepts per-method registrations.
///
/// `middlewares` run in slice order before `endpoint`; the first entry is the
/// outermost.
pub trait HostRouter {
    fn install(
        &mut self,
        method: HttpMethod,
        path: &str,
        middlewares: &[Middleware],
        endpoint: Endpoint,
    );

    /// Path of an installed route that `path` cannot coexist with.
    ///
    /// Consulted before anything is installed; hosts without matcher
    /// restrictions keep the default.
    fn conflicting_route(&self, path: &str) -> Option<String> {
        let _ = path;
        None
    }
}
