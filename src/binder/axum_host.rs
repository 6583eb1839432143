//! axum implementation of the host router.
//!
//! # Responsibilities
//! - Translate registered patterns into axum path syntax
//! - Wrap the adapter in a per-method `MethodRouter`
//! - Layer route middleware so the first one runs outermost
//! - Route middleware and handler errors into one error pipeline
//!
//! # Design Decisions
//! - Middleware is attached with `route_layer`, so it never runs for the
//!   405 fallback of a path
//! - Several methods on one path merge into a single axum route
//! - An exact (method, path) repeat is skipped with a warning; axum would
//!   panic on the overlap and the first registration wins anyway
//! - Patterns axum's matcher cannot hold next to an installed one are
//!   reported through `conflicting_route` before binding and skipped by
//!   `install`, which never panics
//! - The body cap for `Context` helpers travels as a request extension

use std::collections::HashSet;
use std::mem;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::routing::{on, MethodRouter};
use axum::Router;

use crate::binder::host::{Endpoint, HostRouter};
use crate::error::ErrorPipeline;
use crate::handler::{BodyLimit, Continuation, Middleware, DEFAULT_BODY_LIMIT};
use crate::routing::path::to_axum_pattern;
use crate::routing::{HttpMethod, ShapeIndex};

/// Host router backed by [`axum::Router`].
#[derive(Debug)]
pub struct AxumHost<S = ()> {
    router: Router<S>,
    pipeline: ErrorPipeline,
    body_limit: usize,
    installed: HashSet<(HttpMethod, String)>,
    shapes: ShapeIndex,
}

impl AxumHost<()> {
    pub fn new() -> Self {
        Self::from_router(Router::new())
    }
}

impl Default for AxumHost<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> AxumHost<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Install onto an existing router, keeping its routes and layers.
    pub fn from_router(router: Router<S>) -> Self {
        Self {
            router,
            pipeline: ErrorPipeline::default(),
            body_limit: DEFAULT_BODY_LIMIT,
            installed: HashSet::new(),
            shapes: ShapeIndex::new(),
        }
    }

    /// Replace the error pipeline used by routes installed afterwards.
    pub fn with_error_handler(mut self, pipeline: ErrorPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Cap for bodies read through `Context` helpers on routes installed
    /// afterwards.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn error_pipeline(&self) -> &ErrorPipeline {
        &self.pipeline
    }

    /// Number of (method, path) pairs installed.
    pub fn installed(&self) -> usize {
        self.installed.len()
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

impl<S> HostRouter for AxumHost<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn install(
        &mut self,
        method: HttpMethod,
        path: &str,
        middlewares: &[Middleware],
        endpoint: Endpoint,
    ) {
        let pattern = to_axum_pattern(path);
        if self.installed.contains(&(method, pattern.clone())) {
            tracing::warn!(method = %method, path = %pattern, "Route already installed, skipping");
            return;
        }
        if let Some(existing) = self.shapes.conflict(path) {
            tracing::error!(
                method = %method,
                path = %path,
                existing = %existing,
                "Route conflicts with an installed pattern, skipping"
            );
            return;
        }
        self.installed.insert((method, pattern.clone()));
        self.shapes.insert(path);

        let next = Continuation::new(self.pipeline.clone());
        let limit = BodyLimit(self.body_limit);
        let handler = move |mut req: Request<Body>| {
            let endpoint = endpoint.clone();
            let next = next.clone();
            req.extensions_mut().insert(limit);
            async move { endpoint(req, next).await }
        };

        let mut method_router: MethodRouter<S> = on(method.filter(), handler);
        for mw in middlewares.iter().rev() {
            let mw = mw.clone();
            let pipeline = self.pipeline.clone();
            method_router = method_router.route_layer(middleware::from_fn(
                move |req: Request<Body>, next: Next| {
                    let mw = mw.clone();
                    let pipeline = pipeline.clone();
                    async move {
                        match mw.call(req, next).await {
                            Ok(response) => response,
                            Err(error) => {
                                tracing::warn!(
                                    middleware = mw.name(),
                                    error = %error,
                                    "Middleware failed, forwarding to error pipeline"
                                );
                                pipeline.handle(error)
                            }
                        }
                    }
                },
            ));
        }

        let router = mem::take(&mut self.router);
        self.router = router.route(&pattern, method_router);
    }

    fn conflicting_route(&self, path: &str) -> Option<String> {
        self.shapes.conflict(path).map(str::to_string)
    }
}
