//! Route middleware.
//!
//! Middleware follows the host's calling convention: it receives the request
//! and the rest of the chain, and either calls `next.run(req)` to proceed or
//! returns its own response to short-circuit. An `Err` is routed into the
//! host's error pipeline.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::error::HandlerError;
use crate::handler::short_type_name;

pub type MiddlewareResult = Result<Response, HandlerError>;

type MiddlewareFn =
    dyn Fn(Request<Body>, Next) -> BoxFuture<'static, MiddlewareResult> + Send + Sync;

/// Named, cheaply clonable middleware.
#[derive(Clone)]
pub struct Middleware {
    name: Arc<str>,
    func: Arc<MiddlewareFn>,
}

impl Middleware {
    /// Wrap an async function. The name defaults to the function's name.
    ///
    /// # Example
    /// ```rust,ignore
    /// async fn auth(req: Request<Body>, next: Next) -> MiddlewareResult {
    ///     if req.headers().contains_key(AUTHORIZATION) {
    ///         Ok(next.run(req).await)
    ///     } else {
    ///         Ok(StatusCode::UNAUTHORIZED.into_response())
    ///     }
    /// }
    ///
    /// let auth = Middleware::from_fn(auth);
    /// ```
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MiddlewareResult> + Send + 'static,
    {
        Self {
            name: short_type_name(std::any::type_name::<F>()).into(),
            func: Arc::new(move |req, next| Box::pin(f(req, next))),
        }
    }

    /// Override the name used in logs and chain inspection.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, MiddlewareResult> {
        (self.func)(req, next)
    }

    /// Same underlying function, regardless of name.
    pub fn ptr_eq(&self, other: &Middleware) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}
