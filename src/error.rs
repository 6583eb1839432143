//! Error types for binding and request handling.
//!
//! # Taxonomy
//! - [`ResolutionError`]: a handler representation cannot be turned into a callable
//! - [`InvalidMethodError`]: a method token outside the allowed set
//! - [`RouteConflictError`]: two patterns the host matcher cannot tell apart
//! - [`BindError`]: any of the above, returned from the bind step
//! - [`HandlerError`]: raised by a handler or middleware while serving a request
//!
//! # Design Decisions
//! - Bind-time errors are logged by the binder before they are returned
//! - Handler errors never escape the adapter; they go to the [`ErrorPipeline`]
//! - The pipeline owns status code and body selection

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Boxed error used for handler and instantiation failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A handler representation could not be resolved into a callable.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Neither the target nor a fresh instance exposes the member.
    #[error("method \"{member}\" not found in controller \"{type_name}\" for route {path}")]
    MissingMember {
        member: String,
        type_name: String,
        path: String,
    },

    /// Building a fresh controller instance failed.
    #[error("failed to instantiate controller \"{type_name}\" for route {path}: {source}")]
    Instantiation {
        type_name: String,
        path: String,
        #[source]
        source: BoxError,
    },

    /// The dispatch descriptor itself is malformed.
    #[error("invalid handler format for route {path}: {reason}")]
    InvalidDescriptor { path: String, reason: &'static str },
}

/// A route declared a method token outside the allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid HTTP method: {method} for route: {path}")]
pub struct InvalidMethodError {
    pub method: String,
    pub path: String,
}

/// Two routes put differently named parameters (or a parameter and a
/// catch-all) at the same position; the host matcher cannot hold both.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("route {path} conflicts with previously registered route {existing}")]
pub struct RouteConflictError {
    pub path: String,
    pub existing: String,
}

/// Failure of the one-time bind step.
#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    InvalidMethod(#[from] InvalidMethodError),

    #[error(transparent)]
    RouteConflict(#[from] RouteConflictError),
}

impl BindError {
    /// Path of the route that failed.
    pub fn path(&self) -> &str {
        match self {
            BindError::Resolution(ResolutionError::MissingMember { path, .. })
            | BindError::Resolution(ResolutionError::Instantiation { path, .. })
            | BindError::Resolution(ResolutionError::InvalidDescriptor { path, .. }) => path,
            BindError::InvalidMethod(e) => &e.path,
            BindError::RouteConflict(e) => &e.path,
        }
    }
}

/// Error raised by a handler or middleware during a request.
///
/// Carries an optional status hint for the error pipeline. Without one the
/// default pipeline answers 500.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct HandlerError {
    status: Option<StatusCode>,
    #[source]
    source: BoxError,
}

impl HandlerError {
    /// Wrap any error without a status hint.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            status: None,
            source: source.into(),
        }
    }

    /// Wrap an error that should be answered with `status`.
    pub fn with_status(status: StatusCode, source: impl Into<BoxError>) -> Self {
        Self {
            status: Some(status),
            source: source.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message.into())
    }

    /// Build from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::new(format!("panic: {}", message))
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn source_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e)
    }
}

impl From<axum::Error> for HandlerError {
    fn from(e: axum::Error) -> Self {
        Self::new(e)
    }
}

/// Centralized error handling shared by every installed route.
#[derive(Clone)]
pub struct ErrorPipeline {
    handler: Arc<dyn Fn(HandlerError) -> Response + Send + Sync>,
}

impl ErrorPipeline {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(HandlerError) -> Response + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(f),
        }
    }

    /// Turn an error into the user-visible response.
    pub fn handle(&self, error: HandlerError) -> Response {
        (self.handler)(error)
    }
}

impl Default for ErrorPipeline {
    fn default() -> Self {
        Self::new(default_error_response)
    }
}

impl fmt::Debug for ErrorPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorPipeline").finish_non_exhaustive()
    }
}

/// Client errors echo their message; server errors stay opaque.
fn default_error_response(error: HandlerError) -> Response {
    let status = error.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(status = %status, error = %error, "Request failed");
        let reason = status.canonical_reason().unwrap_or("Internal Server Error");
        (status, reason).into_response()
    } else {
        tracing::debug!(status = %status, error = %error, "Request rejected");
        (status, error.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_status() {
        let pipeline = ErrorPipeline::default();

        let res = pipeline.handle(HandlerError::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = pipeline.handle(HandlerError::bad_request("missing field"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_panic_payloads() {
        let err = HandlerError::from_panic(Box::new("static str"));
        assert_eq!(err.to_string(), "panic: static str");

        let err = HandlerError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "panic: owned");

        let err = HandlerError::from_panic(Box::new(42u8));
        assert_eq!(err.to_string(), "panic: handler panicked");
    }

    #[test]
    fn test_bind_error_path() {
        let err: BindError = InvalidMethodError {
            method: "foo".into(),
            path: "/a".into(),
        }
        .into();
        assert_eq!(err.path(), "/a");
        assert_eq!(err.to_string(), "invalid HTTP method: foo for route: /a");

        let err: BindError = RouteConflictError {
            path: "/users/:userId".into(),
            existing: "/users/:id".into(),
        }
        .into();
        assert_eq!(err.path(), "/users/:userId");
        assert_eq!(
            err.to_string(),
            "route /users/:userId conflicts with previously registered route /users/:id"
        );
    }

    #[test]
    fn test_handler_error_source_chain() {
        use std::error::Error as _;

        let err = HandlerError::with_status(StatusCode::CONFLICT, "already exists");
        assert_eq!(err.to_string(), "already exists");
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("already exists"));
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }
}
