//! Request adapter bridging resolved handlers into the host's calling
//! convention.
//!
//! # Responsibilities
//! - Build the per-request [`Context`]
//! - Await the handler
//! - Forward errors and panics to the continuation
//!
//! # Design Decisions
//! - Nothing escapes the adapter: every outcome is a response
//! - The handler call itself runs inside the guarded future, so a panic
//!   before the first await is caught too

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use futures_util::FutureExt;

use crate::binder::host::Endpoint;
use crate::error::HandlerError;
use crate::handler::{BoxHandler, Context, Continuation};

/// Wrap `handler`, registered at `pattern`, into an [`Endpoint`].
pub fn adapter(handler: BoxHandler, pattern: Arc<str>) -> Endpoint {
    Arc::new(move |request: Request<Body>, next: Continuation| {
        let handler = handler.clone();
        let pattern = pattern.clone();

        Box::pin(async move {
            let ctx = Context::new(request, next.clone(), pattern.clone());
            let outcome = AssertUnwindSafe(async move { handler(ctx).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => {
                    tracing::warn!(route = %pattern, error = %error, "Handler failed, forwarding to error pipeline");
                    next.error(error)
                }
                Err(panic) => {
                    let error = HandlerError::from_panic(panic);
                    tracing::error!(route = %pattern, error = %error, "Handler panicked, forwarding to error pipeline");
                    next.error(error)
                }
            }
        })
    })
}
