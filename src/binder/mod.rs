//! Binding subsystem.
//!
//! # Data Flow
//! ```text
//! RouteBuilder table (insertion order)
//!     → resolve.rs (handler → BoxHandler, method tokens → HttpMethod)
//!     → adapter.rs (BoxHandler → Endpoint)
//!     → host.rs (HostRouter::install per method)
//!     → axum_host.rs (axum::Router with middleware layers)
//! ```
//!
//! # Design Decisions
//! - Abort on the first failure: every entry is resolved and validated in a
//!   planning pass before anything is installed, so a failed bind leaves the
//!   host untouched
//! - Patterns the host cannot hold side by side (`/users/:id` and
//!   `/users/:userId`) are rejected during planning, never at install
//! - Failures are logged before they are returned
//! - Binding twice onto the same host registers every route twice; the caller
//!   owns that

pub mod adapter;
pub mod axum_host;
pub mod host;
pub mod resolve;

use std::sync::Arc;

use crate::error::{BindError, RouteConflictError};
use crate::routing::{HttpMethod, RouteBuilder, RouteEntry, ShapeIndex};

pub use adapter::adapter;
pub use axum_host::AxumHost;
pub use host::{Endpoint, HostRouter};
pub use resolve::{resolve, validate_methods};

struct PlannedRoute<'a> {
    entry: &'a RouteEntry,
    methods: Vec<HttpMethod>,
    endpoint: Endpoint,
}

/// Install every route of `routes` onto `host`.
pub fn apply<H: HostRouter>(routes: &RouteBuilder, host: &mut H) -> Result<(), BindError> {
    let plan = routes
        .entries()
        .iter()
        .map(plan_route)
        .collect::<Result<Vec<_>, _>>()?;
    check_conflicts(&plan, host)?;

    let mut installed = 0usize;
    for route in &plan {
        for method in &route.methods {
            tracing::debug!(
                method = %method,
                path = %route.entry.path,
                middleware = ?route.entry.middleware_names(),
                "Installing route"
            );
            host.install(
                *method,
                &route.entry.path,
                &route.entry.middlewares,
                route.endpoint.clone(),
            );
            installed += 1;
        }
    }

    tracing::info!(entries = plan.len(), installed, "Route table bound");
    Ok(())
}

/// Reject patterns that clash with each other or with routes the host
/// already holds.
fn check_conflicts<H: HostRouter>(plan: &[PlannedRoute<'_>], host: &H) -> Result<(), BindError> {
    let mut shapes = ShapeIndex::new();
    for route in plan {
        let path = route.entry.path.as_str();
        let existing = host
            .conflicting_route(path)
            .or_else(|| shapes.conflict(path).map(str::to_string));

        if let Some(existing) = existing {
            tracing::error!(path = %path, existing = %existing, "Conflicting route pattern");
            return Err(RouteConflictError {
                path: path.to_string(),
                existing,
            }
            .into());
        }
        shapes.insert(path);
    }
    Ok(())
}

fn plan_route(entry: &RouteEntry) -> Result<PlannedRoute<'_>, BindError> {
    let handler = resolve(&entry.handler, &entry.path).map_err(|e| {
        tracing::error!(path = %entry.path, error = %e, "Error setting up route");
        BindError::from(e)
    })?;

    let methods = validate_methods(entry).map_err(|e| {
        tracing::error!(method = %e.method, path = %e.path, "Invalid HTTP method");
        BindError::from(e)
    })?;

    Ok(PlannedRoute {
        entry,
        methods,
        endpoint: adapter(handler, Arc::from(entry.path.as_str())),
    })
}
