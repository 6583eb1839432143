//! Route table entries and their read-only summaries.

use std::fmt;

use serde::Serialize;

use crate::handler::{HandlerKind, Middleware, RouteHandler};

/// One registration prior to per-method fan-out.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Raw method tokens, validated at bind time.
    pub methods: Vec<String>,
    /// Normalized absolute path.
    pub path: String,
    pub handler: RouteHandler,
    /// Global, then group, then call-site middleware.
    pub middlewares: Vec<Middleware>,
}

impl RouteEntry {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            methods: self.methods.clone(),
            path: self.path.clone(),
            middleware_count: self.middlewares.len(),
            handler_type: self.handler.kind(),
        }
    }

    /// Middleware names in chain order.
    pub fn middleware_names(&self) -> Vec<&str> {
        self.middlewares.iter().map(Middleware::name).collect()
    }
}

/// Projection of a [`RouteEntry`] for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub methods: Vec<String>,
    pub path: String,
    pub middleware_count: usize,
    pub handler_type: HandlerKind,
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<16} {:<40} {:>2} middleware  {}",
            self.methods.join(",").to_uppercase(),
            self.path,
            self.middleware_count,
            self.handler_type
        )
    }
}
