//! Route registration subsystem.
//!
//! # Data Flow
//! ```text
//! Setup code
//!     → builder.rs (add / get / post ..., group, middleware)
//!     → path.rs (prefix join + normalization)
//!     → entry.rs (RouteEntry with middleware snapshot)
//!     → RouteBuilder table, in registration order
//!
//! Inspection:
//!     RouteBuilder::routes() → RouteSummary per entry
//!
//! Bind (once, at startup):
//!     RouteBuilder → binder::apply → HostRouter
//! ```
//!
//! # Design Decisions
//! - Paths and middleware chains are fixed at registration time
//! - Scopes nest additively and restore on every exit path
//! - Deterministic: the same registration calls give the same table

pub mod builder;
pub mod entry;
pub mod method;
pub mod path;

pub use builder::{RouteBuilder, RouteHandle};
pub use entry::{RouteEntry, RouteSummary};
pub use method::{HttpMethod, IntoMethods};
pub use path::{normalize, ShapeIndex};
