//! Declarative route registration for axum
//!
//! Routes are collected on a [`RouteBuilder`] (prefix groups, group and
//! global middleware, handlers given as functions or controller members) and
//! bound once onto a [`HostRouter`] such as [`AxumHost`].

// Registration
pub mod handler;
pub mod routing;

// Binding onto the host framework
pub mod binder;
pub mod error;

// Demo server
pub mod config;
pub mod http;
pub mod observability;
pub mod web;

pub use binder::{AxumHost, HostRouter};
pub use error::{BindError, ErrorPipeline, HandlerError};
pub use handler::{action, Context, DispatchTarget, HandlerResult, Middleware};
pub use routing::{RouteBuilder, RouteSummary};
