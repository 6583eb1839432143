//! HTTP serving for a bound route table.
//!
//! # Data Flow
//! ```text
//! RouteBuilder + AppConfig
//!     → server.rs (bind onto AxumHost, add /_routes, wrap in tower-http layers)
//!     → axum::serve on a TcpListener
//! ```

pub mod server;

pub use server::{AppServer, ROUTES_PATH};
