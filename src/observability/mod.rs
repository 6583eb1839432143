//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! binder (route installs, bind failures)
//! adapter (forwarded handler errors, panics)
//! error pipeline (5xx responses)
//!     → tracing events with structured fields
//!     → logging.rs subscriber (stdout)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the
//!   binary's job
//! - `RUST_LOG` wins over the configured filter

pub mod logging;
