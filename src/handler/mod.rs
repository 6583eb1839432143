//! Handler representations.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     async fn / closure      → RouteHandler::Direct(BoxHandler)
//!     action(target, member)  → RouteHandler::Member(Dispatch)
//!
//! Bind (binder::resolve):
//!     RouteHandler → BoxHandler (receiver bound for member dispatch)
//!
//! Request (binder::adapter):
//!     Request → Context → BoxHandler → Response | HandlerError
//! ```
//!
//! # Design Decisions
//! - One callable shape after resolution: `Fn(Context) -> Future<HandlerResult>`
//! - Member dispatch is a tagged variant, never runtime probing
//! - Middleware is named so chains can be logged and inspected

pub mod context;
pub mod dispatch;
pub mod middleware;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::error::HandlerError;

pub use context::{BodyLimit, Context, Continuation, ResponseWriter, DEFAULT_BODY_LIMIT};
pub use dispatch::{action, bind, Controller, ControllerFactory, Dispatch, DispatchTarget};
pub use middleware::Middleware;

/// Result every resolved handler produces.
pub type HandlerResult = Result<Response, HandlerError>;

/// Type-erased resolved handler.
pub type BoxHandler = Arc<dyn Fn(Context) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Box an async function or closure taking a [`Context`].
pub fn boxed<F, Fut>(f: F) -> BoxHandler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// A handler as registered, before resolution.
#[derive(Clone)]
pub enum RouteHandler {
    /// Invoked as-is.
    Direct(BoxHandler),
    /// Resolved against a controller at bind time.
    Member(Dispatch),
}

impl RouteHandler {
    pub fn kind(&self) -> HandlerKind {
        match self {
            RouteHandler::Direct(_) => HandlerKind::Function,
            RouteHandler::Member(_) => HandlerKind::Controller,
        }
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteHandler::Direct(_) => f.write_str("Direct(..)"),
            RouteHandler::Member(d) => f.debug_tuple("Member").field(d).finish(),
        }
    }
}

/// Shape reported by route summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Function,
    Controller,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Function => f.write_str("function"),
            HandlerKind::Controller => f.write_str("controller"),
        }
    }
}

/// Conversion into a [`RouteHandler`] at registration time.
///
/// The marker parameter keeps the function impl apart from the descriptor
/// impls; callers never name it.
pub trait IntoRouteHandler<M> {
    fn into_route_handler(self) -> RouteHandler;
}

#[doc(hidden)]
#[derive(Debug)]
pub struct ViaFn;

impl<F, Fut> IntoRouteHandler<ViaFn> for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn into_route_handler(self) -> RouteHandler {
        RouteHandler::Direct(boxed(self))
    }
}

impl IntoRouteHandler<Dispatch> for Dispatch {
    fn into_route_handler(self) -> RouteHandler {
        RouteHandler::Member(self)
    }
}

impl IntoRouteHandler<RouteHandler> for RouteHandler {
    fn into_route_handler(self) -> RouteHandler {
        self
    }
}

/// Last path segment of a type name, for log and error messages.
pub(crate) fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello(ctx: Context) -> HandlerResult {
        Ok(ctx.response.send("hi"))
    }

    #[derive(Default)]
    struct Greeter;

    impl Controller for Greeter {
        fn action(self: Arc<Self>, _name: &str) -> Option<BoxHandler> {
            None
        }
    }

    #[test]
    fn test_handler_kinds() {
        assert_eq!(hello.into_route_handler().kind(), HandlerKind::Function);

        let dispatch = action(DispatchTarget::instantiable::<Greeter>(), "index");
        assert_eq!(dispatch.into_route_handler().kind(), HandlerKind::Controller);
        assert_eq!(HandlerKind::Controller.to_string(), "controller");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("my_app::controllers::UserController"), "UserController");
        assert_eq!(short_type_name("Plain"), "Plain");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
    }
}
