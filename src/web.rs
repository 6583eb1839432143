//! Sample route table served by the `route-facade` binary.
//!
//! Covers each way of naming a handler: a plain async function, a member
//! callable without an instance, a member of a shared object, and a member
//! of a controller built fresh per route. Routes under `/secure-group` and
//! the `*-middleware` routes require `Authorization: Bearer mysecrettoken`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::error::BoxError;
use crate::handler::middleware::MiddlewareResult;
use crate::handler::{
    action, bind, boxed, BoxHandler, Context, Controller, ControllerFactory, DispatchTarget,
    HandlerResult, Middleware,
};
use crate::routing::RouteBuilder;

/// Token accepted by [`auth`].
pub const DEMO_TOKEN: &str = "mysecrettoken";

/// Header stamped on every response by [`powered_by`].
pub const POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

/// User attached to the request by [`auth`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: u64,
    pub name: String,
}

fn success(ctx: Context, message: &str, result: serde_json::Value) -> HandlerResult {
    ctx.response.json(&json!({
        "status": true,
        "code": 200,
        "message": message,
        "result": result,
    }))
}

pub async fn hello(ctx: Context) -> HandlerResult {
    Ok(ctx.response.send("world"))
}

pub async fn index(ctx: Context) -> HandlerResult {
    Ok(ctx.response.send("Hello World!"))
}

/// Controller whose members need no instance.
pub struct Sample1;

impl Sample1 {
    pub async fn index(ctx: Context) -> HandlerResult {
        success(ctx, "Success: Sample1", json!({}))
    }
}

impl ControllerFactory for Sample1 {
    fn type_name(&self) -> &str {
        "Sample1"
    }

    fn static_action(&self, name: &str) -> Option<BoxHandler> {
        match name {
            "index" => Some(boxed(Sample1::index)),
            _ => None,
        }
    }

    fn instantiate(&self) -> Result<Arc<dyn Controller>, BoxError> {
        Err("Sample1 exposes static members only".into())
    }
}

/// Shared object; members are bound to the one value.
pub struct Sample2 {
    label: &'static str,
}

impl Default for Sample2 {
    fn default() -> Self {
        Self {
            label: "Success: Sample2",
        }
    }
}

impl Sample2 {
    pub async fn index(self: Arc<Self>, ctx: Context) -> HandlerResult {
        success(ctx, self.label, json!({}))
    }
}

impl Controller for Sample2 {
    fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler> {
        match name {
            "index" => Some(bind(self, Self::index)),
            _ => None,
        }
    }
}

/// Built fresh for each route that names one of its members.
#[derive(Default)]
pub struct ProfileController;

impl ProfileController {
    async fn show(self: Arc<Self>, ctx: Context) -> HandlerResult {
        let user = ctx.request.extensions().get::<AuthUser>().cloned();
        match user {
            Some(user) => success(ctx, "Success: Profile", json!(user)),
            None => Err(crate::error::HandlerError::with_status(
                StatusCode::UNAUTHORIZED,
                "no authenticated user",
            )),
        }
    }
}

impl Controller for ProfileController {
    fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler> {
        match name {
            "show" => Some(bind(self, Self::show)),
            _ => None,
        }
    }
}

async fn check_token(mut req: Request<Body>, next: Next) -> MiddlewareResult {
    let expected = format!("Bearer {}", DEMO_TOKEN);
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if presented != Some(expected.as_str()) {
        let body = json!({
            "status": false,
            "code": 401,
            "message": "Unauthorized: Invalid or missing token",
        });
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    }

    req.extensions_mut().insert(AuthUser {
        id: 1,
        name: "John Doe".to_string(),
    });
    Ok(next.run(req).await)
}

async fn stamp(req: Request<Body>, next: Next) -> MiddlewareResult {
    let mut res = next.run(req).await;
    res.headers_mut()
        .insert(POWERED_BY, HeaderValue::from_static("route-facade"));
    Ok(res)
}

/// Bearer token check; attaches [`AuthUser`] on success.
pub fn auth() -> Middleware {
    Middleware::from_fn(check_token).named("auth")
}

pub fn powered_by() -> Middleware {
    Middleware::from_fn(stamp).named("powered_by")
}

/// Register the sample table onto `routes`.
pub fn register(routes: &mut RouteBuilder) {
    let sample1 = DispatchTarget::factory(Sample1);
    let sample2 = DispatchTarget::shared(Sample2::default());
    let profile = DispatchTarget::instantiable::<ProfileController>();

    routes.middleware([powered_by()], |routes| {
        routes.get("/", index);
        routes.get("/hello", hello);

        routes.get("/sample1.0", Sample1::index);
        routes.get("/sample1.1", action(sample1.clone(), "index"));
        routes.get("/sample2.1", action(sample2.clone(), "index"));
        routes
            .get("/sample-middleware", action(sample1.clone(), "index"))
            .middleware(auth());
        routes
            .get("/profile", action(profile.clone(), "show"))
            .middleware(auth());

        routes.group("/group", |routes| {
            routes.get("/sample1.0", Sample1::index);
            routes.get("/sample1.1", action(sample1.clone(), "index"));
            routes.get("/sample2.1", action(sample2.clone(), "index"));
            routes
                .get("/sample-middleware", action(sample1.clone(), "index"))
                .middleware(auth());
        });

        routes.group_with("/secure-group", [auth()], |routes| {
            routes.get("/sample1.0", Sample1::index);
            routes.get("/sample1.1", action(sample1.clone(), "index"));
            routes.get("/sample2.1", action(sample2.clone(), "index"));
            routes.get("/profile", action(profile.clone(), "show"));
        });

        routes.group("/nested", |routes| {
            routes.group("/sample1", |routes| {
                routes.get("/sample1.0", Sample1::index);
                routes.get("/sample1.1", action(sample1.clone(), "index"));
            });
            routes.group("/sample2", |routes| {
                routes.get("/sample2.1", action(sample2.clone(), "index"));
            });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerKind;

    #[test]
    fn test_table_shape() {
        let mut routes = RouteBuilder::new();
        register(&mut routes);

        let summaries: Vec<_> = routes.routes().collect();
        assert_eq!(summaries.len(), 18);
        assert!(summaries.iter().all(|s| s.methods == ["get"]));

        let find = |path: &str| summaries.iter().find(|s| s.path == path).unwrap();
        assert_eq!(find("/").middleware_count, 1);
        assert_eq!(find("/sample1.0").handler_type, HandlerKind::Function);
        assert_eq!(find("/sample1.1").handler_type, HandlerKind::Controller);
        assert_eq!(find("/sample-middleware").middleware_count, 2);
        assert_eq!(find("/secure-group/profile").middleware_count, 2);
        assert_eq!(find("/nested/sample2/sample2.1").middleware_count, 1);

        assert_eq!(routes.current_prefix(), "");
        assert!(routes.current_global_middlewares().is_empty());
    }

    #[test]
    fn test_table_binds() {
        let mut routes = RouteBuilder::new();
        register(&mut routes);

        let mut host = crate::binder::AxumHost::new();
        routes.apply(&mut host).unwrap();
        assert_eq!(host.installed(), 18);
    }
}
