//! Per-request context handed to resolved handlers.
//!
//! # Responsibilities
//! - Carry the request, a response writer and the continuation
//! - Expose path parameters of the registered pattern
//! - Parse JSON and urlencoded form request bodies under a size cap
//!
//! # Design Decisions
//! - The response writer is consumed when a body is sent, so a handler
//!   produces exactly one response
//! - The continuation only forwards errors; status and body of error
//!   responses belong to the error pipeline

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Form, FromRequest};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ErrorPipeline, HandlerError};
use crate::routing::path::extract_params;

/// Default cap for bodies read through [`Context`] helpers.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Request extension overriding [`DEFAULT_BODY_LIMIT`]; set by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

/// Context value passed to every resolved handler.
pub struct Context {
    /// Incoming request, untouched by the adapter.
    pub request: Request<Body>,
    /// Response under construction.
    pub response: ResponseWriter,
    /// Error continuation into the host's error pipeline.
    pub next: Continuation,
    pattern: Arc<str>,
}

impl Context {
    pub(crate) fn new(request: Request<Body>, next: Continuation, pattern: Arc<str>) -> Self {
        Self {
            request,
            response: ResponseWriter::default(),
            next,
            pattern,
        }
    }

    /// Registered route pattern this request matched.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Named path parameter (`:id` or `{id}` in the pattern).
    pub fn param(&self, name: &str) -> Option<String> {
        extract_params(&self.pattern, self.request.uri().path())?
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.request.uri().query()
    }

    /// Body size cap in effect for this request.
    pub fn body_limit(&self) -> usize {
        self.request
            .extensions()
            .get::<BodyLimit>()
            .map_or(DEFAULT_BODY_LIMIT, |limit| limit.0)
    }

    /// Take the raw request body, failing with 413 past [`Self::body_limit`].
    ///
    /// The body is consumed; a second call sees an empty body.
    pub async fn body_bytes(&mut self) -> Result<Bytes, HandlerError> {
        let limit = self.body_limit();
        let body = std::mem::take(self.request.body_mut());
        axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| HandlerError::with_status(StatusCode::PAYLOAD_TOO_LARGE, e))
    }

    /// Take and deserialize the JSON request body.
    pub async fn json_body<T: DeserializeOwned>(&mut self) -> Result<T, HandlerError> {
        let bytes = self.body_bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HandlerError::with_status(StatusCode::BAD_REQUEST, e))
    }

    /// Take and deserialize an `application/x-www-form-urlencoded` body.
    ///
    /// Follows axum's `Form` rules: `GET` and `HEAD` read the query string,
    /// other methods require the form content type.
    pub async fn form_body<T: DeserializeOwned>(&mut self) -> Result<T, HandlerError> {
        let bytes = self.body_bytes().await?;

        let mut request = Request::new(Body::from(bytes));
        *request.method_mut() = self.request.method().clone();
        *request.uri_mut() = self.request.uri().clone();
        *request.headers_mut() = self.request.headers().clone();

        let Form(value) = Form::<T>::from_request(request, &())
            .await
            .map_err(|rejection| HandlerError::with_status(rejection.status(), rejection.body_text()))?;
        Ok(value)
    }
}

/// Builder for the handler's response.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseWriter {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send a text or byte body. Defaults to `text/plain` unless a content
    /// type was set.
    pub fn send(self, body: impl Into<Body>) -> Response {
        self.finish(
            body.into(),
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Response, HandlerError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.finish(
            Body::from(bytes),
            HeaderValue::from_static("application/json"),
        ))
    }

    /// Empty body; status defaults to 204 if none was set.
    pub fn no_content(mut self) -> Response {
        if self.status == StatusCode::OK {
            self.status = StatusCode::NO_CONTENT;
        }
        let mut res = Response::new(Body::empty());
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }

    fn finish(mut self, body: Body, content_type: HeaderValue) -> Response {
        self.headers
            .entry(header::CONTENT_TYPE)
            .or_insert(content_type);
        let mut res = Response::new(body);
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

/// Continuation handed to handlers; forwards errors to the host pipeline.
#[derive(Clone, Debug)]
pub struct Continuation {
    pipeline: ErrorPipeline,
}

impl Continuation {
    pub fn new(pipeline: ErrorPipeline) -> Self {
        Self { pipeline }
    }

    /// Forward an error; the pipeline produces the response.
    pub fn error(&self, error: impl Into<HandlerError>) -> Response {
        self.pipeline.handle(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn context(uri: &str, pattern: &str, body: Body) -> Context {
        let request = Request::builder().uri(uri).body(body).unwrap();
        Context::new(request, Continuation::new(ErrorPipeline::default()), pattern.into())
    }

    #[test]
    fn test_params_and_query() {
        let ctx = context("/users/7?expand=posts", "/users/:id", Body::empty());
        assert_eq!(ctx.param("id").as_deref(), Some("7"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.query(), Some("expand=posts"));
        assert_eq!(ctx.pattern(), "/users/:id");
    }

    #[test]
    fn test_writer_defaults() {
        let res = ResponseWriter::default().send("world");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );

        let res = ResponseWriter::default()
            .status(StatusCode::CREATED)
            .json(&serde_json::json!({ "id": 1 }))
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");

        let res = ResponseWriter::default().no_content();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_json_body() {
        #[derive(Debug, serde::Deserialize)]
        struct Input {
            name: String,
        }

        let mut ctx = context("/users", "/users", Body::from(r#"{"name":"ada"}"#));
        let input: Input = ctx.json_body().await.unwrap();
        assert_eq!(input.name, "ada");

        let mut ctx = context("/users", "/users", Body::from("not json"));
        let err = ctx.json_body::<Input>().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_body_limit_extension() {
        let mut ctx = context("/users", "/users", Body::from(r#"{"name":"ada lovelace"}"#));
        assert_eq!(ctx.body_limit(), DEFAULT_BODY_LIMIT);

        ctx.request.extensions_mut().insert(BodyLimit(4));
        let err = ctx.json_body::<serde_json::Value>().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn test_form_body() {
        #[derive(Debug, serde::Deserialize)]
        struct Login {
            user: String,
            remember: bool,
        }

        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("user=ada+lovelace&remember=true"))
            .unwrap();
        let mut ctx = Context::new(
            request,
            Continuation::new(ErrorPipeline::default()),
            "/login".into(),
        );
        let login: Login = ctx.form_body().await.unwrap();
        assert_eq!(login.user, "ada lovelace");
        assert!(login.remember);

        // Wrong content type is rejected with axum's status.
        let mut ctx = context("/login", "/login", Body::from("user=ada"));
        *ctx.request.method_mut() = axum::http::Method::POST;
        let err = ctx.form_body::<Login>().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNSUPPORTED_MEDIA_TYPE));
    }

    #[test]
    fn test_continuation_uses_pipeline() {
        let next = Continuation::new(ErrorPipeline::new(|_| {
            (StatusCode::IM_A_TEAPOT, "custom").into_response()
        }));
        let res = next.error(HandlerError::new("boom"));
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
    }
}
