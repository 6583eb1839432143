//! HTTP method tokens.
//!
//! Routes store raw lowercase tokens as registered; they are only checked
//! against the allowed set when the table is bound.

use std::fmt;
use std::str::FromStr;

use axum::routing::MethodFilter;
use serde::Serialize;

/// The methods a route may be bound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    /// Canonical lowercase token.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }

    pub fn filter(&self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Options => MethodFilter::OPTIONS,
            HttpMethod::Head => MethodFilter::HEAD,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown method token. The binder turns this into an
/// [`InvalidMethodError`](crate::error::InvalidMethodError) carrying the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Exact match on the lowercase token; `"GET"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Anything that names one or more method tokens at registration time.
pub trait IntoMethods {
    fn into_methods(self) -> Vec<String>;
}

impl IntoMethods for &str {
    fn into_methods(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoMethods for String {
    fn into_methods(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoMethods for HttpMethod {
    fn into_methods(self) -> Vec<String> {
        vec![self.as_str().to_string()]
    }
}

impl<const N: usize> IntoMethods for [&str; N] {
    fn into_methods(self) -> Vec<String> {
        self.iter().map(|m| m.to_string()).collect()
    }
}

impl<const N: usize> IntoMethods for [HttpMethod; N] {
    fn into_methods(self) -> Vec<String> {
        self.iter().map(|m| m.as_str().to_string()).collect()
    }
}

impl IntoMethods for &[&str] {
    fn into_methods(self) -> Vec<String> {
        self.iter().map(|m| m.to_string()).collect()
    }
}

impl IntoMethods for Vec<&str> {
    fn into_methods(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoMethods for Vec<String> {
    fn into_methods(self) -> Vec<String> {
        self
    }
}

impl IntoMethods for Vec<HttpMethod> {
    fn into_methods(self) -> Vec<String> {
        self.iter().map(|m| m.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens() {
        for m in HttpMethod::ALL {
            assert_eq!(m.as_str().parse::<HttpMethod>(), Ok(m));
        }
        assert_eq!("foo".parse::<HttpMethod>(), Err(UnknownMethod("foo".into())));
        assert!("GET".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_into_methods() {
        assert_eq!("get".into_methods(), vec!["get"]);
        assert_eq!(["get", "post"].into_methods(), vec!["get", "post"]);
        assert_eq!(
            vec![HttpMethod::Put, HttpMethod::Patch].into_methods(),
            vec!["put", "patch"]
        );
    }
}
