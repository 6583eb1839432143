//! Route path normalization and parameter handling.
//!
//! # Responsibilities
//! - Normalize registered paths (single leading slash, no empty segments)
//! - Join scope prefixes with call-site segments
//! - Translate express-style patterns (`:id`, `*`) into axum syntax
//! - Extract parameters from a concrete request path
//! - Detect patterns the host matcher cannot hold side by side
//!
//! # Design Decisions
//! - Pure string functions, no allocation beyond the result
//! - Patterns are stored in the form they were registered; translation to the
//!   host syntax happens at install time

use std::collections::HashMap;

/// Normalize a route path.
///
/// Splits on `/`, drops empty segments and rejoins with a leading slash, so
/// `"//a//b//"` becomes `"/a/b"` and `""` becomes `"/"`. Idempotent.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Join a scope prefix and a call-site segment into a normalized path.
pub fn join(prefix: &str, path: &str) -> String {
    normalize(&format!("{}/{}", prefix, path))
}

/// Rewrite `:name` segments to `{name}` and `*`/`*name` segments to
/// `{*name}`. Segments already in axum syntax pass through.
pub fn to_axum_pattern(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 4);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        if let Some(name) = segment.strip_prefix(':') {
            out.push('{');
            out.push_str(name);
            out.push('}');
        } else if let Some(name) = segment.strip_prefix('*') {
            out.push_str("{*");
            out.push_str(if name.is_empty() { "wildcard" } else { name });
            out.push('}');
        } else {
            out.push_str(segment);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
    Wildcard(&'a str),
}

fn parse_segment(segment: &str) -> Segment<'_> {
    if let Some(name) = segment.strip_prefix(':') {
        return Segment::Param(name);
    }
    if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        return match inner.strip_prefix('*') {
            Some(name) => Segment::Wildcard(name),
            None => Segment::Param(inner),
        };
    }
    if let Some(name) = segment.strip_prefix('*') {
        return Segment::Wildcard(if name.is_empty() { "wildcard" } else { name });
    }
    Segment::Literal(segment)
}

/// Match `path` against a registered `pattern` and collect named parameters.
///
/// Returns `None` when the path does not match the pattern.
pub fn extract_params(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
    let mut values = path.split('/').filter(|s| !s.is_empty());
    let mut params = Vec::new();

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        match parse_segment(segment) {
            Segment::Literal(lit) => {
                if values.next()? != lit {
                    return None;
                }
            }
            Segment::Param(name) => {
                params.push((name.to_string(), values.next()?.to_string()));
            }
            Segment::Wildcard(name) => {
                let rest: Vec<&str> = values.by_ref().collect();
                params.push((name.to_string(), rest.join("/")));
                return Some(params);
            }
        }
    }

    if values.next().is_some() {
        return None;
    }
    Some(params)
}

/// Index of the dynamic segments seen so far, keyed by the shape of the
/// path before them (literals kept, parameter names erased).
///
/// The host matcher accepts `/users/:id` next to `/users/me`, but not next to
/// `/users/:userId` or `/users/*`: at one position there can be a single
/// parameter name, or a single catch-all.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    catch_all: bool,
    path: String,
}

impl ShapeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// First recorded path whose dynamic segments clash with `path`.
    pub fn conflict(&self, path: &str) -> Option<&str> {
        dynamic_slots(path).into_iter().find_map(|(key, name, catch_all)| {
            self.slots
                .get(&key)
                .filter(|slot| slot.name != name || slot.catch_all != catch_all)
                .map(|slot| slot.path.as_str())
        })
    }

    /// Record `path`. Slots already taken keep their first owner.
    pub fn insert(&mut self, path: &str) {
        for (key, name, catch_all) in dynamic_slots(path) {
            self.slots.entry(key).or_insert_with(|| Slot {
                name: name.to_string(),
                catch_all,
                path: path.to_string(),
            });
        }
    }
}

fn dynamic_slots(pattern: &str) -> Vec<(String, &str, bool)> {
    let mut key = String::new();
    let mut slots = Vec::new();
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        match parse_segment(segment) {
            Segment::Literal(lit) => {
                key.push('/');
                key.push_str(lit);
            }
            Segment::Param(name) => {
                slots.push((key.clone(), name, false));
                key.push_str("/{}");
            }
            Segment::Wildcard(name) => {
                slots.push((key.clone(), name, true));
                break;
            }
        }
    }
    slots
}
