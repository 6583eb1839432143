//! Route registration and scope composition.
//!
//! # Responsibilities
//! - Accumulate route entries in registration order
//! - Track the composition scope (prefix, group and global middleware)
//! - Snapshot scope into each entry at registration time
//!
//! # Design Decisions
//! - Explicit builder value instead of process-wide state
//! - Scoped calls restore the previous scope through a drop guard, so the
//!   restore also runs when the callback unwinds
//! - Method tokens are stored raw; validation waits for the bind step

use std::mem;

use crate::binder::{self, HostRouter};
use crate::error::BindError;
use crate::handler::{IntoRouteHandler, Middleware};
use crate::routing::entry::{RouteEntry, RouteSummary};
use crate::routing::method::{HttpMethod, IntoMethods};
use crate::routing::path;

#[derive(Debug, Clone, Default)]
struct Scope {
    prefix: String,
    group_middlewares: Vec<Middleware>,
    global_middlewares: Vec<Middleware>,
}

/// Restores the saved scope when dropped.
struct ScopeGuard<'a> {
    builder: &'a mut RouteBuilder,
    saved: Scope,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.builder.scope = mem::take(&mut self.saved);
    }
}

/// Declarative route table builder.
///
/// # Example
/// ```rust,ignore
/// let mut routes = RouteBuilder::new();
/// routes.get("/", home);
/// routes.middleware([logger], |r| {
///     r.group_with("/api", [auth], |r| {
///         r.get("/users/:id", action(DispatchTarget::instantiable::<Users>(), "show"));
///         r.post("/users", create_user).middleware(validate);
///     });
/// });
/// routes.apply(&mut host)?;
/// ```
#[derive(Debug, Default)]
pub struct RouteBuilder {
    routes: Vec<RouteEntry>,
    scope: Scope,
}

impl RouteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one or more methods at `path`.
    ///
    /// The path is joined to the current prefix and normalized. The entry's
    /// middleware is a snapshot of global, group and `middlewares`, in that
    /// order.
    pub fn add<M>(
        &mut self,
        methods: impl IntoMethods,
        path: &str,
        handler: impl IntoRouteHandler<M>,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> RouteHandle<'_> {
        let full_path = path::join(&self.scope.prefix, path);

        let mut chain = Vec::with_capacity(
            self.scope.global_middlewares.len() + self.scope.group_middlewares.len(),
        );
        chain.extend(self.scope.global_middlewares.iter().cloned());
        chain.extend(self.scope.group_middlewares.iter().cloned());
        chain.extend(middlewares);

        self.routes.push(RouteEntry {
            methods: methods.into_methods(),
            path: full_path,
            handler: handler.into_route_handler(),
            middlewares: chain,
        });

        let index = self.routes.len() - 1;
        RouteHandle {
            entry: &mut self.routes[index],
        }
    }

    pub fn get<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Get, path, handler, [])
    }

    pub fn post<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Post, path, handler, [])
    }

    pub fn put<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Put, path, handler, [])
    }

    pub fn delete<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Delete, path, handler, [])
    }

    pub fn patch<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Patch, path, handler, [])
    }

    pub fn options<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Options, path, handler, [])
    }

    pub fn head<M>(&mut self, path: &str, handler: impl IntoRouteHandler<M>) -> RouteHandle<'_> {
        self.add(HttpMethod::Head, path, handler, [])
    }

    /// Register routes under `prefix`.
    pub fn group<R>(&mut self, prefix: &str, f: impl FnOnce(&mut RouteBuilder) -> R) -> R {
        self.group_with(prefix, [], f)
    }

    /// Register routes under `prefix` with additional group middleware.
    ///
    /// Prefix and group middleware accumulate down nested groups and are
    /// restored when `f` returns or unwinds.
    pub fn group_with<R>(
        &mut self,
        prefix: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
        f: impl FnOnce(&mut RouteBuilder) -> R,
    ) -> R {
        let saved = self.scope.clone();
        self.scope.prefix = path::join(&saved.prefix, prefix);
        self.scope.group_middlewares.extend(middlewares);

        let mut guard = ScopeGuard {
            builder: self,
            saved,
        };
        f(&mut *guard.builder)
    }

    /// Register routes with additional global middleware; the prefix is
    /// left untouched.
    pub fn middleware<R>(
        &mut self,
        middlewares: impl IntoIterator<Item = Middleware>,
        f: impl FnOnce(&mut RouteBuilder) -> R,
    ) -> R {
        let saved = self.scope.clone();
        self.scope.global_middlewares.extend(middlewares);

        let mut guard = ScopeGuard {
            builder: self,
            saved,
        };
        f(&mut *guard.builder)
    }

    /// Summaries of every registered route, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = RouteSummary> + '_ {
        self.routes.iter().map(RouteEntry::summary)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drop every entry and return to the root scope.
    pub fn reset(&mut self) {
        self.routes.clear();
        self.scope = Scope::default();
    }

    pub fn current_prefix(&self) -> &str {
        &self.scope.prefix
    }

    pub fn current_group_middlewares(&self) -> &[Middleware] {
        &self.scope.group_middlewares
    }

    pub fn current_global_middlewares(&self) -> &[Middleware] {
        &self.scope.global_middlewares
    }

    /// Bind the table onto `host`. See [`binder::apply`].
    pub fn apply<H: HostRouter>(&self, host: &mut H) -> Result<(), BindError> {
        binder::apply(self, host)
    }
}

/// Handle to the entry just registered.
#[derive(Debug)]
pub struct RouteHandle<'a> {
    entry: &'a mut RouteEntry,
}

impl RouteHandle<'_> {
    /// Append a call-site middleware after the inherited ones.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.entry.middlewares.push(middleware);
        self
    }

    pub fn middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.entry.middlewares.extend(middlewares);
        self
    }

    pub fn entry(&self) -> &RouteEntry {
        self.entry
    }
}
