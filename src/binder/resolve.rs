//! Handler resolution and method validation.
//!
//! # Resolution Order
//! 1. `Direct` handlers are used as-is
//! 2. `Static` targets: member bound to the shared receiver
//! 3. `Instantiable` targets: static member first, then a fresh instance
//! 4. Anything else is a [`ResolutionError`]

use crate::error::{InvalidMethodError, ResolutionError};
use crate::handler::{BoxHandler, Dispatch, DispatchTarget, RouteHandler};
use crate::routing::{HttpMethod, RouteEntry};

/// Resolve `handler`, registered at `path`, into a single callable.
pub fn resolve(handler: &RouteHandler, path: &str) -> Result<BoxHandler, ResolutionError> {
    match handler {
        RouteHandler::Direct(f) => Ok(f.clone()),
        RouteHandler::Member(dispatch) => resolve_member(dispatch, path),
    }
}

fn resolve_member(dispatch: &Dispatch, path: &str) -> Result<BoxHandler, ResolutionError> {
    let member = dispatch.member.as_str();
    if member.is_empty() {
        return Err(ResolutionError::InvalidDescriptor {
            path: path.to_string(),
            reason: "empty member name",
        });
    }

    let missing = || ResolutionError::MissingMember {
        member: member.to_string(),
        type_name: dispatch.target.type_name().to_string(),
        path: path.to_string(),
    };

    match &dispatch.target {
        DispatchTarget::Static(controller) => controller.clone().action(member).ok_or_else(missing),
        DispatchTarget::Instantiable(factory) => {
            if let Some(handler) = factory.static_action(member) {
                return Ok(handler);
            }

            let instance = factory
                .instantiate()
                .map_err(|source| ResolutionError::Instantiation {
                    type_name: factory.type_name().to_string(),
                    path: path.to_string(),
                    source,
                })?;

            tracing::debug!(controller = factory.type_name(), route = %path, "Instantiated controller");
            instance.action(member).ok_or_else(missing)
        }
    }
}

/// Check every method token of `entry` against the allowed set.
pub fn validate_methods(entry: &RouteEntry) -> Result<Vec<HttpMethod>, InvalidMethodError> {
    entry
        .methods
        .iter()
        .map(|token| {
            token.parse::<HttpMethod>().map_err(|_| InvalidMethodError {
                method: token.clone(),
                path: entry.path.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::handler::{action, bind, Context, Controller, ControllerFactory, HandlerResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Pages;

    impl Pages {
        async fn index(self: Arc<Self>, ctx: Context) -> HandlerResult {
            Ok(ctx.response.send("pages"))
        }
    }

    impl Controller for Pages {
        fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler> {
            match name {
                "index" => Some(bind(self, Self::index)),
                _ => None,
            }
        }
    }

    async fn listing(ctx: Context) -> HandlerResult {
        Ok(ctx.response.send("static listing"))
    }

    /// Exposes `index` statically and `show` per instance.
    struct CountingFactory {
        built: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ControllerFactory for CountingFactory {
        fn type_name(&self) -> &str {
            "Articles"
        }

        fn static_action(&self, name: &str) -> Option<BoxHandler> {
            (name == "index").then(|| crate::handler::boxed(listing))
        }

        fn instantiate(&self) -> Result<Arc<dyn Controller>, BoxError> {
            if self.fail {
                return Err("connection refused".into());
            }
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Instance))
        }
    }

    struct Instance;

    impl Controller for Instance {
        fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler> {
            (name == "show").then(|| bind(self, |_me: Arc<Instance>, ctx: Context| async move {
                Ok::<_, crate::error::HandlerError>(ctx.response.send("instance show"))
            }))
        }
    }

    fn factory(built: &Arc<AtomicUsize>) -> DispatchTarget {
        DispatchTarget::factory(CountingFactory {
            built: built.clone(),
            fail: false,
        })
    }

    fn member(target: DispatchTarget, name: &str) -> RouteHandler {
        RouteHandler::Member(action(target, name))
    }

    #[test]
    fn test_static_target() {
        let handler = member(DispatchTarget::shared(Pages), "index");
        assert!(resolve(&handler, "/pages").is_ok());

        let handler = member(DispatchTarget::shared(Pages), "missing");
        let err = resolve(&handler, "/pages").err().unwrap();
        assert_eq!(
            err.to_string(),
            "method \"missing\" not found in controller \"Pages\" for route /pages"
        );
    }

    #[test]
    fn test_static_member_skips_instantiation() {
        let built = Arc::new(AtomicUsize::new(0));
        assert!(resolve(&member(factory(&built), "index"), "/articles").is_ok());
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_instance_member_builds_fresh_instance() {
        let built = Arc::new(AtomicUsize::new(0));
        assert!(resolve(&member(factory(&built), "show"), "/articles/:id").is_ok());
        assert_eq!(built.load(Ordering::SeqCst), 1);

        assert!(resolve(&member(factory(&built), "show"), "/articles/:id/preview").is_ok());
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_instance_missing_member() {
        let built = Arc::new(AtomicUsize::new(0));
        let err = resolve(&member(factory(&built), "destroy"), "/articles").err().unwrap();
        assert!(matches!(
            err,
            ResolutionError::MissingMember { ref member, ref type_name, ref path }
                if member == "destroy" && type_name == "Articles" && path == "/articles"
        ));
    }

    #[test]
    fn test_instantiation_failure() {
        let target = DispatchTarget::factory(CountingFactory {
            built: Arc::new(AtomicUsize::new(0)),
            fail: true,
        });
        let err = resolve(&member(target, "show"), "/articles").err().unwrap();
        assert!(matches!(err, ResolutionError::Instantiation { .. }));
    }

    #[test]
    fn test_empty_member_is_invalid() {
        let err = resolve(&member(DispatchTarget::shared(Pages), ""), "/pages").err().unwrap();
        assert_eq!(err.to_string(), "invalid handler format for route /pages: empty member name");
    }

    #[test]
    fn test_default_instantiable() {
        let handler = member(DispatchTarget::instantiable::<Pages>(), "index");
        assert!(resolve(&handler, "/").is_ok());
    }

    #[test]
    fn test_validate_methods() {
        let entry = RouteEntry {
            methods: vec!["get".into(), "foo".into()],
            path: "/a".into(),
            handler: RouteHandler::Direct(crate::handler::boxed(listing)),
            middlewares: Vec::new(),
        };
        let err = validate_methods(&entry).unwrap_err();
        assert_eq!(err.method, "foo");
        assert_eq!(err.path, "/a");

        let entry = RouteEntry {
            methods: vec!["get".into(), "head".into()],
            ..entry
        };
        assert_eq!(
            validate_methods(&entry).unwrap(),
            vec![HttpMethod::Get, HttpMethod::Head]
        );
    }
}
