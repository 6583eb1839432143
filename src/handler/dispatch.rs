//! Controller dispatch targets.
//!
//! A route can name its handler as `(target, member)` instead of a function.
//! The target is either a shared receiver that exposes the member directly, or
//! a factory that builds a fresh receiver for each route at bind time.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::BoxError;
use crate::handler::{short_type_name, BoxHandler, Context, HandlerResult};

/// A receiver exposing named members.
///
/// # Example
/// ```rust,ignore
/// impl Controller for UserController {
///     fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler> {
///         match name {
///             "index" => Some(bind(self, Self::index)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Controller: Send + Sync + 'static {
    /// Look up `name` and bind it to this receiver.
    fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler>;

    fn type_name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Builds fresh controllers; may also expose members without an instance.
pub trait ControllerFactory: Send + Sync + 'static {
    fn type_name(&self) -> &str;

    /// Members callable without constructing an instance.
    fn static_action(&self, name: &str) -> Option<BoxHandler> {
        let _ = name;
        None
    }

    fn instantiate(&self) -> Result<Arc<dyn Controller>, BoxError>;
}

/// Factory for controllers constructed through [`Default`].
pub struct DefaultFactory<C> {
    _marker: PhantomData<fn() -> C>,
}

impl<C> DefaultFactory<C> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C> Default for DefaultFactory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Controller + Default> ControllerFactory for DefaultFactory<C> {
    fn type_name(&self) -> &str {
        short_type_name(std::any::type_name::<C>())
    }

    fn instantiate(&self) -> Result<Arc<dyn Controller>, BoxError> {
        Ok(Arc::new(C::default()))
    }
}

/// Target half of a dispatch descriptor.
#[derive(Clone)]
pub enum DispatchTarget {
    /// Shared receiver; members are bound to it directly.
    Static(Arc<dyn Controller>),
    /// Factory; a fresh receiver is built when no static member matches.
    Instantiable(Arc<dyn ControllerFactory>),
}

impl DispatchTarget {
    pub fn shared<C: Controller>(controller: C) -> Self {
        DispatchTarget::Static(Arc::new(controller))
    }

    pub fn instantiable<C: Controller + Default>() -> Self {
        DispatchTarget::Instantiable(Arc::new(DefaultFactory::<C>::new()))
    }

    pub fn factory<F: ControllerFactory>(factory: F) -> Self {
        DispatchTarget::Instantiable(Arc::new(factory))
    }

    pub fn type_name(&self) -> &str {
        match self {
            DispatchTarget::Static(c) => c.type_name(),
            DispatchTarget::Instantiable(f) => f.type_name(),
        }
    }
}

impl fmt::Debug for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchTarget::Static(_) => write!(f, "Static({})", self.type_name()),
            DispatchTarget::Instantiable(_) => write!(f, "Instantiable({})", self.type_name()),
        }
    }
}

/// Dispatch descriptor: a target plus the member to invoke on it.
#[derive(Clone, Debug)]
pub struct Dispatch {
    pub target: DispatchTarget,
    pub member: String,
}

/// Build a dispatch descriptor, the counterpart of `[Controller, "member"]`.
pub fn action(target: DispatchTarget, member: impl Into<String>) -> Dispatch {
    Dispatch {
        target,
        member: member.into(),
    }
}

/// Bind a method taking `Arc<C>` as receiver into a [`BoxHandler`].
pub fn bind<C, F, Fut>(receiver: Arc<C>, f: F) -> BoxHandler
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(receiver.clone(), ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct UserController;

    impl UserController {
        async fn index(self: Arc<Self>, ctx: Context) -> HandlerResult {
            Ok(ctx.response.send("users"))
        }
    }

    impl Controller for UserController {
        fn action(self: Arc<Self>, name: &str) -> Option<BoxHandler> {
            match name {
                "index" => Some(bind(self, Self::index)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_type_names() {
        assert_eq!(DispatchTarget::shared(UserController).type_name(), "UserController");
        assert_eq!(
            DispatchTarget::instantiable::<UserController>().type_name(),
            "UserController"
        );
    }

    #[test]
    fn test_action_lookup() {
        let controller = Arc::new(UserController);
        assert!(controller.clone().action("index").is_some());
        assert!(controller.action("destroy").is_none());
    }

    #[test]
    fn test_default_factory_builds() {
        let factory = DefaultFactory::<UserController>::new();
        assert!(factory.static_action("index").is_none());
        let instance = factory.instantiate().unwrap();
        assert!(instance.action("index").is_some());
    }

    #[test]
    fn test_descriptor_debug() {
        let d = action(DispatchTarget::shared(UserController), "index");
        assert_eq!(format!("{:?}", d.target), "Static(UserController)");
        assert_eq!(d.member, "index");
    }
}
