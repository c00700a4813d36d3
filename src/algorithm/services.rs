use super::{AlgorithmError, AlgorithmResult};
use ahash::RandomState;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A typed key under which a shared service is registered.
///
/// Tokens are `const`-constructible so they can live in statics; the
/// factory runs the first time an unregistered token is resolved, and may
/// decline by returning `None`.
pub struct ServiceToken<T> {
    name: &'static str,
    factory: fn() -> Option<Rc<T>>,
}

impl<T> ServiceToken<T> {
    pub const fn new(name: &'static str, factory: fn() -> Option<Rc<T>>) -> Self {
        Self { name, factory }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Per-host cache of shared service instances, keyed by token.
///
/// Algorithms constructed over the same registry resolve the same
/// instances, which is how a parent computation shares its cancel flag
/// with a child one.
pub struct ServiceRegistry {
    services: RefCell<HashMap<(TypeId, &'static str), Rc<dyn Any>, RandomState>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: RefCell::new(HashMap::with_hasher(RandomState::new())),
        }
    }

    /// Pre-registers an instance for `token`, replacing any cached one.
    pub fn register<T: 'static>(&self, token: &ServiceToken<T>, service: Rc<T>) {
        self.services
            .borrow_mut()
            .insert((TypeId::of::<T>(), token.name), service);
    }

    /// The instance for `token`, building and caching one via the token's
    /// factory on first resolution.
    pub fn resolve<T: 'static>(&self, token: &ServiceToken<T>) -> AlgorithmResult<Rc<T>> {
        self.try_resolve(token)
            .ok_or(AlgorithmError::ServiceNotFound { name: token.name })
    }

    pub fn try_resolve<T: 'static>(&self, token: &ServiceToken<T>) -> Option<Rc<T>> {
        let key = (TypeId::of::<T>(), token.name);
        if let Some(cached) = self.services.borrow().get(&key) {
            return Rc::clone(cached).downcast::<T>().ok();
        }
        let created = (token.factory)()?;
        self.services
            .borrow_mut()
            .insert(key, Rc::clone(&created) as Rc<dyn Any>);
        Some(created)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
