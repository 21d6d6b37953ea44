//! Named, insertion-ordered interceptors.

use crate::net::{RequestDescriptor, ResponseDescriptor};
use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// Deferred, single-use operation yielding the synthetic response.
///
/// Returned by an interceptor to claim a call. Nothing runs until the
/// synthetic lifecycle driver calls [`Producer::produce`].
pub struct Producer {
    run: Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<ResponseDescriptor>> + Send>,
}

impl Producer {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<ResponseDescriptor>> + Send + 'static,
    {
        Self {
            run: Box::new(move || f().boxed()),
        }
    }

    /// Runs the producer. Consumes it, so it can only run once.
    pub async fn produce(self) -> anyhow::Result<ResponseDescriptor> {
        (self.run)().await
    }
}

impl Debug for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}

/// Decides whether to take over a call.
///
/// Returning `None` declines and lets the next interceptor try. Interceptors
/// are consulted synchronously, only the returned [`Producer`] is async.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, request: &RequestDescriptor) -> Option<Producer>;
}

impl<F> Interceptor for F
where
    F: Fn(&RequestDescriptor) -> Option<Producer> + Send + Sync,
{
    fn intercept(&self, request: &RequestDescriptor) -> Option<Producer> {
        self(request)
    }
}

lazy_static! {
    static ref GLOBAL: Arc<InterceptorRegistry> = Arc::new(InterceptorRegistry::new());
}

/// Insertion-ordered mapping from name to interceptor.
///
/// Re-registering a name replaces the interceptor but keeps its original
/// position. [`resolve`](Self::resolve) works on a snapshot taken when it
/// starts, so registrations made while it runs only affect later calls.
#[derive(Default)]
pub struct InterceptorRegistry {
    hooks: RwLock<IndexMap<String, Arc<dyn Interceptor>>>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by [`insert_hook`](crate::hook::insert_hook).
    pub fn global() -> Arc<InterceptorRegistry> {
        GLOBAL.clone()
    }

    /// Inserts or replaces the interceptor under `name`.
    pub fn register(&self, name: impl Into<String>, interceptor: impl Interceptor + 'static) {
        let name = name.into();
        let mut hooks = self.hooks.write();
        if hooks.contains_key(&name) {
            warn!("Hook with name \"{name}\" already exists, replacing it.");
        } else {
            info!("Inserting hook \"{name}\"");
        }
        hooks.insert(name, Arc::new(interceptor));
    }

    /// [`register`](Self::register) for plain closures.
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&RequestDescriptor) -> Option<Producer> + Send + Sync + 'static,
    {
        self.register(name, f);
    }

    /// Removes the interceptor under `name`. Returns false when there was none.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.hooks.write().shift_remove(name).is_some();
        if removed {
            info!("Removed hook \"{name}\"");
        }
        removed
    }

    /// Registered names in consultation order
    pub fn names(&self) -> Vec<String> {
        self.hooks.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers `request` to each interceptor in order and returns the first
    /// producer together with the name of the interceptor that supplied it.
    /// Interceptors after the first acceptor are not consulted.
    pub fn resolve(&self, request: &RequestDescriptor) -> Option<(String, Producer)> {
        let snapshot: Vec<(String, Arc<dyn Interceptor>)> = self
            .hooks
            .read()
            .iter()
            .map(|(name, hook)| (name.clone(), hook.clone()))
            .collect();

        for (name, hook) in snapshot {
            debug!("Calling hook \"{name}\"");
            match hook.intercept(request) {
                Some(producer) => {
                    debug!("Hook \"{name}\" is overriding the request.");
                    return Some((name, producer));
                }
                None => debug!("Hook \"{name}\" did not return a response."),
            }
        }

        debug!("No hooks returned a response, proceeding with original send.");
        None
    }
}
