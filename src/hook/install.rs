use crate::config::HookConfig;
use crate::errors::HookError;
use crate::hook::intercept::HookedRequest;
use crate::hook::overrides;
use crate::hook::registry::{Interceptor, InterceptorRegistry};
use crate::xhr::{Accessors, RequestFactory, RequestObject};
use log::{info, warn};
use std::sync::Arc;
use url::Url;

/// Request factory whose objects are [`HookedRequest`]s.
///
/// This is the only place hooks get attached: callers that create their
/// request objects through the installed factory get interception, everyone
/// else keeps the plain objects.
pub struct HookedFactory {
    inner: Arc<dyn RequestFactory>,
    registry: Arc<InterceptorRegistry>,
    base_url: Url,
}

impl HookedFactory {
    /// Installs the hook layer on top of `inner`.
    ///
    /// Installing on a factory that is already hooked logs a warning and returns
    /// it unchanged. Fails when the objects `inner` creates lack a getter for one
    /// of the observable fields.
    pub fn install(
        inner: Arc<dyn RequestFactory>,
        registry: Arc<InterceptorRegistry>,
        config: &HookConfig,
    ) -> Result<Arc<dyn RequestFactory>, HookError> {
        if inner.is_hooked() {
            warn!("Request factory is already hooked, skipping.");
            return Ok(inner);
        }

        overrides::verify(inner.accessors())?;

        info!("Hooking request factory ({} hooks registered)", registry.len());
        Ok(Arc::new(HookedFactory {
            inner,
            registry,
            base_url: config.base_url.clone(),
        }))
    }

    /// Installs on top of `inner` using the process-wide registry.
    pub fn install_global(inner: Arc<dyn RequestFactory>, config: &HookConfig) -> Result<Arc<dyn RequestFactory>, HookError> {
        Self::install(inner, InterceptorRegistry::global(), config)
    }

    pub fn registry(&self) -> &Arc<InterceptorRegistry> {
        &self.registry
    }
}

impl RequestFactory for HookedFactory {
    fn create(&self) -> Arc<dyn RequestObject> {
        Arc::new(HookedRequest::wrap(
            self.inner.create(),
            self.registry.clone(),
            self.base_url.clone(),
        ))
    }

    fn accessors(&self) -> Accessors {
        self.inner.accessors()
    }

    fn is_hooked(&self) -> bool {
        true
    }
}

/// Registers `interceptor` under `name` in the process-wide registry.
pub fn insert_hook(name: impl Into<String>, interceptor: impl Interceptor + 'static) {
    InterceptorRegistry::global().register(name, interceptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Producer;
    use crate::net::{NullFetcher, RequestDescriptor, ResponseDescriptor};
    use crate::xhr::{ObservableField, ReadyState, StandardRequestFactory};
    use std::time::Duration;

    fn standard() -> Arc<dyn RequestFactory> {
        Arc::new(StandardRequestFactory::new(
            Arc::new(NullFetcher::with_response(200, b"real".to_vec())),
            HookConfig::default().base_url,
        ))
    }

    struct NoResponseUrl(Arc<dyn RequestFactory>);

    impl RequestFactory for NoResponseUrl {
        fn create(&self) -> Arc<dyn RequestObject> {
            self.0.create()
        }

        fn accessors(&self) -> Accessors {
            Accessors::all() - Accessors::RESPONSE_URL
        }
    }

    #[test]
    fn installing_twice_is_a_no_op() {
        let config = HookConfig::default();
        let registry = Arc::new(InterceptorRegistry::new());

        let once = HookedFactory::install(standard(), registry.clone(), &config).unwrap();
        let twice = HookedFactory::install(once.clone(), registry, &config).unwrap();

        assert!(once.is_hooked());
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn created_objects_are_wrapped_exactly_once() {
        let config = HookConfig::default();
        let factory = HookedFactory::install(standard(), Arc::new(InterceptorRegistry::new()), &config).unwrap();

        let request = factory.create();
        let hooked = request.as_hooked().expect("hooked object");
        assert!(hooked.inner().as_hooked().is_none());
    }

    #[test]
    fn missing_getter_fails_installation() {
        let config = HookConfig::default();
        let result = HookedFactory::install(
            Arc::new(NoResponseUrl(standard())),
            Arc::new(InterceptorRegistry::new()),
            &config,
        );

        assert!(matches!(result, Err(HookError::MissingAccessor(ObservableField::ResponseUrl))));
    }

    #[tokio::test]
    async fn installed_factory_routes_through_its_registry() {
        let config = HookConfig::default();
        let registry = Arc::new(InterceptorRegistry::new());
        registry.register_fn("hello", |req: &RequestDescriptor| {
            let url = req.url.clone();
            (req.url.path() == "/hello")
                .then(|| Producer::new(move || async move { Ok(ResponseDescriptor::new(url, 200, b"hi".to_vec())) }))
        });
        let factory = HookedFactory::install(standard(), registry, &config).unwrap();

        let hello = factory.create();
        let other = factory.create();
        for (req, url) in [(&hello, "/hello"), (&other, "/other")] {
            req.open("GET", url).unwrap();
            req.send().unwrap();
        }
        tokio::time::timeout(Duration::from_secs(5), async {
            while hello.ready_state() != ReadyState::Done || other.ready_state() != ReadyState::Done {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(hello.response_text(), "hi");
        assert_eq!(other.response_text(), "real");
    }

    #[test]
    fn insert_hook_targets_the_global_registry() {
        insert_hook("install-test-hook", |_: &RequestDescriptor| -> Option<Producer> { None });
        assert!(InterceptorRegistry::global().names().contains(&"install-test-hook".to_string()));
        assert!(InterceptorRegistry::global().unregister("install-test-hook"));
    }
}
