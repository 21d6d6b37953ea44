use crate::errors::HookError;
use crate::hook::registry::InterceptorRegistry;
use crate::hook::state::StateStore;
use crate::hook::{driver, overrides};
use crate::net::{parse_method, RequestDescriptor};
use crate::xhr::{listener, EventListener, EventTarget, ReadyState, RequestId, RequestObject, XhrEvent};
use log::{debug, warn};
use std::sync::{Arc, Weak};
use url::Url;

/// Decorator that makes a request object interceptable.
///
/// Call-shaping operations are recorded and forwarded to the wrapped object.
/// On `send()` the registered interceptors decide whether the real exchange
/// runs or a synthetic one replaces it. Getters read through the override
/// layer, and notifications from the wrapped object are re-dispatched with
/// this decorator as `this`.
#[derive(Clone)]
pub struct HookedRequest {
    shared: Arc<Shared>,
}

struct Shared {
    inner: Arc<dyn RequestObject>,
    registry: Arc<InterceptorRegistry>,
    base_url: Url,
    state: StateStore,
    events: EventTarget,
}

impl HookedRequest {
    /// Wraps `inner`. An object that already is a `HookedRequest` is returned as is.
    pub fn wrap(inner: Arc<dyn RequestObject>, registry: Arc<InterceptorRegistry>, base_url: Url) -> HookedRequest {
        if let Some(hooked) = inner.as_hooked() {
            warn!("Request[{}] is already hooked, skipping.", inner.id());
            return hooked.clone();
        }

        let shared = Arc::new(Shared {
            inner,
            registry,
            base_url,
            state: StateStore::new(),
            events: EventTarget::new(),
        });

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        for event in XhrEvent::ALL {
            let weak = weak.clone();
            shared.inner.add_event_listener(
                event,
                listener(move |e, _| {
                    if let Some(shared) = weak.upgrade() {
                        HookedRequest { shared }.dispatch(e);
                    }
                }),
            );
        }

        HookedRequest { shared }
    }

    /// The wrapped request object
    pub fn inner(&self) -> &Arc<dyn RequestObject> {
        &self.shared.inner
    }

    /// The per-request override state
    pub fn state(&self) -> &StateStore {
        &self.shared.state
    }

    /// Whether a synthetic exchange has taken over this request
    pub fn is_synthetic(&self) -> bool {
        self.shared.state.read(|s| s.ready_state.is_set()).unwrap_or(false)
    }

    pub(crate) fn dispatch(&self, event: XhrEvent) {
        self.shared.events.dispatch(event, self);
    }

    /// Builds the descriptor handed to interceptors. `None` when method or URL
    /// are missing or unusable, in which case the real object gets the call.
    fn descriptor(&self) -> Option<RequestDescriptor> {
        let state = self.shared.state.snapshot()?;
        let method = parse_method(state.method.as_deref()?).ok()?;
        let url = match self.shared.base_url.join(state.url.as_deref()?) {
            Ok(url) => url,
            Err(e) => {
                debug!("Request[{}]: cannot resolve URL for hooks: {}", self.id(), e);
                return None;
            }
        };

        Some(RequestDescriptor {
            method,
            url,
            headers: state.headers,
            body: None,
        })
    }
}

impl RequestObject for HookedRequest {
    fn id(&self) -> RequestId {
        self.shared.inner.id()
    }

    fn open(&self, method: &str, url: &str) -> Result<(), HookError> {
        debug!("Request[{}]: open called with method: {}, url: {}", self.id(), method, url);
        self.shared.state.update(|s| {
            s.method = Some(method.to_string());
            s.url = Some(url.to_string());
            s.headers.clear();
        });

        self.shared.inner.open(method, url)
    }

    fn set_request_header(&self, name: &str, value: &str) -> Result<(), HookError> {
        self.shared.state.update(|s| {
            s.headers.insert(name.to_string(), value.to_string());
        });

        self.shared.inner.set_request_header(name, value)
    }

    fn send(&self) -> Result<(), HookError> {
        if self.is_synthetic() {
            return Err(HookError::InvalidState("a synthetic exchange already ran on this request"));
        }

        let Some(request) = self.descriptor() else {
            return self.shared.inner.send();
        };
        // Interceptors must not claim a call that cannot be driven
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(HookError::NoRuntime);
        }

        match self.shared.registry.resolve(&request) {
            Some((name, producer)) => {
                debug!("Request[{}]: hook \"{}\" takes over {} {}", self.id(), name, request.method, request.url);
                driver::start(self, producer)?;
                Ok(())
            }
            None => self.shared.inner.send(),
        }
    }

    fn ready_state(&self) -> ReadyState {
        overrides::ready_state(&self.shared.state, self.shared.inner.as_ref())
    }

    fn status(&self) -> u16 {
        overrides::status(&self.shared.state, self.shared.inner.as_ref())
    }

    fn status_text(&self) -> String {
        overrides::status_text(&self.shared.state, self.shared.inner.as_ref())
    }

    fn response(&self) -> Option<Vec<u8>> {
        overrides::response(&self.shared.state, self.shared.inner.as_ref())
    }

    fn response_url(&self) -> String {
        overrides::response_url(&self.shared.state, self.shared.inner.as_ref())
    }

    fn response_text(&self) -> String {
        overrides::response_text(&self.shared.state, self.shared.inner.as_ref())
    }

    fn add_event_listener(&self, event: XhrEvent, listener: EventListener) {
        self.shared.events.add(event, listener);
    }

    fn as_hooked(&self) -> Option<&HookedRequest> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HookConfig;
    use crate::hook::Producer;
    use crate::net::{NullFetcher, ResponseDescriptor};
    use crate::xhr::StandardRequest;
    use http::Method;
    use parking_lot::Mutex;
    use std::time::Duration;

    type Trace = Arc<Mutex<Vec<(XhrEvent, ReadyState, u16)>>>;

    fn base() -> Url {
        HookConfig::default().base_url
    }

    fn standard(fetcher: NullFetcher) -> Arc<dyn RequestObject> {
        Arc::new(StandardRequest::new(Arc::new(fetcher), base()))
    }

    fn trace(req: &dyn RequestObject) -> Trace {
        let trace: Trace = Arc::default();
        for event in XhrEvent::ALL {
            let trace = trace.clone();
            req.add_event_listener(
                event,
                listener(move |e, this| trace.lock().push((e, this.ready_state(), this.status()))),
            );
        }
        trace
    }

    async fn wait_done(req: &dyn RequestObject) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while req.ready_state() != ReadyState::Done {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("request did not finish");
    }

    async fn run(req: &dyn RequestObject, method: &str, url: &str) {
        req.open(method, url).unwrap();
        req.set_request_header("X-Requested-With", "XMLHttpRequest").unwrap();
        req.send().unwrap();
        wait_done(req).await;
    }

    #[tokio::test]
    async fn declined_calls_behave_exactly_like_the_real_object() {
        let plain = standard(NullFetcher::with_response(404, b"nope".to_vec()));
        let plain_trace = trace(plain.as_ref());
        run(plain.as_ref(), "GET", "/missing").await;

        let registry = Arc::new(InterceptorRegistry::new());
        registry.register_fn("decliner", |_| None);
        let hooked = HookedRequest::wrap(standard(NullFetcher::with_response(404, b"nope".to_vec())), registry, base());
        let hooked_trace = trace(&hooked);
        run(&hooked, "GET", "/missing").await;

        assert_eq!(*plain_trace.lock(), *hooked_trace.lock());
        assert_eq!(hooked.status(), 404);
        assert_eq!(hooked.status_text(), "Not Found");
        assert_eq!(hooked.response_text(), "nope");
        assert_eq!(hooked.response_url(), plain.response_url());
        assert!(!hooked.is_synthetic());
    }

    #[tokio::test]
    async fn descriptor_carries_recorded_call_metadata() {
        let seen = Arc::new(Mutex::new(None));
        let registry = Arc::new(InterceptorRegistry::new());
        let s = seen.clone();
        registry.register_fn("spy", move |req| {
            *s.lock() = Some(req.clone());
            None
        });

        let hooked = HookedRequest::wrap(standard(NullFetcher::new()), registry, base());
        hooked.open("GET", "/stale").unwrap();
        hooked.set_request_header("X-Old", "1").unwrap();
        // reopening resets recorded headers
        hooked.open("GET", "/api/x?number=10").unwrap();
        hooked.set_request_header("X-Token", "abc").unwrap();
        hooked.send().unwrap();

        let req = seen.lock().clone().expect("hook consulted");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.as_str(), "http://localhost/api/x?number=10");
        assert_eq!(req.header("X-Token"), Some("abc"));
        assert_eq!(req.header("X-Old"), None);
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn accepted_calls_never_reach_the_real_object() {
        let registry = Arc::new(InterceptorRegistry::new());
        registry.register_fn("mock", |req| {
            let url = req.url.clone();
            Some(Producer::new(move || async move { Ok(ResponseDescriptor::new(url, 200, b"mocked".to_vec())) }))
        });

        let real = standard(NullFetcher::with_response(500, b"real".to_vec()));
        let hooked = HookedRequest::wrap(real.clone(), registry, base());
        let real_trace = trace(real.as_ref());
        run(&hooked, "GET", "/data").await;

        assert_eq!(hooked.response_text(), "mocked");
        assert_eq!(hooked.status(), 200);
        assert!(hooked.is_synthetic());
        // the real object was opened but never sent
        assert_eq!(real.ready_state(), ReadyState::Opened);
        assert_eq!(real.status(), 0);
        assert_eq!(*real_trace.lock(), vec![(XhrEvent::ReadyStateChange, ReadyState::Opened, 0)]);
    }

    #[tokio::test]
    async fn send_without_open_is_left_to_the_real_object() {
        let registry = Arc::new(InterceptorRegistry::new());
        let consulted = Arc::new(Mutex::new(false));
        let c = consulted.clone();
        registry.register_fn("spy", move |_| {
            *c.lock() = true;
            None
        });

        let hooked = HookedRequest::wrap(standard(NullFetcher::new()), registry, base());
        assert!(matches!(hooked.send(), Err(HookError::InvalidState(_))));
        assert!(!*consulted.lock());
    }

    #[test]
    fn interceptors_are_not_consulted_without_a_runtime() {
        let consulted = Arc::new(Mutex::new(0));
        let registry = Arc::new(InterceptorRegistry::new());
        let c = consulted.clone();
        registry.register_fn("claim-all", move |req| {
            *c.lock() += 1;
            let url = req.url.clone();
            Some(Producer::new(move || async move { Ok(ResponseDescriptor::new(url, 200, Vec::new())) }))
        });

        let hooked = HookedRequest::wrap(standard(NullFetcher::new()), registry, base());
        hooked.open("GET", "/data").unwrap();

        assert!(matches!(hooked.send(), Err(HookError::NoRuntime)));
        assert_eq!(*consulted.lock(), 0);
        assert!(!hooked.is_synthetic());
    }

    #[tokio::test]
    async fn lowercase_method_reaches_interceptors_as_get() {
        let seen = Arc::new(Mutex::new(None));
        let registry = Arc::new(InterceptorRegistry::new());
        let s = seen.clone();
        registry.register_fn("spy", move |req| {
            *s.lock() = Some(req.method.clone());
            None
        });

        let hooked = HookedRequest::wrap(standard(NullFetcher::new()), registry, base());
        hooked.open("get", "/x").unwrap();
        hooked.send().unwrap();

        assert_eq!(*seen.lock(), Some(Method::GET));
    }

    #[tokio::test]
    async fn wrapping_twice_returns_the_same_decorator() {
        let registry = Arc::new(InterceptorRegistry::new());
        let hooked = HookedRequest::wrap(standard(NullFetcher::new()), registry.clone(), base());
        let again = HookedRequest::wrap(Arc::new(hooked.clone()), registry, base());

        assert!(Arc::ptr_eq(&hooked.shared, &again.shared));
        assert!(again.inner().as_hooked().is_none());
    }

    #[tokio::test]
    async fn real_notifications_reach_decorator_listeners() {
        let registry = Arc::new(InterceptorRegistry::new());
        let hooked = HookedRequest::wrap(standard(NullFetcher::new()), registry, base());
        let trace = trace(&hooked);

        hooked.open("GET", "/").unwrap();
        assert_eq!(*trace.lock(), vec![(XhrEvent::ReadyStateChange, ReadyState::Opened, 0)]);
    }
}
