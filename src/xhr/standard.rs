use crate::errors::HookError;
use crate::net::{parse_method, Fetcher, RequestDescriptor, ResponseDescriptor};
use crate::xhr::{EventListener, EventTarget, ReadyState, RequestFactory, RequestId, RequestObject, XhrEvent};
use http::{HeaderName, HeaderValue, Method};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// The real request object.
///
/// Runs the legacy state machine over a [`Fetcher`]:
/// `open` → `Opened`; `send` → `loadstart`, then asynchronously
/// `HeadersReceived`, `Loading`, `Done` with a `readystatechange` for each,
/// followed by `load` + `loadend`. A failed exchange ends in `Done` with
/// `readystatechange`, `error` and `loadend`, no status and no body.
#[derive(Clone)]
pub struct StandardRequest {
    shared: Arc<Shared>,
}

struct Shared {
    id: RequestId,
    fetcher: Arc<dyn Fetcher>,
    base_url: Url,
    state: Mutex<ExchangeState>,
    events: EventTarget,
}

#[derive(Default)]
struct ExchangeState {
    ready_state: ReadyState,
    method: Option<Method>,
    url: Option<Url>,
    headers: HashMap<String, String>,
    /// Set between `send()` and the end of the exchange
    send_flag: bool,
    status: u16,
    status_text: String,
    response: Option<Vec<u8>>,
    response_url: Option<Url>,
}

impl StandardRequest {
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: Url) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: RequestId::new(),
                fetcher,
                base_url,
                state: Mutex::new(ExchangeState::default()),
                events: EventTarget::new(),
            }),
        }
    }

    fn dispatch(&self, event: XhrEvent) {
        self.shared.events.dispatch(event, self);
    }

    fn set_ready_state(&self, ready_state: ReadyState) {
        self.shared.state.lock().ready_state = ready_state;
        self.dispatch(XhrEvent::ReadyStateChange);
    }

    async fn run(self, request: RequestDescriptor) {
        match self.shared.fetcher.fetch(request).await {
            Ok(resp) => self.receive(resp).await,
            Err(e) => {
                debug!("Request[{}]: network error: {}", self.shared.id, e);
                self.network_error();
            }
        }
    }

    async fn receive(&self, resp: ResponseDescriptor) {
        {
            let mut state = self.shared.state.lock();
            state.status = resp.status;
            state.status_text = resp.status_text;
            state.response_url = Some(resp.url);
        }
        self.set_ready_state(ReadyState::HeadersReceived);
        self.set_ready_state(ReadyState::Loading);

        match resp.body.into_bytes().await {
            Ok(body) => {
                {
                    let mut state = self.shared.state.lock();
                    state.response = Some(body);
                    state.send_flag = false;
                }
                self.set_ready_state(ReadyState::Done);
                self.dispatch(XhrEvent::Load);
                self.dispatch(XhrEvent::LoadEnd);
            }
            Err(e) => {
                debug!("Request[{}]: body could not be read: {}", self.shared.id, e);
                self.network_error();
            }
        }
    }

    fn network_error(&self) {
        {
            let mut state = self.shared.state.lock();
            state.send_flag = false;
            state.status = 0;
            state.status_text.clear();
            state.response = None;
            state.response_url = None;
        }
        self.set_ready_state(ReadyState::Done);
        self.dispatch(XhrEvent::Error);
        self.dispatch(XhrEvent::LoadEnd);
    }
}

impl RequestObject for StandardRequest {
    fn id(&self) -> RequestId {
        self.shared.id
    }

    fn open(&self, method: &str, url: &str) -> Result<(), HookError> {
        let method = parse_method(method)
            .map_err(|_| HookError::InvalidMethod(method.to_string()))?;
        let url = self
            .shared
            .base_url
            .join(url)
            .map_err(|source| HookError::InvalidUrl { url: url.to_string(), source })?;

        {
            let mut state = self.shared.state.lock();
            *state = ExchangeState {
                method: Some(method),
                url: Some(url),
                ..ExchangeState::default()
            };
        }
        self.set_ready_state(ReadyState::Opened);
        Ok(())
    }

    fn set_request_header(&self, name: &str, value: &str) -> Result<(), HookError> {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| HookError::InvalidHeader(name.to_string()))?;
        HeaderValue::from_str(value).map_err(|_| HookError::InvalidHeader(name.to_string()))?;

        let mut state = self.shared.state.lock();
        if state.ready_state != ReadyState::Opened || state.send_flag {
            return Err(HookError::InvalidState("set_request_header() requires an opened, unsent request"));
        }

        // Repeated headers are combined, as the legacy object does
        state
            .headers
            .entry(name.to_string())
            .and_modify(|v| {
                v.push_str(", ");
                v.push_str(value);
            })
            .or_insert_with(|| value.to_string());
        Ok(())
    }

    fn send(&self) -> Result<(), HookError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| HookError::NoRuntime)?;

        let request = {
            let mut state = self.shared.state.lock();
            if state.ready_state != ReadyState::Opened || state.send_flag {
                return Err(HookError::InvalidState("send() requires an opened, unsent request"));
            }
            let (Some(method), Some(url)) = (state.method.clone(), state.url.clone()) else {
                return Err(HookError::InvalidState("send() called before open()"));
            };
            state.send_flag = true;

            RequestDescriptor {
                method,
                url,
                headers: state.headers.clone(),
                body: None,
            }
        };

        debug!("Request[{}]: sending {} {}", self.shared.id, request.method, request.url);
        self.dispatch(XhrEvent::LoadStart);
        runtime.spawn(self.clone().run(request));
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        self.shared.state.lock().ready_state
    }

    fn status(&self) -> u16 {
        self.shared.state.lock().status
    }

    fn status_text(&self) -> String {
        self.shared.state.lock().status_text.clone()
    }

    fn response(&self) -> Option<Vec<u8>> {
        let state = self.shared.state.lock();
        if state.ready_state == ReadyState::Done {
            state.response.clone()
        } else {
            None
        }
    }

    fn response_url(&self) -> String {
        self.shared
            .state
            .lock()
            .response_url
            .as_ref()
            .map(Url::to_string)
            .unwrap_or_default()
    }

    fn response_text(&self) -> String {
        self.shared
            .state
            .lock()
            .response
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    fn add_event_listener(&self, event: XhrEvent, listener: EventListener) {
        self.shared.events.add(event, listener);
    }
}

/// Factory for [`StandardRequest`]s sharing one fetcher.
#[derive(Clone)]
pub struct StandardRequestFactory {
    fetcher: Arc<dyn Fetcher>,
    base_url: Url,
}

impl StandardRequestFactory {
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }
}

impl RequestFactory for StandardRequestFactory {
    fn create(&self) -> Arc<dyn RequestObject> {
        Arc::new(StandardRequest::new(self.fetcher.clone(), self.base_url.clone()))
    }
}
