//! Synthetic lifecycle driver.
//!
//! Replays the legacy state transitions for a response obtained from a
//! [`Producer`]:
//!
//! ```text
//! success: OPENED  readystatechange
//!          (await producer)
//!          HEADERS_RECEIVED  loadstart
//!          (buffer body)
//!          DONE  load, readystatechange, loadend
//!
//! failure: DONE  error, readystatechange
//! ```
//!
//! `LOADING` is never entered and the failure path emits no `loadend`.

use crate::errors::HookError;
use crate::hook::intercept::HookedRequest;
use crate::hook::registry::Producer;
use crate::hook::state::PatchedState;
use crate::net::ResponseDescriptor;
use crate::xhr::{ReadyState, RequestObject, XhrEvent};
use log::{debug, error};

/// Commits `request` to the synthetic path and spawns the rest of the lifecycle.
///
/// The `OPENED` transition happens before this returns. A producer that never
/// resolves leaves the request at `OPENED`.
pub(crate) fn start(request: &HookedRequest, producer: Producer) -> Result<(), HookError> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| HookError::NoRuntime)?;

    transition(request, ReadyState::Opened, |_| {});
    request.dispatch(XhrEvent::ReadyStateChange);

    runtime.spawn(run(request.clone(), producer));
    Ok(())
}

async fn run(request: HookedRequest, producer: Producer) {
    let resp = match producer.produce().await {
        Ok(resp) => resp,
        Err(e) => return fail(&request, e),
    };

    if let Err(e) = complete(&request, resp).await {
        fail(&request, e);
    }
}

async fn complete(request: &HookedRequest, resp: ResponseDescriptor) -> anyhow::Result<()> {
    let ResponseDescriptor {
        url,
        status,
        status_text,
        body,
        ..
    } = resp;

    transition(request, ReadyState::HeadersReceived, |s| {
        s.status.set(status);
        s.status_text.set(status_text);
    });
    request.dispatch(XhrEvent::LoadStart);

    let bytes = body.into_bytes().await?;
    debug!("Request[{}]: synthetic response {} with {} bytes", request.id(), status, bytes.len());

    transition(request, ReadyState::Done, |s| {
        s.response.set(bytes);
        s.response_url.set(url.to_string());
    });
    request.dispatch(XhrEvent::Load);
    request.dispatch(XhrEvent::ReadyStateChange);
    request.dispatch(XhrEvent::LoadEnd);

    Ok(())
}

fn fail(request: &HookedRequest, e: anyhow::Error) {
    error!("Request[{}]: producer failed: {:#}", request.id(), e);

    transition(request, ReadyState::Done, |_| {});
    request.dispatch(XhrEvent::Error);
    request.dispatch(XhrEvent::ReadyStateChange);
}

fn transition(request: &HookedRequest, ready_state: ReadyState, f: impl FnOnce(&mut PatchedState)) {
    request.state().update(|s| {
        f(s);
        s.ready_state.set(ready_state);
    });
}
