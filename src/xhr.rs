//! The legacy request object contract.
//!
//! A request object is a long-lived, stateful handle: callers `open()` it,
//! set headers, `send()` it and then observe progress through polled fields
//! ([`RequestObject::ready_state`], [`RequestObject::status`], ...) and
//! notifications ([`XhrEvent`]) instead of awaiting a single result.
//!
//! - [`RequestObject`] is the capability every request object implements.
//! - [`RequestFactory`] stands in for the request object's type: it mints
//!   objects and declares which observable fields they expose getters for.
//! - [`StandardRequest`] is the real object, driving an exchange over a
//!   [`Fetcher`](crate::net::Fetcher).

mod event;
mod object;
mod ready_state;
mod standard;

pub use event::{listener, EventListener, EventTarget, XhrEvent};
pub use object::{Accessors, ObservableField, RequestFactory, RequestId, RequestObject};
pub use ready_state::ReadyState;
pub use standard::{StandardRequest, StandardRequestFactory};
