use crate::errors::HookError;
use crate::hook::HookedRequest;
use crate::xhr::{EventListener, ReadyState, XhrEvent};
use bitflags::bitflags;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a request object, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stateful request object.
///
/// Mirrors the legacy request client: call-shaping operations (`open`,
/// `set_request_header`, `send`) plus fields that callers poll while the
/// exchange progresses. `send()` only starts the exchange, the outcome is
/// observed through the getters and the dispatched [`XhrEvent`]s.
pub trait RequestObject: Send + Sync {
    /// Identifier used in log output
    fn id(&self) -> RequestId;

    /// Initializes the request. `url` may be relative to the configured base URL.
    fn open(&self, method: &str, url: &str) -> Result<(), HookError>;

    /// Adds a request header. Only valid between `open()` and `send()`.
    fn set_request_header(&self, name: &str, value: &str) -> Result<(), HookError>;

    /// Starts the exchange and returns immediately.
    fn send(&self) -> Result<(), HookError>;

    fn ready_state(&self) -> ReadyState;

    /// Response status, `0` until headers are received or after a network error
    fn status(&self) -> u16;

    fn status_text(&self) -> String;

    /// Response body bytes, `None` until the exchange is done
    fn response(&self) -> Option<Vec<u8>>;

    /// Final URL of the response, empty until known
    fn response_url(&self) -> String;

    /// Response body decoded as text
    fn response_text(&self) -> String;

    fn add_event_listener(&self, event: XhrEvent, listener: EventListener);

    /// Returns the hook decorator when this object already is one.
    fn as_hooked(&self) -> Option<&HookedRequest> {
        None
    }
}

/// Fields of a request object that callers observe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObservableField {
    ReadyState,
    Status,
    StatusText,
    Response,
    ResponseUrl,
    ResponseText,
}

impl ObservableField {
    pub const ALL: [ObservableField; 6] = [
        ObservableField::ReadyState,
        ObservableField::Status,
        ObservableField::StatusText,
        ObservableField::Response,
        ObservableField::ResponseUrl,
        ObservableField::ResponseText,
    ];

    /// Property name as seen by callers of the legacy object
    pub fn name(&self) -> &'static str {
        match self {
            ObservableField::ReadyState => "readyState",
            ObservableField::Status => "status",
            ObservableField::StatusText => "statusText",
            ObservableField::Response => "response",
            ObservableField::ResponseUrl => "responseURL",
            ObservableField::ResponseText => "responseText",
        }
    }

    pub fn accessor(&self) -> Accessors {
        match self {
            ObservableField::ReadyState => Accessors::READY_STATE,
            ObservableField::Status => Accessors::STATUS,
            ObservableField::StatusText => Accessors::STATUS_TEXT,
            ObservableField::Response => Accessors::RESPONSE,
            ObservableField::ResponseUrl => Accessors::RESPONSE_URL,
            ObservableField::ResponseText => Accessors::RESPONSE_TEXT,
        }
    }
}

impl Display for ObservableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

bitflags! {
    /// Set of observable fields a request object type provides getters for.
    pub struct Accessors: u8 {
        const READY_STATE   = 0b0000_0001;
        const STATUS        = 0b0000_0010;
        const STATUS_TEXT   = 0b0000_0100;
        const RESPONSE      = 0b0000_1000;
        const RESPONSE_URL  = 0b0001_0000;
        const RESPONSE_TEXT = 0b0010_0000;
    }
}

/// Creates request objects of one kind; plays the role of the object's type.
pub trait RequestFactory: Send + Sync {
    fn create(&self) -> Arc<dyn RequestObject>;

    /// Observable fields the created objects expose getters for
    fn accessors(&self) -> Accessors {
        Accessors::all()
    }

    /// True once the hook layer has been installed on this factory
    fn is_hooked(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_maps_to_a_distinct_accessor() {
        let combined = ObservableField::ALL
            .iter()
            .fold(Accessors::empty(), |acc, f| acc | f.accessor());
        assert_eq!(combined, Accessors::all());
    }

    #[test]
    fn field_names_follow_the_legacy_properties() {
        assert_eq!(ObservableField::ResponseUrl.to_string(), "responseURL");
        assert_eq!(ObservableField::ReadyState.name(), "readyState");
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
