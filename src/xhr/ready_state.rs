use std::fmt::{Display, Formatter};

/// Lifecycle stage of a request object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ReadyState {
    /// Object created, `open()` not called yet
    #[default]
    Unsent = 0,
    /// `open()` called
    Opened = 1,
    /// Status line and headers received
    HeadersReceived = 2,
    /// Body is being received
    Loading = 3,
    /// Exchange finished, successfully or not
    Done = 4,
}

impl ReadyState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<ReadyState> for u8 {
    fn from(state: ReadyState) -> Self {
        state.as_u8()
    }
}

impl TryFrom<u8> for ReadyState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReadyState::Unsent),
            1 => Ok(ReadyState::Opened),
            2 => Ok(ReadyState::HeadersReceived),
            3 => Ok(ReadyState::Loading),
            4 => Ok(ReadyState::Done),
            other => Err(other),
        }
    }
}

impl Display for ReadyState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadyState::Unsent => write!(f, "UNSENT"),
            ReadyState::Opened => write!(f, "OPENED"),
            ReadyState::HeadersReceived => write!(f, "HEADERS_RECEIVED"),
            ReadyState::Loading => write!(f, "LOADING"),
            ReadyState::Done => write!(f, "DONE"),
        }
    }
}
