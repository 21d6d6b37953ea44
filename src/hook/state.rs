//! Per-request override state.

use crate::xhr::ReadyState;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

/// An observable field's source of truth.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Field<T> {
    /// Defer to the real object's value
    #[default]
    Inherit,
    /// Synthetic value, authoritative from now on
    Override(T),
}

impl<T> Field<T> {
    pub fn set(&mut self, value: T) {
        *self = Field::Override(value);
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Field::Override(_))
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Inherit => Field::Inherit,
            Field::Override(v) => Field::Override(v),
        }
    }

    /// The override when set, otherwise whatever `real` returns.
    pub fn resolve(self, real: impl FnOnce() -> T) -> T {
        match self {
            Field::Inherit => real(),
            Field::Override(v) => v,
        }
    }
}

/// Captured call metadata and synthetic field values of one request object.
#[derive(Clone, Debug, Default)]
pub struct PatchedState {
    pub method: Option<String>,
    pub url: Option<String>,
    pub headers: HashMap<String, String>,
    pub ready_state: Field<ReadyState>,
    pub status: Field<u16>,
    pub status_text: Field<String>,
    pub response: Field<Vec<u8>>,
    pub response_url: Field<String>,
}

impl PatchedState {
    /// Whether the synthetic path has finished with this request
    pub fn is_sealed(&self) -> bool {
        self.ready_state == Field::Override(ReadyState::Done)
    }
}

/// Side table holding a request object's [`PatchedState`].
///
/// The state is created on first write. Reads before that see nothing,
/// which makes every field inherit. Once the synthetic path has driven the
/// state to `Done` it is sealed and further updates are dropped.
#[derive(Debug, Default)]
pub struct StateStore {
    slot: Mutex<Option<PatchedState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads from the state without creating it. `None` when it was never written.
    pub fn read<R>(&self, f: impl FnOnce(&PatchedState) -> R) -> Option<R> {
        self.slot.lock().as_ref().map(f)
    }

    /// Applies `f`, creating the state if needed. Returns false when the state is sealed.
    pub fn update(&self, f: impl FnOnce(&mut PatchedState)) -> bool {
        let mut slot = self.slot.lock();
        let state = slot.get_or_insert_with(PatchedState::default);
        if state.is_sealed() {
            debug!("Patched state is sealed, ignoring update");
            return false;
        }
        f(state);
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn is_sealed(&self) -> bool {
        self.read(PatchedState::is_sealed).unwrap_or(false)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Option<PatchedState> {
        self.read(PatchedState::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_resolves_to_override_or_real() {
        let mut status: Field<u16> = Field::default();
        assert_eq!(status.clone().resolve(|| 404), 404);
        assert!(!status.is_set());

        status.set(200);
        assert_eq!(status.clone().resolve(|| 404), 200);
        assert_eq!(status.as_ref(), Field::Override(&200));
    }

    #[test]
    fn store_is_created_lazily() {
        let store = StateStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.read(|s| s.status.clone()), None);

        store.update(|s| s.method = Some("GET".into()));
        assert!(store.is_initialized());
        assert_eq!(store.read(|s| s.method.clone()), Some(Some("GET".into())));
        assert_eq!(store.read(|s| s.status.clone()), Some(Field::Inherit));
    }

    #[test]
    fn sealed_state_refuses_updates() {
        let store = StateStore::new();
        assert!(store.update(|s| {
            s.status.set(200);
            s.ready_state.set(ReadyState::Done);
        }));
        assert!(store.is_sealed());

        assert!(!store.update(|s| s.status.set(500)));
        assert!(!store.update(|s| {
            s.headers.insert("a".into(), "b".into());
        }));
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.status, Field::Override(200));
        assert!(snap.headers.is_empty());
    }

    #[test]
    fn non_terminal_override_does_not_seal() {
        let store = StateStore::new();
        store.update(|s| s.ready_state.set(ReadyState::HeadersReceived));
        assert!(!store.is_sealed());
        assert!(store.update(|s| s.status.set(204)));
    }
}
