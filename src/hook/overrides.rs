//! Override-or-default getters for the observable fields.
//!
//! Each getter returns the synthetic value from the [`StateStore`] when one
//! is set, otherwise it asks the real object. No value is ever invented.

use crate::errors::HookError;
use crate::hook::state::{Field, PatchedState, StateStore};
use crate::xhr::{Accessors, ObservableField, ReadyState, RequestObject};

/// Fails on the first observable field the real type has no getter for.
pub(crate) fn verify(accessors: Accessors) -> Result<(), HookError> {
    match ObservableField::ALL
        .into_iter()
        .find(|field| !accessors.contains(field.accessor()))
    {
        Some(missing) => Err(HookError::MissingAccessor(missing)),
        None => Ok(()),
    }
}

fn field<T>(store: &StateStore, pick: impl FnOnce(&PatchedState) -> Field<T>) -> Field<T> {
    store.read(pick).unwrap_or(Field::Inherit)
}

pub(crate) fn ready_state(store: &StateStore, real: &dyn RequestObject) -> ReadyState {
    field(store, |s| s.ready_state.clone()).resolve(|| real.ready_state())
}

pub(crate) fn status(store: &StateStore, real: &dyn RequestObject) -> u16 {
    field(store, |s| s.status.clone()).resolve(|| real.status())
}

pub(crate) fn status_text(store: &StateStore, real: &dyn RequestObject) -> String {
    field(store, |s| s.status_text.clone()).resolve(|| real.status_text())
}

pub(crate) fn response(store: &StateStore, real: &dyn RequestObject) -> Option<Vec<u8>> {
    match field(store, |s| s.response.clone()) {
        Field::Override(bytes) => Some(bytes),
        Field::Inherit => real.response(),
    }
}

pub(crate) fn response_url(store: &StateStore, real: &dyn RequestObject) -> String {
    field(store, |s| s.response_url.clone()).resolve(|| real.response_url())
}

/// UTF-8 decode of the synthetic body; the real decoded text when there is none.
pub(crate) fn response_text(store: &StateStore, real: &dyn RequestObject) -> String {
    match field(store, |s| s.response.clone()) {
        Field::Override(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Field::Inherit => real.response_text(),
    }
}
