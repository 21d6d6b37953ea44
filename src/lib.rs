//! Request interception for a legacy, stateful request client.
//!
//! Request objects created through a hooked [`xhr::RequestFactory`] consult a
//! registry of named interceptors on every `send()`. An interceptor either
//! declines, and the real exchange runs untouched, or returns a producer whose
//! response is replayed through the same state transitions and notifications
//! a real exchange would emit. See [`hook`] for the moving parts.

pub mod config;
pub mod errors;
pub mod hook;
pub mod logging;
pub mod net;
pub mod pagination;
pub mod xhr;

pub use config::HookConfig;
pub use errors::HookError;
pub use hook::{insert_hook, HookedFactory, InterceptorRegistry, Producer};
