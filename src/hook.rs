//! Request interception and synthetic-response emulation.
//!
//! Callers obtain request objects from a hooked [`RequestFactory`]. Each
//! object is a [`HookedRequest`] decorating the real one:
//!
//! 1. `open` / `set_request_header` are recorded into the object's
//!    [`PatchedState`] and passed through unchanged.
//! 2. `send` builds a [`RequestDescriptor`](crate::net::RequestDescriptor)
//!    and asks the [`InterceptorRegistry`] for a [`Producer`].
//! 3. Without a producer the real `send` runs untouched. With one, the real
//!    object is never sent: the synthetic lifecycle driver replays the
//!    legacy state transitions and notifications from the produced response.
//! 4. Getters return the synthetic value once it is set, the real value otherwise.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gosub_request_hook::config::HookConfig;
//! use gosub_request_hook::hook::{HookedFactory, InterceptorRegistry, Producer};
//! use gosub_request_hook::net::{HttpFetcher, RequestDescriptor, ResponseDescriptor};
//! use gosub_request_hook::xhr::{RequestFactory, StandardRequestFactory};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HookConfig::default();
//! let fetcher = Arc::new(HttpFetcher::new(&config.user_agent)?);
//! let registry = Arc::new(InterceptorRegistry::new());
//!
//! registry.register_fn("hello", |req: &RequestDescriptor| {
//!     let url = req.url.clone();
//!     (req.url.path() == "/hello").then(|| {
//!         Producer::new(move || async move { Ok(ResponseDescriptor::new(url, 200, b"hi".to_vec())) })
//!     })
//! });
//!
//! let factory = HookedFactory::install(
//!     Arc::new(StandardRequestFactory::new(fetcher, config.base_url.clone())),
//!     registry,
//!     &config,
//! )?;
//! let request = factory.create();
//! request.open("GET", "/hello")?;
//! # Ok(()) }
//! ```

mod driver;
mod install;
mod intercept;
mod overrides;
mod registry;
mod state;

pub use install::{insert_hook, HookedFactory};
pub use intercept::HookedRequest;
pub use registry::{Interceptor, InterceptorRegistry, Producer};
pub use state::{Field, PatchedState, StateStore};
