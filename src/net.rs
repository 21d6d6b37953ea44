//! Network layer: request/response descriptors, transports and URL patterns.
//!
//! - [`RequestDescriptor`] is the immutable snapshot handed to interceptors.
//! - [`ResponseDescriptor`] is what an interceptor's producer (or a transport) yields.
//! - [`Fetcher`] performs one exchange. [`HttpFetcher`] talks to the network through
//!   `reqwest`, [`NullFetcher`] answers locally.
//! - [`UrlPattern`] matches request paths against simple glob patterns.

mod fetch;
mod matcher;
mod request;
mod response;

pub use fetch::{FetchError, Fetcher, HttpFetcher, NullFetcher};
pub use matcher::UrlPattern;
pub use request::{parse_method, RequestDescriptor};
pub use response::{ResponseBody, ResponseDescriptor};
