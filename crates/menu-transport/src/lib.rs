//! HTTP client for the menu extraction job API.

mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use http::HttpJobTransport;
pub use menu_types::{JobTransport, PollOutcome, StartOutcome, TransportError};

#[cfg(feature = "test-util")]
pub use mock::MockJobTransport;
