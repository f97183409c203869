//! Prefetch-and-poll coordinator for restaurant menu analyses.
//!
//! The coordinator starts a long-running extraction job for the restaurant the user is
//! focused on, polls it in the background, and keeps the result in memory. Work for a
//! restaurant the user has moved away from is disowned and never written back.

mod config;
mod coordinator;
mod error;
mod store;
mod worker;

pub use config::{
    PrefetchConfig, DEFAULT_ITEM_LIMIT, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT,
};
pub use coordinator::PrefetchCoordinator;
pub use error::{ConfigError, PrefetchError};
pub use menu_types::{JobTransport, MenuItem, PrefetchEntry, PrefetchStatus};
pub use store::PrefetchStore;
