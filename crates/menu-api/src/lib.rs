//! REST facade over the prefetch coordinator for the UI layer.

pub mod server;
