//! Core types and traits for menu prefetching.
//!
//! Wire DTOs match the menu extraction job API's camelCase JSON.

mod dto;
mod prefetch;
mod traits;

pub use dto::*;
pub use prefetch::*;
pub use traits::*;
