//! Shared market-data types for candlestream services

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{Px, Qty, Ts};
