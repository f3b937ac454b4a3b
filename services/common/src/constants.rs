//! Shared numeric and time constants

// Fixed-point arithmetic (4 decimal places)
/// Fixed-point scale factor
pub const FIXED_POINT_SCALE: i64 = 10_000;
pub const FIXED_POINT_SCALE_F64: f64 = 10_000.0;

// Time constants
pub const NANOS_PER_SEC: u64 = 1_000_000_000;
pub const NANOS_PER_MILLI: u64 = 1_000_000;
pub const SECS_PER_MIN: u64 = 60;
pub const SECS_PER_HOUR: u64 = 3600;
pub const SECS_PER_DAY: u64 = 86_400;
