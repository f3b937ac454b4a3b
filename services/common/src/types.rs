//! Core fixed-point market types
//!
//! Prices and quantities are stored as `i64` ticks with 4 decimal places so that
//! candle arithmetic stays deterministic. Floating point appears only at system
//! boundaries (exchange payloads, CSV export).

use crate::constants::{FIXED_POINT_SCALE, FIXED_POINT_SCALE_F64, NANOS_PER_SEC};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clamp a scaled f64 into the i64 tick range.
fn clamp_ticks(scaled: f64) -> i64 {
    const MAX_SAFE: f64 = 9_223_372_036_854_775_807.0;
    const MIN_SAFE: f64 = -9_223_372_036_854_775_808.0;

    if scaled >= MAX_SAFE {
        i64::MAX
    } else if scaled <= MIN_SAFE {
        i64::MIN
    } else {
        #[allow(clippy::cast_possible_truncation)]
        {
            scaled as i64
        }
    }
}

/// Price in fixed-point ticks (1 tick = 0.0001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Px(i64);

impl Px {
    /// Zero price
    pub const ZERO: Self = Self(0);

    /// Convert from f64 at a system boundary. Prefer `from_i64` internally.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(clamp_ticks((value * FIXED_POINT_SCALE_F64).round()))
    }

    /// Create from raw ticks
    #[must_use]
    pub const fn from_i64(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Raw tick value
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Convert to f64 for external output only
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.0 as f64 / FIXED_POINT_SCALE_F64
        }
    }

    /// Signed tick difference, `self - other`
    #[must_use]
    pub const fn diff(self, other: Self) -> i64 {
        self.0 - other.0
    }

    /// True for strictly positive prices
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / FIXED_POINT_SCALE;
        let frac = (self.0 % FIXED_POINT_SCALE).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Quantity in fixed-point units (1 unit = 0.0001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qty(i64);

impl Qty {
    /// Zero quantity
    pub const ZERO: Self = Self(0);

    /// Convert from f64 at a system boundary. Prefer `from_i64` internally.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(clamp_ticks((value * FIXED_POINT_SCALE_F64).round()))
    }

    /// Create from raw units
    #[must_use]
    pub const fn from_i64(units: i64) -> Self {
        Self(units)
    }

    /// Raw unit value
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Convert to f64 for external output only
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.0 as f64 / FIXED_POINT_SCALE_F64
        }
    }

    /// Fixed-point addition
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Signed unit difference, `self - other`
    #[must_use]
    pub const fn diff(self, other: Self) -> i64 {
        self.0 - other.0
    }

    /// True for negative quantities
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / FIXED_POINT_SCALE;
        let frac = (self.0 % FIXED_POINT_SCALE).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Timestamp in nanoseconds since the UNIX epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ts(u64);

impl Ts {
    /// Current wall-clock timestamp
    #[must_use]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| std::time::Duration::from_secs(0));
        Self(duration.as_secs() * NANOS_PER_SEC + u64::from(duration.subsec_nanos()))
    }

    /// Create from nanoseconds since epoch
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create from whole seconds since epoch
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * NANOS_PER_SEC)
    }

    /// Nanoseconds since epoch
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Whole seconds since epoch (truncating)
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0 / NANOS_PER_SEC
    }

    /// Create from a timezone-aware chrono datetime. Pre-epoch times clamp to zero.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        #[allow(clippy::cast_sign_loss)]
        Self(dt.timestamp_nanos_opt().unwrap_or(0).max(0) as u64)
    }

    /// Convert to a chrono datetime in UTC
    #[must_use]
    pub fn to_datetime(&self) -> DateTime<Utc> {
        #[allow(clippy::cast_possible_wrap)]
        DateTime::from_timestamp_nanos(self.0 as i64)
    }
}

impl fmt::Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().to_rfc3339())
    }
}
