//! Compile-time-known time quantities with delta sub-steps.
//!
//! [`TimeValue`] is the payload of constant-time operations and delay
//! wrappers. It tracks wall-clock time in femtoseconds plus a delta
//! sub-step for ordering simultaneous events; a value is "immediate"
//! only when both components are zero.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;

/// A compile-time-known delay with femtosecond resolution.
///
/// Ordered first by femtosecond component, then by delta sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeValue {
    /// Wall-clock delay in femtoseconds.
    pub fs: u64,
    /// Delta sub-step within the same wall-clock instant.
    pub delta: u32,
}

impl TimeValue {
    /// The immediate (zero-time, zero-delta) delay.
    pub const ZERO: TimeValue = TimeValue { fs: 0, delta: 0 };

    /// Creates a delay from both components.
    pub fn new(fs: u64, delta: u32) -> Self {
        Self { fs, delta }
    }

    /// Creates a delay from a femtosecond value with delta 0.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs, delta: 0 }
    }

    /// Creates a delay from a nanosecond value with delta 0.
    pub fn from_ns(ns: u64) -> Self {
        Self {
            fs: ns * FS_PER_NS,
            delta: 0,
        }
    }

    /// Creates a pure delta delay (zero wall-clock time).
    pub fn delta_step(delta: u32) -> Self {
        Self { fs: 0, delta }
    }

    /// Returns `true` if both components are zero, i.e. the delay is
    /// immediate and observing through it is the identity.
    pub fn is_zero(&self) -> bool {
        self.fs == 0 && self.delta == 0
    }
}

impl Default for TimeValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Ord for TimeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fs.cmp(&other.fs).then(self.delta.cmp(&other.delta))
    }
}

impl PartialOrd for TimeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")?;
        } else if fs >= FS_PER_US && fs % FS_PER_US == 0 {
            write!(f, "{} us", fs / FS_PER_US)?;
        } else if fs >= FS_PER_NS && fs % FS_PER_NS == 0 {
            write!(f, "{} ns", fs / FS_PER_NS)?;
        } else if fs >= FS_PER_PS && fs % FS_PER_PS == 0 {
            write!(f, "{} ps", fs / FS_PER_PS)?;
        } else {
            write!(f, "{fs} fs")?;
        }
        if self.delta > 0 {
            write!(f, "+d{}", self.delta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_immediate() {
        assert!(TimeValue::ZERO.is_zero());
        assert!(TimeValue::default().is_zero());
    }

    #[test]
    fn delta_only_is_not_immediate() {
        assert!(!TimeValue::delta_step(1).is_zero());
    }

    #[test]
    fn fs_only_is_not_immediate() {
        assert!(!TimeValue::from_fs(1).is_zero());
    }

    #[test]
    fn from_ns_scales() {
        assert_eq!(TimeValue::from_ns(3).fs, 3_000_000);
    }

    #[test]
    fn ordering_fs_first() {
        let a = TimeValue::new(100, 9);
        let b = TimeValue::new(200, 0);
        assert!(a < b);
    }

    #[test]
    fn ordering_by_delta_within_instant() {
        assert!(TimeValue::delta_step(1) < TimeValue::delta_step(2));
    }

    #[test]
    fn display_units() {
        assert_eq!(TimeValue::ZERO.to_string(), "0 fs");
        assert_eq!(TimeValue::from_ns(10).to_string(), "10 ns");
        assert_eq!(TimeValue::from_fs(500_000).to_string(), "500 ps");
        assert_eq!(TimeValue::from_fs(1_500).to_string(), "1500 fs");
        assert_eq!(TimeValue::from_fs(2 * FS_PER_US).to_string(), "2 us");
    }

    #[test]
    fn display_with_delta() {
        assert_eq!(TimeValue::new(FS_PER_NS, 2).to_string(), "1 ns+d2");
        assert_eq!(TimeValue::delta_step(1).to_string(), "0 fs+d1");
    }

    #[test]
    fn serde_roundtrip() {
        let t = TimeValue::new(42, 7);
        let json = serde_json::to_string(&t).unwrap();
        let back: TimeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
