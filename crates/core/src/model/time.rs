use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Milliseconds since the Unix epoch.
pub type Timestamp = f64;

pub const MILLISECOND: f64 = 1.0;
pub const SECOND: f64 = 1_000.0;
pub const MINUTE: f64 = 60.0 * SECOND;
pub const HOUR: f64 = 60.0 * MINUTE;
pub const DAY: f64 = 24.0 * HOUR;
pub const WEEK: f64 = 7.0 * DAY;
pub const MONTH: f64 = 30.0 * DAY;
pub const YEAR: f64 = 365.0 * DAY;

/// The visible time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Build a range, rejecting non-finite bounds and `end < start`.
    pub fn checked(start: Timestamp, end: Timestamp) -> Result<Self> {
        let range = Self::new(start, end);
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.end < self.start {
            return Err(TimelineError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        t >= self.start && t <= self.end
    }

    /// Shift both bounds by `delta`.
    pub fn shifted(&self, delta: f64) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_rejects_inverted_and_nan() {
        assert!(TimeRange::checked(0.0, 10.0).is_ok());
        assert!(TimeRange::checked(5.0, 5.0).is_ok());
        assert!(TimeRange::checked(10.0, 0.0).is_err());
        assert!(TimeRange::checked(f64::NAN, 0.0).is_err());
        assert!(TimeRange::checked(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn duration_and_shift() {
        let r = TimeRange::new(100.0, 400.0);
        assert_eq!(r.duration(), 300.0);
        assert_eq!(r.shifted(-50.0), TimeRange::new(50.0, 350.0));
        assert!(r.contains(400.0));
        assert!(!r.contains(401.0));
    }
}
