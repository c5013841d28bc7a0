use crate::math::{convert_domain, convert_or_zero};
use crate::model::TimeRange;

/// Linear mapping between the visible time range and the canvas's CSS width.
///
/// Built fresh from the current range and surface width whenever it is
/// needed; it is never cached across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub range: TimeRange,
    /// CSS pixel width (backing width divided by device pixel ratio).
    pub width: f64,
}

impl TimeScale {
    pub fn new(range: TimeRange, width: f64) -> Self {
        Self { range, width }
    }

    /// Time to CSS x. Degenerate ranges map to `0.0`.
    pub fn time_to_pixel(&self, t: f64) -> f64 {
        convert_or_zero(t, self.range.start, self.range.end, 0.0, self.width)
    }

    /// CSS x to time. A zero-width surface maps to `0.0`.
    pub fn pixel_to_time(&self, px: f64) -> f64 {
        convert_or_zero(px, 0.0, self.width, self.range.start, self.range.end)
    }

    /// Duration covered by `px` CSS pixels (a width, not a position).
    pub fn width_to_duration(&self, px: f64) -> f64 {
        self.pixel_to_time(px) - self.range.start
    }

    /// Map a time through a non-linear ratio warp, e.g. for fisheye rulers.
    pub fn time_to_pixel_warped(&self, t: f64, warp: impl Fn(f64) -> f64) -> f64 {
        let v = convert_domain(t, self.range.start, self.range.end, 0.0, self.width, warp);
        if v.is_finite() { v } else { 0.0 }
    }
}
