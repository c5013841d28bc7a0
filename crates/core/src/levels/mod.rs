//! Calendar-aligned mark levels for the grid and the ruler.
//!
//! A level is a row in an ascending table: it applies when the visible
//! duration is at most `domain`, and says where marks start, how they step
//! and how they look. Layers pick the finest level whose marks still fit
//! the available width.

pub mod grid;
pub mod ruler;

use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc,
};

use crate::math::convert_or_zero;
use crate::model::Timestamp;

/// Calendar in which marks are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar at `minutes` east of UTC. Out-of-range offsets fall back to UTC.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        match FixedOffset::east_opt(minutes.saturating_mul(60)) {
            Some(offset) => Self { offset },
            None => {
                log::warn!("calendar: utc offset of {minutes} minutes is out of range, using UTC");
                Self::utc()
            }
        }
    }

    pub fn at(&self, t: Timestamp) -> Option<DateTime<FixedOffset>> {
        if !t.is_finite() {
            return None;
        }
        self.offset.timestamp_millis_opt(t.floor() as i64).single()
    }

    fn local(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.offset.from_local_datetime(&naive).single()
    }
}

pub fn timestamp(dt: &DateTime<FixedOffset>) -> Timestamp {
    dt.timestamp_millis() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    /// Weeks start on Monday.
    Week,
    Month,
    Year,
}

/// "Every `every` units, aligned to multiples of `every`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub unit: TimeUnit,
    pub every: u32,
}

impl Cadence {
    pub const fn new(unit: TimeUnit, every: u32) -> Self {
        Self { unit, every }
    }

    /// The aligned mark at or before `t`.
    pub fn start(&self, calendar: &Calendar, t: Timestamp) -> Option<DateTime<FixedOffset>> {
        let dt = calendar.at(t)?;
        let floored = start_of(calendar, &dt, self.unit)?;
        let extra = match self.unit {
            TimeUnit::Second => floored.second(),
            TimeUnit::Minute => floored.minute(),
            TimeUnit::Hour => floored.hour(),
            TimeUnit::Month => floored.month0(),
            _ => 0,
        } % self.every.max(1);
        add(&floored, -i64::from(extra), self.unit)
    }

    /// The mark after `dt`.
    pub fn step(&self, dt: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        add(dt, i64::from(self.every.max(1)), self.unit)
    }
}

fn start_of(
    calendar: &Calendar,
    dt: &DateTime<FixedOffset>,
    unit: TimeUnit,
) -> Option<DateTime<FixedOffset>> {
    let naive = dt.naive_local();
    let date = naive.date();
    let floored = match unit {
        TimeUnit::Millisecond => return Some(*dt),
        TimeUnit::Second => date.and_hms_opt(naive.hour(), naive.minute(), naive.second())?,
        TimeUnit::Minute => date.and_hms_opt(naive.hour(), naive.minute(), 0)?,
        TimeUnit::Hour => date.and_hms_opt(naive.hour(), 0, 0)?,
        TimeUnit::Day => date.and_hms_opt(0, 0, 0)?,
        TimeUnit::Week => {
            let back = i64::from(date.weekday().num_days_from_monday());
            (date - chrono::Duration::days(back)).and_hms_opt(0, 0, 0)?
        }
        TimeUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.and_hms_opt(0, 0, 0)?,
        TimeUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
    };
    calendar.local(floored)
}

fn add(dt: &DateTime<FixedOffset>, n: i64, unit: TimeUnit) -> Option<DateTime<FixedOffset>> {
    let months = |m: i64| {
        let magnitude = Months::new(u32::try_from(m.unsigned_abs()).ok()?);
        if m >= 0 {
            dt.checked_add_months(magnitude)
        } else {
            dt.checked_sub_months(magnitude)
        }
    };
    match unit {
        TimeUnit::Millisecond => dt.checked_add_signed(chrono::Duration::milliseconds(n)),
        TimeUnit::Second => dt.checked_add_signed(chrono::Duration::seconds(n)),
        TimeUnit::Minute => dt.checked_add_signed(chrono::Duration::minutes(n)),
        TimeUnit::Hour => dt.checked_add_signed(chrono::Duration::hours(n)),
        TimeUnit::Day => dt.checked_add_signed(chrono::Duration::days(n)),
        TimeUnit::Week => dt.checked_add_signed(chrono::Duration::weeks(n)),
        TimeUnit::Month => months(n),
        TimeUnit::Year => months(n.checked_mul(12)?),
    }
}

pub fn is_weekend(dt: &DateTime<FixedOffset>) -> bool {
    matches!(dt.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

/// Width the marks of `cadence` would take over a span of `domain`
/// milliseconds drawn into `width` pixels, at `spacing` pixels per mark.
///
/// Marks are simulated from the epoch; the one at x = 0 is free.
pub fn marks_width(
    cadence: &Cadence,
    calendar: &Calendar,
    domain: f64,
    width: f64,
    spacing: f64,
) -> f64 {
    let mut total = 0.0;
    let mut cursor = calendar.at(0.0);
    while let Some(dt) = cursor {
        let t = timestamp(&dt);
        if t >= domain {
            break;
        }
        if convert_or_zero(t, 0.0, domain, 0.0, width) > 0.0 {
            total += spacing;
        }
        cursor = cadence.step(&dt);
    }
    total
}

/// Common shape of grid and ruler levels.
pub trait Level {
    /// Largest visible duration this level is used for.
    fn domain(&self) -> f64;

    fn cadence(&self) -> &Cadence;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WidthEstimate {
    domain: f64,
    width: f64,
    marks: f64,
}

/// Per-level memo of [`marks_width`], keyed by the domain and width it was
/// computed for.
#[derive(Debug, Default)]
pub struct WidthCache {
    slots: Vec<Option<WidthEstimate>>,
    misses: usize,
}

impl WidthCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_compute(
        &mut self,
        level: usize,
        domain: f64,
        width: f64,
        compute: impl FnOnce() -> f64,
    ) -> f64 {
        if self.slots.len() <= level {
            self.slots.resize(level + 1, None);
        }
        if let Some(hit) = self.slots[level] {
            if hit.domain == domain && hit.width == width {
                return hit.marks;
            }
        }
        self.misses += 1;
        let marks = compute();
        self.slots[level] = Some(WidthEstimate {
            domain,
            width,
            marks,
        });
        marks
    }

    /// Number of estimates computed so far.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

/// Index of the finest level in `levels` that covers `domain` and whose
/// marks fit in `width + buffer`, or the coarsest level when none does.
pub fn select_level<L: Level>(
    levels: &[L],
    cache: &mut WidthCache,
    calendar: &Calendar,
    domain: f64,
    width: f64,
    spacing: f64,
    buffer: f64,
) -> Option<usize> {
    for (i, level) in levels.iter().enumerate() {
        if domain > level.domain() {
            continue;
        }
        let marks = cache.get_or_compute(i, domain, width, || {
            marks_width(level.cadence(), calendar, domain, width, spacing)
        });
        if marks > width + buffer {
            continue;
        }
        return Some(i);
    }
    levels.len().checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DAY, HOUR, MINUTE, SECOND};

    fn ts(calendar: &Calendar, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        let naive = NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0));
        let Some(dt) = naive.and_then(|n| calendar.local(n)) else {
            panic!("valid date");
        };
        timestamp(&dt)
    }

    #[test]
    fn start_aligns_to_multiples() {
        let cal = Calendar::utc();
        let t = ts(&cal, 2024, 5, 17, 13, 37) + 12.0 * SECOND;
        let quarter_hours = Cadence::new(TimeUnit::Minute, 15);
        let start = quarter_hours.start(&cal, t).map(|dt| timestamp(&dt));
        assert_eq!(start, Some(ts(&cal, 2024, 5, 17, 13, 30)));

        let quarters = Cadence::new(TimeUnit::Month, 3);
        let start = quarters.start(&cal, t).map(|dt| timestamp(&dt));
        assert_eq!(start, Some(ts(&cal, 2024, 4, 1, 0, 0)));

        // 2024-05-17 is a Friday.
        let weeks = Cadence::new(TimeUnit::Week, 1);
        let start = weeks.start(&cal, t).map(|dt| timestamp(&dt));
        assert_eq!(start, Some(ts(&cal, 2024, 5, 13, 0, 0)));
    }

    #[test]
    fn offset_calendar_aligns_days_locally() {
        let cal = Calendar::with_offset_minutes(180);
        let local_noon = ts(&cal, 2024, 1, 10, 12, 0);
        let day = Cadence::new(TimeUnit::Day, 1);
        let start = day.start(&cal, local_noon).map(|dt| timestamp(&dt));
        assert_eq!(start, Some(local_noon - 12.0 * HOUR));
        // Local midnight is 21:00 UTC the previous day.
        assert_eq!(start.map(|s| s.rem_euclid(DAY)), Some(21.0 * HOUR));
    }

    #[test]
    fn month_steps_follow_calendar() {
        let cal = Calendar::utc();
        let monthly = Cadence::new(TimeUnit::Month, 1);
        let Some(jan) = cal.at(ts(&cal, 2023, 1, 1, 0, 0)) else {
            panic!("valid date");
        };
        let feb = monthly.step(&jan).map(|dt| timestamp(&dt));
        assert_eq!(feb, Some(ts(&cal, 2023, 2, 1, 0, 0)));
    }

    #[test]
    fn marks_width_counts_marks_after_origin() {
        let cal = Calendar::utc();
        let minutes = Cadence::new(TimeUnit::Minute, 1);
        // Marks at 0, 1, ..., 9 minutes; the one at x = 0 is not counted.
        let w = marks_width(&minutes, &cal, 10.0 * MINUTE, 500.0, 50.0);
        assert_eq!(w, 450.0);
    }

    struct TestLevel(f64, Cadence);

    impl Level for TestLevel {
        fn domain(&self) -> f64 {
            self.0
        }
        fn cadence(&self) -> &Cadence {
            &self.1
        }
    }

    #[test]
    fn selects_finest_fitting_level_and_caches_by_domain() {
        let cal = Calendar::utc();
        let levels = [
            TestLevel(HOUR, Cadence::new(TimeUnit::Minute, 1)),
            TestLevel(DAY, Cadence::new(TimeUnit::Hour, 1)),
            TestLevel(f64::INFINITY, Cadence::new(TimeUnit::Day, 1)),
        ];
        let mut cache = WidthCache::new();

        // Ten minutes in 1000px: 9 marks * 60 = 540 fits.
        let level = select_level(&levels, &mut cache, &cal, 10.0 * MINUTE, 1000.0, 60.0, 0.0);
        assert_eq!(level, Some(0));
        assert_eq!(cache.misses(), 1);

        // Same inputs reuse the estimate.
        select_level(&levels, &mut cache, &cal, 10.0 * MINUTE, 1000.0, 60.0, 0.0);
        assert_eq!(cache.misses(), 1);

        // Fifty minutes no longer fits minute marks.
        let level = select_level(&levels, &mut cache, &cal, 50.0 * MINUTE, 1000.0, 60.0, 0.0);
        assert_eq!(level, Some(1));
        assert_eq!(cache.misses(), 3);

        // A domain nothing fits in falls back to the coarsest level.
        let level = select_level(&levels, &mut cache, &cal, 400.0 * DAY, 10.0, 60.0, 0.0);
        assert_eq!(level, Some(2));
    }
}
