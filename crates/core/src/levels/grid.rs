use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use tracklane_protocol::ThemeToken;

use super::{Cadence, Level, TimeUnit};
use crate::model::{DAY, HOUR, MONTH, YEAR};

/// Emphasis of a single grid line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStyle {
    /// Start of the next larger calendar unit.
    Boundary,
    Primary,
    Secondary,
}

impl GridStyle {
    pub fn token(self) -> ThemeToken {
        match self {
            GridStyle::Boundary => ThemeToken::GridBoundary,
            GridStyle::Primary => ThemeToken::GridPrimary,
            GridStyle::Secondary => ThemeToken::GridSecondary,
        }
    }
}

pub struct GridLevel {
    pub domain: f64,
    pub cadence: Cadence,
    pub style: fn(&DateTime<FixedOffset>) -> GridStyle,
}

impl Level for GridLevel {
    fn domain(&self) -> f64 {
        self.domain
    }

    fn cadence(&self) -> &Cadence {
        &self.cadence
    }
}

fn primary_if(cond: bool) -> GridStyle {
    if cond {
        GridStyle::Primary
    } else {
        GridStyle::Secondary
    }
}

fn minute_style(t: &DateTime<FixedOffset>) -> GridStyle {
    primary_if(t.minute() % 5 == 0)
}

fn quarter_hour_style(t: &DateTime<FixedOffset>) -> GridStyle {
    if t.hour() == 0 && t.minute() == 0 {
        return GridStyle::Boundary;
    }
    primary_if(t.minute() == 0)
}

fn hour_style(t: &DateTime<FixedOffset>) -> GridStyle {
    if t.hour() == 0 {
        return GridStyle::Boundary;
    }
    primary_if(t.hour() % 4 == 0)
}

fn day_style(t: &DateTime<FixedOffset>) -> GridStyle {
    if t.day() == 1 {
        return GridStyle::Boundary;
    }
    primary_if(t.weekday() == chrono::Weekday::Mon)
}

fn month_style(t: &DateTime<FixedOffset>) -> GridStyle {
    primary_if(t.month0() % 3 == 0)
}

fn year_style(_: &DateTime<FixedOffset>) -> GridStyle {
    GridStyle::Primary
}

/// Grid levels, finest first.
pub static GRID_LEVELS: [GridLevel; 6] = [
    GridLevel {
        domain: HOUR,
        cadence: Cadence::new(TimeUnit::Minute, 1),
        style: minute_style,
    },
    GridLevel {
        domain: DAY,
        cadence: Cadence::new(TimeUnit::Minute, 15),
        style: quarter_hour_style,
    },
    GridLevel {
        domain: MONTH,
        cadence: Cadence::new(TimeUnit::Hour, 1),
        style: hour_style,
    },
    GridLevel {
        domain: YEAR,
        cadence: Cadence::new(TimeUnit::Day, 1),
        style: day_style,
    },
    GridLevel {
        domain: YEAR * 5.0,
        cadence: Cadence::new(TimeUnit::Month, 1),
        style: month_style,
    },
    GridLevel {
        domain: f64::INFINITY,
        cadence: Cadence::new(TimeUnit::Year, 1),
        style: year_style,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Calendar;

    #[test]
    fn table_is_ascending() {
        assert!(GRID_LEVELS.windows(2).all(|w| w[0].domain < w[1].domain));
    }

    #[test]
    fn midnight_is_a_boundary() {
        let cal = Calendar::utc();
        let Some(midnight) = cal.at(0.0) else {
            panic!("epoch is representable");
        };
        assert_eq!((GRID_LEVELS[1].style)(&midnight), GridStyle::Boundary);
        assert_eq!((GRID_LEVELS[2].style)(&midnight), GridStyle::Boundary);
        // 1970-01-01 is the first of the month.
        assert_eq!((GRID_LEVELS[3].style)(&midnight), GridStyle::Boundary);
        assert_eq!(GridStyle::Boundary.token(), ThemeToken::GridBoundary);
    }
}
