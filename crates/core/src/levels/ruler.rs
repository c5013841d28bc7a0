use chrono::{DateTime, Datelike, FixedOffset};

use super::{Cadence, Level, TimeUnit};
use crate::model::{DAY, HOUR, MINUTE, MONTH, SECOND, YEAR};

/// How a ruler label is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// A `strftime` pattern.
    Pattern(&'static str),
    /// `Q1`..`Q4`.
    Quarter,
}

impl LabelFormat {
    pub fn format(&self, t: &DateTime<FixedOffset>) -> String {
        match self {
            LabelFormat::Pattern(pattern) => t.format(pattern).to_string(),
            LabelFormat::Quarter => format!("Q{}", t.month0() / 3 + 1),
        }
    }
}

/// One row of ruler labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRow {
    pub cadence: Cadence,
    pub format: LabelFormat,
    /// Paint Saturday and Sunday labels with the weekend color.
    pub weekend: bool,
}

pub struct RulerLevel {
    pub domain: f64,
    pub row: LabelRow,
    /// Secondary row. When absent, the next level's row is used.
    pub sup: Option<LabelRow>,
}

impl Level for RulerLevel {
    fn domain(&self) -> f64 {
        self.domain
    }

    fn cadence(&self) -> &Cadence {
        &self.row.cadence
    }
}

const fn row(unit: TimeUnit, every: u32, format: LabelFormat) -> LabelRow {
    LabelRow {
        cadence: Cadence::new(unit, every),
        format,
        weekend: false,
    }
}

const fn weekend_row(unit: TimeUnit, every: u32, format: LabelFormat) -> LabelRow {
    LabelRow {
        cadence: Cadence::new(unit, every),
        format,
        weekend: true,
    }
}

const MILLIS: LabelFormat = LabelFormat::Pattern("%3fms");
const SECONDS: LabelFormat = LabelFormat::Pattern("%S′′");
const MINUTES: LabelFormat = LabelFormat::Pattern("%M′");
const HOURS: LabelFormat = LabelFormat::Pattern("%H");
const DAY_OF_MONTH: LabelFormat = LabelFormat::Pattern("%-d");
const MONTH_DAY: LabelFormat = LabelFormat::Pattern("%b %-d");
const MONTH_NAME: LabelFormat = LabelFormat::Pattern("%b");
const MONTH_YEAR: LabelFormat = LabelFormat::Pattern("%b %Y");
const YEAR_NUMBER: LabelFormat = LabelFormat::Pattern("%Y");

const HOUR_SUP: LabelRow = row(TimeUnit::Hour, 1, HOURS);
const DAY_SUP: LabelRow = weekend_row(TimeUnit::Day, 1, MONTH_DAY);
const MONTH_SUP: LabelRow = row(TimeUnit::Month, 1, MONTH_YEAR);
const YEAR_SUP: LabelRow = row(TimeUnit::Year, 1, YEAR_NUMBER);

/// Ruler levels, finest first.
pub static RULER_LEVELS: [RulerLevel; 12] = [
    RulerLevel {
        domain: SECOND,
        row: row(TimeUnit::Millisecond, 1, MILLIS),
        sup: Some(row(TimeUnit::Second, 1, SECONDS)),
    },
    RulerLevel {
        domain: MINUTE,
        row: row(TimeUnit::Second, 1, SECONDS),
        sup: Some(row(TimeUnit::Minute, 5, MINUTES)),
    },
    RulerLevel {
        domain: HOUR,
        row: row(TimeUnit::Minute, 5, MINUTES),
        sup: Some(HOUR_SUP),
    },
    RulerLevel {
        domain: DAY,
        row: row(TimeUnit::Minute, 15, MINUTES),
        sup: Some(HOUR_SUP),
    },
    RulerLevel {
        domain: DAY,
        row: row(TimeUnit::Hour, 1, HOURS),
        sup: Some(DAY_SUP),
    },
    RulerLevel {
        domain: MONTH,
        row: row(TimeUnit::Hour, 4, HOURS),
        sup: Some(DAY_SUP),
    },
    RulerLevel {
        domain: MONTH,
        row: weekend_row(TimeUnit::Day, 1, DAY_OF_MONTH),
        sup: Some(MONTH_SUP),
    },
    RulerLevel {
        domain: MONTH * 6.0,
        row: row(TimeUnit::Week, 1, DAY_OF_MONTH),
        sup: None,
    },
    RulerLevel {
        domain: YEAR,
        row: row(TimeUnit::Month, 1, MONTH_NAME),
        sup: Some(YEAR_SUP),
    },
    RulerLevel {
        domain: YEAR * 10.0,
        row: row(TimeUnit::Month, 3, LabelFormat::Quarter),
        sup: None,
    },
    RulerLevel {
        domain: YEAR * 100.0,
        row: row(TimeUnit::Year, 1, YEAR_NUMBER),
        sup: None,
    },
    RulerLevel {
        domain: f64::INFINITY,
        row: row(TimeUnit::Year, 10, YEAR_NUMBER),
        sup: None,
    },
];

/// Secondary row for the level at `index`: its own, else the next level's.
pub fn sup_row(levels: &[RulerLevel], index: usize) -> Option<LabelRow> {
    let level = levels.get(index)?;
    level
        .sup
        .or_else(|| levels.get(index + 1).map(|next| next.row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Calendar;

    #[test]
    fn table_is_non_decreasing() {
        assert!(RULER_LEVELS.windows(2).all(|w| w[0].domain <= w[1].domain));
    }

    #[test]
    fn formats_labels() {
        let cal = Calendar::utc();
        // 2024-05-17T13:37:42.026Z, a Friday.
        let Some(t) = cal.at(1_715_953_062_026.0) else {
            panic!("valid timestamp");
        };
        assert_eq!(MILLIS.format(&t), "026ms");
        assert_eq!(SECONDS.format(&t), "42′′");
        assert_eq!(MINUTES.format(&t), "37′");
        assert_eq!(HOURS.format(&t), "13");
        assert_eq!(MONTH_DAY.format(&t), "May 17");
        assert_eq!(MONTH_YEAR.format(&t), "May 2024");
        assert_eq!(LabelFormat::Quarter.format(&t), "Q2");
    }

    #[test]
    fn missing_sup_falls_through_to_next_level() {
        let weekly = RULER_LEVELS
            .iter()
            .position(|l| l.row.cadence == Cadence::new(TimeUnit::Week, 1));
        let Some(weekly) = weekly else {
            panic!("weekly level present");
        };
        assert_eq!(sup_row(&RULER_LEVELS, weekly), Some(RULER_LEVELS[weekly + 1].row));
        assert_eq!(sup_row(&RULER_LEVELS, RULER_LEVELS.len() - 1), None);
    }
}
