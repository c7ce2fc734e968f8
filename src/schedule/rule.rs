//! Recurrence rules: when a standing order fires next.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

const LEAP_REFERENCE_YEAR: i32 = 2000;

/// Cadence of a regular payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Anchor pinning where inside its period a rule fires.
///
/// Weekly anchors are ISO weekdays (1 = Monday), monthly anchors a day of
/// month, yearly anchors a `DD.MM` calendar date. Daily rules carry none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleAnchor {
    None,
    Weekday(u32),
    DayOfMonth(u32),
    DayMonth { day: u32, month: u32 },
}

impl CycleAnchor {
    /// Parses the `"DD.MM"` form used by yearly rules.
    pub fn parse_day_month(value: &str) -> Result<Self> {
        let mut parts = value.splitn(2, '.');
        let day = parts.next().and_then(|p| p.parse::<u32>().ok());
        let month = parts.next().and_then(|p| p.parse::<u32>().ok());
        match (day, month) {
            (Some(day), Some(month)) => Ok(CycleAnchor::DayMonth { day, month }),
            _ => Err(CoreError::Validation(format!(
                "`{value}` is not a DD.MM anchor"
            ))),
        }
    }
}

/// The (period, anchor, time-of-day) triple defining when a payment recurs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub period: PeriodType,
    pub anchor: CycleAnchor,
    pub time_of_day: NaiveTime,
}

impl RecurrenceRule {
    pub fn daily(time_of_day: NaiveTime) -> Self {
        Self {
            period: PeriodType::Daily,
            anchor: CycleAnchor::None,
            time_of_day,
        }
    }

    pub fn weekly(weekday: u32, time_of_day: NaiveTime) -> Self {
        Self {
            period: PeriodType::Weekly,
            anchor: CycleAnchor::Weekday(weekday),
            time_of_day,
        }
    }

    pub fn monthly(day: u32, time_of_day: NaiveTime) -> Self {
        Self {
            period: PeriodType::Monthly,
            anchor: CycleAnchor::DayOfMonth(day),
            time_of_day,
        }
    }

    pub fn yearly(day: u32, month: u32, time_of_day: NaiveTime) -> Self {
        Self {
            period: PeriodType::Yearly,
            anchor: CycleAnchor::DayMonth { day, month },
            time_of_day,
        }
    }

    /// Rejects anchors that do not fit the period. Runs at create/edit time
    /// so invalid rules never reach the scheduler.
    pub fn validate(&self) -> Result<()> {
        match (self.period, self.anchor) {
            (PeriodType::Daily, CycleAnchor::None) => Ok(()),
            (PeriodType::Weekly, CycleAnchor::Weekday(day)) if (1..=7).contains(&day) => Ok(()),
            (PeriodType::Monthly, CycleAnchor::DayOfMonth(day)) if (1..=31).contains(&day) => {
                Ok(())
            }
            (PeriodType::Yearly, CycleAnchor::DayMonth { day, month })
                if (1..=12).contains(&month)
                    && day >= 1
                    && day <= days_in_month(LEAP_REFERENCE_YEAR, month) =>
            {
                Ok(())
            }
            (period, anchor) => Err(CoreError::Validation(format!(
                "anchor {anchor:?} does not fit period {period:?}"
            ))),
        }
    }

    /// Next instant strictly after `from` on which this rule fires.
    ///
    /// Monthly rules clamp the anchor day to shorter months (an anchor of 31
    /// reaching April lands on April 30, never May); yearly Feb-29 anchors
    /// clamp to Feb-28 outside leap years. Both clamps are policy, not
    /// calendar overflow.
    pub fn next_occurrence(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let from_date = from.date_naive();
        let next_date = match (self.period, self.anchor) {
            (PeriodType::Weekly, CycleAnchor::Weekday(target)) => {
                let current = from_date.weekday().number_from_monday();
                let ahead = (target + 7 - current - 1) % 7 + 1;
                from_date + Duration::days(ahead as i64)
            }
            (PeriodType::Monthly, CycleAnchor::DayOfMonth(day)) => {
                let (year, month) = month_after(from_date.year(), from_date.month());
                clamped_date(year, month, day)
            }
            (PeriodType::Yearly, CycleAnchor::DayMonth { day, month }) => {
                let this_year = clamped_date(from_date.year(), month, day);
                if this_year > from_date {
                    this_year
                } else {
                    clamped_date(from_date.year() + 1, month, day)
                }
            }
            // Daily, and the pairings validate() rejects.
            _ => from_date + Duration::days(1),
        };
        at_time(next_date, self.time_of_day)
    }

    pub fn label(&self) -> String {
        match (self.period, self.anchor) {
            (PeriodType::Daily, _) => "Daily".into(),
            (PeriodType::Weekly, CycleAnchor::Weekday(day)) => {
                format!("Weekly on weekday {day}")
            }
            (PeriodType::Monthly, CycleAnchor::DayOfMonth(day)) => {
                format!("Monthly on day {day}")
            }
            (PeriodType::Yearly, CycleAnchor::DayMonth { day, month }) => {
                format!("Yearly on {day:02}.{month:02}")
            }
            _ => "Invalid rule".into(),
        }
    }
}

fn month_after(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = month_after(year, month);
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    (first_next - Duration::days(1)).day()
}

fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

fn at_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_time(time), Utc)
}
