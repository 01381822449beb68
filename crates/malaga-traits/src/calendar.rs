//! Trading calendars.
//!
//! The return-table assembler anchors every net-asset-value series one trading
//! day before the first observation. Which days are trading days is an
//! integration concern, so the calendar is a collaborator behind the
//! [`TradingCalendar`] trait.

use crate::Date;
use chrono::{Datelike, Weekday};
use std::collections::BTreeSet;

/// Longest gap, in calendar days, searched when stepping back to a trading day.
pub const MAX_CALENDAR_GAP_DAYS: usize = 366;

/// Source of valid trading dates.
pub trait TradingCalendar: Send + Sync {
    /// Returns whether the exchange is open on `date`.
    fn is_trading_day(&self, date: Date) -> bool;

    /// Returns the last trading day strictly before `date`.
    ///
    /// The default implementation steps back one calendar day at a time and
    /// gives up after [`MAX_CALENDAR_GAP_DAYS`].
    fn previous_trading_day(&self, date: Date) -> Option<Date> {
        let mut day = date.pred_opt()?;
        for _ in 0..MAX_CALENDAR_GAP_DAYS {
            if self.is_trading_day(day) {
                return Some(day);
            }
            day = day.pred_opt()?;
        }
        None
    }
}

/// Monday to Friday calendar with an optional holiday list.
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    holidays: BTreeSet<Date>,
}

impl WeekdayCalendar {
    /// Creates a weekday calendar without holidays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a weekday calendar that is closed on the given holidays.
    pub fn with_holidays<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = Date>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn is_trading_day(&self, date: Date) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}

/// Calendar backed by an explicit table of trading dates.
///
/// Dates outside the table are closed; stepping back from the earliest listed
/// date yields `None`.
#[derive(Debug, Clone, Default)]
pub struct ListCalendar {
    days: BTreeSet<Date>,
}

impl ListCalendar {
    /// Builds a calendar from a list of trading dates (any order, duplicates ignored).
    pub fn new<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Date>,
    {
        Self {
            days: days.into_iter().collect(),
        }
    }

    /// Number of trading dates in the table.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl TradingCalendar for ListCalendar {
    fn is_trading_day(&self, date: Date) -> bool {
        self.days.contains(&date)
    }

    fn previous_trading_day(&self, date: Date) -> Option<Date> {
        self.days.range(..date).next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_weekday_calendar_skips_weekend() {
        let calendar = WeekdayCalendar::new();
        // Monday 2024-01-08 -> Friday 2024-01-05
        assert_eq!(calendar.previous_trading_day(d(2024, 1, 8)), Some(d(2024, 1, 5)));
        // Wednesday -> Tuesday
        assert_eq!(calendar.previous_trading_day(d(2024, 1, 10)), Some(d(2024, 1, 9)));
        assert!(!calendar.is_trading_day(d(2024, 1, 6)));
    }

    #[test]
    fn test_weekday_calendar_holidays() {
        let calendar = WeekdayCalendar::with_holidays([d(2024, 1, 1)]);
        // Tuesday 2024-01-02 -> skips New Year holiday and the weekend
        assert_eq!(calendar.previous_trading_day(d(2024, 1, 2)), Some(d(2023, 12, 29)));
    }

    #[test]
    fn test_list_calendar() {
        let calendar = ListCalendar::new([d(2024, 1, 10), d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(calendar.len(), 3);
        assert_eq!(calendar.previous_trading_day(d(2024, 1, 10)), Some(d(2024, 1, 4)));
        assert_eq!(calendar.previous_trading_day(d(2024, 1, 8)), Some(d(2024, 1, 4)));
        assert_eq!(calendar.previous_trading_day(d(2024, 1, 3)), None);
    }
}
