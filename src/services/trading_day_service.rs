use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;
use tracing::debug;

use crate::models::TradingDay;
use crate::services::calendar_service::HolidayCalendar;

/// Longest run of non-trading days the resolver will walk through
pub const MAX_LOOKBACK_DAYS: i64 = 31;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("no trading day found in the {days} days before {reference}; holiday calendar looks malformed")]
    NoTradingDay { reference: NaiveDate, days: i64 },
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Check whether `date` is a weekday the calendar does not list as a holiday
pub fn is_trading_day<C: HolidayCalendar + ?Sized>(date: NaiveDate, calendar: &C) -> bool {
    !is_weekend(date) && !calendar.is_holiday(date)
}

/// Most recent trading day strictly before `reference_date`
pub fn resolve_last_trading_day<C: HolidayCalendar + ?Sized>(
    reference_date: NaiveDate,
    calendar: &C,
) -> Result<TradingDay, CalendarError> {
    for back in 1..=MAX_LOOKBACK_DAYS {
        let candidate = reference_date - Duration::days(back);
        if is_trading_day(candidate, calendar) {
            debug!("Resolved {} as the last trading day before {}", candidate, reference_date);
            return Ok(TradingDay::new(candidate));
        }
    }

    Err(CalendarError::NoTradingDay {
        reference: reference_date,
        days: MAX_LOOKBACK_DAYS,
    })
}
