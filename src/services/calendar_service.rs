use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;

/// Lookup of market non-trading dates
pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Rule-based NYSE holiday calendar
///
/// Covers the standing holidays with their weekend observance rules and the
/// unscheduled full-day closures since 1985. Partial-day closures (such as
/// the 2001-09-17 reopening or early closes) are trading days here.
#[derive(Debug, Clone, Copy, Default)]
pub struct NyseCalendar;

/// Unscheduled full-day closures (storms, national days of mourning)
const SPECIAL_CLOSURES: &[(i32, u32, u32)] = &[
    (1985, 9, 27),
    (1994, 4, 27),
    (2001, 9, 11),
    (2001, 9, 12),
    (2001, 9, 13),
    (2001, 9, 14),
    (2004, 6, 11),
    (2007, 1, 2),
    (2012, 10, 29),
    (2012, 10, 30),
    (2018, 12, 5),
    (2025, 1, 9),
];

impl NyseCalendar {
    /// Every NYSE holiday that falls in `year`
    pub fn holidays_for_year(year: i32) -> Vec<NaiveDate> {
        let mut days = Vec::new();

        // New Year's Day moves to Monday when it is a Sunday but is not
        // observed on the prior Friday when it is a Saturday
        if let Some(jan1) = NaiveDate::from_ymd_opt(year, 1, 1) {
            match jan1.weekday() {
                Weekday::Sat => {}
                Weekday::Sun => days.push(jan1 + Duration::days(1)),
                _ => days.push(jan1),
            }
        }

        if year >= 1998 {
            days.extend(nth_weekday(year, 1, Weekday::Mon, 3));
        }
        days.extend(nth_weekday(year, 2, Weekday::Mon, 3));
        days.extend(easter_sunday(year).map(|easter| easter - Duration::days(2)));
        days.extend(last_weekday(year, 5, Weekday::Mon));
        if year >= 2022 {
            days.extend(observed(year, 6, 19));
        }
        days.extend(observed(year, 7, 4));
        days.extend(nth_weekday(year, 9, Weekday::Mon, 1));
        days.extend(nth_weekday(year, 11, Weekday::Thu, 4));
        days.extend(observed(year, 12, 25));

        days.extend(
            SPECIAL_CLOSURES
                .iter()
                .filter(|(y, _, _)| *y == year)
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        );

        days.sort();
        days
    }
}

impl HolidayCalendar for NyseCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        Self::holidays_for_year(date.year()).contains(&date)
    }
}

/// Calendar backed by an explicit list of dates
#[derive(Debug, Clone, Default)]
pub struct FixedCalendar {
    dates: HashSet<NaiveDate>,
}

impl FixedCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// A base calendar plus operator-supplied closures
///
/// Lets a run honour a closure announced after this build without waiting
/// for a new release.
#[derive(Debug, Clone, Default)]
pub struct LayeredCalendar<C> {
    base: C,
    extra: FixedCalendar,
}

impl<C: HolidayCalendar> LayeredCalendar<C> {
    pub fn new(base: C, extra: FixedCalendar) -> Self {
        Self { base, extra }
    }
}

impl<C: HolidayCalendar> HolidayCalendar for LayeredCalendar<C> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.base.is_holiday(date) || self.extra.is_holiday(date)
    }
}

/// Saturday holidays are observed on Friday, Sunday holidays on Monday
fn observed(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    })
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let mut date = NaiveDate::from_ymd_opt(next_year, next_month, 1)? - Duration::days(1);
    while date.weekday() != weekday {
        date -= Duration::days(1);
    }
    Some(date)
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm)
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
