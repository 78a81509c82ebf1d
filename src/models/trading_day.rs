//! Trading day model

use chrono::NaiveDate;
use std::fmt;

/// A calendar date on which the exchange publishes settlements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDay(NaiveDate);

impl TradingDay {
    pub fn new(date: NaiveDate) -> Self {
        TradingDay(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `MM/DD/YYYY`, the form the settlements endpoint expects in `tradeDate`
    pub fn query_format(&self) -> String {
        self.0.format("%m/%d/%Y").to_string()
    }

    /// `YYYY-MM-DD`, used for captions and file labels
    pub fn label(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for TradingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        let day = TradingDay::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(day.query_format(), "01/05/2024");
        assert_eq!(day.label(), "2024-01-05");
        assert_eq!(day.to_string(), "2024-01-05");
    }
}
