//! Settlement tables and the combined dataset handed to rendering

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

use super::instrument::{ChartAxis, Instrument};
use super::trading_day::TradingDay;

/// Delivery month of one futures contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractMonth {
    year: i32,
    month: u32,
}

impl ContractMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(ContractMonth { year, month })
        } else {
            None
        }
    }

    /// First calendar day of the month, the point plotted on the time axis
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for ContractMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_day() {
            Some(date) => write!(f, "{}", date.format("%b %Y")),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}

/// One normalized settlement; `None` price means the feed had no usable value
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRow {
    pub contract_month: ContractMonth,
    pub settlement_price: Option<f64>,
}

/// Normalized rows for a single instrument
#[derive(Debug, Clone)]
pub struct InstrumentTable {
    pub instrument: Instrument,
    pub rows: Vec<SettlementRow>,
}

impl InstrumentTable {
    pub fn priced_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.settlement_price.is_some()).count()
    }
}

/// Everything pulled for one trading day
#[derive(Debug, Clone)]
pub struct SettlementSnapshot {
    pub trading_day: TradingDay,
    pub tables: Vec<InstrumentTable>,
}

impl SettlementSnapshot {
    /// Trading day as `YYYY-MM-DD`
    pub fn label(&self) -> String {
        self.trading_day.label()
    }

    pub fn table(&self, instrument: Instrument) -> Option<&InstrumentTable> {
        self.tables.iter().find(|t| t.instrument == instrument)
    }

    /// Concatenate every table, tagging each row with its instrument
    pub fn combine(&self) -> CombinedDataset {
        let rows = self
            .tables
            .iter()
            .flat_map(|table| {
                table.rows.iter().map(move |row| CombinedRow {
                    instrument: table.instrument,
                    contract_month: row.contract_month,
                    settlement_price: row.settlement_price,
                })
            })
            .collect();

        CombinedDataset {
            trade_date: self.label(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRow {
    pub instrument: Instrument,
    pub contract_month: ContractMonth,
    pub settlement_price: Option<f64>,
}

/// All instruments' rows in one table, built fresh per run
#[derive(Debug, Clone)]
pub struct CombinedDataset {
    pub trade_date: String,
    pub rows: Vec<CombinedRow>,
}

impl CombinedDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn for_instrument(&self, instrument: Instrument) -> impl Iterator<Item = &CombinedRow> {
        self.rows.iter().filter(move |r| r.instrument == instrument)
    }

    /// Instruments present in the dataset, in first-seen order
    pub fn instruments(&self) -> Vec<Instrument> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.instrument) {
                seen.push(row.instrument);
            }
        }
        seen
    }

    pub fn priced_points(&self) -> usize {
        self.rows.iter().filter(|r| r.settlement_price.is_some()).count()
    }

    /// Sorted, de-duplicated contract months across every instrument
    pub fn months(&self) -> Vec<ContractMonth> {
        self.rows
            .iter()
            .map(|r| r.contract_month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn price(&self, instrument: Instrument, month: ContractMonth) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.instrument == instrument && r.contract_month == month)
            .and_then(|r| r.settlement_price)
    }

    /// Min and max price of the instruments plotted on `axis`
    pub fn price_bounds(&self, axis: ChartAxis) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter(|r| r.instrument.axis() == axis)
            .filter_map(|r| r.settlement_price)
            .fold(None, |acc, price| match acc {
                None => Some((price, price)),
                Some((lo, hi)) => Some((lo.min(price), hi.max(price))),
            })
    }
}
