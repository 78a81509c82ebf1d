//! Data models shared by the services
//!
//! Plain data: trading days, instrument descriptors and the settlement
//! tables produced by a pull.

pub mod instrument;
pub mod settlement;
pub mod trading_day;

pub use instrument::{ChartAxis, Instrument, PriceUnit};
pub use settlement::{
    CombinedDataset, CombinedRow, ContractMonth, InstrumentTable, SettlementRow, SettlementSnapshot,
};
pub use trading_day::TradingDay;
