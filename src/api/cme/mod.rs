pub mod client;
pub mod models;

pub use client::CmeClient;
pub use models::{ApiError, RawSettlement, SettlementsResponse};
