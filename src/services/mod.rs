pub mod calendar_service;
pub mod chart_service;
pub mod dashboard_service;
pub mod report_service;
pub mod settlement_service;
pub mod trading_day_service;
