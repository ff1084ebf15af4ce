pub mod api_usage;
pub mod finnhub;
pub mod quote_source;
pub mod synthetic;
pub mod notifier;

pub mod alert_store;
pub mod alert_monitor;

pub mod alerts_service;
pub mod stocks_service;
