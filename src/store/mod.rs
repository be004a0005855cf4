pub mod budget_store;
pub mod database;
pub mod error;
pub mod export;
pub mod time_series_store;
