pub mod fetch_window;
pub mod month;
pub mod records;
pub mod request_budget;
pub mod sample;
