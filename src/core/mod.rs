pub mod calendar;
pub mod globe;
pub mod store;
