pub mod core;

pub use core::store::{
    FileStorage, Hydration, KeyValueStorage, MemoryStorage, Snapshot, StoreOptions, TripStore,
};
pub use core::globe::GlobeSummary;
pub use core::calendar::{DatePicker, MonthView};
