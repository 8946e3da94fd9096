mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from tripla for tests
pub use tripla::core::store::{
    CollaboratorRole, FileStorage, Hydration, ItineraryItemUpdate, ItineraryRepository,
    KeyValueStorage, MediaType, MemoryRepository, MemoryStorage, NewItineraryItem, NewMemory,
    NewPackingItem, NewStay, NewTrip, PackingCategory, PackingRepository, Snapshot,
    StayRepository, StoreOptions, TripFilter, TripIcon, TripRepository, TripStatus, TripStore,
    TripUpdate,
};
