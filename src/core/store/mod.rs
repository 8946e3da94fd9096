mod itinerary;
mod memory;
mod model;
mod packing;
mod snapshot;
mod state;
mod stay;
mod storage;
mod trip;
pub mod util;

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use state::StoreState;

pub use itinerary::{
    ItineraryDay, ItineraryItem, ItineraryItemUpdate, ItineraryRepository, NewItineraryItem,
    group_by_day,
};
pub use memory::{MediaType, Memory, MemoryRepository, NewMemory};
pub use model::{Color, ICON_PALETTE, TripIcon, pick_icon};
pub use packing::{
    NewPackingItem, PackingCategory, PackingItem, PackingProgress, PackingRepository,
    group_by_category,
};
pub use snapshot::{Decoded, Snapshot};
pub use state::{Clock, PersistErrorHandler};
pub use stay::{NewStay, Stay, StayRepository};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use trip::{
    BudgetSummary, Collaborator, CollaboratorRole, NewTrip, Trip, TripFilter, TripRepository,
    TripStatus, TripUpdate,
};

pub const DEFAULT_STORAGE_KEY: &str = "tripla_data_v1";

#[derive(Clone)]
pub struct StoreOptions {
    pub storage_key: String,
    pub clock: Clock,
    /// Called for every failed persistence attempt. Defaults to logging.
    pub on_persist_error: Option<PersistErrorHandler>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Arc::new(OffsetDateTime::now_utc),
            on_persist_error: None,
        }
    }
}

impl std::fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptions")
            .field("storage_key", &self.storage_key)
            .field("on_persist_error", &self.on_persist_error.is_some())
            .finish()
    }
}

impl StoreOptions {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_persist_error_handler(
        mut self,
        handler: impl Fn(&anyhow::Error) + Send + Sync + 'static,
    ) -> Self {
        self.on_persist_error = Some(Arc::new(handler));
        self
    }
}

/// Result of loading the persisted record at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    Restored { trips: usize },
    /// A bare trip array from an older build; child collections start empty.
    Legacy { trips: usize },
    /// Nothing stored yet.
    Empty,
    /// Read or parse failure. The store is still marked hydrated.
    Failed(String),
}

/// Trip data for the whole app. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct TripStore {
    state: Arc<StoreState>,
}

impl TripStore {
    /// Create an empty, not yet hydrated store.
    ///
    /// Spawns the persistence worker, so this must be called from within a
    /// Tokio runtime.
    pub fn new<S: KeyValueStorage>(storage: S, options: StoreOptions) -> Self {
        Self {
            state: Arc::new(StoreState::new(Arc::new(storage), options)),
        }
    }

    /// Create a store and hydrate it from `storage`.
    pub async fn open<S: KeyValueStorage>(storage: S, options: StoreOptions) -> Self {
        let store = Self::new(storage, options);
        store.hydrate().await;
        store
    }

    /// Load the persisted record. Never fails: on any error the current
    /// collections are kept and the store is still marked hydrated.
    pub async fn hydrate(&self) -> Hydration {
        let key = self.state.storage_key().to_string();
        let (outcome, snapshot) = match self.state.load_raw().await {
            Ok(None) => {
                info!(key = %key, "no stored trips found");
                (Hydration::Empty, None)
            }
            Ok(Some(raw)) => match Snapshot::decode(&raw) {
                Ok(Decoded::Current(snapshot)) => {
                    info!(
                        key = %key,
                        trips = snapshot.trips.len(),
                        itinerary_items = snapshot.itinerary_items.len(),
                        stays = snapshot.stays.len(),
                        memories = snapshot.memories.len(),
                        "hydrated trip store"
                    );
                    let trips = snapshot.trips.len();
                    (Hydration::Restored { trips }, Some(snapshot))
                }
                Ok(legacy @ Decoded::Legacy(_)) => {
                    let snapshot = legacy.into_snapshot();
                    info!(key = %key, trips = snapshot.trips.len(), "hydrated legacy trip array");
                    let trips = snapshot.trips.len();
                    (Hydration::Legacy { trips }, Some(snapshot))
                }
                Err(e) => {
                    warn!(key = %key, error = %format!("{:#}", e), "failed to hydrate trip store");
                    (Hydration::Failed(format!("{:#}", e)), None)
                }
            },
            Err(e) => {
                warn!(key = %key, error = %format!("{:#}", e), "failed to read trip store");
                (Hydration::Failed(format!("{:#}", e)), None)
            }
        };
        self.state.finish_hydration(snapshot).await;
        outcome
    }

    pub fn is_hydrated(&self) -> bool {
        self.state.is_hydrated()
    }

    /// Current immutable snapshot of all four collections.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.state.current().await
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.state.subscribe()
    }

    /// Wait for all queued writes to be attempted.
    pub async fn flush(&self) {
        self.state.flush().await
    }
}

/// Draw ids until one is not `taken`.
fn fresh_id(now: OffsetDateTime, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = util::generate_id(now);
        if !taken(&id) {
            return id;
        }
    }
}

impl TripRepository for TripStore {
    async fn create_trip(&self, draft: NewTrip) -> String {
        let now = self.state.now();
        let title = draft.title.clone();
        let id = self
            .state
            .mutate(|snapshot| {
                let id = fresh_id(now, |id| snapshot.contains_trip(id));
                let icon = pick_icon(snapshot.trips.len());
                snapshot.trips.insert(0, draft.into_trip(id.clone(), icon, now));
                (id, true)
            })
            .await;
        info!(trip_id = %id, title = %title, "created trip");
        id
    }

    async fn update_trip(&self, id: &str, update: TripUpdate) -> Option<Trip> {
        let updated = self
            .state
            .mutate(|snapshot| match snapshot.trip_index(id) {
                Some(index) => {
                    let trip = &mut snapshot.trips[index];
                    update.apply(trip);
                    (Some(trip.clone()), true)
                }
                None => (None, false),
            })
            .await;
        match &updated {
            Some(_) => info!(trip_id = %id, "updated trip"),
            None => debug!(trip_id = %id, "update ignored, no such trip"),
        }
        updated
    }

    async fn delete_trip(&self, id: &str) -> bool {
        let removed = self
            .state
            .mutate(|snapshot| {
                let removed = snapshot.remove_trip_cascade(id);
                (removed, removed)
            })
            .await;
        if removed {
            info!(trip_id = %id, "deleted trip");
        }
        removed
    }

    async fn get_trips(&self) -> Vec<Trip> {
        self.state.current().await.trips.clone()
    }

    async fn get_trip(&self, id: &str) -> Option<Trip> {
        let snapshot = self.state.current().await;
        snapshot.trips.iter().find(|trip| trip.id == id).cloned()
    }

    async fn get_trips_filtered(&self, filter: TripFilter) -> Vec<Trip> {
        let snapshot = self.state.current().await;
        snapshot
            .trips
            .iter()
            .filter(|trip| filter.matches(trip))
            .cloned()
            .collect()
    }
}

impl ItineraryRepository for TripStore {
    async fn add_itinerary_item(&self, trip_id: &str, item: NewItineraryItem) -> ItineraryItem {
        let now = self.state.now();
        let item = self
            .state
            .mutate(|snapshot| {
                let id = fresh_id(now, |id| {
                    snapshot.itinerary_items.iter().any(|item| item.id == id)
                });
                let item = item.into_item(id, trip_id);
                snapshot.itinerary_items.push(item.clone());
                (item, true)
            })
            .await;
        info!(trip_id = %trip_id, item_id = %item.id, "added itinerary item");
        item
    }

    async fn update_itinerary_item(
        &self,
        id: &str,
        update: ItineraryItemUpdate,
    ) -> Option<ItineraryItem> {
        let updated = self
            .state
            .mutate(|snapshot| {
                match snapshot.itinerary_items.iter_mut().find(|item| item.id == id) {
                    Some(item) => {
                        update.apply(item);
                        (Some(item.clone()), true)
                    }
                    None => (None, false),
                }
            })
            .await;
        if updated.is_some() {
            info!(item_id = %id, "updated itinerary item");
        }
        updated
    }

    async fn delete_itinerary_item(&self, id: &str) -> bool {
        let removed = self
            .state
            .mutate(|snapshot| {
                let before = snapshot.itinerary_items.len();
                snapshot.itinerary_items.retain(|item| item.id != id);
                let removed = snapshot.itinerary_items.len() != before;
                (removed, removed)
            })
            .await;
        if removed {
            info!(item_id = %id, "deleted itinerary item");
        }
        removed
    }

    async fn get_itinerary(&self, trip_id: &str) -> Vec<ItineraryItem> {
        let snapshot = self.state.current().await;
        snapshot.itinerary_for(trip_id).cloned().collect()
    }
}

impl StayRepository for TripStore {
    async fn add_stay(&self, trip_id: &str, stay: NewStay) -> Stay {
        let now = self.state.now();
        let stay = self
            .state
            .mutate(|snapshot| {
                let id = fresh_id(now, |id| snapshot.stays.iter().any(|stay| stay.id == id));
                let stay = stay.into_stay(id, trip_id);
                snapshot.stays.push(stay.clone());
                (stay, true)
            })
            .await;
        info!(trip_id = %trip_id, stay_id = %stay.id, "added stay");
        stay
    }

    async fn delete_stay(&self, id: &str) -> bool {
        let removed = self
            .state
            .mutate(|snapshot| {
                let before = snapshot.stays.len();
                snapshot.stays.retain(|stay| stay.id != id);
                let removed = snapshot.stays.len() != before;
                (removed, removed)
            })
            .await;
        if removed {
            info!(stay_id = %id, "deleted stay");
        }
        removed
    }

    async fn get_stays(&self, trip_id: &str) -> Vec<Stay> {
        let snapshot = self.state.current().await;
        snapshot.stays_for(trip_id).cloned().collect()
    }
}

impl MemoryRepository for TripStore {
    async fn add_memory(&self, trip_id: &str, memory: NewMemory) -> Memory {
        let now = self.state.now();
        let memory = self
            .state
            .mutate(|snapshot| {
                let id = fresh_id(now, |id| snapshot.memories.iter().any(|m| m.id == id));
                let memory = memory.into_memory(id, trip_id, util::format_timestamp(now));
                snapshot.memories.push(memory.clone());
                (memory, true)
            })
            .await;
        info!(trip_id = %trip_id, memory_id = %memory.id, "added memory");
        memory
    }

    async fn delete_memory(&self, id: &str) -> bool {
        let removed = self
            .state
            .mutate(|snapshot| {
                let before = snapshot.memories.len();
                snapshot.memories.retain(|memory| memory.id != id);
                let removed = snapshot.memories.len() != before;
                (removed, removed)
            })
            .await;
        if removed {
            info!(memory_id = %id, "deleted memory");
        }
        removed
    }

    async fn get_memories(&self, trip_id: &str) -> Vec<Memory> {
        let snapshot = self.state.current().await;
        snapshot.memories_for(trip_id).cloned().collect()
    }
}

impl PackingRepository for TripStore {
    async fn add_packing_item(&self, trip_id: &str, item: NewPackingItem) -> Option<String> {
        let now = self.state.now();
        let id = self
            .state
            .mutate(|snapshot| {
                let Some(index) = snapshot.trip_index(trip_id) else {
                    return (None, false);
                };
                let list = &mut snapshot.trips[index].packing_list;
                let id = fresh_id(now, |id| list.iter().any(|item| item.id == id));
                list.push(item.into_item(id.clone()));
                (Some(id), true)
            })
            .await;
        if let Some(id) = &id {
            info!(trip_id = %trip_id, item_id = %id, "added packing item");
        }
        id
    }

    async fn toggle_packed(&self, trip_id: &str, item_id: &str) -> Option<bool> {
        self.state
            .mutate(|snapshot| {
                let packed = snapshot
                    .trips
                    .iter_mut()
                    .find(|trip| trip.id == trip_id)
                    .and_then(|trip| trip.packing_list.iter_mut().find(|item| item.id == item_id))
                    .map(|item| {
                        item.is_packed = !item.is_packed;
                        item.is_packed
                    });
                (packed, packed.is_some())
            })
            .await
    }

    async fn remove_packing_item(&self, trip_id: &str, item_id: &str) -> bool {
        let removed = self
            .state
            .mutate(|snapshot| {
                let Some(index) = snapshot.trip_index(trip_id) else {
                    return (false, false);
                };
                let list = &mut snapshot.trips[index].packing_list;
                let before = list.len();
                list.retain(|item| item.id != item_id);
                let removed = list.len() != before;
                (removed, removed)
            })
            .await;
        if removed {
            info!(trip_id = %trip_id, item_id = %item_id, "removed packing item");
        }
        removed
    }
}
