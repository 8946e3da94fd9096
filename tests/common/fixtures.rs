use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use time::{OffsetDateTime, macros::datetime};
use tripla::core::store::{
    DEFAULT_STORAGE_KEY, FileStorage, KeyValueStorage, MemoryStorage, NewItineraryItem, NewStay,
    NewTrip, StoreOptions, TripStore,
};

/// Fixed "now" for every test store.
pub const TEST_NOW: OffsetDateTime = datetime!(2026-06-15 12:00 UTC);

pub fn test_options() -> StoreOptions {
    StoreOptions::default().with_clock(|| TEST_NOW)
}

/// Creates a hydrated TripStore backed by files in a temporary directory.
/// Returns both the store and the temp directory (which must be kept alive).
pub async fn create_test_store() -> (TripStore, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let store = TripStore::open(FileStorage::new(dir.path()), test_options()).await;
    (store, dir)
}

/// Creates a hydrated, empty TripStore kept entirely in memory.
pub async fn create_memory_store() -> TripStore {
    TripStore::open(MemoryStorage::new(), test_options()).await
}

/// Reads the persisted record written by a file-backed store.
pub fn read_persisted(dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.join(format!("{}.json", DEFAULT_STORAGE_KEY)))
        .expect("Persisted store file missing");
    serde_json::from_str(&raw).expect("Persisted store is not JSON")
}

/// Writes a raw record where a file-backed store will look for it.
pub fn write_persisted(dir: &Path, raw: &str) {
    FileStorage::new(dir)
        .set_item(DEFAULT_STORAGE_KEY, raw)
        .expect("Failed to seed persisted store");
}

pub fn make_new_trip(title: &str, city: &str, country: &str) -> NewTrip {
    NewTrip::new(title, city, country)
}

pub fn make_dated_trip(title: &str, country: &str, start: &str, end: &str) -> NewTrip {
    NewTrip::new(title, title, country).with_dates(start, end)
}

pub fn make_itinerary_item(title: &str, date: &str, time: Option<&str>) -> NewItineraryItem {
    NewItineraryItem {
        title: title.to_string(),
        date: date.to_string(),
        time: time.map(str::to_string),
        notes: None,
    }
}

pub fn make_stay(name: &str, check_in: &str, check_out: &str) -> NewStay {
    NewStay {
        name: name.to_string(),
        address: Some("1 Test Street".to_string()),
        check_in: check_in.to_string(),
        check_out: check_out.to_string(),
    }
}

/// Storage whose writes always fail; reads report nothing stored.
#[derive(Debug, Default, Clone)]
pub struct FailingStorage {
    pub write_attempts: Arc<AtomicUsize>,
}

impl KeyValueStorage for FailingStorage {
    fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("disk full")
    }

    fn remove_item(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

/// Storage whose reads always fail.
#[derive(Debug, Default)]
pub struct UnreadableStorage;

impl KeyValueStorage for UnreadableStorage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("permission denied reading {}", key)
    }

    fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn remove_item(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
