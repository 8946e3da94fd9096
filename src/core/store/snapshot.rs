use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::store::{itinerary::ItineraryItem, memory::Memory, stay::Stay, trip::Trip};

/// Complete store contents; also the persisted record layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub itinerary_items: Vec<ItineraryItem>,
    #[serde(default)]
    pub stays: Vec<Stay>,
    #[serde(default)]
    pub memories: Vec<Memory>,
}

/// Shape of a decoded persisted record.
#[derive(Debug)]
pub enum Decoded {
    Current(Snapshot),
    /// Older builds stored a bare array of trips.
    Legacy(Vec<Trip>),
}

impl Decoded {
    pub fn into_snapshot(self) -> Snapshot {
        match self {
            Decoded::Current(snapshot) => snapshot,
            Decoded::Legacy(trips) => Snapshot {
                trips,
                ..Default::default()
            },
        }
    }
}

impl Snapshot {
    pub fn encode(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("Failed to serialize store snapshot")
    }

    pub fn decode(raw: &str) -> anyhow::Result<Decoded> {
        let value: Value = serde_json::from_str(raw).context("Persisted store is not valid JSON")?;
        match value {
            Value::Array(_) => {
                let trips = serde_json::from_value(value)
                    .context("Failed to decode legacy trip array")?;
                Ok(Decoded::Legacy(trips))
            }
            Value::Object(_) => {
                let snapshot =
                    serde_json::from_value(value).context("Failed to decode store snapshot")?;
                Ok(Decoded::Current(snapshot))
            }
            other => anyhow::bail!("Unexpected persisted store shape: {}", kind(&other)),
        }
    }

    pub fn trip_index(&self, id: &str) -> Option<usize> {
        self.trips.iter().position(|trip| trip.id == id)
    }

    pub fn contains_trip(&self, id: &str) -> bool {
        self.trip_index(id).is_some()
    }

    pub fn itinerary_for<'a>(&'a self, trip_id: &'a str) -> impl Iterator<Item = &'a ItineraryItem> {
        self.itinerary_items
            .iter()
            .filter(move |item| item.trip_id == trip_id)
    }

    pub fn stays_for<'a>(&'a self, trip_id: &'a str) -> impl Iterator<Item = &'a Stay> {
        self.stays.iter().filter(move |stay| stay.trip_id == trip_id)
    }

    pub fn memories_for<'a>(&'a self, trip_id: &'a str) -> impl Iterator<Item = &'a Memory> {
        self.memories
            .iter()
            .filter(move |memory| memory.trip_id == trip_id)
    }

    /// Remove a trip together with every record that references it.
    pub(super) fn remove_trip_cascade(&mut self, id: &str) -> bool {
        let Some(index) = self.trip_index(id) else {
            return false;
        };
        self.trips.remove(index);
        self.itinerary_items.retain(|item| item.trip_id != id);
        self.stays.retain(|stay| stay.trip_id != id);
        self.memories.retain(|memory| memory.trip_id != id);
        true
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
