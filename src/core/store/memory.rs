use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

/// A photo or video attached to a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub trip_id: String,
    pub uri: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMemory {
    pub uri: String,
    pub media_type: MediaType,
}

impl NewMemory {
    pub fn photo(uri: impl Into<String>) -> Self {
        NewMemory {
            uri: uri.into(),
            media_type: MediaType::Photo,
        }
    }

    pub fn video(uri: impl Into<String>) -> Self {
        NewMemory {
            uri: uri.into(),
            media_type: MediaType::Video,
        }
    }

    pub(super) fn into_memory(self, id: String, trip_id: &str, created_at: String) -> Memory {
        Memory {
            id,
            trip_id: trip_id.to_string(),
            uri: self.uri,
            media_type: self.media_type,
            created_at,
        }
    }
}

pub trait MemoryRepository {
    fn add_memory(&self, trip_id: &str, memory: NewMemory) -> impl Future<Output = Memory>;
    fn delete_memory(&self, id: &str) -> impl Future<Output = bool>;
    fn get_memories(&self, trip_id: &str) -> impl Future<Output = Vec<Memory>>;
}
