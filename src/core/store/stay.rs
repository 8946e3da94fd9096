use serde::{Deserialize, Serialize};

use crate::core::store::util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    pub id: String,
    pub trip_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub check_in: String,
    pub check_out: String,
}

impl Stay {
    pub fn nights(&self) -> u32 {
        util::nights_between(&self.check_in, &self.check_out)
    }
}

#[derive(Debug, Clone)]
pub struct NewStay {
    pub name: String,
    pub address: Option<String>,
    pub check_in: String,
    pub check_out: String,
}

impl NewStay {
    pub(super) fn into_stay(self, id: String, trip_id: &str) -> Stay {
        Stay {
            id,
            trip_id: trip_id.to_string(),
            name: self.name,
            address: self.address,
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

pub trait StayRepository {
    fn add_stay(&self, trip_id: &str, stay: NewStay) -> impl Future<Output = Stay>;
    fn delete_stay(&self, id: &str) -> impl Future<Output = bool>;
    fn get_stays(&self, trip_id: &str) -> impl Future<Output = Vec<Stay>>;
}
