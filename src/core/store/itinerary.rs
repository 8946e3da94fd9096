use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItem {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewItineraryItem {
    pub title: String,
    pub date: String,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl NewItineraryItem {
    pub(super) fn into_item(self, id: String, trip_id: &str) -> ItineraryItem {
        ItineraryItem {
            id,
            trip_id: trip_id.to_string(),
            title: self.title,
            date: self.date,
            time: self.time,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItineraryItemUpdate {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl ItineraryItemUpdate {
    pub(super) fn apply(self, item: &mut ItineraryItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(date) = self.date {
            item.date = date;
        }
        if let Some(time) = self.time {
            item.time = time;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryDay {
    pub date: String,
    pub items: Vec<ItineraryItem>,
}

/// Group items by calendar day (the part of `date` before any `T`), days
/// ascending, items within a day ordered by time with untimed items first.
pub fn group_by_day<'a, I>(items: I) -> Vec<ItineraryDay>
where
    I: IntoIterator<Item = &'a ItineraryItem>,
{
    let mut days: BTreeMap<String, Vec<ItineraryItem>> = BTreeMap::new();
    for item in items {
        let key = item.date.split('T').next().unwrap_or_default().to_string();
        days.entry(key).or_default().push(item.clone());
    }
    days.into_iter()
        .map(|(date, mut items)| {
            items.sort_by(|a, b| {
                a.time
                    .as_deref()
                    .unwrap_or_default()
                    .cmp(b.time.as_deref().unwrap_or_default())
            });
            ItineraryDay { date, items }
        })
        .collect()
}

pub trait ItineraryRepository {
    fn add_itinerary_item(
        &self,
        trip_id: &str,
        item: NewItineraryItem,
    ) -> impl Future<Output = ItineraryItem>;
    fn update_itinerary_item(
        &self,
        id: &str,
        update: ItineraryItemUpdate,
    ) -> impl Future<Output = Option<ItineraryItem>>;
    fn delete_itinerary_item(&self, id: &str) -> impl Future<Output = bool>;
    fn get_itinerary(&self, trip_id: &str) -> impl Future<Output = Vec<ItineraryItem>>;
}
