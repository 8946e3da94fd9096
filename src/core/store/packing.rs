use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackingCategory {
    Essentials,
    Clothing,
    Toiletries,
    Electronics,
    Documents,
    #[default]
    Other,
}

impl PackingCategory {
    /// Display order of the packing screen.
    pub const ORDER: [PackingCategory; 6] = [
        PackingCategory::Essentials,
        PackingCategory::Documents,
        PackingCategory::Clothing,
        PackingCategory::Toiletries,
        PackingCategory::Electronics,
        PackingCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PackingCategory::Essentials => "Essentials",
            PackingCategory::Clothing => "Clothing",
            PackingCategory::Toiletries => "Toiletries",
            PackingCategory::Electronics => "Electronics",
            PackingCategory::Documents => "Documents",
            PackingCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: PackingCategory,
    #[serde(default)]
    pub is_packed: bool,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct NewPackingItem {
    pub name: String,
    pub category: PackingCategory,
    pub quantity: u32,
}

impl NewPackingItem {
    pub fn new(name: impl Into<String>) -> Self {
        NewPackingItem {
            name: name.into(),
            category: PackingCategory::Other,
            quantity: 1,
        }
    }

    pub(super) fn into_item(self, id: String) -> PackingItem {
        PackingItem {
            id,
            name: self.name,
            category: self.category,
            is_packed: false,
            quantity: self.quantity.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingProgress {
    pub packed: usize,
    pub total: usize,
}

impl PackingProgress {
    pub fn of(items: &[PackingItem]) -> Self {
        PackingProgress {
            packed: items.iter().filter(|item| item.is_packed).count(),
            total: items.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.packed == self.total
    }
}

/// Items grouped by category in display order; empty categories are omitted.
pub fn group_by_category(items: &[PackingItem]) -> Vec<(PackingCategory, Vec<&PackingItem>)> {
    PackingCategory::ORDER
        .iter()
        .filter_map(|category| {
            let group: Vec<&PackingItem> = items
                .iter()
                .filter(|item| item.category == *category)
                .collect();
            (!group.is_empty()).then_some((*category, group))
        })
        .collect()
}

pub trait PackingRepository {
    /// Returns the new item's id, or `None` when the trip does not exist.
    fn add_packing_item(
        &self,
        trip_id: &str,
        item: NewPackingItem,
    ) -> impl Future<Output = Option<String>>;
    /// Returns the new packed state.
    fn toggle_packed(&self, trip_id: &str, item_id: &str) -> impl Future<Output = Option<bool>>;
    fn remove_packing_item(&self, trip_id: &str, item_id: &str) -> impl Future<Output = bool>;
}
