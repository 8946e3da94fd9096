use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::store::{
    model::{Color, TripIcon},
    packing::PackingItem,
    util,
};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const SELF_COLLABORATOR_ID: &str = "self";
const SELF_AVATAR: &str = "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Planning,
    Upcoming,
    Ongoing,
    Completed,
}

impl TripStatus {
    /// Snapshot status for a trip given its (optional) dates.
    ///
    /// Either date missing or unparsable yields `Planning`. The range is
    /// inclusive on both ends.
    pub fn derive(start: Option<&str>, end: Option<&str>, now: OffsetDateTime) -> Self {
        let (Some(start), Some(end)) = (
            start.and_then(util::parse_iso),
            end.and_then(util::parse_iso),
        ) else {
            return TripStatus::Planning;
        };
        if now > end {
            TripStatus::Completed
        } else if now >= start {
            TripStatus::Ongoing
        } else {
            TripStatus::Upcoming
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripStatus::Planning => "Planning",
            TripStatus::Upcoming => "Upcoming",
            TripStatus::Ongoing => "Ongoing",
            TripStatus::Completed => "Past",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Owner,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub role: CollaboratorRole,
}

impl Collaborator {
    /// The local user, owner of every trip created on this device.
    pub fn local_owner() -> Self {
        Collaborator {
            id: SELF_COLLABORATOR_ID.to_string(),
            name: "You".to_string(),
            avatar: SELF_AVATAR.to_string(),
            role: CollaboratorRole::Owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub destination: String,
    #[serde(default)]
    pub country: String,
    pub icon: TripIcon,
    pub icon_color: Color,
    pub start_date: String,
    pub end_date: String,
    pub status: TripStatus,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default, deserialize_with = "util::lenient_amount")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "util::lenient_amount")]
    pub spent_budget: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Day-by-day activity plans written by earlier app versions. Kept as-is
    /// so rewriting the record never loses them.
    #[serde(default)]
    pub itinerary: Vec<serde_json::Value>,
    #[serde(default)]
    pub packing_list: Vec<PackingItem>,
    #[serde(default)]
    pub is_offline_available: bool,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Trip {
    pub fn nights(&self) -> u32 {
        util::nights_between(&self.start_date, &self.end_date)
    }

    pub fn budget(&self) -> BudgetSummary {
        BudgetSummary::new(self.total_budget, self.spent_budget)
    }
}

/// Draft submitted by the create-trip form. Title and city are validated by
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct NewTrip {
    pub title: String,
    pub destination_city: String,
    pub destination_country: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cover_image: Option<String>,
    pub total_budget: Option<f64>,
}

impl NewTrip {
    pub fn new(title: impl Into<String>, city: impl Into<String>, country: impl Into<String>) -> Self {
        NewTrip {
            title: title.into(),
            destination_city: city.into(),
            destination_country: country.into(),
            ..Default::default()
        }
    }

    pub fn with_dates(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self.end_date = Some(end.into());
        self
    }

    pub fn with_budget(mut self, total: f64) -> Self {
        self.total_budget = Some(total);
        self
    }

    /// Split a "City, Country" string the way the create form does: the first
    /// comma separates the city, everything after it is the country.
    pub fn split_destination(destination: &str) -> (String, String) {
        match destination.split_once(',') {
            Some((city, rest)) => {
                let country = rest
                    .split(',')
                    .map(str::trim)
                    .collect::<Vec<_>>()
                    .join(", ");
                (city.trim().to_string(), country)
            }
            None => (destination.trim().to_string(), String::new()),
        }
    }

    pub(super) fn into_trip(
        self,
        id: String,
        icon: (TripIcon, Color),
        now: OffsetDateTime,
    ) -> Trip {
        let status = TripStatus::derive(self.start_date.as_deref(), self.end_date.as_deref(), now);
        let now_iso = util::format_timestamp(now);
        Trip {
            id,
            name: self.title,
            destination: self.destination_city,
            country: self.destination_country,
            icon: icon.0,
            icon_color: icon.1,
            start_date: self
                .start_date
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| now_iso.clone()),
            end_date: self.end_date.filter(|d| !d.is_empty()).unwrap_or(now_iso),
            status,
            collaborators: vec![Collaborator::local_owner()],
            total_budget: self.total_budget.map_or(0.0, util::finite_or_zero),
            spent_budget: 0.0,
            currency: default_currency(),
            cover_image: self.cover_image,
            itinerary: Vec::new(),
            packing_list: Vec::new(),
            is_offline_available: false,
        }
    }
}

/// Partial trip fields; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub destination: Option<String>,
    pub country: Option<String>,
    pub icon: Option<TripIcon>,
    pub icon_color: Option<Color>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<TripStatus>,
    pub collaborators: Option<Vec<Collaborator>>,
    pub total_budget: Option<f64>,
    pub spent_budget: Option<f64>,
    pub currency: Option<String>,
    pub cover_image: Option<Option<String>>,
    pub is_offline_available: Option<bool>,
}

impl TripUpdate {
    pub(super) fn apply(self, trip: &mut Trip) {
        if let Some(name) = self.name {
            trip.name = name;
        }
        if let Some(destination) = self.destination {
            trip.destination = destination;
        }
        if let Some(country) = self.country {
            trip.country = country;
        }
        if let Some(icon) = self.icon {
            trip.icon = icon;
        }
        if let Some(icon_color) = self.icon_color {
            trip.icon_color = icon_color;
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(status) = self.status {
            trip.status = status;
        }
        if let Some(collaborators) = self.collaborators {
            trip.collaborators = collaborators;
        }
        if let Some(total_budget) = self.total_budget {
            trip.total_budget = util::finite_or_zero(total_budget);
        }
        if let Some(spent_budget) = self.spent_budget {
            trip.spent_budget = util::finite_or_zero(spent_budget);
        }
        if let Some(currency) = self.currency {
            trip.currency = currency;
        }
        if let Some(cover_image) = self.cover_image {
            trip.cover_image = cover_image;
        }
        if let Some(offline) = self.is_offline_available {
            trip.is_offline_available = offline;
        }
    }
}

/// Tabs of the trips list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripFilter {
    #[default]
    Upcoming,
    Planning,
    Completed,
    All,
}

impl TripFilter {
    pub fn matches(&self, trip: &Trip) -> bool {
        match self {
            TripFilter::Upcoming => {
                matches!(trip.status, TripStatus::Upcoming | TripStatus::Ongoing)
            }
            TripFilter::Planning => trip.status == TripStatus::Planning,
            TripFilter::Completed => trip.status == TripStatus::Completed,
            TripFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    pub total: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percent_spent: i64,
    /// Fill ratio for a progress bar, clamped to `[0, 1]`.
    pub bar_ratio: f64,
}

impl BudgetSummary {
    pub fn new(total: f64, spent: f64) -> Self {
        let ratio = if total > 0.0 { spent / total } else { 0.0 };
        BudgetSummary {
            total,
            spent,
            remaining: total - spent,
            percent_spent: (ratio * 100.0).round() as i64,
            bar_ratio: ratio.clamp(0.0, 1.0),
        }
    }
}

pub trait TripRepository {
    fn create_trip(&self, draft: NewTrip) -> impl Future<Output = String>;
    fn update_trip(&self, id: &str, update: TripUpdate) -> impl Future<Output = Option<Trip>>;
    fn delete_trip(&self, id: &str) -> impl Future<Output = bool>;
    fn get_trips(&self) -> impl Future<Output = Vec<Trip>>;
    fn get_trip(&self, id: &str) -> impl Future<Output = Option<Trip>>;
    fn get_trips_filtered(&self, filter: TripFilter) -> impl Future<Output = Vec<Trip>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-06-15 12:00 UTC);

    #[test]
    fn status_without_both_dates_is_planning() {
        assert_eq!(TripStatus::derive(None, None, NOW), TripStatus::Planning);
        assert_eq!(
            TripStatus::derive(Some("2026-06-01"), None, NOW),
            TripStatus::Planning
        );
        assert_eq!(
            TripStatus::derive(Some(""), Some("2026-06-20"), NOW),
            TripStatus::Planning
        );
    }

    #[test]
    fn status_follows_the_date_range() {
        assert_eq!(
            TripStatus::derive(Some("2026-01-01"), Some("2026-01-10"), NOW),
            TripStatus::Completed
        );
        assert_eq!(
            TripStatus::derive(Some("2026-06-10"), Some("2026-06-20"), NOW),
            TripStatus::Ongoing
        );
        assert_eq!(
            TripStatus::derive(Some("2026-07-01"), Some("2026-07-10"), NOW),
            TripStatus::Upcoming
        );
    }

    #[test]
    fn status_range_is_inclusive() {
        let start = "2026-06-15T12:00:00Z";
        assert_eq!(
            TripStatus::derive(Some(start), Some(start), NOW),
            TripStatus::Ongoing
        );
    }

    #[test]
    fn destination_splits_at_first_comma() {
        assert_eq!(
            NewTrip::split_destination("Kyoto, Japan"),
            ("Kyoto".to_string(), "Japan".to_string())
        );
        assert_eq!(
            NewTrip::split_destination(" Austin , Texas,USA "),
            ("Austin".to_string(), "Texas, USA".to_string())
        );
        assert_eq!(
            NewTrip::split_destination("Lisbon "),
            ("Lisbon".to_string(), String::new())
        );
    }

    #[test]
    fn budget_summary_clamps_bar_only() {
        let over = BudgetSummary::new(1000.0, 1250.0);
        assert_eq!(over.remaining, -250.0);
        assert_eq!(over.percent_spent, 125);
        assert_eq!(over.bar_ratio, 1.0);

        let empty = BudgetSummary::new(0.0, 40.0);
        assert_eq!(empty.percent_spent, 0);
        assert_eq!(empty.bar_ratio, 0.0);
    }

    #[test]
    fn non_finite_budgets_are_stored_as_zero() {
        let mut trip = NewTrip::new("Rome", "Rome", "Italy")
            .with_budget(f64::INFINITY)
            .into_trip("t1".into(), crate::core::store::model::pick_icon(0), NOW);
        assert_eq!(trip.total_budget, 0.0);

        TripUpdate {
            total_budget: Some(f64::NAN),
            spent_budget: Some(f64::NEG_INFINITY),
            ..Default::default()
        }
        .apply(&mut trip);
        assert_eq!(trip.total_budget, 0.0);
        assert_eq!(trip.spent_budget, 0.0);
        assert!(serde_json::to_string(&trip).is_ok_and(|json| !json.contains("null")));
    }

    #[test]
    fn upcoming_filter_includes_ongoing() {
        let trip = NewTrip::new("Rome", "Rome", "Italy")
            .with_dates("2026-06-10", "2026-06-20")
            .into_trip("t1".into(), crate::core::store::model::pick_icon(0), NOW);
        assert_eq!(trip.status, TripStatus::Ongoing);
        assert!(TripFilter::Upcoming.matches(&trip));
        assert!(!TripFilter::Completed.matches(&trip));
        assert!(TripFilter::All.matches(&trip));
    }
}
