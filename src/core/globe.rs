//! Per-country aggregation of completed trips for the globe screen.

use std::collections::HashMap;

use crate::core::store::{Trip, TripStatus};

/// UN member and observer states, the denominator of the coverage figure.
pub const TOTAL_COUNTRIES_WORLD: usize = 195;

const COUNTRY_CODES: &[(&str, &str)] = &[
    ("Argentina", "AR"),
    ("Australia", "AU"),
    ("Austria", "AT"),
    ("Belgium", "BE"),
    ("Brazil", "BR"),
    ("Canada", "CA"),
    ("Chile", "CL"),
    ("China", "CN"),
    ("Croatia", "HR"),
    ("Czech Republic", "CZ"),
    ("Denmark", "DK"),
    ("Egypt", "EG"),
    ("Finland", "FI"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Greece", "GR"),
    ("Iceland", "IS"),
    ("India", "IN"),
    ("Indonesia", "ID"),
    ("Ireland", "IE"),
    ("Italy", "IT"),
    ("Japan", "JP"),
    ("Kenya", "KE"),
    ("Mexico", "MX"),
    ("Morocco", "MA"),
    ("Netherlands", "NL"),
    ("New Zealand", "NZ"),
    ("Norway", "NO"),
    ("Peru", "PE"),
    ("Philippines", "PH"),
    ("Portugal", "PT"),
    ("South Africa", "ZA"),
    ("South Korea", "KR"),
    ("Spain", "ES"),
    ("Sweden", "SE"),
    ("Switzerland", "CH"),
    ("Thailand", "TH"),
    ("Turkey", "TR"),
    ("United Arab Emirates", "AE"),
    ("United Kingdom", "GB"),
    ("United States", "US"),
    ("USA", "US"),
    ("UK", "GB"),
    ("Vietnam", "VN"),
];

/// ISO 3166 alpha-2 code for a country name, matched case-insensitively.
pub fn country_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    COUNTRY_CODES
        .iter()
        .find(|(country, _)| country.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitedTrip {
    pub id: String,
    pub name: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub nights: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryGroup {
    pub country: String,
    /// Empty when the country is not in the lookup table.
    pub country_code: String,
    pub trips: Vec<VisitedTrip>,
    pub total_nights: u32,
}

impl CountryGroup {
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }
}

/// Group completed trips by country, alphabetically by country name.
/// Trips without a country are skipped.
pub fn group_by_country<'a, I>(trips: I) -> Vec<CountryGroup>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let mut groups: HashMap<&str, CountryGroup> = HashMap::new();
    for trip in trips {
        if trip.status != TripStatus::Completed || trip.country.is_empty() {
            continue;
        }
        let nights = trip.nights();
        let group = groups.entry(trip.country.as_str()).or_insert_with(|| CountryGroup {
            country: trip.country.clone(),
            country_code: country_code(&trip.country).unwrap_or_default().to_string(),
            trips: Vec::new(),
            total_nights: 0,
        });
        group.total_nights += nights;
        group.trips.push(VisitedTrip {
            id: trip.id.clone(),
            name: trip.name.clone(),
            destination: trip.destination.clone(),
            start_date: trip.start_date.clone(),
            end_date: trip.end_date.clone(),
            nights,
        });
    }

    let mut groups: Vec<CountryGroup> = groups.into_values().collect();
    groups.sort_by(|a, b| {
        a.country
            .to_lowercase()
            .cmp(&b.country.to_lowercase())
            .then_with(|| a.country.cmp(&b.country))
    });
    groups
}

pub fn world_percent(visited_countries: usize) -> u32 {
    ((visited_countries as f64 / TOTAL_COUNTRIES_WORLD as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobeSummary {
    pub countries: Vec<CountryGroup>,
    pub visited_codes: Vec<String>,
    pub world_percent: u32,
    pub total_nights: u32,
}

impl GlobeSummary {
    pub fn from_trips<'a, I>(trips: I) -> Self
    where
        I: IntoIterator<Item = &'a Trip>,
    {
        let trips: Vec<&Trip> = trips.into_iter().collect();
        let countries = group_by_country(trips.iter().copied());
        let visited_codes = countries
            .iter()
            .filter(|group| !group.country_code.is_empty())
            .map(|group| group.country_code.clone())
            .collect();
        GlobeSummary {
            world_percent: world_percent(countries.len()),
            // Every completed trip counts, with or without a country.
            total_nights: trips
                .iter()
                .filter(|trip| trip.status == TripStatus::Completed)
                .map(|trip| trip.nights())
                .sum(),
            visited_codes,
            countries,
        }
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{Collaborator, TripIcon, Color};

    fn trip(id: &str, country: &str, start: &str, end: &str, status: TripStatus) -> Trip {
        Trip {
            id: id.to_string(),
            name: format!("Trip {}", id),
            destination: "Somewhere".to_string(),
            country: country.to_string(),
            icon: TripIcon::Sun,
            icon_color: Color::rgb(0x5F, 0x4B, 0x32),
            start_date: start.to_string(),
            end_date: end.to_string(),
            status,
            collaborators: vec![Collaborator::local_owner()],
            total_budget: 0.0,
            spent_budget: 0.0,
            currency: "USD".to_string(),
            cover_image: None,
            itinerary: Vec::new(),
            packing_list: Vec::new(),
            is_offline_available: false,
        }
    }

    #[test]
    fn groups_completed_trips_by_country() {
        let trips = vec![
            trip("a", "Japan", "2025-04-01", "2025-04-08", TripStatus::Completed),
            trip("b", "italy", "2025-06-01", "2025-06-03", TripStatus::Completed),
            trip("c", "Japan", "2025-10-01", "2025-10-04T06:00:00Z", TripStatus::Completed),
            trip("d", "France", "2026-10-01", "2026-10-04", TripStatus::Upcoming),
            trip("e", "", "2025-01-01", "2025-01-02", TripStatus::Completed),
        ];
        let groups = group_by_country(&trips);
        let names: Vec<_> = groups.iter().map(|g| g.country.as_str()).collect();
        assert_eq!(names, vec!["italy", "Japan"]);
        assert_eq!(groups[0].country_code, "IT");
        assert_eq!(groups[1].trip_count(), 2);
        assert_eq!(groups[1].total_nights, 7 + 4);
    }

    #[test]
    fn inverted_dates_count_zero_nights() {
        let trips = vec![trip("a", "Peru", "2025-04-08", "2025-04-01", TripStatus::Completed)];
        assert_eq!(group_by_country(&trips)[0].total_nights, 0);
    }

    #[test]
    fn summary_reports_world_coverage() {
        let trips = vec![
            trip("a", "Japan", "2025-04-01", "2025-04-08", TripStatus::Completed),
            trip("b", "Atlantis", "2025-06-01", "2025-06-03", TripStatus::Completed),
            trip("c", "", "2025-08-01", "2025-08-06", TripStatus::Completed),
            trip("d", "", "2026-08-01", "2026-08-06", TripStatus::Upcoming),
        ];
        let summary = GlobeSummary::from_trips(&trips);
        assert_eq!(summary.country_count(), 2);
        assert_eq!(summary.visited_codes, vec!["JP".to_string()]);
        assert_eq!(summary.world_percent, 1);
        assert_eq!(summary.total_nights, 7 + 2 + 5);
        assert_eq!(world_percent(0), 0);
        assert_eq!(world_percent(20), 10);
        assert_eq!(world_percent(195), 100);
    }

    #[test]
    fn country_lookup_ignores_case() {
        assert_eq!(country_code("japan"), Some("JP"));
        assert_eq!(country_code(" United Kingdom "), Some("GB"));
        assert_eq!(country_code("Narnia"), None);
    }
}
