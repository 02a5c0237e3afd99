use super::calendar;
use super::ids::TourId;
use super::money::Price;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct GroupSize {
    #[serde(default = "GroupSize::default_min")]
    pub min: u32,
    pub max: u32,
}

impl GroupSize {
    fn default_min() -> u32 {
        1
    }

    /// Whether `travelers` fits the group limits a single booking may take.
    pub fn admits(&self, travelers: u32) -> bool {
        travelers >= 1 && travelers <= self.max
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct Duration {
    pub days: u32,
    #[serde(default)]
    pub nights: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Rating {
    #[serde(default)]
    pub average: f32,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Difficulty {
    Easy,
    Moderate,
    Challenging,
    Expert,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Challenging => "Challenging",
            Difficulty::Expert => "Expert",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "moderate" => Ok(Difficulty::Moderate),
            "challenging" => Ok(Difficulty::Challenging),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A sellable travel package, as served by `GET /tours/:id`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id", alias = "id")]
    pub id: TourId,
    pub title: String,
    #[serde(default)]
    pub tour_code: Option<String>,
    #[serde(default)]
    pub destinations: Vec<String>,
    #[serde(default)]
    pub tour_type: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub duration: Duration,
    pub group_size: GroupSize,
    #[serde(default, with = "calendar::list")]
    pub start_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub rating: Rating,
}

impl Tour {
    /// Price of booking this tour for `travelers` people.
    pub fn quote(&self, travelers: u32) -> Price {
        self.price * travelers
    }

    pub fn summary(&self) -> TourSummary {
        TourSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            price: Some(self.price),
            group_size: Some(self.group_size),
        }
    }
}

/// The slice of a tour embedded in cart lines and bookings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TourSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: TourId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub group_size: Option<GroupSize>,
}

impl TourSummary {
    pub fn max_travelers(&self) -> Option<u32> {
        self.group_size.map(|size| size.max)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum SortOrder {
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    DurationShort,
    Rating,
    Newest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Featured => "featured",
            SortOrder::PriceLow => "price-low",
            SortOrder::PriceHigh => "price-high",
            SortOrder::DurationShort => "duration-short",
            SortOrder::Rating => "rating",
            SortOrder::Newest => "newest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "featured" => Ok(SortOrder::Featured),
            "price-low" => Ok(SortOrder::PriceLow),
            "price-high" => Ok(SortOrder::PriceHigh),
            "duration-short" => Ok(SortOrder::DurationShort),
            "rating" => Ok(SortOrder::Rating),
            "newest" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Catalog filters for `GET /tours`.
///
/// Changing any filter sends the listing back to the first page; only [`TourQuery::with_page`]
/// moves between pages.
#[derive(Debug, PartialEq, Clone)]
pub struct TourQuery {
    pub search: Option<String>,
    pub destination: Option<String>,
    pub tour_type: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub sort: SortOrder,
    pub page: u32,
}

impl Default for TourQuery {
    fn default() -> Self {
        Self {
            search: None,
            destination: None,
            tour_type: None,
            min_price: None,
            max_price: None,
            min_duration: None,
            max_duration: None,
            difficulty: None,
            sort: SortOrder::Featured,
            page: 1,
        }
    }
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value.trim().to_string())
    }
}

impl TourQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(search);
        self.page = 1;
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = non_blank(destination);
        self.page = 1;
        self
    }

    pub fn with_tour_type(mut self, tour_type: impl Into<String>) -> Self {
        self.tour_type = non_blank(tour_type);
        self.page = 1;
        self
    }

    pub fn with_price_range(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self.page = 1;
        self
    }

    pub fn with_duration_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_duration = min;
        self.max_duration = max;
        self.page = 1;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self.page = 1;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Drops every filter, keeping nothing but the defaults.
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    /// Query-string pairs for the non-empty filters, in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(destination) = &self.destination {
            pairs.push(("destination", destination.clone()));
        }
        if let Some(tour_type) = &self.tour_type {
            pairs.push(("tourType", tour_type.clone()));
        }
        if let Some(min_price) = self.min_price {
            pairs.push(("minPrice", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("maxPrice", max_price.to_string()));
        }
        if let Some(min_duration) = self.min_duration {
            pairs.push(("minDuration", min_duration.to_string()));
        }
        if let Some(max_duration) = self.max_duration {
            pairs.push(("maxDuration", max_duration.to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.to_string()));
        }
        pairs.push(("sort", self.sort.to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_tours: u32,
}

/// One page of the catalog listing.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct TourPage {
    #[serde(default)]
    pub tours: Vec<Tour>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_query_only_sends_sort_and_page() {
        let pairs = TourQuery::new().to_query_pairs();
        assert_eq!(
            pairs,
            vec![("sort", "featured".to_string()), ("page", "1".to_string())]
        );
    }

    #[test]
    fn test_filter_change_resets_page() {
        let query = TourQuery::new().with_page(4).with_destination("Ladakh");
        assert_eq!(query.page, 1);

        let query = query.with_page(3);
        assert_eq!(query.page, 3);
        assert_eq!(query.destination.as_deref(), Some("Ladakh"));
    }

    #[test]
    fn test_blank_filters_are_skipped() {
        let query = TourQuery::new()
            .with_search("   ")
            .with_tour_type("Beach")
            .with_price_range(Some(Price::new(dec!(5000))), None)
            .with_difficulty(Some(Difficulty::Moderate))
            .with_sort(SortOrder::PriceLow);

        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("tourType", "Beach".to_string()),
                ("minPrice", "5000".to_string()),
                ("difficulty", "Moderate".to_string()),
                ("sort", "price-low".to_string()),
                ("page", "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_cleared_restores_defaults() {
        let query = TourQuery::new()
            .with_search("goa")
            .with_sort(SortOrder::Rating)
            .with_page(2);
        assert_eq!(query.cleared(), TourQuery::default());
    }

    #[test]
    fn test_tour_deserialization() {
        let json = r#"{
            "_id": "t-100",
            "title": "Spiti Valley Circuit",
            "destinations": ["Manali", "Kaza"],
            "tourType": "Mountain",
            "difficulty": "Challenging",
            "price": 10000,
            "duration": { "days": 7, "nights": 6 },
            "groupSize": { "min": 1, "max": 12 },
            "startDates": ["2026-05-01T00:00:00.000Z", "2026-06-01"],
            "rating": { "average": 4.7, "count": 31 }
        }"#;

        let tour: Tour = serde_json::from_str(json).unwrap();
        assert_eq!(tour.id, TourId::new("t-100"));
        assert_eq!(tour.difficulty, Some(Difficulty::Challenging));
        assert_eq!(tour.group_size.max, 12);
        assert_eq!(tour.start_dates.len(), 2);
        assert_eq!(tour.quote(2), Price::new(dec!(20000)));
        assert!(tour.group_size.admits(12));
        assert!(!tour.group_size.admits(13));
        assert!(!tour.group_size.admits(0));
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price-high".parse::<SortOrder>(), Ok(SortOrder::PriceHigh));
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
