use super::calendar;
use super::ids::{CartItemId, TourId};
use super::money::Price;
use super::tour::TourSummary;
use crate::error::StorefrontError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One pending selection: a tour, a party size and a departure date.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: CartItemId,
    pub tour: TourSummary,
    pub travelers: u32,
    #[serde(with = "calendar")]
    pub start_date: NaiveDate,
    pub price: Price,
}

/// The server's view of the user's cart.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Price,
}

impl Cart {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the line prices, which is what checkout charges.
    pub fn line_total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn traveler_count(&self) -> u32 {
        self.items.iter().map(|item| item.travelers).sum()
    }

    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

/// Body of `POST /cart/add`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub tour_id: TourId,
    pub travelers: u32,
    #[serde(with = "calendar")]
    pub start_date: NaiveDate,
}

impl AddToCart {
    pub fn new(
        tour_id: TourId,
        travelers: u32,
        start_date: NaiveDate,
    ) -> Result<Self, StorefrontError> {
        check_travelers(travelers, None)?;
        Ok(Self {
            tour_id,
            travelers,
            start_date,
        })
    }
}

/// Body of `PUT /cart/item/:id`; absent fields are left as they are.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "calendar::option"
    )]
    pub start_date: Option<NaiveDate>,
}

impl CartItemPatch {
    pub fn travelers(travelers: u32) -> Self {
        Self {
            travelers: Some(travelers),
            start_date: None,
        }
    }

    pub fn start_date(start_date: NaiveDate) -> Self {
        Self {
            travelers: None,
            start_date: Some(start_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.travelers.is_none() && self.start_date.is_none()
    }
}

/// Enforces `1 <= travelers <= max` when the tour's group limit is known.
pub fn check_travelers(travelers: u32, max: Option<u32>) -> Result<(), StorefrontError> {
    if travelers == 0 {
        return Err(StorefrontError::ValidationError(
            "At least one traveler is required".to_string(),
        ));
    }
    if let Some(max) = max
        && travelers > max
    {
        return Err(StorefrontError::ValidationError(format!(
            "This tour takes at most {max} travelers per booking"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cart_deserialization_and_totals() {
        let json = r#"{
            "items": [
                {
                    "_id": "line-1",
                    "tour": { "_id": "t-1", "title": "Goa Beach Escape", "price": 10000,
                              "groupSize": { "min": 1, "max": 6 } },
                    "travelers": 2,
                    "startDate": "2026-12-20T00:00:00.000Z",
                    "price": 20000
                },
                {
                    "_id": "line-2",
                    "tour": { "_id": "t-2", "title": "Kerala Backwaters" },
                    "travelers": 1,
                    "startDate": "2027-01-05",
                    "price": 8500.5
                }
            ],
            "total": 28500.5
        }"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.traveler_count(), 3);
        assert_eq!(cart.line_total(), Price::new(dec!(28500.5)));
        assert_eq!(cart.total, cart.line_total());
        assert_eq!(cart.items[0].tour.max_travelers(), Some(6));
        assert_eq!(cart.items[1].tour.max_travelers(), None);
        assert_eq!(
            cart.items[0].start_date,
            NaiveDate::from_ymd_opt(2026, 12, 20).unwrap()
        );
    }

    #[test]
    fn test_empty_cart_payload() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.line_total(), Price::ZERO);
    }

    #[test]
    fn test_patch_only_serializes_present_fields() {
        let patch = CartItemPatch::travelers(3);
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"travelers":3}"#
        );

        let patch = CartItemPatch::start_date(NaiveDate::from_ymd_opt(2026, 4, 2).unwrap());
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"startDate":"2026-04-02"}"#
        );
    }

    #[test]
    fn test_traveler_bounds() {
        assert!(check_travelers(1, Some(1)).is_ok());
        assert!(check_travelers(0, None).is_err());
        assert!(check_travelers(7, Some(6)).is_err());
        assert!(check_travelers(40, None).is_ok());
    }
}
