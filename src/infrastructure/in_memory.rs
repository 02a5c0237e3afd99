use crate::domain::booking::{Booking, BookingStatus, ETicket, PaymentStatus};
use crate::domain::cart::{AddToCart, Cart, CartItem, CartItemPatch};
use crate::domain::ids::{BookingId, CartItemId, OrderId, TourId};
use crate::domain::money::Price;
use crate::domain::order::{CreateOrderRequest, PendingOrder, VerifyPaymentRequest};
use crate::domain::ports::{BookingApi, CartApi, TourApi};
use crate::domain::tour::{
    Difficulty, Duration, GroupSize, Pagination, Rating, SortOrder, Tour, TourPage, TourQuery,
};
use crate::domain::traveler::Traveler;
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal_macros::dec;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

const PAGE_SIZE: usize = 12;

/// Publishable key handed out with sandbox orders.
pub const SANDBOX_KEY: &str = "rzp_test_sandbox";

/// The signature the sandbox accepts for a payment on `order_id`.
pub fn sandbox_signature(order_id: &OrderId, payment_id: &str) -> String {
    format!("sandbox:{order_id}:{payment_id}")
}

#[derive(Default)]
struct State {
    tours: Vec<Tour>,
    cart: Vec<CartItem>,
    /// Newest first, as the bookings endpoint returns them.
    bookings: Vec<Booking>,
    orders: HashMap<OrderId, BookingId>,
    sequence: u64,
    create_order_calls: usize,
    verify_calls: usize,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn tour(&self, id: &TourId) -> Result<&Tour> {
        self.tours
            .iter()
            .find(|tour| &tour.id == id)
            .ok_or_else(|| not_found("Tour not found"))
    }

    fn cart_view(&self) -> Cart {
        Cart {
            items: self.cart.clone(),
            total: self.cart.iter().map(|item| item.price).sum(),
        }
    }

    fn booking_mut(&mut self, id: &BookingId) -> Result<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|booking| &booking.id == id)
            .ok_or_else(|| not_found("Booking not found"))
    }
}

fn bad_request(message: impl Into<String>) -> StorefrontError {
    StorefrontError::Api {
        status: 400,
        message: Some(message.into()),
    }
}

fn not_found(message: &str) -> StorefrontError {
    StorefrontError::Api {
        status: 404,
        message: Some(message.to_string()),
    }
}

fn check_group(tour: &Tour, travelers: u32) -> Result<()> {
    if tour.group_size.admits(travelers) {
        Ok(())
    } else {
        Err(bad_request(format!(
            "Number of travelers must be between 1 and {}",
            tour.group_size.max
        )))
    }
}

fn check_departure(tour: &Tour, start_date: NaiveDate) -> Result<()> {
    if tour.start_dates.is_empty() || tour.start_dates.contains(&start_date) {
        Ok(())
    } else {
        Err(bad_request("Selected date is not available for this tour"))
    }
}

/// A self-contained booking service.
///
/// Implements the cart, booking and tour endpoints with the server's rules: line prices are
/// computed here, group sizes and departure dates are enforced, and payments are only
/// confirmed when the receipt carries [`sandbox_signature`]. Clones share the same state.
#[derive(Default, Clone)]
pub struct InMemoryStorefront {
    state: Arc<RwLock<State>>,
}

impl InMemoryStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tours(tours: Vec<Tour>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                tours,
                ..Default::default()
            })),
        }
    }

    /// A small catalog plus one booking still waiting for payment.
    pub fn with_demo_data() -> Self {
        let tours = demo_tours();
        let pending = tours.get(2).map(|tour| Booking {
            id: BookingId::new("bk_demo_1"),
            reference: Some("TRZ-DEMO-1".to_string()),
            tour: tour.summary(),
            travelers: vec![sandbox_traveler("Demo Traveler"), sandbox_traveler("Demo Companion")],
            start_date: tour
                .start_dates
                .first()
                .copied()
                .unwrap_or(NaiveDate::MIN),
            end_date: None,
            total_price: tour.quote(2),
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            special_requests: None,
            e_ticket: None,
        });
        Self {
            state: Arc::new(RwLock::new(State {
                tours,
                bookings: pending.into_iter().collect(),
                ..Default::default()
            })),
        }
    }

    pub async fn add_booking(&self, booking: Booking) {
        self.state.write().await.bookings.insert(0, booking);
    }

    pub async fn create_order_calls(&self) -> usize {
        self.state.read().await.create_order_calls
    }

    pub async fn verify_calls(&self) -> usize {
        self.state.read().await.verify_calls
    }
}

#[async_trait]
impl CartApi for InMemoryStorefront {
    async fn fetch(&self) -> Result<Cart> {
        Ok(self.state.read().await.cart_view())
    }

    async fn add(&self, item: AddToCart) -> Result<Cart> {
        let mut state = self.state.write().await;
        let tour = state.tour(&item.tour_id)?;
        check_group(tour, item.travelers)?;
        check_departure(tour, item.start_date)?;
        let summary = tour.summary();
        let price = tour.quote(item.travelers);

        let id = CartItemId::new(format!("item_{}", state.next_id()));
        debug!(item = %id, tour = %item.tour_id, "sandbox cart add");
        state.cart.push(CartItem {
            id,
            tour: summary,
            travelers: item.travelers,
            start_date: item.start_date,
            price,
        });
        Ok(state.cart_view())
    }

    async fn update(&self, item_id: &CartItemId, patch: CartItemPatch) -> Result<Cart> {
        let mut state = self.state.write().await;
        let index = state
            .cart
            .iter()
            .position(|item| &item.id == item_id)
            .ok_or_else(|| not_found("Cart item not found"))?;
        let line = &state.cart[index];
        let travelers = patch.travelers.unwrap_or(line.travelers);
        let start_date = patch.start_date.unwrap_or(line.start_date);

        let tour = state.tour(&line.tour.id)?;
        check_group(tour, travelers)?;
        check_departure(tour, start_date)?;
        let price = tour.quote(travelers);

        let line = &mut state.cart[index];
        line.travelers = travelers;
        line.start_date = start_date;
        line.price = price;
        Ok(state.cart_view())
    }

    async fn remove(&self, item_id: &CartItemId) -> Result<Cart> {
        let mut state = self.state.write().await;
        let before = state.cart.len();
        state.cart.retain(|item| &item.id != item_id);
        if state.cart.len() == before {
            return Err(not_found("Cart item not found"));
        }
        Ok(state.cart_view())
    }

    async fn clear(&self) -> Result<Cart> {
        let mut state = self.state.write().await;
        state.cart.clear();
        Ok(state.cart_view())
    }
}

#[async_trait]
impl BookingApi for InMemoryStorefront {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<PendingOrder> {
        let mut state = self.state.write().await;
        state.create_order_calls += 1;
        if request.travelers.is_empty() {
            return Err(bad_request("At least one traveler is required"));
        }
        if request.total_price <= Price::ZERO {
            return Err(bad_request("Invalid booking amount"));
        }
        let tour = state.tour(&request.tour_id)?;
        let summary = tour.summary();
        let end_date = request
            .start_date
            .checked_add_days(Days::new(u64::from(tour.duration.days)));

        let sequence = state.next_id();
        let booking_id = BookingId::new(format!("bk_{sequence}"));
        let order_id = OrderId::new(format!("order_{}", Uuid::new_v4().simple()));
        state.bookings.insert(
            0,
            Booking {
                id: booking_id.clone(),
                reference: Some(format!("TRZ-{sequence:05}")),
                tour: summary,
                travelers: request.travelers,
                start_date: request.start_date,
                end_date,
                total_price: request.total_price,
                booking_status: BookingStatus::Pending,
                payment_status: PaymentStatus::Pending,
                special_requests: request.special_requests,
                e_ticket: None,
            },
        );
        state.orders.insert(order_id.clone(), booking_id.clone());
        debug!(order = %order_id, booking = %booking_id, "sandbox order created");

        Ok(PendingOrder {
            order_id,
            booking_id,
            amount: request.total_price,
            currency: "INR".to_string(),
            key: SANDBOX_KEY.to_string(),
        })
    }

    async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<()> {
        let mut state = self.state.write().await;
        state.verify_calls += 1;
        match state.orders.get(&request.order_id) {
            Some(booking_id) if booking_id == &request.booking_id => {}
            _ => return Err(bad_request("Order does not match booking")),
        }
        if request.signature != sandbox_signature(&request.order_id, &request.payment_id) {
            return Err(bad_request("Invalid payment signature"));
        }

        let booking = state.booking_mut(&request.booking_id)?;
        booking.booking_status = BookingStatus::Confirmed;
        booking.payment_status = PaymentStatus::Completed;
        booking.e_ticket = Some(ETicket {
            issued: true,
            ticket_number: booking.reference.as_ref().map(|r| format!("ET-{r}")),
        });
        Ok(())
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.state.read().await.bookings.clone())
    }

    async fn booking(&self, id: &BookingId) -> Result<Booking> {
        let state = self.state.read().await;
        state
            .bookings
            .iter()
            .find(|booking| &booking.id == id)
            .cloned()
            .ok_or_else(|| not_found("Booking not found"))
    }

    async fn cancel(&self, id: &BookingId, reason: String) -> Result<Booking> {
        let mut state = self.state.write().await;
        let booking = state.booking_mut(id)?;
        if matches!(
            booking.booking_status,
            BookingStatus::Cancelled | BookingStatus::Completed
        ) {
            return Err(bad_request("This booking cannot be cancelled"));
        }
        debug!(booking = %id, %reason, "sandbox booking cancelled");
        booking.booking_status = BookingStatus::Cancelled;
        if booking.payment_status == PaymentStatus::Completed {
            booking.payment_status = PaymentStatus::Refunded;
        }
        Ok(booking.clone())
    }
}

fn matches_query(tour: &Tour, query: &TourQuery) -> bool {
    let contains = |haystack: &str, needle: &str| {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    };
    if let Some(search) = &query.search
        && !contains(&tour.title, search)
        && !tour.destinations.iter().any(|d| contains(d, search))
    {
        return false;
    }
    if let Some(destination) = &query.destination
        && !tour.destinations.iter().any(|d| contains(d, destination))
    {
        return false;
    }
    if let Some(tour_type) = &query.tour_type
        && !tour
            .tour_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(tour_type))
    {
        return false;
    }
    if query.min_price.is_some_and(|min| tour.price < min)
        || query.max_price.is_some_and(|max| tour.price > max)
    {
        return false;
    }
    if query.min_duration.is_some_and(|min| tour.duration.days < min)
        || query.max_duration.is_some_and(|max| tour.duration.days > max)
    {
        return false;
    }
    query
        .difficulty
        .is_none_or(|difficulty| tour.difficulty == Some(difficulty))
}

#[async_trait]
impl TourApi for InMemoryStorefront {
    async fn list(&self, query: TourQuery) -> Result<TourPage> {
        let state = self.state.read().await;
        let mut tours: Vec<Tour> = state
            .tours
            .iter()
            .filter(|tour| matches_query(tour, &query))
            .cloned()
            .collect();
        match query.sort {
            SortOrder::Featured => {}
            SortOrder::PriceLow => tours.sort_by_key(|tour| tour.price),
            SortOrder::PriceHigh => tours.sort_by_key(|tour| Reverse(tour.price)),
            SortOrder::DurationShort => tours.sort_by_key(|tour| tour.duration.days),
            SortOrder::Rating => {
                tours.sort_by(|a, b| b.rating.average.total_cmp(&a.rating.average))
            }
            SortOrder::Newest => tours.reverse(),
        }

        let total_tours = tours.len();
        let total_pages = total_tours.div_ceil(PAGE_SIZE);
        let page = query.page.max(1) as usize;
        let tours = tours
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();
        Ok(TourPage {
            tours,
            pagination: Pagination {
                current_page: page as u32,
                total_pages: total_pages as u32,
                total_tours: total_tours as u32,
            },
        })
    }

    async fn get(&self, id: &TourId) -> Result<Tour> {
        self.state.read().await.tour(id).cloned()
    }
}

/// Builds a catalog entry for the sandbox; also handy for tests.
pub fn sandbox_tour(id: &str, title: &str, price: Price, max_travelers: u32) -> Tour {
    Tour {
        id: TourId::new(id),
        title: title.to_string(),
        tour_code: None,
        destinations: vec![],
        tour_type: None,
        difficulty: None,
        price,
        original_price: None,
        duration: Duration { days: 5, nights: 4 },
        group_size: GroupSize {
            min: 1,
            max: max_travelers,
        },
        start_dates: vec![],
        rating: Rating::default(),
    }
}

fn demo_tours() -> Vec<Tour> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    vec![
        Tour {
            tour_code: Some("GOA-05".to_string()),
            destinations: vec!["Goa".to_string()],
            tour_type: Some("Beach".to_string()),
            difficulty: Some(Difficulty::Easy),
            original_price: Some(Price::new(dec!(12500))),
            start_dates: vec![date(2027, 1, 10), date(2027, 2, 14)],
            rating: Rating {
                average: 4.6,
                count: 212,
            },
            ..sandbox_tour("goa-beach-escape", "Goa Beach Escape", Price::new(dec!(10000)), 6)
        },
        Tour {
            tour_code: Some("LEH-08".to_string()),
            destinations: vec!["Leh".to_string(), "Ladakh".to_string()],
            tour_type: Some("Adventure".to_string()),
            difficulty: Some(Difficulty::Challenging),
            duration: Duration { days: 8, nights: 7 },
            start_dates: vec![date(2027, 6, 5), date(2027, 7, 3)],
            rating: Rating {
                average: 4.8,
                count: 96,
            },
            ..sandbox_tour(
                "ladakh-bike-expedition",
                "Ladakh Bike Expedition",
                Price::new(dec!(32000)),
                4,
            )
        },
        Tour {
            tour_code: Some("KER-04".to_string()),
            destinations: vec!["Alleppey".to_string(), "Kerala".to_string()],
            tour_type: Some("Family".to_string()),
            difficulty: Some(Difficulty::Easy),
            duration: Duration { days: 4, nights: 3 },
            start_dates: vec![date(2027, 3, 20)],
            rating: Rating {
                average: 4.4,
                count: 158,
            },
            ..sandbox_tour(
                "kerala-backwaters",
                "Kerala Backwaters Retreat",
                Price::new(dec!(18500)),
                8,
            )
        },
        Tour {
            tour_code: Some("RAJ-07".to_string()),
            destinations: vec!["Jaipur".to_string(), "Udaipur".to_string()],
            tour_type: Some("Heritage".to_string()),
            difficulty: Some(Difficulty::Moderate),
            duration: Duration { days: 7, nights: 6 },
            rating: Rating {
                average: 4.5,
                count: 74,
            },
            ..sandbox_tour(
                "rajasthan-heritage",
                "Rajasthan Heritage Trail",
                Price::new(dec!(24000)),
                10,
            )
        },
    ]
}

/// A traveler record that passes the server's checks; used for seeded data and tests.
pub fn sandbox_traveler(name: &str) -> Traveler {
    Traveler {
        name: name.to_string(),
        age: 30,
        gender: crate::domain::traveler::Gender::Other,
        document_type: Default::default(),
        document_number: "P0000000".to_string(),
        emergency_contact: Default::default(),
    }
}
