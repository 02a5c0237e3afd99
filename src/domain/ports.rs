use super::booking::Booking;
use super::cart::{AddToCart, Cart, CartItemPatch};
use super::ids::{BookingId, CartItemId, TourId};
use super::order::{
    CreateOrderRequest, GatewayOutcome, GatewayRequest, PendingOrder, VerifyPaymentRequest,
};
use super::tour::{Tour, TourPage, TourQuery};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The cart endpoints. Every call answers with the full, authoritative cart.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn fetch(&self) -> Result<Cart>;
    async fn add(&self, item: AddToCart) -> Result<Cart>;
    async fn update(&self, item_id: &CartItemId, patch: CartItemPatch) -> Result<Cart>;
    async fn remove(&self, item_id: &CartItemId) -> Result<Cart>;
    async fn clear(&self) -> Result<Cart>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<PendingOrder>;
    /// The server checks the gateway signature; the client never does.
    async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<()>;
    async fn my_bookings(&self) -> Result<Vec<Booking>>;
    async fn booking(&self, id: &BookingId) -> Result<Booking>;
    async fn cancel(&self, id: &BookingId, reason: String) -> Result<Booking>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TourApi: Send + Sync {
    async fn list(&self, query: TourQuery) -> Result<TourPage>;
    async fn get(&self, id: &TourId) -> Result<Tour>;
}

/// The external payment widget.
///
/// `open` suspends until the user either completes payment or dismisses the widget; there is
/// no timeout. An error means the widget could not be shown at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn open(&self, request: GatewayRequest) -> Result<GatewayOutcome>;
}

pub type SharedCartApi = Arc<dyn CartApi>;
pub type SharedBookingApi = Arc<dyn BookingApi>;
pub type SharedTourApi = Arc<dyn TourApi>;
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
