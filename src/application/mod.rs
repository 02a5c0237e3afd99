//! Application layer: the storefront's use cases.
//!
//! [`Storefront`] is the explicit context object. It is built once from the ports and the
//! user's session and hands out the cart store, catalog, bookings desk and checkouts. Nothing
//! here reaches for global state.

pub mod bookings;
pub mod catalog;
pub mod cart_store;
pub mod checkout;
pub mod payment;

use crate::domain::ports::{SharedBookingApi, SharedCartApi, SharedPaymentGateway, SharedTourApi};
use crate::domain::traveler::Session;
use crate::error::Result;
use bookings::BookingDesk;
use cart_store::CartStore;
use catalog::TourCatalog;
use checkout::{CheckoutOrchestrator, CheckoutSource};
use payment::PaymentReconciler;
use std::sync::Arc;

pub struct Storefront {
    session: Session,
    cart: Arc<CartStore>,
    catalog: TourCatalog,
    bookings: BookingDesk,
    reconciler: Arc<PaymentReconciler>,
}

impl Storefront {
    pub fn new(
        cart_api: SharedCartApi,
        booking_api: SharedBookingApi,
        tour_api: SharedTourApi,
        gateway: SharedPaymentGateway,
        session: Session,
        merchant: impl Into<String>,
    ) -> Self {
        let reconciler = Arc::new(PaymentReconciler::new(
            booking_api.clone(),
            gateway,
            merchant,
        ));
        Self {
            cart: Arc::new(CartStore::new(cart_api)),
            catalog: TourCatalog::new(tour_api),
            bookings: BookingDesk::new(booking_api, reconciler.clone(), session.clone()),
            reconciler,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn catalog(&self) -> &TourCatalog {
        &self.catalog
    }

    pub fn bookings(&self) -> &BookingDesk {
        &self.bookings
    }

    /// Starts a checkout for the given lines.
    pub fn checkout(&self, source: CheckoutSource) -> Result<CheckoutOrchestrator> {
        CheckoutOrchestrator::new(
            source,
            self.session.clone(),
            self.reconciler.clone(),
            self.cart.clone(),
        )
    }

    /// Starts a checkout over whatever the cart currently holds on the server.
    pub async fn checkout_cart(&self) -> Result<CheckoutOrchestrator> {
        let cart = self.cart.fetch().await?;
        self.checkout(CheckoutSource::Cart(cart.items))
    }
}
