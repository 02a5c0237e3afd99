use super::payment::{PaymentReconciler, PaymentResult};
use crate::domain::booking::{Booking, BookingFilter, DashboardStats};
use crate::domain::ids::BookingId;
use crate::domain::order::CreateOrderRequest;
use crate::domain::ports::SharedBookingApi;
use crate::domain::traveler::Session;
use crate::error::{Result, StorefrontError};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

const RECENT_BOOKINGS: usize = 5;

/// The user's dashboard: headline figures plus the most recent bookings.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent: Vec<Booking>,
}

/// The user's view of their own bookings.
pub struct BookingDesk {
    api: SharedBookingApi,
    reconciler: Arc<PaymentReconciler>,
    session: Session,
}

impl BookingDesk {
    pub fn new(api: SharedBookingApi, reconciler: Arc<PaymentReconciler>, session: Session) -> Self {
        Self {
            api,
            reconciler,
            session,
        }
    }

    pub async fn my_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let bookings = self
            .api
            .my_bookings()
            .await
            .map_err(|e| e.into_request_failure("Failed to load bookings"))?;
        Ok(filter.apply(bookings))
    }

    pub async fn booking(&self, id: &BookingId) -> Result<Booking> {
        self.api
            .booking(id)
            .await
            .map_err(|e| e.into_request_failure("Failed to load booking details"))
    }

    pub async fn cancel(&self, id: &BookingId, reason: &str) -> Result<Booking> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(StorefrontError::ValidationError(
                "Please provide a reason for cancellation".to_string(),
            ));
        }
        let booking = self
            .api
            .cancel(id, reason.to_string())
            .await
            .map_err(|e| e.into_request_failure("Failed to cancel booking"))?;
        info!(booking = %id, "booking cancelled");
        Ok(booking)
    }

    /// Pays for a booking that was created but never paid.
    ///
    /// A fresh order is raised for the booking's tour, travelers, date and total, then
    /// settled through the same widget-and-verify sequence as checkout.
    pub async fn complete_payment(&self, booking: &Booking) -> Result<PaymentResult> {
        if !booking.awaiting_payment() {
            return Err(StorefrontError::InvalidState(format!(
                "booking {} is not awaiting payment",
                booking.id
            )));
        }
        let request = CreateOrderRequest {
            tour_id: booking.tour.id.clone(),
            travelers: booking.travelers.clone(),
            start_date: booking.start_date,
            total_price: booking.total_price,
            special_requests: None,
        };
        let description = format!("Payment for {}", booking.tour.title);
        self.reconciler
            .settle(request, description, &self.session.profile)
            .await
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        let bookings = self
            .api
            .my_bookings()
            .await
            .map_err(|e| e.into_request_failure("Failed to load bookings"))?;
        let stats = DashboardStats::from_bookings(&bookings, today);
        let recent = bookings.into_iter().take(RECENT_BOOKINGS).collect();
        Ok(Dashboard { stats, recent })
    }
}
