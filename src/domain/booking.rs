use super::calendar;
use super::ids::BookingId;
use super::money::Price;
use super::tour::TourSummary;
use super::traveler::Traveler;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ETicket {
    #[serde(default)]
    pub issued: bool,
    #[serde(default)]
    pub ticket_number: Option<String>,
}

/// Read-only snapshot of a server-owned booking.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", alias = "id")]
    pub id: BookingId,
    /// Human-facing booking reference, distinct from the record id.
    #[serde(default, rename = "bookingId")]
    pub reference: Option<String>,
    pub tour: TourSummary,
    #[serde(default)]
    pub travelers: Vec<Traveler>,
    #[serde(with = "calendar")]
    pub start_date: NaiveDate,
    #[serde(default, with = "calendar::option")]
    pub end_date: Option<NaiveDate>,
    pub total_price: Price,
    #[serde(default)]
    pub booking_status: BookingStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub e_ticket: Option<ETicket>,
}

impl Booking {
    /// Created but never paid for; the only state from which payment can be resumed.
    pub fn awaiting_payment(&self) -> bool {
        self.booking_status == BookingStatus::Pending
            && self.payment_status == PaymentStatus::Pending
    }
}

/// Status and free-text filter over the user's bookings list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingFilter {
    /// `None` means all statuses.
    pub status: Option<BookingStatus>,
    pub search: String,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status
            && booking.booking_status != status
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        booking.tour.title.to_lowercase().contains(&needle)
            || booking
                .reference
                .as_deref()
                .is_some_and(|reference| reference.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, bookings: Vec<Booking>) -> Vec<Booking> {
        bookings
            .into_iter()
            .filter(|booking| self.matches(booking))
            .collect()
    }
}

/// Figures shown on the user dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub upcoming_trips: usize,
    pub completed_trips: usize,
    pub total_spent: Price,
}

impl DashboardStats {
    pub fn from_bookings(bookings: &[Booking], today: NaiveDate) -> Self {
        let upcoming_trips = bookings
            .iter()
            .filter(|b| b.start_date > today && b.booking_status == BookingStatus::Confirmed)
            .count();
        let completed_trips = bookings
            .iter()
            .filter(|b| {
                b.end_date.is_some_and(|end| end < today)
                    && b.booking_status == BookingStatus::Completed
            })
            .count();
        let total_spent = bookings
            .iter()
            .filter(|b| b.payment_status == PaymentStatus::Completed)
            .map(|b| b.total_price)
            .sum();

        Self {
            total_bookings: bookings.len(),
            upcoming_trips,
            completed_trips,
            total_spent,
        }
    }
}
