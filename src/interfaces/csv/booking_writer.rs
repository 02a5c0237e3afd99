use crate::domain::booking::Booking;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BookingRow<'a> {
    id: &'a str,
    reference: &'a str,
    tour: &'a str,
    start_date: String,
    travelers: usize,
    total: String,
    booking_status: String,
    payment_status: String,
}

impl<'a> From<&'a Booking> for BookingRow<'a> {
    fn from(booking: &'a Booking) -> Self {
        Self {
            id: booking.id.as_str(),
            reference: booking.reference.as_deref().unwrap_or_default(),
            tour: &booking.tour.title,
            start_date: booking.start_date.format("%Y-%m-%d").to_string(),
            travelers: booking.travelers.len(),
            total: booking.total_price.to_string(),
            booking_status: booking.booking_status.to_string(),
            payment_status: booking.payment_status.to_string(),
        }
    }
}

/// Writes bookings as CSV, one row per booking.
pub struct BookingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BookingWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_bookings<'a>(
        &mut self,
        bookings: impl IntoIterator<Item = &'a Booking>,
    ) -> Result<()> {
        for booking in bookings {
            self.writer.serialize(BookingRow::from(booking))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingStatus, PaymentStatus};
    use crate::domain::ids::{BookingId, TourId};
    use crate::domain::money::Price;
    use crate::domain::tour::TourSummary;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_header_and_rows() {
        let booking = Booking {
            id: BookingId::new("bk_1"),
            reference: Some("TRZ-00001".to_string()),
            tour: TourSummary {
                id: TourId::new("goa"),
                title: "Goa Beach Escape".to_string(),
                price: None,
                group_size: None,
            },
            travelers: vec![],
            start_date: NaiveDate::from_ymd_opt(2027, 1, 10).unwrap(),
            end_date: None,
            total_price: Price::new(dec!(20000.00)),
            booking_status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Completed,
            special_requests: None,
            e_ticket: None,
        };

        let mut out = Vec::new();
        BookingWriter::new(&mut out)
            .write_bookings([&booking])
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with(
            "id,reference,tour,start_date,travelers,total,booking_status,payment_status\n"
        ));
        assert!(text.contains("bk_1,TRZ-00001,Goa Beach Escape,2027-01-10,0,20000,Confirmed,Completed"));
    }
}
