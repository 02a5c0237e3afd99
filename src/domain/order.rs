use super::calendar;
use super::ids::{BookingId, OrderId, TourId};
use super::money::Price;
use super::traveler::{Traveler, UserProfile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /bookings/create-order`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub tour_id: TourId,
    pub travelers: Vec<Traveler>,
    #[serde(with = "calendar")]
    pub start_date: NaiveDate,
    pub total_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// A server-side order awaiting payment.
///
/// Lives for one payment-widget interaction. If the user walks away the booking behind it
/// simply stays `Pending` on the server.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub order_id: OrderId,
    pub booking_id: BookingId,
    pub amount: Price,
    #[serde(default = "PendingOrder::default_currency")]
    pub currency: String,
    /// Publishable key the widget is opened with.
    #[serde(default)]
    pub key: String,
}

impl PendingOrder {
    fn default_currency() -> String {
        "INR".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl From<&UserProfile> for Prefill {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            contact: profile.phone.clone(),
        }
    }
}

/// Everything the payment widget is configured with.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct GatewayRequest {
    pub key: String,
    pub amount_minor: u64,
    pub currency: String,
    pub merchant: String,
    pub description: String,
    pub order_id: OrderId,
    pub prefill: Prefill,
}

/// The signed identifiers the widget hands back after a successful payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct GatewayReceipt {
    pub order_id: OrderId,
    pub payment_id: String,
    pub signature: String,
}

/// How the user left the payment widget.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GatewayOutcome {
    Paid(GatewayReceipt),
    Dismissed,
}

/// Body of `POST /bookings/verify-payment`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "razorpay_order_id")]
    pub order_id: OrderId,
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
    #[serde(rename = "bookingId")]
    pub booking_id: BookingId,
}

impl VerifyPaymentRequest {
    pub fn new(receipt: GatewayReceipt, booking_id: BookingId) -> Self {
        Self {
            order_id: receipt.order_id,
            payment_id: receipt.payment_id,
            signature: receipt.signature,
            booking_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pending_order_defaults() {
        let json = r#"{ "orderId": "order_abc", "bookingId": "b-1", "amount": 20000 }"#;
        let order: PendingOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.currency, "INR");
        assert_eq!(order.amount, Price::new(dec!(20000)));
        assert!(order.key.is_empty());
    }

    #[test]
    fn test_verify_request_wire_names() {
        let receipt = GatewayReceipt {
            order_id: OrderId::new("order_abc"),
            payment_id: "pay_1".to_string(),
            signature: "sig".to_string(),
        };
        let body = VerifyPaymentRequest::new(receipt, BookingId::new("b-1"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["razorpay_order_id"], "order_abc");
        assert_eq!(json["razorpay_payment_id"], "pay_1");
        assert_eq!(json["razorpay_signature"], "sig");
        assert_eq!(json["bookingId"], "b-1");
    }
}
