use crate::domain::ids::BookingId;
use crate::domain::order::{
    CreateOrderRequest, GatewayOutcome, GatewayReceipt, GatewayRequest, PendingOrder, Prefill,
    VerifyPaymentRequest,
};
use crate::domain::ports::{SharedBookingApi, SharedPaymentGateway};
use crate::domain::traveler::UserProfile;
use crate::error::{Result, StorefrontError};
use tracing::{info, warn};

/// Bridges the storefront to the booking service and the payment widget.
///
/// Owns the fixed three-call sequence: create an order, hand it to the widget, and ask the
/// server to verify what the widget returned. Each step is exposed separately so callers can
/// track where a payment stands.
pub struct PaymentReconciler {
    bookings: SharedBookingApi,
    gateway: SharedPaymentGateway,
    merchant: String,
}

/// What came of a full payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResult {
    Verified { booking_id: BookingId },
    Cancelled { booking_id: BookingId },
}

impl PaymentReconciler {
    pub fn new(
        bookings: SharedBookingApi,
        gateway: SharedPaymentGateway,
        merchant: impl Into<String>,
    ) -> Self {
        Self {
            bookings,
            gateway,
            merchant: merchant.into(),
        }
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<PendingOrder> {
        let order = self
            .bookings
            .create_order(request)
            .await
            .map_err(|e| e.into_request_failure("Failed to initiate payment. Please try again."))?;
        info!(order = %order.order_id, booking = %order.booking_id, amount = %order.amount, "order created");
        Ok(order)
    }

    /// Widget configuration for `order`.
    pub fn gateway_request(
        &self,
        order: &PendingOrder,
        description: String,
        profile: &UserProfile,
    ) -> Result<GatewayRequest> {
        let amount_minor = order.amount.to_minor_units().ok_or_else(|| {
            StorefrontError::ValidationError(format!("Order amount {} is not payable", order.amount))
        })?;
        Ok(GatewayRequest {
            key: order.key.clone(),
            amount_minor,
            currency: order.currency.clone(),
            merchant: self.merchant.clone(),
            description,
            order_id: order.order_id.clone(),
            prefill: Prefill::from(profile),
        })
    }

    /// Opens the widget and waits for the user; there is no timeout.
    pub async fn collect(&self, request: GatewayRequest) -> Result<GatewayOutcome> {
        info!(order = %request.order_id, "opening payment gateway");
        self.gateway.open(request).await
    }

    /// Asks the server to check the receipt against the order it issued.
    pub async fn verify(&self, receipt: GatewayReceipt, booking_id: &BookingId) -> Result<()> {
        let request = VerifyPaymentRequest::new(receipt, booking_id.clone());
        self.bookings.verify_payment(request).await.map_err(|e| {
            warn!(booking = %booking_id, error = %e, "payment verification failed");
            StorefrontError::VerificationFailed
        })?;
        info!(booking = %booking_id, "payment verified");
        Ok(())
    }

    /// Runs all three steps back to back.
    pub async fn settle(
        &self,
        request: CreateOrderRequest,
        description: String,
        profile: &UserProfile,
    ) -> Result<PaymentResult> {
        let order = self.create_order(request).await?;
        let gateway_request = self.gateway_request(&order, description, profile)?;
        match self.collect(gateway_request).await? {
            GatewayOutcome::Dismissed => {
                info!(booking = %order.booking_id, "payment cancelled by user");
                Ok(PaymentResult::Cancelled {
                    booking_id: order.booking_id,
                })
            }
            GatewayOutcome::Paid(receipt) => {
                self.verify(receipt, &order.booking_id).await?;
                Ok(PaymentResult::Verified {
                    booking_id: order.booking_id,
                })
            }
        }
    }
}
