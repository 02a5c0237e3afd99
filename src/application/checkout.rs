use super::cart_store::CartStore;
use super::payment::PaymentReconciler;
use crate::domain::cart::{CartItem, check_travelers};
use crate::domain::ids::BookingId;
use crate::domain::money::Price;
use crate::domain::order::{CreateOrderRequest, GatewayOutcome, PendingOrder};
use crate::domain::tour::{Tour, TourSummary};
use crate::domain::traveler::{Session, TravelerDraft, validate_all};
use crate::error::{Result, StorefrontError};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a checkout's lines come from.
#[derive(Debug, Clone)]
pub enum CheckoutSource {
    /// Everything in the user's cart; the cart is cleared once payment is verified.
    Cart(Vec<CartItem>),
    /// A single tour bought straight from its page, bypassing the cart.
    Direct {
        tour: Tour,
        travelers: u32,
        start_date: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine {
    pub tour: TourSummary,
    pub travelers: u32,
    pub start_date: NaiveDate,
    pub price: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The user closed the payment widget.
    Cancelled,
    /// The server rejected the widget's receipt.
    VerificationFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    CollectingTravelerInfo,
    AwaitingPaymentOrder,
    AwaitingGatewayResult { order: PendingOrder },
    Verifying { booking_id: BookingId },
    Done { booking_id: BookingId },
    Failed { booking_id: BookingId, reason: FailureReason },
}

/// Result of a verified checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub booking_id: BookingId,
}

impl Confirmation {
    /// Where the user lands after paying.
    pub fn redirect_path(&self) -> String {
        format!("/user/booking-success/{}", self.booking_id)
    }
}

/// Drives one checkout from traveler details to a verified booking.
///
/// `pay` takes `&mut self`, so a checkout can never have two payment attempts in flight.
pub struct CheckoutOrchestrator {
    lines: Vec<CheckoutLine>,
    from_cart: bool,
    travelers: Vec<TravelerDraft>,
    special_requests: Option<String>,
    state: CheckoutState,
    session: Session,
    reconciler: Arc<PaymentReconciler>,
    cart: Arc<CartStore>,
}

impl CheckoutOrchestrator {
    pub fn new(
        source: CheckoutSource,
        session: Session,
        reconciler: Arc<PaymentReconciler>,
        cart: Arc<CartStore>,
    ) -> Result<Self> {
        let (lines, from_cart) = match source {
            CheckoutSource::Cart(items) => {
                let lines: Vec<CheckoutLine> = items
                    .into_iter()
                    .map(|item| CheckoutLine {
                        tour: item.tour,
                        travelers: item.travelers,
                        start_date: item.start_date,
                        price: item.price,
                    })
                    .collect();
                (lines, true)
            }
            CheckoutSource::Direct {
                tour,
                travelers,
                start_date,
            } => {
                check_travelers(travelers, Some(tour.group_size.max))?;
                let line = CheckoutLine {
                    price: tour.quote(travelers),
                    tour: tour.summary(),
                    travelers,
                    start_date,
                };
                (vec![line], false)
            }
        };

        if lines.is_empty() {
            return Err(StorefrontError::ValidationError(
                "Your cart is empty".to_string(),
            ));
        }

        let traveler_count: u32 = lines.iter().map(|line| line.travelers).sum();
        let travelers = TravelerDraft::roster(traveler_count as usize, &session.profile);

        Ok(Self {
            lines,
            from_cart,
            travelers,
            special_requests: None,
            state: CheckoutState::CollectingTravelerInfo,
            session,
            reconciler,
            cart,
        })
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn lines(&self) -> &[CheckoutLine] {
        &self.lines
    }

    /// Aggregate price across all lines.
    pub fn payable(&self) -> Price {
        self.lines.iter().map(|line| line.price).sum()
    }

    pub fn travelers(&self) -> &[TravelerDraft] {
        &self.travelers
    }

    /// One form per traveler, sized to the total party across all lines.
    pub fn travelers_mut(&mut self) -> &mut [TravelerDraft] {
        &mut self.travelers
    }

    /// Fills the traveler forms in order; rows beyond the party size are ignored.
    pub fn fill_travelers(&mut self, drafts: impl IntoIterator<Item = TravelerDraft>) {
        for (slot, draft) in self.travelers.iter_mut().zip(drafts) {
            *slot = draft;
        }
    }

    pub fn set_special_requests(&mut self, requests: impl Into<String>) {
        let requests = requests.into();
        self.special_requests = if requests.trim().is_empty() {
            None
        } else {
            Some(requests)
        };
    }

    /// Sends a failed checkout back to the traveler form so the user can try again.
    pub fn retry(&mut self) -> Result<()> {
        match self.state {
            CheckoutState::Failed { .. } => {
                self.transition(CheckoutState::CollectingTravelerInfo);
                Ok(())
            }
            _ => Err(StorefrontError::InvalidState(
                "only a failed checkout can be retried".to_string(),
            )),
        }
    }

    /// Runs the payment sequence: validate, create the order, open the widget, verify.
    pub async fn pay(&mut self) -> Result<Confirmation> {
        if self.state != CheckoutState::CollectingTravelerInfo {
            return Err(StorefrontError::InvalidState(format!(
                "cannot start payment from {:?}",
                self.state
            )));
        }

        let travelers = validate_all(&self.travelers)?;
        let first = self
            .lines
            .first()
            .cloned()
            .ok_or_else(|| StorefrontError::InvalidState("checkout has no lines".to_string()))?;

        self.transition(CheckoutState::AwaitingPaymentOrder);
        let request = CreateOrderRequest {
            tour_id: first.tour.id.clone(),
            travelers,
            start_date: first.start_date,
            total_price: self.payable(),
            special_requests: self.special_requests.clone(),
        };
        let order = match self.reconciler.create_order(request).await {
            Ok(order) => order,
            Err(e) => {
                self.transition(CheckoutState::CollectingTravelerInfo);
                return Err(e);
            }
        };

        let description = format!("Booking for {}", first.tour.title);
        let gateway_request =
            match self
                .reconciler
                .gateway_request(&order, description, &self.session.profile)
            {
                Ok(request) => request,
                Err(e) => {
                    self.transition(CheckoutState::CollectingTravelerInfo);
                    return Err(e);
                }
            };
        let booking_id = order.booking_id.clone();

        self.transition(CheckoutState::AwaitingGatewayResult { order });
        let outcome = match self.reconciler.collect(gateway_request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.transition(CheckoutState::CollectingTravelerInfo);
                return Err(e);
            }
        };

        let receipt = match outcome {
            GatewayOutcome::Dismissed => {
                self.transition(CheckoutState::Failed {
                    booking_id,
                    reason: FailureReason::Cancelled,
                });
                return Err(StorefrontError::PaymentCancelled);
            }
            GatewayOutcome::Paid(receipt) => receipt,
        };

        self.transition(CheckoutState::Verifying {
            booking_id: booking_id.clone(),
        });
        if let Err(e) = self.reconciler.verify(receipt, &booking_id).await {
            self.transition(CheckoutState::Failed {
                booking_id,
                reason: FailureReason::VerificationFailed,
            });
            return Err(e);
        }

        if self.from_cart
            && let Err(e) = self.cart.clear().await
        {
            warn!(error = %e, "booking confirmed but the cart could not be cleared");
        }

        info!(booking = %booking_id, "checkout complete");
        self.transition(CheckoutState::Done {
            booking_id: booking_id.clone(),
        });
        Ok(Confirmation { booking_id })
    }

    fn transition(&mut self, next: CheckoutState) {
        debug!(from = ?self.state, to = ?next, "checkout transition");
        self.state = next;
    }
}
