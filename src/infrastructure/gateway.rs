use super::in_memory::sandbox_signature;
use crate::domain::order::{GatewayOutcome, GatewayReceipt, GatewayRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// What the scripted user does when the widget opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayScript {
    /// Pays; the receipt carries a signature the sandbox accepts.
    Approve,
    /// Pays, but the receipt's signature will not verify.
    Decline,
    /// Closes the widget without paying.
    Dismiss,
    /// The widget never loads.
    Unavailable,
}

/// A payment widget that plays out a fixed script.
///
/// Each call to `open` consumes the next step; once the script runs out the last step
/// repeats. Every request seen is recorded.
pub struct ScriptedGateway {
    steps: Mutex<Vec<GatewayScript>>,
    seen: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new(script: GatewayScript) -> Self {
        Self::sequence(vec![script])
    }

    /// Plays `steps` in order; an empty script behaves like [`GatewayScript::Dismiss`].
    pub fn sequence(mut steps: Vec<GatewayScript>) -> Self {
        steps.reverse();
        Self {
            steps: Mutex::new(steps),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn next_step(&self) -> Result<GatewayScript> {
        let mut steps = self
            .steps
            .lock()
            .map_err(|_| StorefrontError::GatewayUnavailable("script poisoned".to_string()))?;
        let step = if steps.len() > 1 {
            steps.pop()
        } else {
            steps.last().copied()
        };
        Ok(step.unwrap_or(GatewayScript::Dismiss))
    }

    /// Requests the widget was opened with, oldest first.
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn open(&self, request: GatewayRequest) -> Result<GatewayOutcome> {
        let step = self.next_step()?;
        debug!(?step, order = %request.order_id, "scripted gateway opened");
        if step == GatewayScript::Unavailable {
            return Err(StorefrontError::GatewayUnavailable(
                "checkout script failed to load".to_string(),
            ));
        }
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }

        let payment_id = format!("pay_{}", Uuid::new_v4().simple());
        let outcome = match step {
            GatewayScript::Approve => GatewayOutcome::Paid(GatewayReceipt {
                signature: sandbox_signature(&request.order_id, &payment_id),
                order_id: request.order_id,
                payment_id,
            }),
            GatewayScript::Decline => GatewayOutcome::Paid(GatewayReceipt {
                signature: "invalid-signature".to_string(),
                order_id: request.order_id,
                payment_id,
            }),
            GatewayScript::Dismiss | GatewayScript::Unavailable => GatewayOutcome::Dismissed,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::OrderId;
    use crate::domain::order::Prefill;

    fn request() -> GatewayRequest {
        GatewayRequest {
            key: "rzp_test_sandbox".to_string(),
            amount_minor: 1_000_000,
            currency: "INR".to_string(),
            merchant: "Tripzybee".to_string(),
            description: "Booking".to_string(),
            order_id: OrderId::new("order_1"),
            prefill: Prefill::default(),
        }
    }

    #[tokio::test]
    async fn test_approve_signs_receipt() {
        let gateway = ScriptedGateway::new(GatewayScript::Approve);
        let GatewayOutcome::Paid(receipt) = gateway.open(request()).await.unwrap() else {
            panic!("expected a receipt");
        };
        assert_eq!(
            receipt.signature,
            sandbox_signature(&receipt.order_id, &receipt.payment_id)
        );
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_sequence_repeats_last_step() {
        let gateway = ScriptedGateway::sequence(vec![
            GatewayScript::Unavailable,
            GatewayScript::Dismiss,
        ]);
        assert!(matches!(
            gateway.open(request()).await,
            Err(StorefrontError::GatewayUnavailable(_))
        ));
        assert_eq!(
            gateway.open(request()).await.unwrap(),
            GatewayOutcome::Dismissed
        );
        assert_eq!(
            gateway.open(request()).await.unwrap(),
            GatewayOutcome::Dismissed
        );
        assert_eq!(gateway.requests().len(), 2);
    }
}
