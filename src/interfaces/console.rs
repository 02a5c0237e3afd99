use crate::domain::order::{GatewayOutcome, GatewayReceipt, GatewayRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::sync::Mutex;

/// A payment widget driven by a person at a terminal.
///
/// Shows the order, then asks for the payment id and signature returned by the hosted
/// checkout page. Answering anything but `p` at the first prompt, or closing the input,
/// dismisses the widget.
pub struct ConsoleGateway<R, W> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead + Send, W: Write + Send> ConsoleGateway<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[async_trait]
impl<R: BufRead + Send, W: Write + Send> PaymentGateway for ConsoleGateway<R, W> {
    async fn open(&self, request: GatewayRequest) -> Result<GatewayOutcome> {
        let mut guard = self.io.lock().map_err(|_| {
            StorefrontError::GatewayUnavailable("console is unavailable".to_string())
        })?;
        let (input, output) = &mut *guard;

        let amount = Decimal::from(request.amount_minor) / Decimal::ONE_HUNDRED;
        writeln!(output, "{} | {}", request.merchant, request.description)?;
        writeln!(
            output,
            "Order {} for {} {}",
            request.order_id,
            request.currency,
            amount.normalize()
        )?;
        writeln!(output, "Key: {}", request.key)?;

        let choice = prompt(input, output, "[p]ay or [c]ancel: ")?;
        if !choice.is_some_and(|c| c.eq_ignore_ascii_case("p")) {
            return Ok(GatewayOutcome::Dismissed);
        }
        let Some(payment_id) = prompt(input, output, "Payment id: ")? else {
            return Ok(GatewayOutcome::Dismissed);
        };
        let Some(signature) = prompt(input, output, "Signature: ")? else {
            return Ok(GatewayOutcome::Dismissed);
        };
        Ok(GatewayOutcome::Paid(GatewayReceipt {
            order_id: request.order_id,
            payment_id,
            signature,
        }))
    }
}
