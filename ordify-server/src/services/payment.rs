//! Mocked Stripe Payment Service
//!
//! Reproduces the Stripe test-mode contract closely enough for the
//! frontend: intent ids (`pi_<24 alnum>`), client secrets, cent amounts,
//! the published test-card table, and realistic processing delays.
//! Injected through ServerState so tests can shrink the delays.

use std::time::Duration;

use serde::Serialize;

const DEFAULT_CREATE_DELAY_MS: u64 = 500;
const DEFAULT_CONFIRM_DELAY_MS: u64 = 1000;

/// A mocked payment intent, shaped like Stripe's.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// Amount in cents
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

/// Result of a confirm call.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub payment_intent_id: String,
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    Succeeded { paid_at: i64 },
    Failed { error: String },
}

/// Mocked payment processor.
#[derive(Debug, Clone)]
pub struct PaymentService {
    create_delay: Duration,
    confirm_delay: Duration,
}

impl PaymentService {
    pub fn new() -> Self {
        Self {
            create_delay: Duration::from_millis(DEFAULT_CREATE_DELAY_MS),
            confirm_delay: Duration::from_millis(DEFAULT_CONFIRM_DELAY_MS),
        }
    }

    /// Custom processing delays (unit tests use zero).
    pub fn with_delays(create: Duration, confirm: Duration) -> Self {
        Self {
            create_delay: create,
            confirm_delay: confirm,
        }
    }

    /// Create a payment intent for the amount (in currency units, not cents).
    pub async fn create_payment_intent(&self, amount: f64, currency: &str) -> PaymentIntent {
        tokio::time::sleep(self.create_delay).await;

        let payment_intent_id = format!("pi_{}", random_alnum(24));
        let client_secret = format!("{payment_intent_id}_secret_{}", random_alnum(24));

        PaymentIntent {
            client_secret,
            payment_intent_id,
            // Stripe works in cents
            amount: (amount * 100.0).round() as i64,
            currency: currency.to_string(),
            status: "requires_payment_method".to_string(),
        }
    }

    /// Confirm a payment against the test-card table.
    pub async fn confirm_payment(&self, payment_intent_id: &str, card_number: &str) -> Confirmation {
        tokio::time::sleep(self.confirm_delay).await;

        let outcome = match validate_test_card(card_number) {
            Ok(brand) => {
                tracing::debug!(brand, payment_intent_id, "test card accepted");
                PaymentOutcome::Succeeded {
                    paid_at: shared::util::now_millis(),
                }
            }
            Err(error) => {
                tracing::debug!(error, payment_intent_id, "test card rejected");
                PaymentOutcome::Failed {
                    error: error.to_string(),
                }
            }
        };

        Confirmation {
            payment_intent_id: payment_intent_id.to_string(),
            outcome,
        }
    }
}

impl Default for PaymentService {
    fn default() -> Self {
        Self::new()
    }
}

/// Stripe's published test cards: https://stripe.com/docs/testing
/// Returns the brand on success, the decline code on failure.
fn validate_test_card(card_number: &str) -> Result<&'static str, &'static str> {
    let clean: String = card_number.chars().filter(|c| !c.is_whitespace()).collect();

    match clean.as_str() {
        "4242424242424242" => Ok("visa"),
        "4000056655665556" => Ok("visa_debit"),
        "5555555555554444" => Ok("mastercard"),
        "5200828282828210" => Ok("mastercard_debit"),
        "378282246310005" => Ok("amex"),
        "4000000000000002" => Err("card_declined"),
        "4000000000009995" => Err("insufficient_funds"),
        "4000000000000069" => Err("expired_card"),
        "4000000000000127" => Err("incorrect_cvc"),
        _ => {
            // Any other plausible card number succeeds in test mode
            if (13..=19).contains(&clean.len()) && clean.chars().all(|c| c.is_ascii_digit()) {
                Ok("unknown")
            } else {
                Err("invalid_card_number")
            }
        }
    }
}

fn random_alnum(length: usize) -> String {
    use rand::Rng;
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}
