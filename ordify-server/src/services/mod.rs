pub mod payment;

pub use payment::{Confirmation, PaymentIntent, PaymentOutcome, PaymentService};
