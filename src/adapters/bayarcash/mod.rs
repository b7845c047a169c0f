//! BayarCash (payment gateway) adapter.
//!
//! Implements the `PaymentGateway` port. Personal access tokens arrive as
//! `secrecy::SecretString` and are only exposed to build the bearer header.

mod client;
mod mock_payment_gateway;
mod wire;

pub use client::{BayarCashClient, BayarCashConfig, DEFAULT_PAYMENT_CHANNEL};
pub use mock_payment_gateway::{GatewayCall, MockPaymentGateway};
