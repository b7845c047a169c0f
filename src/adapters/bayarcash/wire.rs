//! BayarCash wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::integration::Amount;

/// Body of `POST /payment-intents`.
#[derive(Debug, Serialize)]
pub struct PaymentIntentBody<'a> {
    pub payment_channel: u32,
    pub portal_key: &'a str,
    pub order_number: &'a str,
    pub amount: &'a Amount,
    pub payer_name: &'a str,
    pub payer_email: &'a str,
    pub return_url: &'a str,
}

/// Successful payment-intent response. Older API versions return `url`.
#[derive(Debug, Deserialize)]
pub struct PaymentIntentResponse {
    pub payment_url: Option<String>,
    pub url: Option<String>,
    pub id: Option<Value>,
}

impl PaymentIntentResponse {
    pub fn checkout_url(&self) -> Option<&str> {
        self.payment_url.as_deref().or(self.url.as_deref())
    }

    /// Transaction id, which the gateway may send as a string or a number.
    pub fn transaction_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// The gateway's `message` field, if the error body has one.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    match parsed.get("message")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
