//! Mock payment gateway for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::integration::{GatewayEnvironment, UsableCredentials};
use crate::ports::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest};

/// Mock gateway with scripted results and a call log.
///
/// Unscripted calls succeed with a URL and id derived from the order number.
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    results: VecDeque<Result<PaymentIntent, GatewayError>>,
    call_log: Vec<GatewayCall>,
}

/// Recorded call for assertions.
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub environment: GatewayEnvironment,
    pub portal_key: String,
    pub request: PaymentIntentRequest,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the result of the next call.
    pub fn push_result(&self, result: Result<PaymentIntent, GatewayError>) {
        self.state().results.push_back(result);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_intent(
        &self,
        environment: GatewayEnvironment,
        credentials: &UsableCredentials,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut state = self.state();
        state.call_log.push(GatewayCall {
            environment,
            portal_key: credentials.portal_key.clone(),
            request: request.clone(),
        });
        state.results.pop_front().unwrap_or_else(|| {
            Ok(PaymentIntent {
                payment_url: format!(
                    "https://checkout.mock/{}/{}",
                    environment, request.order_number
                ),
                transaction_id: format!("trx_{}", request.order_number),
            })
        })
    }
}
