//! Mock payment gateway for testing.
//!
//! Provides a configurable in-process `PaymentGateway` for unit and
//! integration tests. Supports:
//! - Idempotent authorizations keyed like the real gateway
//! - Status changes to simulate a client completing payment
//! - Error injection (next call, or per method)
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    Authorization, AuthorizationRequest, AuthorizationStatus, GatewayError, PaymentGateway,
    Refund, RefundRequest,
};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// let auth = gateway.create_authorization(request).await?;
///
/// // Simulate the client completing payment
/// gateway.set_status(&auth.id, AuthorizationStatus::Succeeded);
///
/// // Inject errors
/// gateway.set_method_error("create_refund", GatewayError::provider("down"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Authorizations by ID.
    authorizations: HashMap<String, Authorization>,

    /// Authorization ID by idempotency key.
    idempotency: HashMap<String, String>,

    /// Refunds issued, in order.
    refunds: Vec<(RefundRequest, Refund)>,

    /// Error to return on next call.
    next_error: Option<GatewayError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, GatewayError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    sequence: u64,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the gateway-side status of a stored authorization.
    pub fn set_status(&self, authorization_id: &str, status: AuthorizationStatus) {
        if let Some(auth) = self.state().authorizations.get_mut(authorization_id) {
            auth.status = status;
        }
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: GatewayError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.state()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Count calls to a specific method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Number of distinct authorizations created.
    pub fn authorization_count(&self) -> usize {
        self.state().authorizations.len()
    }

    /// Refunds issued so far.
    pub fn refunds(&self) -> Vec<(RefundRequest, Refund)> {
        self.state().refunds.clone()
    }

    fn record_call(&self, method: &str, args: Vec<String>) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Authorization, GatewayError> {
        self.record_call(
            "create_authorization",
            vec![
                request.amount.cents().to_string(),
                request.idempotency_key.clone(),
            ],
        )?;

        let mut state = self.state();
        if let Some(existing) = state
            .idempotency
            .get(&request.idempotency_key)
            .and_then(|id| state.authorizations.get(id))
        {
            return Ok(existing.clone());
        }

        state.sequence += 1;
        let id = format!("pi_mock_{}", state.sequence);
        let authorization = Authorization {
            client_secret: Some(format!("{}_secret_mock", id)),
            id: id.clone(),
            status: AuthorizationStatus::RequiresPaymentMethod,
            amount: request.amount,
            currency: request.currency,
        };
        state
            .idempotency
            .insert(request.idempotency_key, id.clone());
        state.authorizations.insert(id, authorization.clone());
        Ok(authorization)
    }

    async fn retrieve_authorization(&self, id: &str) -> Result<Authorization, GatewayError> {
        self.record_call("retrieve_authorization", vec![id.to_string()])?;
        self.state()
            .authorizations
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(id))
    }

    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, GatewayError> {
        self.record_call(
            "create_refund",
            vec![
                request.payment_intent_id.clone(),
                request.amount.cents().to_string(),
            ],
        )?;

        let mut state = self.state();
        if !state.authorizations.contains_key(&request.payment_intent_id) {
            return Err(GatewayError::not_found(&request.payment_intent_id));
        }
        state.sequence += 1;
        let refund = Refund {
            id: format!("re_mock_{}", state.sequence),
            amount: request.amount,
            status: "succeeded".to_string(),
        };
        state.refunds.push((request, refund.clone()));
        Ok(refund)
    }
}
