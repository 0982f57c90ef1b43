//! Scriptable in-process execution gateway.
//!
//! Used by the test suites and by the binary when no gateway URL is
//! configured. Gateway order ids are generated sequentially (`EXT-1`,
//! `EXT-2`, ...). Any operation can be switched to fail.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    AccessToken, ExecutionGatewayPort, ExternalStatusEntry, GatewayError, GatewayOrderAck,
    GatewayOrderRequest, PriceQuote, PriceRequest,
};
use crate::domain::shared::{CustomerId, ExternalOrderId, ForeignId};

/// Gateway operations, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    /// `get_price`
    GetPrice,
    /// `refresh_access_token`
    RefreshToken,
    /// `create_order`
    CreateOrder,
    /// `get_esigning_url`
    EsigningUrl,
    /// `cancel_order`
    CancelOrder,
    /// `get_transaction_timeline`
    Timeline,
}

#[derive(Debug, Default)]
struct MockState {
    failing: HashSet<MockOperation>,
    calls: HashMap<MockOperation, usize>,
    cancel_responses: HashMap<ExternalOrderId, Vec<ExternalStatusEntry>>,
    timelines: HashMap<String, Vec<ExternalStatusEntry>>,
    created: Vec<GatewayOrderRequest>,
    quoted_amount: Option<Decimal>,
}

/// Mock execution gateway.
#[derive(Debug)]
pub struct MockExecutionGateway {
    unit_price: Decimal,
    order_counter: AtomicU64,
    state: Mutex<MockState>,
}

impl Default for MockExecutionGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutionGateway {
    /// Mock quoting 1000 per unit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_unit_price(Decimal::ONE_THOUSAND)
    }

    /// Mock quoting `unit_price` per unit.
    #[must_use]
    pub fn with_unit_price(unit_price: Decimal) -> Self {
        Self {
            unit_price,
            order_counter: AtomicU64::new(1),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Quote `amount` as the total regardless of units.
    pub fn quote_amount(&self, amount: Decimal) {
        self.state().quoted_amount = Some(amount);
    }

    /// Make `operation` fail until [`Self::recover`] is called.
    pub fn fail(&self, operation: MockOperation) {
        self.state().failing.insert(operation);
    }

    /// Make `operation` succeed again.
    pub fn recover(&self, operation: MockOperation) {
        self.state().failing.remove(&operation);
    }

    /// Number of calls made to `operation`.
    #[must_use]
    pub fn calls(&self, operation: MockOperation) -> usize {
        self.state().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Orders placed so far.
    #[must_use]
    pub fn created_orders(&self) -> Vec<GatewayOrderRequest> {
        self.state().created.clone()
    }

    /// Entries returned when `order_id` is cancelled. Unscripted
    /// cancellations return the order itself as `cancelled`.
    pub fn script_cancellation(&self, order_id: ExternalOrderId, entries: Vec<ExternalStatusEntry>) {
        self.state().cancel_responses.insert(order_id, entries);
    }

    /// Timeline returned for `product_code`.
    pub fn script_timeline(&self, product_code: impl Into<String>, entries: Vec<ExternalStatusEntry>) {
        self.state().timelines.insert(product_code.into(), entries);
    }

    /// Count the call and fail it if scripted to.
    fn enter(&self, operation: MockOperation) -> Result<(), GatewayError> {
        let mut state = self.state();
        *state.calls.entry(operation).or_insert(0) += 1;
        if state.failing.contains(&operation) {
            return Err(GatewayError::ConnectionError {
                message: format!("mock {operation:?} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ExecutionGatewayPort for MockExecutionGateway {
    async fn get_price(&self, request: &PriceRequest) -> Result<PriceQuote, GatewayError> {
        self.enter(MockOperation::GetPrice)?;
        let user_amount = self
            .state()
            .quoted_amount
            .unwrap_or_else(|| self.unit_price.saturating_mul(Decimal::from(request.units)));
        Ok(PriceQuote {
            unit_price: self.unit_price,
            user_amount,
        })
    }

    async fn refresh_access_token(
        &self,
        customer_id: &CustomerId,
    ) -> Result<AccessToken, GatewayError> {
        self.enter(MockOperation::RefreshToken)?;
        Ok(AccessToken::new(format!("token-{customer_id}")))
    }

    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrderAck, GatewayError> {
        self.enter(MockOperation::CreateOrder)?;
        let n = self.order_counter.fetch_add(1, Ordering::SeqCst);
        self.state().created.push(request.clone());

        let external_order_id = format!("EXT-{n}");
        let foreign_id = format!("FRN-{}", request.customer_id);
        Ok(GatewayOrderAck {
            external_order_id: ExternalOrderId::new(external_order_id.clone()),
            foreign_id: Some(ForeignId::new(foreign_id.clone())),
            payload: serde_json::json!({
                "success": true,
                "orderId": external_order_id,
                "foreignId": foreign_id,
                "referenceId": request.reference.as_str(),
            }),
        })
    }

    async fn get_esigning_url(
        &self,
        order_id: &ExternalOrderId,
        _pan: &str,
        _email: &str,
    ) -> Result<String, GatewayError> {
        self.enter(MockOperation::EsigningUrl)?;
        Ok(format!("https://esign.mock/{order_id}"))
    }

    async fn cancel_order(
        &self,
        order_id: &ExternalOrderId,
        _token: &AccessToken,
    ) -> Result<Vec<ExternalStatusEntry>, GatewayError> {
        self.enter(MockOperation::CancelOrder)?;
        let scripted = self.state().cancel_responses.get(order_id).cloned();
        Ok(scripted.unwrap_or_else(|| {
            vec![ExternalStatusEntry {
                order_id: order_id.clone(),
                status: "cancelled".to_string(),
                transaction_id: None,
            }]
        }))
    }

    async fn get_transaction_timeline(
        &self,
        product_code: &str,
        _token: &AccessToken,
    ) -> Result<Vec<ExternalStatusEntry>, GatewayError> {
        self.enter(MockOperation::Timeline)?;
        Ok(self
            .state()
            .timelines
            .get(product_code)
            .cloned()
            .unwrap_or_default())
    }
}
