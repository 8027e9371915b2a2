use std::sync::Arc;

use crate::core::config::GatewayConfig;
use crate::core::rate_limiter::RateLimiter;
use crate::storage::PaymentLedger;

/// Error type flowing out of the handler tree.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type HandlerResult = Result<(), HandlerError>;

/// Shared state injected into every handler via the dependency map.
#[derive(Clone)]
pub struct HandlerDeps {
    pub ledger: Arc<PaymentLedger>,
    pub config: Arc<GatewayConfig>,
    pub rate_limiter: Arc<RateLimiter>,
}
