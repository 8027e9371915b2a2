//! Core utilities: configuration, logging, rate limiting.

pub mod config;
pub mod logging;
pub mod rate_limiter;

pub use config::{GatewayConfig, StorageKind};
pub use logging::init_logger;
pub use rate_limiter::RateLimiter;
