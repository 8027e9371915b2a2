//! Telegram gateway bot for a paid community.
//!
//! The bot receives payment confirmations over a Telegram webhook, keeps a
//! review ledger in SQLite (or in memory for throwaway deployments) and
//! exposes a small HTTP API for operations and admin stats.

pub mod core;
pub mod storage;
pub mod telegram;
pub mod web_server;

pub use crate::core::config::{GatewayConfig, StorageKind};
pub use crate::storage::{PaymentLedger, StatusCounts};
pub use crate::telegram::{schema, HandlerDeps, HandlerError};
pub use crate::web_server::{build_router, start_web_server, WebState};
