pub mod commands;
pub mod proofs;
pub mod schema;
pub mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, HandlerResult};
