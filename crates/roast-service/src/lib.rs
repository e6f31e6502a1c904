//! GitHub roast comparison service
//!
//! Validates two GitHub logins, fetches their public repositories through a
//! shared TTL cache and asks a text generation backend to roast them. The
//! result is returned either as one JSON document or as server-sent events.

pub mod cache;
pub mod compare;
pub mod config;
pub mod delivery;
pub mod directory;
pub mod error;
pub mod generator;
pub mod server;
pub mod types;

#[cfg(test)]
mod testing;

pub use compare::{Comparator, DeliveryMode};
pub use config::Config;
pub use error::{Result, RoastError};
pub use server::{create_router, start_server, ServerState, SharedState};
pub use types::*;
