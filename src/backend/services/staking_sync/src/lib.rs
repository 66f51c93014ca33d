//! Staking exposure aggregation, pool reward accounting, and the
//! coordinator that keeps both in step with the chain client.

pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::SyncConfig;
pub use services::sync_coordinator::{SyncCommand, SyncCoordinator};
pub use services::sync_handle::SyncHandle;
