//! Chain-facing data model shared by the staking services.
//!
//! Every monetary value is an arbitrary-precision integer in planck. Nothing
//! in this crate performs I/O; values arrive from the chain client and are
//! decoded here before any aggregation runs.

pub mod balance;
pub mod era;
pub mod errors;
pub mod exposure;
pub mod pool;

pub use balance::Planck;
pub use errors::{ModelError, Result};

/// On-chain account identifier, rendered and parsed as SS58 text.
pub use sp_core::crypto::AccountId32 as AccountId;
pub use sp_core::crypto::Ss58Codec;

// Common shared traits

/// Values bound to a single on-chain account.
pub trait Addressable {
    fn address(&self) -> &AccountId;
}
