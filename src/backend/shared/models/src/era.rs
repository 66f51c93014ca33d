use std::sync::Arc;

use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::balance::Planck;
use crate::exposure::ExposureEntry;
use crate::{AccountId, Addressable};

pub type EraIndex = u32;

/// Summary of one era's exposures as seen from one target account.
///
/// Produced wholesale for an `(era, target_account)` pair and never patched;
/// a new era or a new target always yields a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraStatsSnapshot {
    pub era: EraIndex,
    pub target_account: Option<AccountId>,
    pub total_staked: Planck,
    pub total_active_nominators: usize,
    pub active_validators_count: usize,
    pub min_active_bond: Planck,
    pub target_account_own_stake: Option<Planck>,
    /// Decoded exposures the statistics were computed from.
    pub stakers: Arc<Vec<ExposureEntry>>,
}

impl EraStatsSnapshot {
    pub fn empty(era: EraIndex, target_account: Option<AccountId>) -> Self {
        Self {
            era,
            target_account,
            total_staked: Planck::zero(),
            total_active_nominators: 0,
            active_validators_count: 0,
            min_active_bond: Planck::zero(),
            target_account_own_stake: None,
            stakers: Arc::new(Vec::new()),
        }
    }

    /// Whether this snapshot was computed for the given era and account.
    pub fn is_for(&self, era: EraIndex, target_account: Option<&AccountId>) -> bool {
        self.era == era && self.target_account.as_ref() == target_account
    }

    pub fn staker(&self, validator: &AccountId) -> Option<&ExposureEntry> {
        self.stakers.iter().find(|entry| entry.address() == validator)
    }
}

/// Where a nomination stands in the current era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NominationStatus {
    /// The nominator backs the validator in this era's exposure.
    Active,
    /// The validator is active but the nominator is not among its backers.
    Inactive,
    /// The validator is not in this era's active set.
    Waiting,
}
