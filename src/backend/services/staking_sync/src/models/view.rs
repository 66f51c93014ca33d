use staking_models::era::EraStatsSnapshot;
use staking_models::pool::{BondedPoolState, PoolAddresses, PoolId, RewardPoolState};
use staking_models::Planck;
use std::collections::BTreeMap;

use crate::models::context::{ContextKey, Generation, SyncStatus};
use crate::models::payout::PendingPayout;

/// Latest chain state of one tracked pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePool {
    pub id: PoolId,
    pub addresses: PoolAddresses,
    pub bonded_pool: Option<BondedPoolState>,
    pub reward_pool: Option<RewardPoolState>,
    pub reward_account_balance: Option<Planck>,
    /// `None` until bonded, reward and balance data have all arrived.
    pub pending_payout: Option<PendingPayout>,
}

impl ActivePool {
    pub fn new(id: PoolId, addresses: PoolAddresses) -> Self {
        Self {
            id,
            addresses,
            bonded_pool: None,
            reward_pool: None,
            reward_account_balance: None,
            pending_payout: None,
        }
    }
}

/// What the coordinator publishes after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncView {
    pub generation: Generation,
    pub key: Option<ContextKey>,
    pub status: SyncStatus,
    pub era_stakers_syncing: bool,
    pub snapshot: Option<EraStatsSnapshot>,
    pub pools: BTreeMap<PoolId, ActivePool>,
    pub selected_pool: Option<PoolId>,
}

impl Default for SyncView {
    fn default() -> Self {
        Self {
            generation: 0,
            key: None,
            status: SyncStatus::Unsynced,
            era_stakers_syncing: false,
            snapshot: None,
            pools: BTreeMap::new(),
            selected_pool: None,
        }
    }
}
