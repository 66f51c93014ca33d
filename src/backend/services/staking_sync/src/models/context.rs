use serde::{Deserialize, Serialize};
use staking_models::era::EraIndex;
use staking_models::pool::{MemberState, PoolId};
use staking_models::AccountId;
use std::collections::BTreeSet;

/// Monotonic id of one context entry.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Unsynced,
    Syncing,
    Synced,
}

/// Identity of a tracked context. A change in any field starts a new
/// generation with fresh subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey {
    pub network: String,
    pub active_account: Option<AccountId>,
    pub era: Option<EraIndex>,
    pub pool_ids: BTreeSet<PoolId>,
}

/// Everything the surrounding application knows about the active position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    pub network: String,
    pub active_account: Option<AccountId>,
    /// `None` until the chain reports an active era.
    pub active_era: Option<EraIndex>,
    /// Pools in which the account holds a role.
    pub role_pools: BTreeSet<PoolId>,
    pub membership: Option<MemberState>,
}

impl SyncContext {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            active_account: None,
            active_era: None,
            role_pools: BTreeSet::new(),
            membership: None,
        }
    }

    pub fn with_account(mut self, account: AccountId) -> Self {
        self.active_account = Some(account);
        self
    }

    pub fn with_era(mut self, era: EraIndex) -> Self {
        self.active_era = Some(era);
        self
    }

    pub fn with_role_pool(mut self, pool_id: PoolId) -> Self {
        self.role_pools.insert(pool_id);
        self
    }

    pub fn with_membership(mut self, membership: MemberState) -> Self {
        self.membership = Some(membership);
        self
    }

    pub fn membership_pool(&self) -> Option<PoolId> {
        self.membership.as_ref().map(|member| member.pool_id)
    }

    /// Role pools plus the membership pool.
    pub fn tracked_pools(&self) -> BTreeSet<PoolId> {
        let mut pools = self.role_pools.clone();
        pools.extend(self.membership_pool());
        pools
    }

    pub fn key(&self) -> ContextKey {
        ContextKey {
            network: self.network.clone(),
            active_account: self.active_account.clone(),
            era: self.active_era,
            pool_ids: self.tracked_pools(),
        }
    }
}
