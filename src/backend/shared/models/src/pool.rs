use serde::{Deserialize, Serialize};

use crate::balance::Planck;
use crate::errors::{ModelError, Result};
use crate::AccountId;

pub type PoolId = u32;

/// Prefix of every pallet-derived account.
const MODULE_ACCOUNT_PREFIX: &[u8; 4] = b"modl";

/// Default pallet id of the nomination pools pallet.
pub const DEFAULT_POOLS_PALLET_ID: &str = "py/nopls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolState {
    Open,
    Blocked,
    Destroying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolRole {
    Depositor,
    Root,
    Nominator,
    /// Allowed to toggle the pool state.
    Bouncer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRoles {
    pub depositor: AccountId,
    pub root: Option<AccountId>,
    pub nominator: Option<AccountId>,
    pub bouncer: Option<AccountId>,
}

impl PoolRoles {
    pub fn has_role(&self, who: &AccountId, role: PoolRole) -> bool {
        let holder = match role {
            PoolRole::Depositor => Some(&self.depositor),
            PoolRole::Root => self.root.as_ref(),
            PoolRole::Nominator => self.nominator.as_ref(),
            PoolRole::Bouncer => self.bouncer.as_ref(),
        };
        holder == Some(who)
    }

    pub fn roles_of(&self, who: &AccountId) -> Vec<PoolRole> {
        [
            PoolRole::Depositor,
            PoolRole::Root,
            PoolRole::Nominator,
            PoolRole::Bouncer,
        ]
        .into_iter()
        .filter(|role| self.has_role(who, *role))
        .collect()
    }

    pub fn is_owner(&self, who: &AccountId) -> bool {
        self.has_role(who, PoolRole::Root)
    }

    pub fn is_state_toggler(&self, who: &AccountId) -> bool {
        self.has_role(who, PoolRole::Bouncer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondedPoolState {
    /// Total points issued by the pool. Zero for an empty pool.
    pub points: Planck,
    pub state: PoolState,
    pub roles: PoolRoles,
    pub member_counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPoolState {
    /// Fixed point, scaled by `10^18`.
    pub last_recorded_reward_counter: Planck,
    pub last_recorded_total_payouts: Planck,
    pub total_rewards_claimed: Planck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberState {
    pub pool_id: PoolId,
    pub points: Planck,
    /// Fixed point, scaled by `10^18`.
    pub last_recorded_reward_counter: Planck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoolAccountType {
    Bonded = 0,
    Reward = 1,
}

/// Accounts the pools pallet derives for a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAddresses {
    pub stash: AccountId,
    pub reward: AccountId,
}

impl PoolAddresses {
    pub fn derive(pallet_id: &[u8; 8], pool_id: PoolId) -> Self {
        Self {
            stash: derive_pool_account(pallet_id, PoolAccountType::Bonded, pool_id),
            reward: derive_pool_account(pallet_id, PoolAccountType::Reward, pool_id),
        }
    }
}

pub fn pallet_id_from_str(raw: &str) -> Result<[u8; 8]> {
    raw.as_bytes()
        .try_into()
        .map_err(|_| ModelError::InvalidPalletId(raw.len()))
}

/// `"modl" ‖ pallet_id ‖ account_type ‖ pool_id (LE)`, zero padded to 32 bytes.
pub fn derive_pool_account(pallet_id: &[u8; 8], kind: PoolAccountType, pool_id: PoolId) -> AccountId {
    let mut raw = [0u8; 32];
    raw[..4].copy_from_slice(MODULE_ACCOUNT_PREFIX);
    raw[4..12].copy_from_slice(pallet_id);
    raw[12] = kind as u8;
    raw[13..17].copy_from_slice(&pool_id.to_le_bytes());
    AccountId::new(raw)
}
