use staking_models::era::EraIndex;
use staking_models::exposure::RawExposure;
use staking_models::pool::{BondedPoolState, PoolId, RewardPoolState};
use staking_models::Planck;

use crate::models::aggregation::AggregationResponse;
use crate::models::context::Generation;

/// A value pushed by one chain subscription.
#[derive(Debug, Clone)]
pub enum Delivery {
    Exposures {
        era: EraIndex,
        exposures: Vec<RawExposure>,
    },
    BondedPool {
        pool_id: PoolId,
        state: Option<BondedPoolState>,
    },
    RewardPool {
        pool_id: PoolId,
        state: Option<RewardPoolState>,
    },
    /// Free balance of a pool's reward account.
    RewardAccountBalance { pool_id: PoolId, balance: Planck },
}

/// Everything that reaches the coordinator's inbox.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    Delivery {
        generation: Generation,
        delivery: Delivery,
    },
    Aggregated(AggregationResponse),
}

/// Subscriptions that must deliver before a context counts as synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriptionKey {
    BondedPool(PoolId),
    RewardPool(PoolId),
    RewardAccountBalance(PoolId),
}

impl Delivery {
    pub fn subscription_key(&self) -> Option<SubscriptionKey> {
        match self {
            Delivery::Exposures { .. } => None,
            Delivery::BondedPool { pool_id, .. } => Some(SubscriptionKey::BondedPool(*pool_id)),
            Delivery::RewardPool { pool_id, .. } => Some(SubscriptionKey::RewardPool(*pool_id)),
            Delivery::RewardAccountBalance { pool_id, .. } => {
                Some(SubscriptionKey::RewardAccountBalance(*pool_id))
            }
        }
    }
}
