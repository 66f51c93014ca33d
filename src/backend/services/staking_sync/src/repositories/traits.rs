use anyhow::Result;
use async_trait::async_trait;
use staking_models::era::EraIndex;
use staking_models::exposure::RawExposure;
use staking_models::pool::{BondedPoolState, PoolId, RewardPoolState};
use staking_models::{AccountId, Planck};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::context::Generation;
use crate::models::events::{CoordinatorEvent, Delivery};

/// A live chain subscription. Not `Clone`: releasing it consumes it, so
/// each handle is released at most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: Uuid,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Push side of one subscription, handed to the chain client.
///
/// Every value is tagged with the generation the subscription was opened
/// under, so the coordinator can drop deliveries for a context it has left.
pub struct Sink<T> {
    generation: Generation,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    wrap: Arc<dyn Fn(T) -> Delivery + Send + Sync>,
}

impl<T> Sink<T> {
    pub fn new<F>(generation: Generation, events: mpsc::UnboundedSender<CoordinatorEvent>, wrap: F) -> Self
    where
        F: Fn(T) -> Delivery + Send + Sync + 'static,
    {
        Self {
            generation,
            events,
            wrap: Arc::new(wrap),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns `false` once the coordinator is gone.
    pub fn send(&self, value: T) -> bool {
        self.events
            .send(CoordinatorEvent::Delivery {
                generation: self.generation,
                delivery: (self.wrap)(value),
            })
            .is_ok()
    }
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            events: self.events.clone(),
            wrap: Arc::clone(&self.wrap),
        }
    }
}

impl<T> fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Subscriptions offered by the external chain client.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn subscribe_exposures(
        &self,
        era: EraIndex,
        sink: Sink<Vec<RawExposure>>,
    ) -> Result<SubscriptionHandle>;

    async fn subscribe_bonded_pool(
        &self,
        pool_id: PoolId,
        sink: Sink<Option<BondedPoolState>>,
    ) -> Result<SubscriptionHandle>;

    async fn subscribe_reward_pool(
        &self,
        pool_id: PoolId,
        sink: Sink<Option<RewardPoolState>>,
    ) -> Result<SubscriptionHandle>;

    async fn subscribe_account_balance(
        &self,
        address: AccountId,
        sink: Sink<Planck>,
    ) -> Result<SubscriptionHandle>;

    /// Must tolerate handles whose stream already ended.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}
