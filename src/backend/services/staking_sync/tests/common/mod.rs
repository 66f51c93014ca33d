#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use staking_models::era::EraIndex;
use staking_models::exposure::{RawExposure, RawIndividualExposure};
use staking_models::pool::{
    BondedPoolState, MemberState, PoolAddresses, PoolId, PoolRoles, PoolState, RewardPoolState,
    DEFAULT_POOLS_PALLET_ID,
};
use staking_models::{AccountId, Planck, Ss58Codec};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use staking_sync::repositories::{ChainClient, Sink, SubscriptionHandle};

/// One call observed by the fake chain, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCall {
    Subscribe(Uuid),
    Unsubscribe(Uuid),
}

#[derive(Default)]
struct FakeState {
    exposures: Vec<(EraIndex, Sink<Vec<RawExposure>>)>,
    bonded: Vec<(PoolId, Sink<Option<BondedPoolState>>)>,
    reward: Vec<(PoolId, Sink<Option<RewardPoolState>>)>,
    balances: Vec<(AccountId, Sink<Planck>)>,
    issued: Vec<Uuid>,
    released: HashMap<Uuid, usize>,
    log: Vec<ChainCall>,
}

/// In-memory chain client. Keeps every sink it was handed so tests can push
/// values on behalf of the chain, including through superseded sinks.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<FakeState>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(state: &mut FakeState) -> SubscriptionHandle {
        let handle = SubscriptionHandle::new();
        state.issued.push(handle.id());
        state.log.push(ChainCall::Subscribe(handle.id()));
        handle
    }

    pub fn issued(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().issued.clone()
    }

    pub fn release_count(&self, id: &Uuid) -> usize {
        self.state.lock().unwrap().released.get(id).copied().unwrap_or(0)
    }

    pub fn log(&self) -> Vec<ChainCall> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn live_subscriptions(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .issued
            .iter()
            .filter(|id| !state.released.contains_key(id))
            .count()
    }

    pub fn exposures_sink(&self, era: EraIndex) -> Option<Sink<Vec<RawExposure>>> {
        let state = self.state.lock().unwrap();
        state
            .exposures
            .iter()
            .rev()
            .find(|(e, _)| *e == era)
            .map(|(_, sink)| sink.clone())
    }

    pub fn bonded_sink(&self, pool_id: PoolId) -> Option<Sink<Option<BondedPoolState>>> {
        let state = self.state.lock().unwrap();
        state
            .bonded
            .iter()
            .rev()
            .find(|(id, _)| *id == pool_id)
            .map(|(_, sink)| sink.clone())
    }

    pub fn push_exposures(&self, era: EraIndex, exposures: Vec<RawExposure>) -> bool {
        self.exposures_sink(era)
            .map(|sink| sink.send(exposures))
            .unwrap_or(false)
    }

    pub fn push_bonded_pool(&self, pool_id: PoolId, pool: Option<BondedPoolState>) -> bool {
        self.bonded_sink(pool_id)
            .map(|sink| sink.send(pool))
            .unwrap_or(false)
    }

    pub fn push_reward_pool(&self, pool_id: PoolId, pool: Option<RewardPoolState>) -> bool {
        let sink = {
            let state = self.state.lock().unwrap();
            state
                .reward
                .iter()
                .rev()
                .find(|(id, _)| *id == pool_id)
                .map(|(_, sink)| sink.clone())
        };
        sink.map(|sink| sink.send(pool)).unwrap_or(false)
    }

    /// Pushes the free balance of `pool_id`'s reward account.
    pub fn push_reward_balance(&self, pool_id: PoolId, balance: u128) -> bool {
        let address = reward_account(pool_id);
        let sink = {
            let state = self.state.lock().unwrap();
            state
                .balances
                .iter()
                .rev()
                .find(|(who, _)| *who == address)
                .map(|(_, sink)| sink.clone())
        };
        sink.map(|sink| sink.send(Planck::from(balance)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn subscribe_exposures(
        &self,
        era: EraIndex,
        sink: Sink<Vec<RawExposure>>,
    ) -> Result<SubscriptionHandle> {
        let mut state = self.state.lock().unwrap();
        state.exposures.push((era, sink));
        Ok(Self::issue(&mut state))
    }

    async fn subscribe_bonded_pool(
        &self,
        pool_id: PoolId,
        sink: Sink<Option<BondedPoolState>>,
    ) -> Result<SubscriptionHandle> {
        let mut state = self.state.lock().unwrap();
        state.bonded.push((pool_id, sink));
        Ok(Self::issue(&mut state))
    }

    async fn subscribe_reward_pool(
        &self,
        pool_id: PoolId,
        sink: Sink<Option<RewardPoolState>>,
    ) -> Result<SubscriptionHandle> {
        let mut state = self.state.lock().unwrap();
        state.reward.push((pool_id, sink));
        Ok(Self::issue(&mut state))
    }

    async fn subscribe_account_balance(
        &self,
        address: AccountId,
        sink: Sink<Planck>,
    ) -> Result<SubscriptionHandle> {
        let mut state = self.state.lock().unwrap();
        state.balances.push((address, sink));
        Ok(Self::issue(&mut state))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut state = self.state.lock().unwrap();
        *state.released.entry(handle.id()).or_insert(0) += 1;
        state.log.push(ChainCall::Unsubscribe(handle.id()));
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn account(seed: u8) -> AccountId {
    AccountId::new([seed; 32])
}

pub fn reward_account(pool_id: PoolId) -> AccountId {
    let mut pallet_id = [0u8; 8];
    pallet_id.copy_from_slice(DEFAULT_POOLS_PALLET_ID.as_bytes());
    PoolAddresses::derive(&pallet_id, pool_id).reward
}

pub fn raw_exposure(validator: u8, total: u64, others: &[(u8, u64)]) -> RawExposure {
    RawExposure {
        validator: Some(account(validator).to_ss58check()),
        total: Some(total.to_string()),
        own: Some("0".to_string()),
        others: others
            .iter()
            .map(|(who, value)| RawIndividualExposure {
                who: Some(account(*who).to_ss58check()),
                value: Some(value.to_string()),
            })
            .collect(),
    }
}

pub fn bonded_pool(points: u128) -> BondedPoolState {
    BondedPoolState {
        points: Planck::from(points),
        state: PoolState::Open,
        roles: PoolRoles {
            depositor: account(200),
            root: Some(account(200)),
            nominator: None,
            bouncer: None,
        },
        member_counter: 2,
    }
}

pub fn reward_pool(counter: u128, total_payouts: u128, claimed: u128) -> RewardPoolState {
    RewardPoolState {
        last_recorded_reward_counter: Planck::from(counter),
        last_recorded_total_payouts: Planck::from(total_payouts),
        total_rewards_claimed: Planck::from(claimed),
    }
}

pub fn member(pool_id: PoolId, points: u128) -> MemberState {
    MemberState {
        pool_id,
        points: Planck::from(points),
        last_recorded_reward_counter: Planck::from(0u32),
    }
}
