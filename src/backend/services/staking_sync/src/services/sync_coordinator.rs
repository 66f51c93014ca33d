use staking_models::era::{EraIndex, EraStatsSnapshot};
use staking_models::exposure::RawExposure;
use staking_models::pool::{BondedPoolState, MemberState, PoolAddresses, PoolId, RewardPoolState};
use staking_models::balance::planck_to_unit;
use staking_models::Planck;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::models::aggregation::{AggregationParams, AggregationRequest, AggregationResponse, AggregationTag};
use crate::models::context::{Generation, SyncContext, SyncStatus};
use crate::models::events::{CoordinatorEvent, Delivery, SubscriptionKey};
use crate::models::payout::PendingPayout;
use crate::models::view::{ActivePool, SyncView};
use crate::repositories::traits::{ChainClient, Sink, SubscriptionHandle};
use crate::services::aggregation_worker::AggregationWorker;
use crate::services::payout_service::PayoutEngine;
use crate::services::sync_handle::SyncHandle;
use crate::utils::errors::Result;

/// Signals from the surrounding application.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    EnterContext(SyncContext),
    ChainReady(bool),
    SetMembership(Option<MemberState>),
    SelectPool(PoolId),
    Shutdown,
}

/// Owns the subscription lifecycle for the active staking context and
/// publishes aggregation and payout results for it.
///
/// Every context entry gets a new generation. Subscriptions opened for a
/// generation are released exactly once when it is left, before any
/// subscription for the successor is opened. Deliveries and aggregation
/// responses tagged with another generation are dropped.
pub struct SyncCoordinator<C: ChainClient + 'static> {
    client: Arc<C>,
    config: SyncConfig,
    existential_deposit: Planck,
    min_unclaimed_display: Planck,
    pallet_id: [u8; 8],
    payout_engine: PayoutEngine,
    worker: Option<AggregationWorker>,
    events_tx: mpsc::UnboundedSender<CoordinatorEvent>,
    events_rx: mpsc::UnboundedReceiver<CoordinatorEvent>,
    view_tx: watch::Sender<SyncView>,

    generation: Generation,
    context: Option<SyncContext>,
    chain_ready: bool,
    status: SyncStatus,
    retry_pending: bool,
    handles: Vec<SubscriptionHandle>,
    awaiting: BTreeSet<SubscriptionKey>,

    aggregation_version: u64,
    pending_aggregation: Option<AggregationTag>,
    era_stakers_syncing: bool,
    snapshot: Option<EraStatsSnapshot>,

    pools: BTreeMap<PoolId, ActivePool>,
    selected_pool: Option<PoolId>,
}

impl<C: ChainClient + 'static> SyncCoordinator<C> {
    /// Create a coordinator and spawn its aggregation worker. Must be called
    /// from within a tokio runtime.
    pub fn new(client: Arc<C>, config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let existential_deposit = config.existential_deposit()?;
        let pallet_id = config.pallet_id()?;
        let min_unclaimed_display = config.min_unclaimed_display()?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let worker = AggregationWorker::spawn(config.worker_channel_capacity, events_tx.clone());
        let (view_tx, _) = watch::channel(SyncView::default());

        Ok(Self {
            client,
            config,
            existential_deposit,
            min_unclaimed_display,
            pallet_id,
            payout_engine: PayoutEngine::new(),
            worker: Some(worker),
            events_tx,
            events_rx,
            view_tx,
            generation: 0,
            context: None,
            chain_ready: false,
            status: SyncStatus::Unsynced,
            retry_pending: false,
            handles: Vec::new(),
            awaiting: BTreeSet::new(),
            aggregation_version: 0,
            pending_aggregation: None,
            era_stakers_syncing: false,
            snapshot: None,
            pools: BTreeMap::new(),
            selected_pool: None,
        })
    }

    pub fn handle(&self) -> SyncHandle {
        SyncHandle::new(self.view_tx.subscribe(), self.min_unclaimed_display.clone())
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn context(&self) -> Option<&SyncContext> {
        self.context.as_ref()
    }

    /// Switch to `context`. A context with the same identity only refreshes
    /// membership-derived payouts; any other starts a new generation.
    pub async fn enter_context(&mut self, context: SyncContext) {
        let same_identity = self
            .context
            .as_ref()
            .map(|current| current.key() == context.key())
            .unwrap_or(false);

        if same_identity {
            self.context = Some(context);
            self.recompute_payouts();
            self.publish();
            return;
        }

        self.teardown();
        self.generation += 1;
        info!(
            generation = self.generation,
            network = %context.network,
            account = ?context.active_account,
            era = ?context.active_era,
            pools = context.tracked_pools().len(),
            "Entering staking context"
        );

        self.selected_pool = context
            .membership_pool()
            .or_else(|| context.tracked_pools().into_iter().next());
        self.context = Some(context);
        self.publish();

        self.try_begin_sync().await;
    }

    /// Chain readiness. Losing readiness leaves the current generation;
    /// regaining it (re)starts subscriptions, retrying any that failed.
    pub async fn set_chain_ready(&mut self, ready: bool) {
        let was_ready = self.chain_ready;
        self.chain_ready = ready;

        if ready {
            self.try_begin_sync().await;
            return;
        }

        if was_ready && self.context.is_some() {
            self.teardown();
            self.generation += 1;
            info!(generation = self.generation, "Chain not ready; context reset");
            self.publish();
        }
    }

    /// Pool membership of the active account changed.
    pub async fn set_membership(&mut self, membership: Option<MemberState>) {
        let Some(mut next) = self.context.clone() else {
            debug!("Membership update without an active context");
            return;
        };
        next.membership = membership;
        self.enter_context(next).await;
    }

    /// Pool shown in detail by the application. Ignored for untracked pools.
    pub fn select_pool(&mut self, pool_id: PoolId) {
        let tracked = self
            .context
            .as_ref()
            .map(|context| context.tracked_pools().contains(&pool_id))
            .unwrap_or(false);
        if !tracked {
            debug!(pool_id, "Ignoring selection of untracked pool");
            return;
        }
        self.selected_pool = Some(pool_id);
        self.publish();
    }

    /// Wait for the next delivery or aggregation response and apply it.
    pub async fn process_next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Apply everything already queued without waiting. Returns the count.
    pub async fn process_ready_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            processed += 1;
        }
        processed
    }

    /// Drive the coordinator from `commands` until `Shutdown` or until every
    /// command sender is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SyncCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SyncCommand::Shutdown) | None => break,
                    Some(command) => self.apply_command(command).await,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event).await,
            }
        }
        self.shutdown().await;
    }

    pub async fn apply_command(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::EnterContext(context) => self.enter_context(context).await,
            SyncCommand::ChainReady(ready) => self.set_chain_ready(ready).await,
            SyncCommand::SetMembership(membership) => self.set_membership(membership).await,
            SyncCommand::SelectPool(pool_id) => self.select_pool(pool_id),
            SyncCommand::Shutdown => {}
        }
    }

    /// Release every subscription and stop the aggregation worker.
    pub async fn shutdown(mut self) {
        self.teardown();
        self.publish();
        if let Some(worker) = self.worker.take() {
            worker.shutdown().await;
        }
        info!(generation = self.generation, "Sync coordinator stopped");
    }

    async fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::Delivery { generation, delivery } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        "Dropping delivery for a superseded context"
                    );
                    return;
                }
                self.apply_delivery(delivery).await;
            }
            CoordinatorEvent::Aggregated(response) => self.apply_aggregation(response),
        }
        self.publish();
    }

    async fn apply_delivery(&mut self, delivery: Delivery) {
        if let Some(key) = delivery.subscription_key() {
            self.awaiting.remove(&key);
        }

        match delivery {
            Delivery::Exposures { era, exposures } => self.dispatch_aggregation(era, exposures).await,
            Delivery::BondedPool { pool_id, state } => {
                if let Some(pool) = self.pools.get_mut(&pool_id) {
                    pool.bonded_pool = state;
                }
                self.recompute_payout(pool_id);
            }
            Delivery::RewardPool { pool_id, state } => {
                if let Some(pool) = self.pools.get_mut(&pool_id) {
                    pool.reward_pool = state;
                }
                self.recompute_payout(pool_id);
            }
            Delivery::RewardAccountBalance { pool_id, balance } => {
                if let Some(pool) = self.pools.get_mut(&pool_id) {
                    pool.reward_account_balance = Some(balance);
                }
                self.recompute_payout(pool_id);
            }
        }

        self.check_synced();
    }

    async fn dispatch_aggregation(&mut self, era: EraIndex, exposures: Vec<RawExposure>) {
        let target_account = self.context.as_ref().and_then(|c| c.active_account.clone());
        self.aggregation_version += 1;

        let tag = AggregationTag {
            generation: self.generation,
            version: self.aggregation_version,
            era,
            target_account: target_account.clone(),
        };
        let request = AggregationRequest {
            tag: tag.clone(),
            exposures,
            params: AggregationParams {
                max_rewarded_per_validator: self.config.max_nominator_rewarded_per_validator,
                target_account,
            },
        };

        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        match worker.dispatch(request).await {
            Ok(()) => {
                // Supersedes any request still in flight for this generation.
                self.pending_aggregation = Some(tag);
                self.era_stakers_syncing = true;
            }
            Err(err) => warn!(generation = self.generation, era, error = %err, "Could not dispatch aggregation"),
        }
    }

    fn apply_aggregation(&mut self, response: AggregationResponse) {
        if self.pending_aggregation.as_ref() != Some(&response.tag) {
            debug!(
                generation = response.tag.generation,
                version = response.tag.version,
                current = self.generation,
                "Dropping stale aggregation response"
            );
            return;
        }

        info!(
            generation = self.generation,
            era = response.tag.era,
            total_staked = %planck_to_unit(&response.snapshot.total_staked, self.config.units),
            unit = %self.config.unit,
            nominators = response.snapshot.total_active_nominators,
            validators = response.snapshot.active_validators_count,
            skipped = response.skipped,
            "Era stakers synced"
        );
        self.pending_aggregation = None;
        self.era_stakers_syncing = false;
        self.snapshot = Some(response.snapshot);
    }

    async fn try_begin_sync(&mut self) {
        if !self.chain_ready {
            return;
        }
        let Some(context) = self.context.clone() else {
            return;
        };
        let retrying = self.status == SyncStatus::Syncing && self.retry_pending;
        if self.status != SyncStatus::Unsynced && !retrying {
            return;
        }

        self.status = SyncStatus::Syncing;
        self.retry_pending = false;
        self.publish();

        if let Err(err) = self.subscribe_all(&context).await {
            warn!(
                generation = self.generation,
                error = %err,
                "Subscription failed; retrying on next ready signal"
            );
            self.release_handles();
            self.pools.clear();
            self.era_stakers_syncing = false;
            self.pending_aggregation = None;
            // Sinks of the failed attempt keep their tag; the retry must not
            // count their deliveries.
            self.generation += 1;
            self.retry_pending = true;
            self.publish();
            return;
        }

        self.check_synced();
        self.publish();
    }

    async fn subscribe_all(&mut self, context: &SyncContext) -> anyhow::Result<()> {
        let generation = self.generation;

        if let Some(era) = context.active_era {
            let sink = Sink::new(generation, self.events_tx.clone(), move |exposures: Vec<RawExposure>| {
                Delivery::Exposures { era, exposures }
            });
            let handle = self.client.subscribe_exposures(era, sink).await?;
            self.handles.push(handle);
            self.era_stakers_syncing = true;
        }

        for pool_id in context.tracked_pools() {
            let addresses = PoolAddresses::derive(&self.pallet_id, pool_id);
            let reward_account = addresses.reward.clone();
            self.pools.insert(pool_id, ActivePool::new(pool_id, addresses));

            let sink = Sink::new(generation, self.events_tx.clone(), move |state: Option<BondedPoolState>| {
                Delivery::BondedPool { pool_id, state }
            });
            self.awaiting.insert(SubscriptionKey::BondedPool(pool_id));
            let handle = self.client.subscribe_bonded_pool(pool_id, sink).await?;
            self.handles.push(handle);

            let sink = Sink::new(generation, self.events_tx.clone(), move |state: Option<RewardPoolState>| {
                Delivery::RewardPool { pool_id, state }
            });
            self.awaiting.insert(SubscriptionKey::RewardPool(pool_id));
            let handle = self.client.subscribe_reward_pool(pool_id, sink).await?;
            self.handles.push(handle);

            let sink = Sink::new(generation, self.events_tx.clone(), move |balance: Planck| {
                Delivery::RewardAccountBalance { pool_id, balance }
            });
            self.awaiting.insert(SubscriptionKey::RewardAccountBalance(pool_id));
            let handle = self.client.subscribe_account_balance(reward_account, sink).await?;
            self.handles.push(handle);
        }

        Ok(())
    }

    fn check_synced(&mut self) {
        if self.status == SyncStatus::Syncing && !self.retry_pending && self.awaiting.is_empty() {
            self.status = SyncStatus::Synced;
            info!(
                generation = self.generation,
                pools = self.pools.len(),
                "Staking context synced"
            );
        }
    }

    fn recompute_payouts(&mut self) {
        let pool_ids: Vec<PoolId> = self.pools.keys().copied().collect();
        for pool_id in pool_ids {
            self.recompute_payout(pool_id);
        }
    }

    fn recompute_payout(&mut self, pool_id: PoolId) {
        let membership = self.context.as_ref().and_then(|c| c.membership.as_ref());
        let bonded_delivered = !self.awaiting.contains(&SubscriptionKey::BondedPool(pool_id));
        let reward_delivered = !self.awaiting.contains(&SubscriptionKey::RewardPool(pool_id));
        let Some(pool) = self.pools.get_mut(&pool_id) else {
            return;
        };

        pool.pending_payout = match (&pool.bonded_pool, &pool.reward_pool, &pool.reward_account_balance) {
            (Some(bonded), Some(reward), Some(balance)) => Some(match membership {
                Some(member) => self.payout_engine.compute_pending_payout(
                    pool_id,
                    bonded,
                    reward,
                    balance,
                    member,
                    &self.existential_deposit,
                ),
                None => PendingPayout::zero(),
            }),
            // The pool no longer exists on chain.
            (None, _, _) if bonded_delivered => Some(PendingPayout::zero()),
            (_, None, _) if reward_delivered => Some(PendingPayout::zero()),
            _ => None,
        };
    }

    /// Leave the current generation: release subscriptions and drop every
    /// result computed for it.
    fn teardown(&mut self) {
        self.release_handles();
        self.status = SyncStatus::Unsynced;
        self.retry_pending = false;
        self.pending_aggregation = None;
        self.era_stakers_syncing = false;
        self.snapshot = None;
        self.pools.clear();
    }

    fn release_handles(&mut self) {
        let released = self.handles.len();
        for handle in self.handles.drain(..) {
            self.client.unsubscribe(handle);
        }
        self.awaiting.clear();
        if released > 0 {
            debug!(generation = self.generation, released, "Released subscriptions");
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(SyncView {
            generation: self.generation,
            key: self.context.as_ref().map(SyncContext::key),
            status: self.status,
            era_stakers_syncing: self.era_stakers_syncing,
            snapshot: self.snapshot.clone(),
            pools: self.pools.clone(),
            selected_pool: self.selected_pool,
        });
    }
}

impl<C: ChainClient + 'static> Drop for SyncCoordinator<C> {
    fn drop(&mut self) {
        self.release_handles();
    }
}
