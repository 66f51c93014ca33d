use staking_models::era::{EraStatsSnapshot, NominationStatus};
use staking_models::pool::PoolId;
use staking_models::{AccountId, Planck};
use std::collections::BTreeMap;
use tokio::sync::watch;

use crate::models::context::{ContextKey, Generation, SyncStatus};
use crate::models::payout::PendingPayout;
use crate::models::view::SyncView;
use crate::services::aggregation_service::AggregationEngine;
use crate::utils::errors::{Result, SyncError};

/// Read side of a [`SyncCoordinator`](crate::SyncCoordinator).
///
/// Every answer comes from the latest published view. `None` means the
/// value is still pending for the context asked about.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    view: watch::Receiver<SyncView>,
    min_unclaimed_display: Planck,
}

impl SyncHandle {
    pub(crate) fn new(view: watch::Receiver<SyncView>, min_unclaimed_display: Planck) -> Self {
        Self {
            view,
            min_unclaimed_display,
        }
    }

    pub fn view(&self) -> SyncView {
        self.view.borrow().clone()
    }

    pub fn generation(&self) -> Generation {
        self.view.borrow().generation
    }

    pub fn current_key(&self) -> Option<ContextKey> {
        self.view.borrow().key.clone()
    }

    /// Snapshot for `key`, if aggregation for that exact context finished.
    pub fn era_stats_snapshot(&self, key: &ContextKey) -> Option<EraStatsSnapshot> {
        let view = self.view.borrow();
        if view.key.as_ref() != Some(key) {
            return None;
        }
        let era = key.era?;
        view.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.is_for(era, key.active_account.as_ref()))
            .cloned()
    }

    pub fn pending_payout(&self, pool_id: PoolId) -> Option<PendingPayout> {
        self.view
            .borrow()
            .pools
            .get(&pool_id)
            .and_then(|pool| pool.pending_payout.clone())
    }

    /// Pending payout of `pool_id` if it clears the configured display
    /// threshold.
    pub fn displayable_payout(&self, pool_id: PoolId) -> Option<PendingPayout> {
        self.pending_payout(pool_id)
            .filter(|payout| payout.is_displayable(&self.min_unclaimed_display))
    }

    pub fn sync_status(&self, key: &ContextKey) -> SyncStatus {
        let view = self.view.borrow();
        if view.key.as_ref() == Some(key) {
            view.status
        } else {
            SyncStatus::Unsynced
        }
    }

    pub fn era_stakers_syncing(&self) -> bool {
        self.view.borrow().era_stakers_syncing
    }

    pub fn selected_pool(&self) -> Option<PoolId> {
        self.view.borrow().selected_pool
    }

    /// Nomination statuses against the current snapshot, once there is one.
    pub fn nomination_statuses(
        &self,
        who: &AccountId,
        targets: &[AccountId],
    ) -> Option<BTreeMap<AccountId, NominationStatus>> {
        let view = self.view.borrow();
        view.snapshot
            .as_ref()
            .map(|snapshot| AggregationEngine::nomination_statuses(snapshot, who, targets))
    }

    /// Wait for the next published view.
    pub async fn changed(&mut self) -> Result<()> {
        self.view
            .changed()
            .await
            .map_err(|_| SyncError::CoordinatorStopped)
    }

    /// Wait until `predicate` holds for the published view.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<SyncView>
    where
        F: FnMut(&SyncView) -> bool,
    {
        let view = self
            .view
            .wait_for(|view| predicate(view))
            .await
            .map_err(|_| SyncError::CoordinatorStopped)?;
        Ok(view.clone())
    }
}
