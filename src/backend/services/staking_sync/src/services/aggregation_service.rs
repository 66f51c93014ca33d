use num_traits::Zero;
use staking_models::era::{EraIndex, EraStatsSnapshot, NominationStatus};
use staking_models::exposure::{decode_exposures, ExposureEntry, IndividualExposure, RawExposure};
use staking_models::{AccountId, Planck};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::models::aggregation::AggregationParams;

/// Turns an era's exposure list into summary statistics.
///
/// Pure: no chain access and no hidden state, so identical inputs always
/// produce identical snapshots.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Decodes a raw delivery and aggregates it. Returns the snapshot and
    /// the number of malformed entries that were skipped.
    pub fn aggregate_raw(
        era: EraIndex,
        exposures: &[RawExposure],
        params: &AggregationParams,
    ) -> (EraStatsSnapshot, usize) {
        let decoded = decode_exposures(exposures);
        let skipped = decoded.skipped();
        if skipped > 0 {
            debug!(era, skipped, "Skipped malformed exposure data");
        }
        (Self::aggregate(era, decoded.entries, params), skipped)
    }

    pub fn aggregate(
        era: EraIndex,
        exposures: Vec<ExposureEntry>,
        params: &AggregationParams,
    ) -> EraStatsSnapshot {
        let limit = params.max_rewarded_per_validator as usize;
        let mut total_staked = Planck::zero();
        let mut active_validators_count = 0;

        let (total_active_nominators, min_active_bond, target_account_own_stake) = {
            // Aggregate bond of every rewarded backer across all validators.
            let mut active_bonds: HashMap<&AccountId, Planck> = HashMap::new();

            for exposure in &exposures {
                total_staked += &exposure.total;
                if !exposure.total.is_zero() {
                    active_validators_count += 1;
                }

                for backer in rewarded_backers(&exposure.others, limit) {
                    *active_bonds.entry(&backer.who).or_insert_with(Planck::zero) += &backer.value;
                }
            }

            let min_active_bond = active_bonds.values().min().cloned().unwrap_or_else(Planck::zero);
            let own_stake = params
                .target_account
                .as_ref()
                .and_then(|target| active_bonds.get(target).cloned());

            (active_bonds.len(), min_active_bond, own_stake)
        };

        EraStatsSnapshot {
            era,
            target_account: params.target_account.clone(),
            total_staked,
            total_active_nominators,
            active_validators_count,
            min_active_bond,
            target_account_own_stake,
            stakers: Arc::new(exposures),
        }
    }

    /// Status of each of `who`'s nominations in the snapshot's era.
    pub fn nomination_statuses(
        snapshot: &EraStatsSnapshot,
        who: &AccountId,
        targets: &[AccountId],
    ) -> BTreeMap<AccountId, NominationStatus> {
        targets
            .iter()
            .map(|target| {
                let status = match snapshot.staker(target) {
                    None => NominationStatus::Waiting,
                    Some(exposure) if exposure.is_backed_by(who) => NominationStatus::Active,
                    Some(_) => NominationStatus::Inactive,
                };
                (target.clone(), status)
            })
            .collect()
    }
}

/// The top `limit` backers by bond; equal bonds keep delivery order.
fn rewarded_backers(others: &[IndividualExposure], limit: usize) -> Vec<&IndividualExposure> {
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<&IndividualExposure> = others.iter().collect();
    if !ranked.windows(2).all(|pair| pair[0].value >= pair[1].value) {
        ranked.sort_by(|a, b| b.value.cmp(&a.value));
    }
    ranked.truncate(limit);
    ranked
}
