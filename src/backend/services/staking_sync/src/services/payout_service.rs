use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};
use staking_models::balance::reward_counter_unit;
use staking_models::pool::{BondedPoolState, MemberState, PoolId, RewardPoolState};
use staking_models::Planck;
use tracing::debug;

use crate::models::payout::PendingPayout;

/// Computes a pool member's pending reward from the pool's reward counter.
///
/// All arithmetic is on arbitrary-precision integers, multiplying before
/// dividing. Division truncates toward zero like the chain's own ledger math.
#[derive(Debug, Clone)]
pub struct PayoutEngine {
    counter_unit: BigUint,
}

impl Default for PayoutEngine {
    fn default() -> Self {
        Self {
            counter_unit: reward_counter_unit(),
        }
    }
}

impl PayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter_unit(counter_unit: BigUint) -> Self {
        Self { counter_unit }
    }

    pub fn counter_unit(&self) -> &BigUint {
        &self.counter_unit
    }

    /// Pending payout of `member` in the pool being viewed.
    ///
    /// Zero when the member belongs to another pool. A zero-point pool or a
    /// negative intermediate yields zero flagged as stale.
    pub fn compute_pending_payout(
        &self,
        viewed_pool: PoolId,
        bonded_pool: &BondedPoolState,
        reward_pool: &RewardPoolState,
        reward_account_balance: &Planck,
        member: &MemberState,
        existential_deposit: &Planck,
    ) -> PendingPayout {
        if member.pool_id != viewed_pool {
            return PendingPayout::zero();
        }

        if bonded_pool.points.is_zero() {
            debug!(pool_id = viewed_pool, "Bonded pool has no points");
            return PendingPayout::stale(Planck::zero());
        }

        let reward_pool_balance = if reward_account_balance > existential_deposit {
            reward_account_balance - existential_deposit
        } else {
            Planck::zero()
        };

        let payouts_since_last_record = BigInt::from(reward_pool_balance)
            + BigInt::from(reward_pool.total_rewards_claimed.clone())
            - BigInt::from(reward_pool.last_recorded_total_payouts.clone());
        let inconsistent = payouts_since_last_record.is_negative();

        let unit = BigInt::from(self.counter_unit.clone());
        let current_reward_counter = payouts_since_last_record * &unit
            / BigInt::from(bonded_pool.points.clone())
            + BigInt::from(reward_pool.last_recorded_reward_counter.clone());

        let pending = (current_reward_counter
            - BigInt::from(member.last_recorded_reward_counter.clone()))
            * BigInt::from(member.points.clone())
            / unit;

        match pending.to_biguint() {
            Some(value) if inconsistent => PendingPayout::stale(value),
            Some(value) => PendingPayout::computed(value),
            None => {
                debug!(pool_id = viewed_pool, %pending, "Clamped negative pending payout");
                PendingPayout::stale(Planck::zero())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staking_models::pool::{PoolRoles, PoolState};
    use staking_models::AccountId;

    fn bonded(points: u128) -> BondedPoolState {
        BondedPoolState {
            points: Planck::from(points),
            state: PoolState::Open,
            roles: PoolRoles {
                depositor: AccountId::new([1; 32]),
                root: None,
                nominator: None,
                bouncer: None,
            },
            member_counter: 1,
        }
    }

    fn reward(counter: u128, total_payouts: u128, claimed: u128) -> RewardPoolState {
        RewardPoolState {
            last_recorded_reward_counter: Planck::from(counter),
            last_recorded_total_payouts: Planck::from(total_payouts),
            total_rewards_claimed: Planck::from(claimed),
        }
    }

    fn member(pool_id: PoolId, points: u128, counter: u128) -> MemberState {
        MemberState {
            pool_id,
            points: Planck::from(points),
            last_recorded_reward_counter: Planck::from(counter),
        }
    }

    fn planck(value: u128) -> Planck {
        Planck::from(value)
    }

    #[test]
    fn computes_pro_rata_share() {
        let payout = PayoutEngine::new().compute_pending_payout(
            1,
            &bonded(1_000_000),
            &reward(0, 0, 0),
            &planck(1_000_000_000_000),
            &member(1, 500_000, 0),
            &planck(0),
        );

        assert_eq!(payout, PendingPayout::computed(planck(500_000_000_000)));
    }

    #[test]
    fn other_pool_yields_zero() {
        let payout = PayoutEngine::new().compute_pending_payout(
            2,
            &bonded(1_000_000),
            &reward(0, 0, 0),
            &planck(1_000_000_000_000),
            &member(1, 500_000, 0),
            &planck(0),
        );

        assert_eq!(payout, PendingPayout::zero());
        assert!(!payout.stale);
    }

    #[test]
    fn empty_pool_yields_zero() {
        for (counter, balance) in [(0, 0), (5, 1_000_000_000), (u128::MAX, u128::MAX)] {
            let payout = PayoutEngine::new().compute_pending_payout(
                1,
                &bonded(0),
                &reward(counter, 0, 7),
                &planck(balance),
                &member(1, 10, 0),
                &planck(1),
            );
            assert!(payout.is_zero());
            assert!(payout.stale);
        }
    }

    #[test]
    fn subtracts_existential_deposit() {
        let payout = PayoutEngine::new().compute_pending_payout(
            1,
            &bonded(100),
            &reward(0, 0, 0),
            &planck(1_100),
            &member(1, 50, 0),
            &planck(100),
        );
        assert_eq!(payout.value, planck(500));

        let below_deposit = PayoutEngine::new().compute_pending_payout(
            1,
            &bonded(100),
            &reward(0, 0, 0),
            &planck(10),
            &member(1, 50, 0),
            &planck(100),
        );
        assert!(below_deposit.is_zero());
        assert!(!below_deposit.stale);
    }

    #[test]
    fn accounts_for_claimed_and_recorded_payouts() {
        // 300 paid out since the last record on a 100 point pool.
        let payout = PayoutEngine::new().compute_pending_payout(
            1,
            &bonded(100),
            &reward(2_000_000_000_000_000_000, 800, 600),
            &planck(500),
            &member(1, 10, 1_000_000_000_000_000_000),
            &planck(0),
        );

        // counter = 3e18 + 2e18; (5e18 - 1e18) * 10 / 1e18 = 40
        assert_eq!(payout, PendingPayout::computed(planck(40)));
    }

    #[test]
    fn negative_pending_is_clamped_and_stale() {
        let payout = PayoutEngine::new().compute_pending_payout(
            1,
            &bonded(100),
            &reward(0, 0, 0),
            &planck(0),
            &member(1, 10, 1_000_000_000_000_000_000),
            &planck(0),
        );

        assert!(payout.is_zero());
        assert!(payout.stale);
    }

    #[test]
    fn doubling_member_points_never_decreases_payout() {
        let engine = PayoutEngine::new();
        for balance in [0u128, 1, 999, 123_456_789, 10_000_000_000_000] {
            let single = engine.compute_pending_payout(
                1,
                &bonded(3_333),
                &reward(17, 0, 0),
                &planck(balance),
                &member(1, 1_111, 5),
                &planck(0),
            );
            let doubled = engine.compute_pending_payout(
                1,
                &bonded(3_333),
                &reward(17, 0, 0),
                &planck(balance),
                &member(1, 2_222, 5),
                &planck(0),
            );
            assert!(doubled.value >= single.value);
        }
    }

    #[test]
    fn truncates_dust() {
        let payout = PayoutEngine::new().compute_pending_payout(
            1,
            &bonded(3),
            &reward(0, 0, 0),
            &planck(10),
            &member(1, 1, 0),
            &planck(0),
        );
        // 10 / 3 per point, truncated.
        assert_eq!(payout.value, planck(3));
    }

    #[test]
    fn custom_counter_unit() {
        let engine = PayoutEngine::with_counter_unit(BigUint::from(1_000u32));
        let payout = engine.compute_pending_payout(
            1,
            &bonded(4),
            &reward(0, 0, 0),
            &planck(10),
            &member(1, 2, 0),
            &planck(0),
        );
        // counter = 10 * 1000 / 4 = 2500; 2500 * 2 / 1000 = 5
        assert_eq!(payout.value, planck(5));
    }
}
