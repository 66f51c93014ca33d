use num_traits::Zero;
use staking_models::Planck;

/// A pool member's claimable reward in planck.
///
/// `stale` marks a figure produced by a guard or clamp (inconsistent
/// counters, an empty pool) rather than by the reward-counter formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingPayout {
    pub value: Planck,
    pub stale: bool,
}

impl PendingPayout {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn computed(value: Planck) -> Self {
        Self { value, stale: false }
    }

    pub fn stale(value: Planck) -> Self {
        Self { value, stale: true }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Whether the amount clears the minimum worth showing to a user.
    pub fn is_displayable(&self, min_unclaimed_display: &Planck) -> bool {
        self.value > *min_unclaimed_display
    }
}
