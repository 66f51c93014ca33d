pub mod aggregation;
pub mod context;
pub mod events;
pub mod payout;
pub mod view;

// Chain data types shared with the other services.
pub use staking_models::{
    era::{EraIndex, EraStatsSnapshot, NominationStatus},
    exposure::{ExposureEntry, IndividualExposure, RawExposure, RawIndividualExposure},
    pool::{BondedPoolState, MemberState, PoolAddresses, PoolId, RewardPoolState},
    AccountId, Planck,
};
