use staking_models::exposure::RawExposure;
use staking_models::{era::EraIndex, era::EraStatsSnapshot, AccountId};

use crate::models::context::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationParams {
    /// Backers paid per validator; only the top this-many count as active.
    pub max_rewarded_per_validator: u32,
    pub target_account: Option<AccountId>,
}

/// Identity every aggregation request and response carries.
///
/// A response is applied only if its tag equals the coordinator's latest
/// request tag; `version` separates repeated requests within a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationTag {
    pub generation: Generation,
    pub version: u64,
    pub era: EraIndex,
    pub target_account: Option<AccountId>,
}

#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub tag: AggregationTag,
    pub exposures: Vec<RawExposure>,
    pub params: AggregationParams,
}

#[derive(Debug, Clone)]
pub struct AggregationResponse {
    pub tag: AggregationTag,
    pub snapshot: EraStatsSnapshot,
    /// Malformed exposures and backers dropped while decoding
    pub skipped: usize,
}
