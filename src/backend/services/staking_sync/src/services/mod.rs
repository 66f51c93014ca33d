pub mod aggregation_service;
pub mod aggregation_worker;
pub mod payout_service;
pub mod sync_coordinator;
pub mod sync_handle;

pub use aggregation_service::AggregationEngine;
pub use payout_service::PayoutEngine;
