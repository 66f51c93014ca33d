pub mod traits;

pub use traits::{ChainClient, Sink, SubscriptionHandle};
