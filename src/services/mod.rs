//! Services for renewal scheduling, spend aggregation and snapshot loading

pub mod aggregator;
pub mod config;
pub mod normalizer;
pub mod query;
pub mod renewal;
pub mod snapshot_loader;

pub use aggregator::{DashboardAggregator, ProviderOrder};
pub use config::{Config, CycleMode};
pub use normalizer::{monthly_equivalent, yearly_equivalent};
pub use query::{ProviderOrdering, ProviderQuery, SubscriptionOrdering, SubscriptionQuery};
pub use renewal::{CalendarCycle, FixedCycle, RenewalCalculator, RenewalStrategy};
pub use snapshot_loader::SnapshotLoader;
