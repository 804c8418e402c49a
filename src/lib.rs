//! Renewal scheduling and spend aggregation for subscription trackers
//!
//! All computation is pure: callers pass an immutable snapshot and an
//! explicit as-of date, and get plain values back.

pub mod services;
pub mod types;
