//! Dashboard output types

use chrono::NaiveDate;
use serde::Serialize;

use super::{BillingCycle, RecordId, Subscription, SubtrackError};

/// Spend totals across a snapshot.
///
/// `count` covers every input record; the sums cover only records whose
/// cycle could be evaluated. Currencies are summed as plain numbers.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Totals {
    pub count: u64,
    pub monthly: f64,
    pub yearly: f64,
}

/// A subscription joined with its computed schedule and provider name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenewalView {
    pub subscription_id: RecordId,
    pub provider_id: RecordId,
    pub provider_name: String,
    pub plan_name: Option<String>,
    pub price: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub cycle_days: i64,
    pub next_renewal: NaiveDate,
    pub auto_renew: bool,
    pub monthly: f64,
    pub yearly: f64,
}

/// Per-provider rollup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderSpend {
    pub provider_id: RecordId,
    pub provider_name: String,
    pub count: u64,
    pub monthly: f64,
}

/// Machine-readable reason a subscription was skipped
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordErrorKind {
    /// Custom cycle without a positive day count
    InvalidCycle { days: i64 },
    /// Stored values the schedule cannot be computed from (e.g. date overflow)
    InvalidRecord,
}

/// A subscription that could not be evaluated
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordError {
    pub subscription_id: RecordId,
    #[serde(flatten)]
    pub kind: RecordErrorKind,
    pub error: String,
}

impl RecordError {
    pub fn new(subscription_id: RecordId, err: &SubtrackError) -> Self {
        let kind = match err {
            SubtrackError::InvalidCycle { days } => RecordErrorKind::InvalidCycle { days: *days },
            _ => RecordErrorKind::InvalidRecord,
        };
        Self {
            subscription_id,
            kind,
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Summary {
    pub totals: Totals,
    /// Renewals in `[as_of, as_of + window]`, soonest first
    pub upcoming: Vec<RenewalView>,
    /// Explicit renewal dates already behind `as_of`
    pub overdue: Vec<RenewalView>,
    pub by_provider: Vec<ProviderSpend>,
    pub errors: Vec<RecordError>,
}

/// List row for filtered subscription queries
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView<'a> {
    #[serde(flatten)]
    pub subscription: &'a Subscription,
    pub provider_name: String,
    /// `None` when the cycle is invalid
    pub next_renewal: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_kind_from_invalid_cycle() {
        let err = RecordError::new(RecordId::Int(1), &SubtrackError::InvalidCycle { days: 0 });

        assert_eq!(err.kind, RecordErrorKind::InvalidCycle { days: 0 });
        assert_eq!(err.error, "invalid cycle: 0 days");
    }

    #[test]
    fn test_record_error_kind_from_invalid_record() {
        let err = RecordError::new(
            RecordId::Int(2),
            &SubtrackError::InvalidRecord("renewal date out of range".into()),
        );

        assert_eq!(err.kind, RecordErrorKind::InvalidRecord);
    }

    #[test]
    fn test_record_error_serializes_kind() {
        let cycle = RecordError::new(RecordId::Int(1), &SubtrackError::InvalidCycle { days: 0 });
        let json = serde_json::to_value(&cycle).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "subscription_id": 1,
                "kind": "invalid_cycle",
                "days": 0,
                "error": "invalid cycle: 0 days"
            })
        );

        let record = RecordError::new(
            RecordId::Text("s9".into()),
            &SubtrackError::InvalidRecord("bad".into()),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "invalid_record");
        assert!(json.get("days").is_none());
    }
}
