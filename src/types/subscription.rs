//! Provider and subscription records as read from the store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Result, SubtrackError};

/// Opaque record identifier.
///
/// Stores hand out either integer keys or string keys. Integers compare
/// numerically and sort before strings, so `9` comes before `10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Custom,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
            BillingCycle::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Store insertion time, used for newest/oldest listings
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Provider {
    /// A provider needs a non-blank display name
    pub fn validate(&self) -> Vec<SubtrackError> {
        if self.name.trim().is_empty() {
            vec![SubtrackError::InvalidRecord(format!(
                "provider {} has an empty name",
                self.id
            ))]
        } else {
            Vec::new()
        }
    }
}

fn default_auto_renew() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: RecordId,
    /// Weak reference to a [`Provider`]; the store calls this field `provider`
    #[serde(alias = "provider")]
    pub provider_id: RecordId,
    #[serde(default)]
    pub plan_name: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    pub billing_cycle: BillingCycle,
    /// Only read when `billing_cycle` is `custom`
    #[serde(default)]
    pub custom_cycle_days: Option<i64>,
    pub start_date: NaiveDate,
    /// Known or overridden schedule; wins over the computed renewal
    #[serde(default)]
    pub next_renewal_date: Option<NaiveDate>,
    /// Display only, never changes the renewal date
    #[serde(default = "default_auto_renew")]
    pub auto_renew: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Report every problem with this record.
    ///
    /// Advisory only: aggregation still uses the stored values as given.
    pub fn validate(&self) -> Vec<SubtrackError> {
        let mut problems = Vec::new();

        if self.price.is_nan() || self.price < 0.0 {
            problems.push(SubtrackError::InvalidRecord(format!(
                "subscription {} has negative price {}",
                self.id, self.price
            )));
        }

        if self.billing_cycle == BillingCycle::Custom {
            let days = self.custom_cycle_days.unwrap_or(0);
            if days <= 0 {
                problems.push(SubtrackError::InvalidCycle { days });
            }
        }

        if let Some(next) = self.next_renewal_date {
            if next < self.start_date {
                problems.push(SubtrackError::InvalidRecord(format!(
                    "subscription {} renews on {} before its start date {}",
                    self.id, next, self.start_date
                )));
            }
        }

        problems
    }

    /// Fail fast on the first validation problem
    pub fn ensure_valid(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Point-in-time copy of the store's records
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_subscription(cycle: BillingCycle, custom_days: Option<i64>) -> Subscription {
        Subscription {
            id: RecordId::Int(1),
            provider_id: RecordId::Int(10),
            plan_name: Some("Premium".into()),
            price: 9.99,
            currency: "USD".into(),
            billing_cycle: cycle,
            custom_cycle_days: custom_days,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            next_renewal_date: None,
            auto_renew: true,
            notes: None,
            created_at: None,
        }
    }

    // ========== RecordId ==========

    #[test]
    fn test_record_id_integers_sort_numerically() {
        let mut ids = vec![RecordId::Int(10), RecordId::Int(9), RecordId::Int(100)];
        ids.sort();
        assert_eq!(
            ids,
            vec![RecordId::Int(9), RecordId::Int(10), RecordId::Int(100)]
        );
    }

    #[test]
    fn test_record_id_integers_before_strings() {
        assert!(RecordId::Int(999) < RecordId::Text("a".into()));
    }

    #[test]
    fn test_record_id_from_str() {
        assert_eq!(RecordId::from("17"), RecordId::Int(17));
        assert_eq!(RecordId::from("sub-a"), RecordId::Text("sub-a".into()));
    }

    #[test]
    fn test_record_id_deserializes_number_or_string() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[3, "abc"]"#).unwrap();
        assert_eq!(ids, vec![RecordId::Int(3), RecordId::Text("abc".into())]);
    }

    // ========== Deserialization ==========

    #[test]
    fn test_subscription_deserialize_store_shape() {
        let json = r#"{
            "id": 5,
            "provider": 2,
            "plan_name": "Family",
            "price": 15.5,
            "currency": "EUR",
            "billing_cycle": "custom",
            "custom_cycle_days": 14,
            "start_date": "2024-02-01"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();

        assert_eq!(sub.provider_id, RecordId::Int(2));
        assert_eq!(sub.billing_cycle, BillingCycle::Custom);
        assert_eq!(sub.custom_cycle_days, Some(14));
        assert_eq!(sub.next_renewal_date, None);
        assert!(sub.auto_renew);
        assert_eq!(sub.created_at, None);
    }

    #[test]
    fn test_created_at_parses_store_timestamp() {
        let json = r#"{
            "id": 1,
            "name": "Netflix",
            "created_at": "2024-02-01T09:30:00.123456Z"
        }"#;
        let provider: Provider = serde_json::from_str(json).unwrap();

        let created = provider.created_at.unwrap();
        assert_eq!(created.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_subscription_deserialize_null_renewal() {
        let json = r#"{
            "id": "a",
            "provider_id": "p",
            "price": 1,
            "billing_cycle": "yearly",
            "start_date": "2024-02-01",
            "next_renewal_date": null,
            "auto_renew": false
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();

        assert_eq!(sub.next_renewal_date, None);
        assert!(!sub.auto_renew);
        assert_eq!(sub.currency, "");
    }

    #[test]
    fn test_snapshot_missing_lists_default_empty() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.providers.is_empty());
        assert!(snapshot.subscriptions.is_empty());
    }

    // ========== Validation ==========

    #[test]
    fn test_validate_clean_record() {
        let sub = make_subscription(BillingCycle::Monthly, None);
        assert!(sub.validate().is_empty());
        assert!(sub.ensure_valid().is_ok());
    }

    #[test]
    fn test_validate_custom_without_days() {
        let sub = make_subscription(BillingCycle::Custom, Some(0));
        let problems = sub.validate();
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            problems[0],
            SubtrackError::InvalidCycle { days: 0 }
        ));
    }

    #[test]
    fn test_validate_custom_days_ignored_for_monthly() {
        let sub = make_subscription(BillingCycle::Monthly, Some(-3));
        assert!(sub.validate().is_empty());
    }

    #[test]
    fn test_validate_negative_price_and_inverted_dates() {
        let mut sub = make_subscription(BillingCycle::Yearly, None);
        sub.price = -1.0;
        sub.next_renewal_date = NaiveDate::from_ymd_opt(2023, 12, 1);

        let problems = sub.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems
            .iter()
            .all(|p| matches!(p, SubtrackError::InvalidRecord(_))));
        assert!(sub.ensure_valid().is_err());
    }

    #[test]
    fn test_provider_blank_name() {
        let provider = Provider {
            id: RecordId::Int(1),
            name: "   ".into(),
            url: None,
            logo_url: None,
            created_at: None,
        };
        assert_eq!(provider.validate().len(), 1);
    }
}
