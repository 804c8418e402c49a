//! Snapshot queries for subscription and provider lists
//!
//! Mirrors the list filters a store exposes (`provider`, `due_in_days`,
//! `ordering`, `search`) so a front end can page through a snapshot
//! without a round trip.

use chrono::{Days, NaiveDate};
use std::cmp::Ordering;
use std::str::FromStr;

use super::aggregator::{provider_name, provider_names};
use super::renewal::RenewalCalculator;
use crate::types::{Provider, RecordId, Result, Subscription, SubscriptionView, SubtrackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionOrdering {
    /// Soonest renewal first
    #[default]
    RenewalAsc,
    RenewalDesc,
    PriceAsc,
    PriceDesc,
    StartAsc,
    StartDesc,
    /// Oldest record first
    CreatedAsc,
    /// Newest record first
    CreatedDesc,
}

impl SubscriptionOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RenewalAsc => "next_renewal_date",
            Self::RenewalDesc => "-next_renewal_date",
            Self::PriceAsc => "price",
            Self::PriceDesc => "-price",
            Self::StartAsc => "start_date",
            Self::StartDesc => "-start_date",
            Self::CreatedAsc => "created_at",
            Self::CreatedDesc => "-created_at",
        }
    }
}

impl FromStr for SubscriptionOrdering {
    type Err = SubtrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "next_renewal_date" => Ok(Self::RenewalAsc),
            "-next_renewal_date" => Ok(Self::RenewalDesc),
            "price" => Ok(Self::PriceAsc),
            "-price" => Ok(Self::PriceDesc),
            "start_date" => Ok(Self::StartAsc),
            "-start_date" => Ok(Self::StartDesc),
            "created_at" | "+created_at" => Ok(Self::CreatedAsc),
            "-created_at" => Ok(Self::CreatedDesc),
            other => Err(SubtrackError::Config(format!(
                "unknown subscription ordering '{}'",
                other
            ))),
        }
    }
}

/// Rows with a value sort before rows without one in both directions
fn cmp_present_first<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter and order subscriptions
#[derive(Debug, Clone, Default)]
pub struct SubscriptionQuery {
    pub provider: Option<RecordId>,
    pub due_in_days: Option<u32>,
    pub ordering: SubscriptionOrdering,
}

impl SubscriptionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: RecordId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn due_in_days(mut self, days: u32) -> Self {
        self.due_in_days = Some(days);
        self
    }

    pub fn ordering(mut self, ordering: SubscriptionOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Run the query against a snapshot.
    ///
    /// Rows whose renewal cannot be computed keep `next_renewal: None`;
    /// they are dropped when `due_in_days` is set.
    pub fn run<'a>(
        &self,
        calculator: &RenewalCalculator,
        subscriptions: &'a [Subscription],
        providers: &[Provider],
        as_of: NaiveDate,
    ) -> Vec<SubscriptionView<'a>> {
        let names = provider_names(providers);
        let due_end = self.due_in_days.map(|days| {
            as_of
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX)
        });

        let mut rows: Vec<SubscriptionView<'a>> = subscriptions
            .iter()
            .filter(|sub| self.provider.as_ref().is_none_or(|p| *p == sub.provider_id))
            .filter_map(|sub| {
                let next_renewal = calculator.next_renewal(sub, as_of).ok();
                if let Some(end) = due_end {
                    match next_renewal {
                        Some(next) if next >= as_of && next <= end => {}
                        _ => return None,
                    }
                }
                Some(SubscriptionView {
                    subscription: sub,
                    provider_name: provider_name(&names, &sub.provider_id),
                    next_renewal,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            let primary = match self.ordering {
                SubscriptionOrdering::RenewalAsc => {
                    cmp_present_first(a.next_renewal, b.next_renewal, false)
                }
                SubscriptionOrdering::RenewalDesc => {
                    cmp_present_first(a.next_renewal, b.next_renewal, true)
                }
                SubscriptionOrdering::PriceAsc => {
                    a.subscription.price.total_cmp(&b.subscription.price)
                }
                SubscriptionOrdering::PriceDesc => {
                    b.subscription.price.total_cmp(&a.subscription.price)
                }
                SubscriptionOrdering::StartAsc => {
                    a.subscription.start_date.cmp(&b.subscription.start_date)
                }
                SubscriptionOrdering::StartDesc => {
                    b.subscription.start_date.cmp(&a.subscription.start_date)
                }
                SubscriptionOrdering::CreatedAsc => {
                    cmp_present_first(
                        a.subscription.created_at,
                        b.subscription.created_at,
                        false,
                    )
                }
                SubscriptionOrdering::CreatedDesc => {
                    cmp_present_first(
                        a.subscription.created_at,
                        b.subscription.created_at,
                        true,
                    )
                }
            };
            primary.then_with(|| a.subscription.id.cmp(&b.subscription.id))
        });

        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderOrdering {
    #[default]
    NameAsc,
    NameDesc,
    CreatedAsc,
    CreatedDesc,
}

impl FromStr for ProviderOrdering {
    type Err = SubtrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" | "+name" => Ok(Self::NameAsc),
            "-name" => Ok(Self::NameDesc),
            "created_at" | "+created_at" => Ok(Self::CreatedAsc),
            "-created_at" => Ok(Self::CreatedDesc),
            other => Err(SubtrackError::Config(format!(
                "unknown provider ordering '{}'",
                other
            ))),
        }
    }
}

/// Search and order providers
#[derive(Debug, Clone, Default)]
pub struct ProviderQuery {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub ordering: ProviderOrdering,
}

impl ProviderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn ordering(mut self, ordering: ProviderOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn run<'a>(&self, providers: &'a [Provider]) -> Vec<&'a Provider> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<&Provider> = providers
            .iter()
            .filter(|p| {
                needle
                    .as_deref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n))
            })
            .collect();

        rows.sort_by(|a, b| {
            let primary = match self.ordering {
                ProviderOrdering::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ProviderOrdering::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
                ProviderOrdering::CreatedAsc => {
                    cmp_present_first(a.created_at, b.created_at, false)
                }
                ProviderOrdering::CreatedDesc => {
                    cmp_present_first(a.created_at, b.created_at, true)
                }
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        rows
    }
}
