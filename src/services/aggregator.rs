//! Aggregator service for computing dashboard summaries

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::normalizer::{monthly_equivalent, yearly_equivalent};
use super::renewal::{cycle_days, RenewalCalculator};
use crate::types::{
    Provider, ProviderSpend, RecordError, RecordId, RenewalView, Result, Subscription,
    SubtrackError, Summary, UNKNOWN_PROVIDER,
};

/// Ordering of the per-provider rollup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderOrder {
    /// First occurrence in the subscription list
    #[default]
    Insertion,
    /// Provider name ascending
    Name,
    /// Monthly spend, largest first
    MonthlyDesc,
}

impl FromStr for ProviderOrder {
    type Err = SubtrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "insertion" => Ok(Self::Insertion),
            "name" => Ok(Self::Name),
            "monthly" | "monthly_desc" => Ok(Self::MonthlyDesc),
            other => Err(SubtrackError::Config(format!(
                "unknown provider order '{}' (expected insertion, name or monthly)",
                other
            ))),
        }
    }
}

/// Provider display names keyed by id. The first provider with an id wins.
pub(crate) fn provider_names(providers: &[Provider]) -> HashMap<&RecordId, &str> {
    let mut names = HashMap::with_capacity(providers.len());
    for provider in providers {
        names.entry(&provider.id).or_insert(provider.name.as_str());
    }
    names
}

/// Look up a provider name, falling back to [`UNKNOWN_PROVIDER`]
pub(crate) fn provider_name(names: &HashMap<&RecordId, &str>, id: &RecordId) -> String {
    match names.get(id) {
        Some(name) => (*name).to_string(),
        None => {
            tracing::debug!(
                error = %SubtrackError::MissingProvider(id.clone()),
                "using placeholder provider name"
            );
            UNKNOWN_PROVIDER.to_string()
        }
    }
}

/// One subscription's derived figures
struct Evaluated<'a> {
    subscription: &'a Subscription,
    cycle_days: i64,
    next_renewal: NaiveDate,
    monthly: f64,
    yearly: f64,
}

impl Evaluated<'_> {
    fn into_view(self, provider_name: String) -> RenewalView {
        let sub = self.subscription;
        RenewalView {
            subscription_id: sub.id.clone(),
            provider_id: sub.provider_id.clone(),
            provider_name,
            plan_name: sub.plan_name.clone(),
            price: sub.price,
            currency: sub.currency.clone(),
            billing_cycle: sub.billing_cycle,
            cycle_days: self.cycle_days,
            next_renewal: self.next_renewal,
            auto_renew: sub.auto_renew,
            monthly: self.monthly,
            yearly: self.yearly,
        }
    }
}

/// Dashboard aggregator.
///
/// Holds no state between calls: every summary is a pure function of the
/// snapshot, the window and the as-of date.
pub struct DashboardAggregator {
    calculator: RenewalCalculator,
    provider_order: ProviderOrder,
}

impl Default for DashboardAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardAggregator {
    pub fn new() -> Self {
        Self::with_calculator(RenewalCalculator::new())
    }

    pub fn with_calculator(calculator: RenewalCalculator) -> Self {
        Self {
            calculator,
            provider_order: ProviderOrder::default(),
        }
    }

    pub fn provider_order(mut self, order: ProviderOrder) -> Self {
        self.provider_order = order;
        self
    }

    pub fn calculator(&self) -> &RenewalCalculator {
        &self.calculator
    }

    fn evaluate<'a>(&self, sub: &'a Subscription, as_of: NaiveDate) -> Result<Evaluated<'a>> {
        let days = cycle_days(sub)?;
        let next_renewal = self.calculator.next_renewal(sub, as_of)?;

        if sub.price < 0.0 || next_renewal < sub.start_date {
            tracing::debug!(subscription = %sub.id, "inconsistent record, using stored values");
        }

        Ok(Evaluated {
            subscription: sub,
            cycle_days: days,
            next_renewal,
            monthly: monthly_equivalent(sub.price, days)?,
            yearly: yearly_equivalent(sub.price, days)?,
        })
    }

    /// Summarize a snapshot as of `as_of`, looking `window_days` ahead.
    ///
    /// Subscriptions that cannot be evaluated are listed in
    /// [`Summary::errors`] and left out of every other figure except
    /// `totals.count`.
    pub fn summarize(
        &self,
        subscriptions: &[Subscription],
        providers: &[Provider],
        window_days: u32,
        as_of: NaiveDate,
    ) -> Summary {
        let names = provider_names(providers);
        let window_end = as_of
            .checked_add_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MAX);

        // Order-preserving, so results line up with the input
        let results: Vec<Result<Evaluated<'_>>> = subscriptions
            .par_iter()
            .map(|sub| self.evaluate(sub, as_of))
            .collect();

        let mut summary = Summary::default();
        summary.totals.count = subscriptions.len() as u64;

        let mut group_index: HashMap<&RecordId, usize> = HashMap::new();

        for (sub, result) in subscriptions.iter().zip(results) {
            let eval = match result {
                Ok(eval) => eval,
                Err(err) => {
                    tracing::warn!(subscription = %sub.id, error = %err, "skipping subscription");
                    summary.errors.push(RecordError::new(sub.id.clone(), &err));
                    continue;
                }
            };

            summary.totals.monthly += eval.monthly;
            summary.totals.yearly += eval.yearly;

            let idx = *group_index.entry(&sub.provider_id).or_insert_with(|| {
                summary.by_provider.push(ProviderSpend {
                    provider_id: sub.provider_id.clone(),
                    provider_name: provider_name(&names, &sub.provider_id),
                    count: 0,
                    monthly: 0.0,
                });
                summary.by_provider.len() - 1
            });
            let group = &mut summary.by_provider[idx];
            group.count += 1;
            group.monthly += eval.monthly;

            if eval.next_renewal < as_of {
                let name = summary.by_provider[idx].provider_name.clone();
                summary.overdue.push(eval.into_view(name));
            } else if eval.next_renewal <= window_end {
                let name = summary.by_provider[idx].provider_name.clone();
                summary.upcoming.push(eval.into_view(name));
            }
        }

        summary.upcoming.sort_by(|a, b| {
            a.next_renewal
                .cmp(&b.next_renewal)
                .then_with(|| a.subscription_id.cmp(&b.subscription_id))
        });
        summary.overdue.sort_by(|a, b| {
            a.next_renewal
                .cmp(&b.next_renewal)
                .then_with(|| a.subscription_id.cmp(&b.subscription_id))
        });

        match self.provider_order {
            ProviderOrder::Insertion => {}
            ProviderOrder::Name => summary.by_provider.sort_by(|a, b| {
                a.provider_name
                    .cmp(&b.provider_name)
                    .then_with(|| a.provider_id.cmp(&b.provider_id))
            }),
            ProviderOrder::MonthlyDesc => summary.by_provider.sort_by(|a, b| {
                b.monthly
                    .total_cmp(&a.monthly)
                    .then_with(|| a.provider_id.cmp(&b.provider_id))
            }),
        }

        summary
    }
}
