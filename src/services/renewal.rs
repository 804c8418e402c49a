//! Renewal scheduling
//!
//! Turns a subscription's `(billing_cycle, start_date, custom_cycle_days)`
//! into the first renewal on or after a caller-supplied as-of date.
//!
//! Cycle lengths follow a fixed-day convention: a month is 30 days and a
//! year is 365 days. The same convention drives spend normalization, so
//! schedules and spend figures agree with each other. [`CalendarCycle`]
//! offers calendar-month stepping behind the same contract.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::types::{BillingCycle, Result, Subscription, SubtrackError};

/// Days in a monthly cycle
pub const DAYS_PER_MONTH: i64 = 30;

/// Days in a yearly cycle
pub const DAYS_PER_YEAR: i64 = 365;

/// Cycle length in days for a subscription.
///
/// Fails with [`SubtrackError::InvalidCycle`] when a custom cycle has no
/// positive day count.
pub fn cycle_days(subscription: &Subscription) -> Result<i64> {
    match subscription.billing_cycle {
        BillingCycle::Monthly => Ok(DAYS_PER_MONTH),
        BillingCycle::Yearly => Ok(DAYS_PER_YEAR),
        BillingCycle::Custom => {
            let days = subscription.custom_cycle_days.unwrap_or(0);
            if days <= 0 {
                Err(SubtrackError::InvalidCycle { days })
            } else {
                Ok(days)
            }
        }
    }
}

fn out_of_range(start: NaiveDate) -> SubtrackError {
    SubtrackError::InvalidRecord(format!("renewal date out of range for start {}", start))
}

/// Stepping rule from an anchor date to the next renewal
pub trait RenewalStrategy: Send + Sync {
    /// Strategy name (e.g., "fixed")
    fn name(&self) -> &str;

    /// First renewal on or after `as_of`, counting cycles from `start`.
    ///
    /// `cycle_days` is already validated as positive.
    fn next_from_start(
        &self,
        cycle: BillingCycle,
        cycle_days: i64,
        start: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<NaiveDate>;
}

/// Fixed-length cycles: `start + ceil((as_of - start) / cycle_days) * cycle_days`
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCycle;

impl RenewalStrategy for FixedCycle {
    fn name(&self) -> &str {
        "fixed"
    }

    fn next_from_start(
        &self,
        _cycle: BillingCycle,
        cycle_days: i64,
        start: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<NaiveDate> {
        if as_of <= start {
            return Ok(start);
        }

        let elapsed = (as_of - start).num_days();
        let steps = elapsed / cycle_days + i64::from(elapsed % cycle_days != 0);
        let offset = steps
            .checked_mul(cycle_days)
            .and_then(|d| u64::try_from(d).ok())
            .ok_or_else(|| out_of_range(start))?;

        start
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| out_of_range(start))
    }
}

/// Calendar-month cycles for monthly/yearly billing.
///
/// Each renewal is `start + k months` computed from the anchor, so a
/// subscription started on Jan 31 renews on Feb 29, then Mar 31.
/// Custom cycles still step by days.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarCycle;

impl CalendarCycle {
    fn add_months(start: NaiveDate, months: i64) -> Result<NaiveDate> {
        let months = u32::try_from(months).map_err(|_| out_of_range(start))?;
        start
            .checked_add_months(Months::new(months))
            .ok_or_else(|| out_of_range(start))
    }
}

impl RenewalStrategy for CalendarCycle {
    fn name(&self) -> &str {
        "calendar"
    }

    fn next_from_start(
        &self,
        cycle: BillingCycle,
        cycle_days: i64,
        start: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<NaiveDate> {
        let months_per_step: i64 = match cycle {
            BillingCycle::Monthly => 1,
            BillingCycle::Yearly => 12,
            BillingCycle::Custom => {
                return FixedCycle.next_from_start(cycle, cycle_days, start, as_of);
            }
        };

        if as_of <= start {
            return Ok(start);
        }

        // Every step before this one lands in an earlier month than as_of
        let month_diff = i64::from(as_of.year() - start.year()) * 12
            + i64::from(as_of.month()) - i64::from(start.month());
        let mut steps = (month_diff / months_per_step).max(0);

        loop {
            let candidate = Self::add_months(start, steps * months_per_step)?;
            if candidate >= as_of {
                return Ok(candidate);
            }
            steps += 1;
        }
    }
}

/// Computes next renewal dates using a pluggable [`RenewalStrategy`]
pub struct RenewalCalculator {
    strategy: Box<dyn RenewalStrategy>,
}

impl Default for RenewalCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl RenewalCalculator {
    /// Fixed 30/365-day cycles
    pub fn new() -> Self {
        Self::with_strategy(Box::new(FixedCycle))
    }

    /// Calendar-month cycles
    pub fn calendar() -> Self {
        Self::with_strategy(Box::new(CalendarCycle))
    }

    pub fn with_strategy(strategy: Box<dyn RenewalStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Next renewal on or after `as_of`.
    ///
    /// A stored `next_renewal_date` is returned unchanged, even when it
    /// lies before `as_of` or before the start date. The cycle is checked
    /// first, so a malformed custom cycle always fails.
    pub fn next_renewal(&self, subscription: &Subscription, as_of: NaiveDate) -> Result<NaiveDate> {
        let days = cycle_days(subscription)?;

        if let Some(explicit) = subscription.next_renewal_date {
            return Ok(explicit);
        }

        self.strategy.next_from_start(
            subscription.billing_cycle,
            days,
            subscription.start_date,
            as_of,
        )
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::types::RecordId;
    use proptest::prelude::*;

    fn make_sub(cycle: BillingCycle, custom_days: i64, start: NaiveDate) -> Subscription {
        Subscription {
            id: RecordId::Int(1),
            provider_id: RecordId::Int(1),
            plan_name: None,
            price: 1.0,
            currency: String::new(),
            billing_cycle: cycle,
            custom_cycle_days: Some(custom_days),
            start_date: start,
            next_renewal_date: None,
            auto_renew: false,
            notes: None,
            created_at: None,
        }
    }

    fn any_cycle() -> impl Strategy<Value = BillingCycle> {
        prop_oneof![
            Just(BillingCycle::Monthly),
            Just(BillingCycle::Yearly),
            Just(BillingCycle::Custom),
        ]
    }

    fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_monthly_start_equals_as_of(offset in 0u64..20_000) {
            let day = epoch() + Days::new(offset);
            let sub = make_sub(BillingCycle::Monthly, 0, day);
            prop_assert_eq!(RenewalCalculator::new().next_renewal(&sub, day).unwrap(), day);
        }

        #[test]
        fn test_next_renewal_never_before_as_of(
            cycle in any_cycle(),
            custom_days in 1i64..1000,
            start_offset in 0u64..20_000,
            as_of_offset in 0u64..20_000,
            calendar in any::<bool>(),
        ) {
            let start = epoch() + Days::new(start_offset);
            let as_of = epoch() + Days::new(as_of_offset);
            let sub = make_sub(cycle, custom_days, start);
            let calc = if calendar { RenewalCalculator::calendar() } else { RenewalCalculator::new() };

            let next = calc.next_renewal(&sub, as_of).unwrap();
            prop_assert!(next >= as_of);
            prop_assert!(next >= start);
        }

        #[test]
        fn test_fixed_renewal_is_within_one_cycle(
            cycle in any_cycle(),
            custom_days in 1i64..1000,
            start_offset in 0u64..20_000,
            as_of_offset in 0u64..20_000,
        ) {
            let start = epoch() + Days::new(start_offset);
            let as_of = epoch() + Days::new(as_of_offset);
            let sub = make_sub(cycle, custom_days, start);
            let days = cycle_days(&sub).unwrap();

            let next = RenewalCalculator::new().next_renewal(&sub, as_of).unwrap();
            prop_assert_eq!((next - start).num_days() % days, 0);
            if as_of > start {
                prop_assert!((next - as_of).num_days() < days);
            }
        }
    }
}
