//! Plain-text rendering for CLI reports

use chrono::NaiveDate;
use subtrack::services::normalizer::round_for_display;
use subtrack::types::{Provider, RenewalView, SubscriptionView, Summary};

fn money(value: f64, currency: &str) -> String {
    let amount = format!("{:.2}", round_for_display(value));
    if currency.is_empty() {
        amount
    } else {
        format!("{} {}", currency, amount)
    }
}

fn renewal_line(view: &RenewalView) -> String {
    format!(
        "  {}  {:<20} {:<16} {:>12}{}",
        view.next_renewal,
        view.provider_name,
        view.plan_name.as_deref().unwrap_or("-"),
        money(view.price, &view.currency),
        if view.auto_renew { "" } else { "  (manual)" }
    )
}

/// Renewals due within the window, soonest first
pub fn render_upcoming(summary: &Summary, as_of: NaiveDate, window_days: u32) -> String {
    let mut lines = vec![format!(
        "Upcoming renewals ({} days from {}):",
        window_days, as_of
    )];
    if summary.upcoming.is_empty() {
        lines.push("  none".to_string());
    }
    lines.extend(summary.upcoming.iter().map(renewal_line));

    if !summary.overdue.is_empty() {
        lines.push(String::new());
        lines.push("Overdue:".to_string());
        lines.extend(summary.overdue.iter().map(renewal_line));
    }
    lines.join("\n")
}

pub fn render_summary(summary: &Summary, as_of: NaiveDate, window_days: u32) -> String {
    let mut lines = Vec::new();

    let mut header = format!("Subscriptions: {}", summary.totals.count);
    if !summary.errors.is_empty() {
        header.push_str(&format!(" ({} skipped)", summary.errors.len()));
    }
    lines.push(header);
    lines.push(format!(
        "Estimated spend: {}/month, {}/year",
        money(summary.totals.monthly, ""),
        money(summary.totals.yearly, "")
    ));
    lines.push(String::new());
    lines.push(render_upcoming(summary, as_of, window_days));

    lines.push(String::new());
    lines.push("By provider:".to_string());
    for group in &summary.by_provider {
        lines.push(format!(
            "  {:<20} {:>3}  {}/month",
            group.provider_name,
            group.count,
            money(group.monthly, "")
        ));
    }

    if !summary.errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        for err in &summary.errors {
            lines.push(format!("  #{}: {}", err.subscription_id, err.error));
        }
    }

    lines.join("\n")
}

pub fn render_subscriptions(rows: &[SubscriptionView<'_>]) -> String {
    if rows.is_empty() {
        return "No subscriptions".to_string();
    }
    rows.iter()
        .map(|row| {
            let sub = row.subscription;
            let next = row
                .next_renewal
                .map(|d| d.to_string())
                .unwrap_or_else(|| "invalid cycle".to_string());
            format!(
                "#{:<6} {:<20} {:<16} {:>12} {:<8} next {}",
                sub.id.to_string(),
                row.provider_name,
                sub.plan_name.as_deref().unwrap_or("-"),
                money(sub.price, &sub.currency),
                sub.billing_cycle.as_str(),
                next
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_providers(rows: &[&Provider]) -> String {
    if rows.is_empty() {
        return "No providers".to_string();
    }
    rows.iter()
        .map(|p| match &p.url {
            Some(url) => format!("#{:<6} {:<20} {}", p.id.to_string(), p.name, url),
            None => format!("#{:<6} {}", p.id.to_string(), p.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtrack::types::{
        BillingCycle, ProviderSpend, RecordError, RecordId, Subscription, SubtrackError, Totals,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn make_view(id: i64, next: NaiveDate) -> RenewalView {
        RenewalView {
            subscription_id: RecordId::Int(id),
            provider_id: RecordId::Int(1),
            provider_name: "Netflix".into(),
            plan_name: Some("Standard".into()),
            price: 15.49,
            currency: "USD".into(),
            billing_cycle: BillingCycle::Monthly,
            cycle_days: 30,
            next_renewal: next,
            auto_renew: true,
            monthly: 15.49,
            yearly: 188.46,
        }
    }

    #[test]
    fn test_money_formats_two_decimals() {
        assert_eq!(money(9.863_013, "USD"), "USD 9.86");
        assert_eq!(money(25.0, ""), "25.00");
    }

    #[test]
    fn test_render_summary_sections() {
        let summary = Summary {
            totals: Totals {
                count: 2,
                monthly: 15.49,
                yearly: 188.461_666,
            },
            upcoming: vec![make_view(1, date(2024, 3, 10))],
            overdue: Vec::new(),
            by_provider: vec![ProviderSpend {
                provider_id: RecordId::Int(1),
                provider_name: "Netflix".into(),
                count: 1,
                monthly: 15.49,
            }],
            errors: vec![RecordError::new(
                RecordId::Int(2),
                &SubtrackError::InvalidCycle { days: 0 },
            )],
        };

        let text = render_summary(&summary, date(2024, 3, 1), 30);

        assert!(text.contains("Subscriptions: 2 (1 skipped)"));
        assert!(text.contains("Estimated spend: 15.49/month, 188.46/year"));
        assert!(text.contains("2024-03-10"));
        assert!(text.contains("USD 15.49"));
        assert!(text.contains("#2: invalid cycle: 0 days"));
        assert!(!text.contains("Overdue"));
    }

    #[test]
    fn test_render_upcoming_empty() {
        let text = render_upcoming(&Summary::default(), date(2024, 3, 1), 7);
        assert!(text.contains("Upcoming renewals (7 days from 2024-03-01):"));
        assert!(text.contains("none"));
    }

    #[test]
    fn test_render_subscriptions_marks_invalid_cycle() {
        let sub = Subscription {
            id: RecordId::Int(4),
            provider_id: RecordId::Int(2),
            plan_name: None,
            price: 3.0,
            currency: "USD".into(),
            billing_cycle: BillingCycle::Custom,
            custom_cycle_days: Some(0),
            start_date: date(2024, 1, 15),
            next_renewal_date: None,
            auto_renew: true,
            notes: None,
            created_at: None,
        };
        let rows = vec![SubscriptionView {
            subscription: &sub,
            provider_name: "Spotify".into(),
            next_renewal: None,
        }];

        let text = render_subscriptions(&rows);
        assert!(text.contains("custom"));
        assert!(text.contains("next invalid cycle"));
    }
}
