//! Pure derivations of dashboard figures from a subscription snapshot.
//!
//! Amounts are accumulated as integer units of 1/10000 so that sums do not
//! depend on the order of the input. Accumulation saturates instead of
//! overflowing, since records loaded from storage are not re-validated.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    domain::{month_start, shift_month, Subscription, COST_SCALE},
    services::history::SpendHistory,
};

/// Number of months shown by the dashboard trend chart.
pub const DEFAULT_TREND_POINTS: usize = 6;

/// Chart colors assigned to categories by order of first appearance.
pub const CATEGORY_PALETTE: [&str; 5] = ["#2e95ff", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingRenewal {
    pub id: String,
    pub name: String,
    pub renewal_date: NaiveDate,
    pub days_until: i64,
    pub cost: f64,
    pub currency: String,
}

pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Sum of every cost, without currency conversion.
    pub fn total_cost(subscriptions: &[Subscription]) -> f64 {
        from_units(sum_units(subscriptions.iter().map(|sub| to_units(sub.cost))))
    }

    /// Cost per category in order of first appearance.
    pub fn by_category(subscriptions: &[Subscription]) -> Vec<CategoryTotal> {
        group_in_order(subscriptions, |sub| sub.category.as_str())
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect()
    }

    /// Cost per currency in order of first appearance.
    pub fn totals_by_currency(subscriptions: &[Subscription]) -> Vec<CurrencyTotal> {
        group_in_order(subscriptions, |sub| sub.currency.as_str())
            .into_iter()
            .map(|(currency, total)| CurrencyTotal { currency, total })
            .collect()
    }

    /// Flat placeholder series for charts when no history has been recorded.
    pub fn trend_series(total: f64, points: usize) -> Vec<f64> {
        vec![total; points]
    }

    /// Monthly totals for the `points` months ending with the month of
    /// `end`. Months before the first record are zero and gaps carry the
    /// previous recorded total forward.
    pub fn trend_from_history(
        history: &SpendHistory,
        end: NaiveDate,
        points: usize,
    ) -> Vec<TrendPoint> {
        let last = month_start(end);
        (0..points)
            .rev()
            .map(|offset| {
                let month = shift_month(last, -(offset as i32));
                let total = history
                    .points()
                    .iter()
                    .take_while(|point| point.month <= month)
                    .last()
                    .map(|point| point.total)
                    .unwrap_or(0.0);
                TrendPoint { month, total }
            })
            .collect()
    }

    /// Renewals falling between `today` and `today + within_days`, soonest first.
    pub fn upcoming_renewals(
        subscriptions: &[Subscription],
        today: NaiveDate,
        within_days: i64,
    ) -> Vec<UpcomingRenewal> {
        let mut upcoming: Vec<_> = subscriptions
            .iter()
            .filter_map(|sub| {
                let days_until = (sub.renewal_date - today).num_days();
                (0..=within_days).contains(&days_until).then(|| UpcomingRenewal {
                    id: sub.id.clone(),
                    name: sub.name.clone(),
                    renewal_date: sub.renewal_date,
                    days_until,
                    cost: sub.cost,
                    currency: sub.currency.clone(),
                })
            })
            .collect();
        upcoming.sort_by(|a, b| {
            a.renewal_date
                .cmp(&b.renewal_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        upcoming
    }

    pub fn category_palette_index(position: usize) -> usize {
        position % CATEGORY_PALETTE.len()
    }
}

/// Category share of the dashboard pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub category: String,
    pub total: f64,
    pub color: &'static str,
}

/// Everything the dashboard renders, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub subscription_count: usize,
    pub total: f64,
    pub categories: Vec<CategorySlice>,
    pub currencies: Vec<CurrencyTotal>,
    pub trend: Vec<TrendPoint>,
    pub upcoming: Vec<UpcomingRenewal>,
}

impl DashboardSummary {
    pub fn build(
        subscriptions: &[Subscription],
        history: &SpendHistory,
        today: NaiveDate,
        upcoming_within_days: i64,
    ) -> Self {
        let total = MetricsAggregator::total_cost(subscriptions);
        let categories = MetricsAggregator::by_category(subscriptions)
            .into_iter()
            .enumerate()
            .map(|(position, entry)| CategorySlice {
                category: entry.category,
                total: entry.total,
                color: CATEGORY_PALETTE[MetricsAggregator::category_palette_index(position)],
            })
            .collect();
        let trend = if history.is_empty() {
            let last = month_start(today);
            MetricsAggregator::trend_series(total, DEFAULT_TREND_POINTS)
                .into_iter()
                .enumerate()
                .map(|(index, total)| TrendPoint {
                    month: shift_month(last, index as i32 + 1 - DEFAULT_TREND_POINTS as i32),
                    total,
                })
                .collect()
        } else {
            MetricsAggregator::trend_from_history(history, today, DEFAULT_TREND_POINTS)
        };
        Self {
            subscription_count: subscriptions.len(),
            total,
            categories,
            currencies: MetricsAggregator::totals_by_currency(subscriptions),
            trend,
            upcoming: MetricsAggregator::upcoming_renewals(
                subscriptions,
                today,
                upcoming_within_days,
            ),
        }
    }
}

fn group_in_order<'a>(
    subscriptions: &'a [Subscription],
    key: impl Fn(&'a Subscription) -> &'a str,
) -> Vec<(String, f64)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, i128)> = Vec::new();
    for sub in subscriptions {
        let name = key(sub);
        let index = *positions.entry(name).or_insert_with(|| {
            groups.push((name, 0));
            groups.len() - 1
        });
        groups[index].1 = groups[index].1.saturating_add(to_units(sub.cost));
    }
    groups
        .into_iter()
        .map(|(name, units)| (name.to_string(), from_units(units)))
        .collect()
}

// `as` saturates at the i128 bounds and maps NaN to zero.
fn to_units(amount: f64) -> i128 {
    (amount * COST_SCALE).round() as i128
}

fn sum_units(units: impl Iterator<Item = i128>) -> i128 {
    units.fold(0, i128::saturating_add)
}

fn from_units(units: i128) -> f64 {
    units as f64 / COST_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingCycle, SubscriptionDraft};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sub(id: &str, cost: f64, category: &str, currency: &str) -> Subscription {
        SubscriptionDraft::new(id, cost, category, date(2025, 1, 1))
            .with_currency(currency)
            .into_subscription(id.to_string())
            .unwrap()
    }

    #[test]
    fn totals_of_empty_snapshot_are_zero() {
        assert_eq!(MetricsAggregator::total_cost(&[]), 0.0);
        assert!(MetricsAggregator::by_category(&[]).is_empty());
    }

    #[test]
    fn total_is_independent_of_order() {
        let mut subs = vec![
            sub("a", 0.1, "X", "USD"),
            sub("b", 0.2, "Y", "USD"),
            sub("c", 0.3, "X", "USD"),
            sub("d", 1e6 + 0.07, "Z", "USD"),
        ];
        let forward = MetricsAggregator::total_cost(&subs);
        subs.reverse();
        assert_eq!(forward.to_bits(), MetricsAggregator::total_cost(&subs).to_bits());
        subs.swap(0, 2);
        assert_eq!(forward.to_bits(), MetricsAggregator::total_cost(&subs).to_bits());
    }

    #[test]
    fn category_sums_add_up_to_total() {
        let subs = vec![
            sub("a", 15.99, "Streaming", "USD"),
            sub("b", 9.99, "Music", "USD"),
            sub("c", 4.49, "Streaming", "EUR"),
            sub("d", 0.01, "Cloud", "USD"),
        ];
        let categories = MetricsAggregator::by_category(&subs);
        let names: Vec<_> = categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Streaming", "Music", "Cloud"]);

        let units = sum_units(categories.iter().map(|c| to_units(c.total)));
        assert_eq!(from_units(units), MetricsAggregator::total_cost(&subs));
    }

    #[test]
    fn oversized_stored_costs_do_not_overflow() {
        let mut big = sub("big", 1.0, "A", "USD");
        big.cost = 1e15;
        let mut bigger = big.clone();
        bigger.id = "bigger".into();
        let subs = vec![big, bigger];

        assert_eq!(MetricsAggregator::total_cost(&subs), 2e15);
        assert_eq!(MetricsAggregator::by_category(&subs)[0].total, 2e15);

        let mut extreme = sub("x", 1.0, "A", "USD");
        extreme.cost = f64::MAX;
        let saturated = MetricsAggregator::total_cost(&[extreme.clone(), extreme]);
        assert!(saturated.is_finite() && saturated > 0.0);
    }

    #[test]
    fn currencies_are_grouped_separately() {
        let subs = vec![
            sub("a", 10.0, "A", "EUR"),
            sub("b", 5.0, "A", "USD"),
            sub("c", 2.5, "B", "EUR"),
        ];
        let totals = MetricsAggregator::totals_by_currency(&subs);
        assert_eq!(
            totals,
            vec![
                CurrencyTotal { currency: "EUR".into(), total: 12.5 },
                CurrencyTotal { currency: "USD".into(), total: 5.0 },
            ]
        );
    }

    #[test]
    fn trend_series_is_flat_placeholder() {
        assert_eq!(MetricsAggregator::trend_series(25.98, 3), vec![25.98; 3]);
        assert!(MetricsAggregator::trend_series(1.0, 0).is_empty());
    }

    #[test]
    fn trend_from_history_carries_totals_forward() {
        let mut history = SpendHistory::default();
        history.record(date(2025, 2, 3), 10.0);
        history.record(date(2025, 4, 20), 30.0);

        let trend = MetricsAggregator::trend_from_history(&history, date(2025, 5, 9), 5);
        let totals: Vec<_> = trend.iter().map(|p| p.total).collect();
        assert_eq!(totals, vec![0.0, 10.0, 10.0, 30.0, 30.0]);
        assert_eq!(trend[0].month, date(2025, 1, 1));
        assert_eq!(trend[4].month, date(2025, 5, 1));
    }

    #[test]
    fn upcoming_renewals_are_windowed_and_sorted() {
        let mut late = sub("late", 1.0, "A", "USD");
        late.renewal_date = date(2025, 2, 10);
        let mut soon = sub("soon", 1.0, "A", "USD");
        soon.renewal_date = date(2025, 2, 2);
        let mut past = sub("past", 1.0, "A", "USD");
        past.renewal_date = date(2025, 1, 20);
        let mut yearly = sub("far", 1.0, "A", "USD");
        yearly.billing_cycle = BillingCycle::Yearly;
        yearly.refresh_renewal_date();

        let upcoming = MetricsAggregator::upcoming_renewals(
            &[late, soon, past, yearly],
            date(2025, 2, 1),
            14,
        );
        let names: Vec<_> = upcoming.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["soon", "late"]);
        assert_eq!(upcoming[0].days_until, 1);
    }

    #[test]
    fn dashboard_assigns_palette_colors_by_first_appearance() {
        let subs: Vec<_> = (0..6)
            .map(|i| sub(&format!("s{i}"), 1.0, &format!("C{i}"), "USD"))
            .collect();
        let summary = DashboardSummary::build(&subs, &SpendHistory::default(), date(2025, 3, 1), 7);
        assert_eq!(summary.categories[0].color, CATEGORY_PALETTE[0]);
        assert_eq!(summary.categories[5].color, CATEGORY_PALETTE[0]);
        assert_eq!(summary.trend.len(), DEFAULT_TREND_POINTS);
        assert_eq!(summary.trend[5].month, date(2025, 3, 1));
        assert!(summary.trend.iter().all(|p| p.total == 6.0));
    }
}
