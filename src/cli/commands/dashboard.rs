use crate::cli::core::CommandResult;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::services::{DashboardSummary, SpendHistory};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "dashboard",
        "Show spend totals, categories, trend, and upcoming renewals",
        "dashboard",
        cmd_dashboard,
    )]
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let subscriptions = context.store.list();
    let history = SpendHistory::load(&**context.store.backend());
    let today = context.store.clock().today();
    let summary = DashboardSummary::build(
        &subscriptions,
        &history,
        today,
        context.config.upcoming_window_days,
    );
    let fmt = context.formatter;
    let preferred = context.settings.snapshot().preferred_currency;
    let single_currency = summary
        .currencies
        .first()
        .map(|entry| entry.currency.clone())
        .unwrap_or(preferred);

    output::section("Dashboard");
    output::two_column(&[
        ("Subscriptions", summary.subscription_count.to_string()),
        (
            "Total",
            fmt.mixed_amount(summary.total, summary.currencies.len(), &single_currency),
        ),
    ]);

    if summary.currencies.len() > 1 {
        output::section("By currency");
        let rows: Vec<_> = summary
            .currencies
            .iter()
            .map(|entry| (entry.currency.as_str(), fmt.amount(entry.total, &entry.currency)))
            .collect();
        output::two_column(&rows);
    }

    if !summary.categories.is_empty() {
        output::section("By category");
        let rows: Vec<_> = summary
            .categories
            .iter()
            .map(|slice| {
                (
                    slice.category.as_str(),
                    format!(
                        "{}  {}",
                        fmt.mixed_amount(slice.total, summary.currencies.len(), &single_currency),
                        slice.color
                    ),
                )
            })
            .collect();
        output::two_column(&rows);
    }

    output::section(if history.is_empty() {
        "Trend (no history recorded yet)"
    } else {
        "Trend"
    });
    let labels: Vec<String> = summary.trend.iter().map(|point| fmt.month(point.month)).collect();
    let rows: Vec<_> = labels
        .iter()
        .zip(&summary.trend)
        .map(|(label, point)| (label.as_str(), format!("{:.2}", point.total)))
        .collect();
    output::two_column(&rows);

    output::section(format!(
        "Renewing in the next {} days",
        context.config.upcoming_window_days
    ));
    if summary.upcoming.is_empty() {
        output::info("  Nothing due.");
    }
    for renewal in &summary.upcoming {
        output::info(format!(
            "  {}  {:<20} {} (in {} days)",
            fmt.date(renewal.renewal_date),
            renewal.name,
            fmt.amount(renewal.cost, &renewal.currency),
            renewal.days_until,
        ));
    }
    Ok(())
}
