use chrono::NaiveDate;

use crate::cli::core::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::domain::{BillingCycle, Subscription, SubscriptionDraft};

const ADD_USAGE: &str =
    "add name=<text> cost=<amount> category=<text> [currency=<code>] [cycle=monthly|yearly] [start=YYYY-MM-DD] [notes=<text>]";
const EDIT_USAGE: &str = "edit <id> <field>=<value>...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("list", "List all subscriptions", "list", cmd_list),
        CommandEntry::new("show", "Show one subscription", "show <id>", cmd_show),
        CommandEntry::new("add", "Record a new subscription", ADD_USAGE, cmd_add),
        CommandEntry::new("edit", "Change fields of a subscription", EDIT_USAGE, cmd_edit),
        CommandEntry::new("delete", "Remove a subscription", "delete <id>", cmd_delete),
    ]
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let subscriptions = context.store.list();
    if subscriptions.is_empty() {
        output::info("No subscriptions yet. Use `add` to record one.");
        return Ok(());
    }
    output::section(format!("Subscriptions ({})", subscriptions.len()));
    for sub in &subscriptions {
        output::info(format!(
            "{}  {:<20} {:>14} {:<8} {:<14} next {}",
            sub.id,
            sub.name,
            context.formatter.amount(sub.cost, &sub.currency),
            sub.billing_cycle,
            sub.category,
            context.formatter.date(sub.renewal_date),
        ));
    }
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = args.first().ok_or_else(|| CommandError::usage("show <id>"))?;
    let sub = context.store.require(id)?;
    print_details(context, &sub);
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let fields = parse_fields(args)?;
    let lookup = |key: &str| {
        fields
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    };
    let name = lookup("name").ok_or_else(|| CommandError::usage(ADD_USAGE))?;
    let cost = SubscriptionDraft::parse_cost(lookup("cost").unwrap_or_default())?;
    let category = lookup("category").unwrap_or_default();
    let start = match lookup("start") {
        Some(raw) => parse_date(raw)?,
        None => context.store.clock().today(),
    };

    let mut draft = SubscriptionDraft::new(name, cost, category, start)
        .with_currency(context.settings.snapshot().preferred_currency);
    if let Some(currency) = lookup("currency") {
        draft.currency = currency.to_string();
    }
    if let Some(cycle) = lookup("cycle") {
        draft.billing_cycle = cycle.parse::<BillingCycle>()?;
    }
    if let Some(notes) = lookup("notes") {
        draft.notes = Some(notes.to_string());
    }

    let created = context.store.create(draft)?;
    output::success(format!("Created {} ({})", created.name, created.id));
    output::info(format!(
        "Next renewal: {}",
        context.formatter.date(created.renewal_date)
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (id, rest) = args
        .split_first()
        .ok_or_else(|| CommandError::usage(EDIT_USAGE))?;
    let fields = parse_fields(rest)?;
    if fields.is_empty() {
        return Err(CommandError::usage(EDIT_USAGE));
    }
    let mut record = context.store.require(id)?;
    for (key, value) in &fields {
        apply_field(&mut record, key, value)?;
    }
    context.store.update(record)?;
    let saved = context.store.require(id)?;
    output::success(format!("Updated {}", saved.name));
    print_details(context, &saved);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = args.first().ok_or_else(|| CommandError::usage("delete <id>"))?;
    let existing = context.store.get_by_id(id);
    context.store.delete(id)?;
    match existing {
        Some(sub) => output::success(format!("Deleted {}", sub.name)),
        None => output::info(format!("No subscription with id `{id}`; nothing to delete.")),
    }
    Ok(())
}

fn print_details(context: &ShellContext, sub: &Subscription) {
    let fmt = &context.formatter;
    output::section(&sub.name);
    let mut rows = vec![
        ("Id", sub.id.clone()),
        ("Cost", fmt.amount(sub.cost, &sub.currency)),
        ("Cycle", sub.billing_cycle.to_string()),
        ("Category", sub.category.clone()),
        ("Started", fmt.date(sub.start_date)),
        ("Renews", fmt.date(sub.renewal_date)),
    ];
    if let Some(notes) = &sub.notes {
        rows.push(("Notes", notes.clone()));
    }
    output::two_column(&rows);
}

fn apply_field(record: &mut Subscription, key: &str, value: &str) -> CommandResult {
    match key {
        "name" => record.name = value.to_string(),
        "cost" => record.cost = SubscriptionDraft::parse_cost(value)?,
        "currency" => record.currency = value.to_string(),
        "cycle" => record.billing_cycle = value.parse()?,
        "category" => record.category = value.to_string(),
        "start" => record.start_date = parse_date(value)?,
        "notes" => record.notes = Some(value.to_string()),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown field `{other}` (expected name, cost, currency, cycle, category, start, or notes)"
            )))
        }
    }
    Ok(())
}

/// Splits `key=value` arguments. Keys are matched case-insensitively.
fn parse_fields(args: &[&str]) -> Result<Vec<(String, String)>, CommandError> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                CommandError::InvalidArguments(format!("expected <field>=<value>, got `{arg}`"))
            })?;
            Ok((key.trim().to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a date (expected YYYY-MM-DD)"))
    })
}
