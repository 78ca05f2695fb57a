//! Subscription records, drafts, and billing cycles.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::shift_month;
use crate::errors::SubscriptionError;

/// Costs are held to a resolution of 1/`COST_SCALE` (four decimal places).
pub const COST_SCALE: f64 = 10_000.0;

/// Largest accepted cost of a single charge.
pub const MAX_COST: f64 = 100_000_000.0;

/// Fixed period between two charges of a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn months(self) -> i32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Yearly => 12,
        }
    }

    /// Next charge date for a subscription that started on `start`.
    pub fn renewal_after(self, start: NaiveDate) -> NaiveDate {
        shift_month(start, self.months())
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for BillingCycle {
    type Err = SubscriptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(BillingCycle::Monthly),
            "yearly" | "year" | "annual" | "y" => Ok(BillingCycle::Yearly),
            other => Err(SubscriptionError::Validation(format!(
                "unknown billing cycle `{other}` (expected monthly or yearly)"
            ))),
        }
    }
}

/// A recurring charge tracked by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub category: String,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Subscription {
    /// Re-derives `renewal_date` from `start_date` and `billing_cycle`.
    pub fn refresh_renewal_date(&mut self) {
        self.renewal_date = self.billing_cycle.renewal_after(self.start_date);
    }

    pub fn to_draft(&self) -> SubscriptionDraft {
        SubscriptionDraft {
            name: self.name.clone(),
            cost: self.cost,
            currency: self.currency.clone(),
            billing_cycle: self.billing_cycle,
            category: self.category.clone(),
            start_date: self.start_date,
            notes: self.notes.clone(),
        }
    }

    /// Validates and normalizes the record in place ahead of a save.
    pub(crate) fn normalize(&mut self) -> Result<(), SubscriptionError> {
        let fields = NormalizedFields::check(
            &self.name,
            self.cost,
            &self.currency,
            &self.category,
            self.notes.as_deref(),
        )?;
        self.name = fields.name;
        self.currency = fields.currency;
        self.category = fields.category;
        self.notes = fields.notes;
        self.refresh_renewal_date();
        Ok(())
    }
}

/// Form input for a subscription that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDraft {
    pub name: String,
    pub cost: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub category: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SubscriptionDraft {
    pub fn new(
        name: impl Into<String>,
        cost: f64,
        category: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            cost,
            currency: "USD".into(),
            billing_cycle: BillingCycle::Monthly,
            category: category.into(),
            start_date,
            notes: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_cycle(mut self, cycle: BillingCycle) -> Self {
        self.billing_cycle = cycle;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Parses a user-entered cost, rejecting blanks and non-numeric input.
    pub fn parse_cost(raw: &str) -> Result<f64, SubscriptionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubscriptionError::Validation("cost is required".into()));
        }
        trimmed
            .parse::<f64>()
            .map_err(|_| SubscriptionError::Validation(format!("`{trimmed}` is not a valid cost")))
    }

    /// Validates the draft and turns it into a record with the given id.
    pub(crate) fn into_subscription(self, id: String) -> Result<Subscription, SubscriptionError> {
        let fields = NormalizedFields::check(
            &self.name,
            self.cost,
            &self.currency,
            &self.category,
            self.notes.as_deref(),
        )?;
        Ok(Subscription {
            id,
            name: fields.name,
            cost: self.cost,
            currency: fields.currency,
            billing_cycle: self.billing_cycle,
            category: fields.category,
            start_date: self.start_date,
            renewal_date: self.billing_cycle.renewal_after(self.start_date),
            notes: fields.notes,
        })
    }
}

struct NormalizedFields {
    name: String,
    currency: String,
    category: String,
    notes: Option<String>,
}

impl NormalizedFields {
    fn check(
        name: &str,
        cost: f64,
        currency: &str,
        category: &str,
        notes: Option<&str>,
    ) -> Result<Self, SubscriptionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubscriptionError::Validation("name is required".into()));
        }
        if !cost.is_finite() || cost <= 0.0 {
            return Err(SubscriptionError::Validation(format!(
                "cost must be a positive amount, got {cost}"
            )));
        }
        if cost > MAX_COST {
            return Err(SubscriptionError::Validation(format!(
                "cost must not exceed {MAX_COST}, got {cost}"
            )));
        }
        let scaled = cost * COST_SCALE;
        if (scaled - scaled.round()).abs() > 1e-3 {
            return Err(SubscriptionError::Validation(format!(
                "cost supports at most four decimal places, got {cost}"
            )));
        }
        let currency = currency.trim();
        if currency.is_empty() {
            return Err(SubscriptionError::Validation("currency is required".into()));
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(SubscriptionError::Validation("category is required".into()));
        }
        let notes = notes
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        Ok(Self {
            name: name.to_string(),
            currency: currency.to_ascii_uppercase(),
            category: category.to_string(),
            notes,
        })
    }
}
