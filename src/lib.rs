#![doc(test(attr(deny(warnings))))]

//! SubTrack Core keeps a list of recurring subscriptions in a key-value
//! store and derives dashboard figures from it.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod services;
pub mod storage;
pub mod utils;

pub use domain::{BillingCycle, Subscription, SubscriptionDraft, UserSettings};
pub use errors::{StorageError, SubscriptionError};
pub use services::{DashboardSummary, MetricsAggregator, SettingsManager, SubscriptionStore};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("SubTrack tracing initialized.");
    });
}
