//! Business logic over the domain models. No terminal I/O.

pub mod history;
pub mod metrics;
pub mod settings_service;
pub mod subscription_service;
pub mod time;

pub use history::{HistoryPoint, SpendHistory};
pub use metrics::{DashboardSummary, MetricsAggregator};
pub use settings_service::SettingsManager;
pub use subscription_service::SubscriptionStore;
pub use time::{Clock, FixedClock, SystemClock};
