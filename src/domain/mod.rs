//! Pure domain models: subscriptions, billing cycles, and user settings.
//! No I/O and no storage access.

pub mod common;
pub mod settings;
pub mod subscription;

pub use common::*;
pub use settings::*;
pub use subscription::*;
