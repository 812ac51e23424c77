//! Event bus and notification plumbing for pipeline runs.
//!
//! - [`EventBus`] / [`PlatformEvent`]: in-process publish/subscribe.
//! - [`EventPersistence`]: writes every published event to the `events` table.
//! - [`delivery`]: outbound webhook and SMTP delivery.
//! - [`HitlNotifier`]: tells reviewers a checkpoint is waiting for them.

pub mod bus;
pub mod delivery;
pub mod event_types;
pub mod notifier;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use notifier::{HitlNotifier, NotifierConfig};
pub use persistence::EventPersistence;
