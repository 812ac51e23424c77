//! Outbound delivery channels for events.

pub mod email;
pub mod webhook;

pub use email::{EmailConfig, EmailDelivery, EmailError};
pub use webhook::{WebhookDelivery, WebhookError};
