//! Reviewer notifications for new HITL tasks.
//!
//! Listens for `hitl.task_created` and fans each one out to the task's
//! assignee by email and to `HITL_WEBHOOK_URL`, whichever are configured.
//! Deliveries run on their own tasks so a slow webhook never stalls the
//! subscription.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;
use crate::delivery::{EmailConfig, EmailDelivery, WebhookDelivery};
use crate::event_types;

#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    pub webhook_url: Option<String>,
    pub email: Option<EmailConfig>,
}

impl NotifierConfig {
    /// `HITL_WEBHOOK_URL` plus the SMTP settings of [`EmailConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("HITL_WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
            email: EmailConfig::from_env(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some() || self.email.is_some()
    }
}

pub struct HitlNotifier {
    webhook_url: Option<String>,
    webhook: Arc<WebhookDelivery>,
    email: Option<Arc<EmailDelivery>>,
}

impl HitlNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            webhook_url: config.webhook_url,
            webhook: Arc::new(WebhookDelivery::new()),
            email: config.email.map(|c| Arc::new(EmailDelivery::new(c))),
        }
    }

    pub fn with_webhook(mut self, webhook: WebhookDelivery) -> Self {
        self.webhook = Arc::new(webhook);
        self
    }

    /// Consume events until the bus closes or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = receiver.recv() => received,
            };
            match received {
                Ok(event) if event.event_type == event_types::HITL_TASK_CREATED => {
                    self.notify(event);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "HITL notifier lagged, notifications were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("HITL notifier stopped");
    }

    fn notify(&self, event: PlatformEvent) {
        let event = Arc::new(event);

        if let Some(url) = self.webhook_url.clone() {
            let webhook = Arc::clone(&self.webhook);
            let event = Arc::clone(&event);
            tokio::spawn(async move {
                if let Err(e) = webhook.deliver(&url, &event).await {
                    tracing::error!(error = %e, "HITL webhook notification failed");
                }
            });
        }

        let assignee = event.payload["assignee"].as_str().map(str::to_string);
        if let (Some(email), Some(to)) = (self.email.clone(), assignee) {
            let (subject, body) = review_message(&event);
            tokio::spawn(async move {
                if let Err(e) = email.send(&to, &subject, body).await {
                    tracing::error!(error = %e, to, "HITL email notification failed");
                }
            });
        }
    }
}

/// Subject and body of the reviewer email.
pub fn review_message(event: &PlatformEvent) -> (String, String) {
    let task_name = event.payload["task_name"].as_str().unwrap_or("review");
    let run_key = event.payload["run_key"].as_str().unwrap_or("unknown");
    let task_id = event
        .source_entity_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".to_string());

    let subject = format!("[AdAPT] Review required: {task_name} for run {run_key}");
    let body = format!(
        "A pipeline run is waiting for your decision.\n\n\
         Run: {run_key}\nTask: {task_name} (#{task_id})\nCreated: {}\n\n\
         Approve or reject it via POST /api/v1/tasks/{task_id}/approve or /reject.",
        event.timestamp
    );
    (subject, body)
}
