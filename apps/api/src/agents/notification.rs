//! Notification agent. Delivery goes through a `NotificationSender` so the
//! transport can be swapped; the default sender only logs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{parse_action, Agent, AgentCore, AgentRequest, AgentResponse, Capability};
use crate::errors::AppError;

pub const NOTIFICATION_AGENT_ID: &str = "notification_agent";

const ACTIONS: &[&str] = &["send_notification"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Result data the message refers to, e.g. a list of matches.
    #[serde(default)]
    pub context: Option<Value>,
}

fn default_channel() -> String {
    "email".to_string()
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Returns whether the message was accepted for delivery.
    async fn send(&self, notification: &Notification) -> Result<bool, AppError>;
}

/// Writes notifications to the log instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<bool, AppError> {
        info!(
            to = %notification.to,
            channel = %notification.channel,
            subject = %notification.subject,
            has_context = notification.context.is_some(),
            "notification dispatched"
        );
        Ok(true)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
enum NotificationAction {
    SendNotification(Notification),
}

pub struct NotificationAgent {
    core: AgentCore,
    sender: Arc<dyn NotificationSender>,
}

impl NotificationAgent {
    pub fn new(sender: Arc<dyn NotificationSender>, history_limit: usize) -> Self {
        Self {
            core: AgentCore::new(
                NOTIFICATION_AGENT_ID,
                "Notification Agent",
                "result",
                vec![Capability::Notification],
                history_limit,
            ),
            sender,
        }
    }

    async fn dispatch(&self, action: NotificationAction) -> Result<Value, AppError> {
        match action {
            NotificationAction::SendNotification(notification) => {
                let to = notification.to.trim();
                if to.is_empty() || (notification.channel == "email" && !to.contains('@')) {
                    return Err(AppError::Validation(format!(
                        "invalid recipient '{}' for channel {}",
                        notification.to, notification.channel
                    )));
                }
                let delivered = self.sender.send(&notification).await?;
                Ok(json!({
                    "delivered": delivered,
                    "to": notification.to,
                    "channel": notification.channel,
                }))
            }
        }
    }
}

#[async_trait]
impl Agent for NotificationAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn execute(&self, request: AgentRequest) -> AgentResponse {
        match parse_action::<NotificationAction>(self.id(), ACTIONS, &request) {
            Ok(action) => self.core.run(&request.action, self.dispatch(action)).await,
            Err(e) => self.core.reject(&request.action, &e),
        }
    }
}
