//! Outbound notification boundary used by the account lifecycle and by
//! employer decisions on applications.
//!
//! Email goes to an HTTP mail relay, in-app records go to the notification
//! center, and realtime events are pushed to a publish endpoint. Only the
//! in-app write touches our own database.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::notification::NotificationKind;
use crate::services::notification_service::NotificationService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEmail {
    pub to: String,
    pub recipient_name: String,
    pub subject: String,
    pub html_body: String,
    pub cta_label: String,
    pub cta_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Failures are returned so the caller can log them and warn the admin.
    async fn send_status_email(&self, email: &StatusEmail) -> Result<()>;

    async fn create_in_app_notification(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Uuid>;

    /// Best-effort push to the user's connected clients. Never fails.
    async fn publish_realtime_status_event(
        &self,
        user_id: Uuid,
        event_type: &str,
        message: &str,
        reason: Option<String>,
    );
}

#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Default)]
pub struct RealtimeSettings {
    pub publish_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct HttpNotifier {
    client: Client,
    notifications: NotificationService,
    mail: MailSettings,
    realtime: RealtimeSettings,
}

impl HttpNotifier {
    pub fn new(
        client: Client,
        notifications: NotificationService,
        mail: MailSettings,
        realtime: RealtimeSettings,
    ) -> Self {
        Self {
            client,
            notifications,
            mail,
            realtime,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_status_email(&self, email: &StatusEmail) -> Result<()> {
        let Some(relay_url) = self.mail.relay_url.as_deref() else {
            return Err(Error::Internal("Mail relay is not configured".into()));
        };

        let payload = json!({
            "from": self.mail.from,
            "to": email.to,
            "to_name": email.recipient_name,
            "subject": email.subject,
            "html": email.html_body,
            "cta": { "label": email.cta_label, "url": email.cta_url },
        });

        let mut request = self.client.post(relay_url).json(&payload);
        if let Some(key) = self.mail.api_key.as_deref() {
            request = request.bearer_auth(key);
        }
        request.send().await?.error_for_status()?;

        tracing::info!(to = %email.to, subject = %email.subject, "status email handed to relay");
        Ok(())
    }

    async fn create_in_app_notification(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Uuid> {
        self.notifications.create(user_id, kind, message).await
    }

    async fn publish_realtime_status_event(
        &self,
        user_id: Uuid,
        event_type: &str,
        message: &str,
        reason: Option<String>,
    ) {
        let Some(url) = self.realtime.publish_url.clone() else {
            tracing::debug!(%user_id, event_type, "realtime publishing disabled");
            return;
        };

        let payload = json!({
            "channel": format!("user-{}", user_id),
            "name": event_type,
            "data": { "message": message, "reason": reason },
        });
        let client = self.client.clone();
        let api_key = self.realtime.api_key.clone();
        let event_type = event_type.to_string();

        tokio::spawn(async move {
            let mut request = client.post(&url).json(&payload);
            if let Some(key) = api_key {
                request = request.bearer_auth(key);
            }
            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => tracing::debug!(%user_id, event_type = %event_type, "realtime event published"),
                Err(e) => {
                    tracing::debug!(%user_id, event_type = %event_type, error = %e, "realtime publish failed")
                }
            }
        });
    }
}
