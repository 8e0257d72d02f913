use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::message_dto::{ContactListQuery, ContactPayload};
use crate::error::{Error, Result};
use crate::models::contact_message::ContactMessage;

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, status, created_at";

/// Messages sent through the public contact form.
#[derive(Clone)]
pub struct ContactService {
    pool: PgPool,
}

impl ContactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(&self, payload: ContactPayload) -> Result<ContactMessage> {
        let message = sqlx::query_as::<_, ContactMessage>(&format!(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        ))
        .bind(payload.name.trim())
        .bind(payload.email.trim())
        .bind(payload.subject.trim())
        .bind(payload.message.trim())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(contact_id = %message.id, "contact message received");
        Ok(message)
    }

    pub async fn list(&self, query: ContactListQuery) -> Result<Vec<ContactMessage>> {
        let limit = query.limit.unwrap_or(50).clamp(1, 200);
        let items = match query.status.as_deref() {
            Some(status @ ("unread" | "read")) => {
                sqlx::query_as::<_, ContactMessage>(&format!(
                    "SELECT {} FROM contact_messages WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
                    CONTACT_COLUMNS
                ))
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(other) => {
                return Err(Error::BadRequest(format!("Unknown contact status: {}", other)))
            }
            None => {
                sqlx::query_as::<_, ContactMessage>(&format!(
                    "SELECT {} FROM contact_messages ORDER BY created_at DESC LIMIT $1",
                    CONTACT_COLUMNS
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(items)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<ContactMessage> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "UPDATE contact_messages SET status = 'read' WHERE id = $1 RETURNING {}",
            CONTACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Contact message not found".into()))
    }
}
