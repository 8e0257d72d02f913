use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::AccountStatus;
use crate::models::message::{CreateMessage, Message};

const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_id, body, created_at, read_at";

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sends a message to another active, non-admin user.
    pub async fn create(&self, msg: CreateMessage) -> Result<Message> {
        if msg.sender_id == msg.recipient_id {
            return Err(Error::BadRequest("You cannot message yourself".into()));
        }
        let recipient: Option<(String, String)> =
            sqlx::query_as("SELECT role, status FROM users WHERE id = $1")
                .bind(msg.recipient_id)
                .fetch_optional(&self.pool)
                .await?;
        match recipient {
            Some((role, status)) if role != "admin" && status == AccountStatus::Active.as_str() => {}
            _ => return Err(Error::NotFound("Recipient not found".into())),
        }

        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (sender_id, recipient_id, body)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(msg.sender_id)
        .bind(msg.recipient_id)
        .bind(msg.body.trim())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(message_id = %message.id, "message sent");
        Ok(message)
    }

    /// Both directions between two users, oldest first.
    pub async fn conversation(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {} FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(user_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Marks everything `other_id` sent to `user_id` as read.
    pub async fn mark_as_read(&self, user_id: Uuid, other_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE recipient_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
