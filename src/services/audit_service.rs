use crate::error::Result;
use crate::models::account::AccountStatus;
use crate::models::audit_log::AuditLog;
use serde_json::{json, Value as JsonValue};
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::PgPool;
use uuid::Uuid;

/// Request metadata recorded with an audit entry.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip: Option<IpNetwork>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        changes: Option<JsonValue>,
        meta: &RequestMeta,
    ) -> Result<AuditLog> {
        let row = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (user_id, action, entity_type, entity_id, changes, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, action, entity_type, entity_id, changes, ip_address, user_agent, created_at
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(changes)
        .bind(meta.ip)
        .bind(&meta.user_agent)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Records an admin status change. Failures are logged and swallowed.
    pub async fn record_status_change(
        &self,
        admin_id: Uuid,
        account_id: Uuid,
        action: &str,
        from: AccountStatus,
        to: AccountStatus,
        reason: Option<&str>,
        meta: &RequestMeta,
    ) {
        let changes = json!({ "from": from, "to": to, "reason": reason });
        if let Err(e) = self
            .log(Some(admin_id), action, "user", account_id, Some(changes), meta)
            .await
        {
            tracing::warn!(%account_id, action, error = %e, "failed to write audit log");
        }
    }
}
