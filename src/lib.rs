pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    account_service::AccountService,
    account_store::{AccountStore, PgAccountStore},
    application_service::ApplicationService,
    application_store::PgApplicationStore,
    audit_service::AuditService,
    auth_service::AuthService,
    contact_service::ContactService,
    document_storage::DocumentStorage,
    job_service::JobService,
    lifecycle_service::LifecycleService,
    message_service::MessageService,
    notification_service::NotificationService,
    notifier::{HttpNotifier, MailSettings, Notifier, RealtimeSettings},
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthService,
    pub lifecycle: LifecycleService,
    pub accounts: AccountService,
    pub jobs: JobService,
    pub applications: ApplicationService,
    pub notifications: NotificationService,
    pub messages: MessageService,
    pub contacts: ContactService,
    pub audit: AuditService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool.clone()));
        let notifications = NotificationService::new(pool.clone());
        let notifier: Arc<dyn Notifier> = Arc::new(HttpNotifier::new(
            http_client,
            notifications.clone(),
            MailSettings {
                relay_url: config.mail_relay_url.clone(),
                api_key: config.mail_api_key.clone(),
                from: config.mail_from.clone(),
            },
            RealtimeSettings {
                publish_url: config.realtime_publish_url.clone(),
                api_key: config.realtime_api_key.clone(),
            },
        ));

        let auth = AuthService::new(store.clone(), config.jwt_secret.clone(), config.jwt_ttl_hours);
        let lifecycle = LifecycleService::new(
            store,
            notifier.clone(),
            DocumentStorage::new(&config.uploads_dir),
            &config.portal_base_url,
        )?;

        Ok(Self {
            auth,
            lifecycle,
            accounts: AccountService::new(pool.clone()),
            jobs: JobService::new(pool.clone()),
            applications: ApplicationService::new(
                pool.clone(),
                Arc::new(PgApplicationStore::new(pool.clone())),
                notifier,
            ),
            notifications,
            messages: MessageService::new(pool.clone()),
            contacts: ContactService::new(pool.clone()),
            audit: AuditService::new(pool.clone()),
            pool,
        })
    }
}
