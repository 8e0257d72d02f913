pub mod account_service;
pub mod account_store;
pub mod application_service;
pub mod application_store;
pub mod audit_service;
pub mod auth_service;
pub mod contact_service;
pub mod document_storage;
pub mod export_service;
pub mod job_service;
pub mod lifecycle_service;
pub mod match_service;
#[cfg(test)]
pub mod memory_store;
pub mod message_service;
pub mod notification_service;
pub mod notifier;
