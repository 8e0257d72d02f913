pub mod account;
pub mod application;
pub mod audit_log;
pub mod contact_message;
pub mod job;
pub mod message;
pub mod notification;
pub mod profile;
pub mod session;
