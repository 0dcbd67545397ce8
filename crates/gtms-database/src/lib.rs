//! # gtms-database
//!
//! PostgreSQL connection management, the record-store traits consumed by
//! the notification pipeline, their PostgreSQL implementations, and an
//! in-memory implementation used by tests and the CLI dry runs.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryRecordStore;
pub use store::{
    AlertStore, ClinicalStore, ComplianceStore, LocationStore, NotificationHistoryStore,
    NotificationStore, PushSubscriptionStore, Stores,
};
