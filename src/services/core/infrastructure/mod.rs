// src/services/core/infrastructure/mod.rs

//! Infrastructure Services Module
//!
//! Storage-facing services: the D1 binding wrapper, the snapshot store, the
//! read-only integration/preference repositories, and the health record
//! store backing the monitor.

pub mod d1;
pub mod health_store;
pub mod integrations;
pub mod snapshot_store;

pub use d1::D1Service;
pub use health_store::HealthRecordStore;
pub use integrations::IntegrationRepository;
pub use snapshot_store::SnapshotStore;
