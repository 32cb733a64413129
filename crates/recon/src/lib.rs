//! `rentroll-recon`: AM/PM rent-roll reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded rows, returns classified diff lines
//! and KPIs. No file formats or CLI concerns.

pub mod aggregate;
pub mod bridge;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod lease;
pub mod model;
pub mod summary;

pub use aggregate::{aggregate, SideAggregate};
pub use bridge::{normalize_name, Resolution, TenantBridge};
pub use config::{AssetOwners, BridgeConfig, BridgeGroup, PercentBase, Thresholds};
pub use engine::{diff, reconcile};
pub use error::ReconError;
pub use export::lines_to_csv;
pub use filter::{DiffOptions, LineFilter};
pub use lease::{lease_register, LeaseRegister};
pub use model::{AggregatedTenant, Delta, DiffLine, DiffResult, Kpis, Row, Side, Status, TenantId};
