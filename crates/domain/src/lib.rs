//! bytepress domain crate
//!
//! This crate contains the core digest logic following hexagonal architecture:
//! - `model`: Canonical article record, per-topic results, rendered digests
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `dates`: Ordered publish-date parsing strategies
//! - `usecases`: Fetch orchestration, enrichment, aggregation, rendering

pub mod dates;
pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;
