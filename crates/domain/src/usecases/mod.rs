//! Application use cases / business logic

pub mod aggregate;
pub mod digest;
pub mod enrich;
pub mod fetch;
pub mod render;

pub use aggregate::aggregate;
pub use digest::{DigestConfig, DigestError, DigestPipeline, DigestReport};
pub use enrich::Enricher;
pub use fetch::{FetchConfig, FetchOrchestrator};
pub use render::{RenderConfig, Renderer};
