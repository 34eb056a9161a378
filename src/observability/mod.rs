//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! features / lifecycle produce:
//!     → logging.rs (structured `tracing` events, subscriber setup)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → whatever metrics recorder the embedding host installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - The library never installs a metrics exporter
//! - Metrics are cheap (atomic increments), no-ops without a recorder

pub mod logging;
pub mod metrics;
