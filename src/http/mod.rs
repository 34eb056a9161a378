//! New-abstraction HTTP surface over the legacy model.
//!
//! # Data Flow
//! ```text
//! legacy::LegacyContext
//!     → features::LegacyFeatureCollection (capability registry)
//!     → context.rs (typed HttpContext facade)
//!     → application code
//!
//! legacy header store  → headers.rs (live HeaderView)
//! legacy byte stream   → stream.rs (DelegatingStream pass-through)
//! ```
//!
//! # Design Decisions
//! - Views hold the legacy object itself, never a copy
//! - Stream wrappers add no buffering and no behavior of their own

pub mod context;
pub mod headers;
pub mod stream;

pub use context::{ContextSnapshot, HttpContext};
pub use headers::{HeaderError, HeaderView, StringValues};
pub use stream::{DelegatingStream, StreamTimeouts};
