//! Request hosting subsystem.
//!
//! # Data Flow
//! ```text
//! legacy request arrives
//!     → host.rs (one adapter + HttpContext per request)
//!     → module.rs (every HttpModule::begin_request, in registration order)
//!     → caller's handler
//!     → every HttpModule::end_request
//!     → context dropped, legacy context untouched
//! ```
//!
//! # Design Decisions
//! - The context is created once and shared by begin, handler, and end
//! - Modules observe; they cannot short-circuit the handler

pub mod host;
pub mod module;

pub use host::RequestHost;
pub use module::HttpModule;
