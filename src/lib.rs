//! Bridge from a legacy property-bag HTTP context to a typed capability
//! registry.
//!
//! A [`LegacyFeatureCollection`] wraps one [`legacy::LegacyContext`] and
//! answers capability lookups for it; [`HttpContext`] is the typed facade
//! new-abstraction code works with, and [`RequestHost`] runs modules and a
//! handler against one such context per request.

// Legacy model
pub mod legacy;

// Capability registry and typed surface
pub mod features;
pub mod http;
pub mod security;

// Hosting
pub mod lifecycle;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::BridgeConfig;
pub use features::{FeatureError, FeatureKey, LegacyFeatureCollection};
pub use http::HttpContext;
pub use lifecycle::{HttpModule, RequestHost};
