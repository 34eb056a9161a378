//! Feature collection subsystem.
//!
//! # Data Flow
//! ```text
//! new-abstraction pipeline
//!     → collection.rs (get/iter by FeatureKey, availability table)
//!     → request.rs / response.rs / connection.rs / identifier.rs
//!       lifetime.rs / tls.rs / send_file.rs / authentication.rs
//!     → legacy::LegacyContext
//! ```
//!
//! # Responsibilities
//! - Define one small trait per server capability
//! - Implement all of them on a single adapter over a legacy context
//! - Answer "is this capability available for this request?"
//!
//! # Design Decisions
//! - Keys are the `TypeId` of the capability trait object
//! - The registry is read-only; `set` always fails
//! - Availability is a per-key predicate evaluated on every lookup

pub mod authentication;
pub mod collection;
pub mod connection;
pub mod identifier;
pub mod lifetime;
pub mod request;
pub mod response;
pub mod send_file;
pub mod tls;

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

pub use authentication::{AuthenticationHandler, HttpAuthenticationFeature};
pub use collection::{AsFeature, LegacyFeatureCollection, WorkerRequestProvider};
pub use connection::HttpConnectionFeature;
pub use identifier::HttpRequestIdentifierFeature;
pub use lifetime::HttpRequestLifetimeFeature;
pub use request::HttpRequestFeature;
pub use response::{HttpResponseFeature, ResponseCallback};
pub use send_file::{HttpSendFileFeature, SendFileError};
pub use tls::TlsConnectionFeature;

/// Errors raised by capability calls.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Permanent gap in what the legacy model can express.
    #[error("{0} is not supported")]
    NotSupported(&'static str),

    /// A server variable needed by the call is absent or malformed.
    #[error("server variable {name} is unusable ({reason})")]
    ServerVariable {
        name: String,
        value: Option<String>,
        reason: String,
    },
}

/// Identity of a capability, used as the registry lookup key.
#[derive(Clone, Copy)]
pub struct FeatureKey {
    id: TypeId,
    name: &'static str,
}

impl FeatureKey {
    /// Key of the capability trait object `F`, e.g. `dyn TlsConnectionFeature`.
    pub fn of<F: ?Sized + 'static>() -> Self {
        let full = std::any::type_name::<F>();
        let name = full.rsplit("::").next().unwrap_or(full);
        Self {
            id: TypeId::of::<F>(),
            name,
        }
    }

    pub fn request() -> Self {
        Self::of::<dyn HttpRequestFeature>()
    }

    pub fn response() -> Self {
        Self::of::<dyn HttpResponseFeature>()
    }

    pub fn connection() -> Self {
        Self::of::<dyn HttpConnectionFeature>()
    }

    pub fn request_identifier() -> Self {
        Self::of::<dyn HttpRequestIdentifierFeature>()
    }

    pub fn lifetime() -> Self {
        Self::of::<dyn HttpRequestLifetimeFeature>()
    }

    pub fn send_file() -> Self {
        Self::of::<dyn HttpSendFileFeature>()
    }

    pub fn authentication() -> Self {
        Self::of::<dyn HttpAuthenticationFeature>()
    }

    pub fn tls() -> Self {
        Self::of::<dyn TlsConnectionFeature>()
    }

    /// Short trait name, for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for FeatureKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FeatureKey {}

impl Hash for FeatureKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeatureKey").field(&self.name).finish()
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
