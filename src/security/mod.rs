//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Legacy client certificate bytes:
//!     → certificate.rs (PEM/DER decode, X.509 parse)
//!     → TLS feature (absent on any parse failure)
//!
//! Legacy user principal:
//!     → principal.rs (wrap into claims principal)
//!     → authentication feature (cached per request)
//! ```
//!
//! # Design Decisions
//! - Report only what the legacy layer already established
//! - A certificate that cannot be parsed is the same as no certificate
//! - Claims principals are immutable once built; replacing means re-wrapping

pub mod certificate;
pub mod principal;

pub use certificate::{CertificateError, ClientCertificate};
pub use principal::{claim_types, Claim, ClaimsIdentity, ClaimsPrincipal};
