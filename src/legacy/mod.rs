//! Legacy request/response context subsystem.
//!
//! # Data Flow
//! ```text
//! hosting layer (one context per request)
//!     → LegacyContext (request line, server variables, streams, principal)
//!     → features::LegacyFeatureCollection (reads/writes through it)
//!     → new-abstraction pipeline
//! ```
//!
//! # Responsibilities
//! - Define the contract of the property-bag context being adapted
//! - Define the legacy name/value header store contract
//! - Provide an in-memory context for tests, the CLI, and embedders
//!
//! # Design Decisions
//! - Every accessor takes `&self`; the legacy side owns its own mutability
//! - Streams are shared handles, handed out as-is (never copied)
//! - The context is shared via `Arc` and never disposed by the adapter

pub mod headers;
pub mod memory;
pub mod principal;

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

pub use headers::{HeaderStore, NameValueCollection};
pub use memory::{MemoryContext, MemoryContextBuilder, TransmitFileCall};
pub use principal::{GenericPrincipal, Principal};

/// Request body handle as exposed by the legacy context.
pub type InputStream = Arc<Mutex<dyn Read + Send>>;

/// Response body handle as exposed by the legacy context.
pub type OutputStream = Arc<Mutex<dyn Write + Send>>;

/// Length sentinel understood by [`LegacyContext::transmit_file`] as "rest of file".
pub const WHOLE_FILE: i64 = -1;

/// Client certificate slot of a legacy request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyClientCertificate {
    /// Whether the client presented a certificate at all.
    pub is_present: bool,
    /// Raw certificate bytes as received by the legacy layer.
    pub certificate: Vec<u8>,
}

impl LegacyClientCertificate {
    pub fn present(certificate: impl Into<Vec<u8>>) -> Self {
        Self {
            is_present: true,
            certificate: certificate.into(),
        }
    }
}

/// Low-level worker request reachable through the legacy service lookup.
pub trait WorkerRequest {
    /// Identifier the legacy layer uses to correlate trace events.
    fn request_trace_identifier(&self) -> Uuid;
}

/// One HTTP transaction in the legacy model.
///
/// Implemented by the hosting layer. The adapter reads and writes through
/// this trait for the duration of a single request, possibly from a task
/// that migrates between worker threads.
pub trait LegacyContext: Send + Sync {
    /// HTTP method, verbatim.
    fn http_method(&self) -> String;

    /// Whether the connection was established over TLS.
    fn is_secure_connection(&self) -> bool;

    /// Full request URL, if the legacy layer could build one.
    fn url(&self) -> Option<Url>;

    /// Application-relative path of the executing resource (e.g. `~/orders/list`).
    fn app_relative_execution_path(&self) -> String;

    /// Extra path segment following the executing resource.
    fn path_info(&self) -> String;

    /// Virtual root of the application (e.g. `/shop/`).
    fn app_virtual_path(&self) -> String;

    /// Server/environment variable lookup (`REMOTE_ADDR`, `SERVER_PORT`, ...).
    fn server_variable(&self, name: &str) -> Option<String>;

    /// Whether the request originated from the local machine.
    fn is_local(&self) -> bool;

    fn request_headers(&self) -> Arc<dyn HeaderStore>;

    fn input_stream(&self) -> InputStream;

    fn client_certificate(&self) -> Option<LegacyClientCertificate>;

    /// Stop processing the request immediately.
    fn abort(&self);

    fn status_code(&self) -> u16;

    fn set_status_code(&self, status_code: u16);

    fn status_description(&self) -> String;

    fn set_status_description(&self, description: String);

    fn response_headers(&self) -> Arc<dyn HeaderStore>;

    fn output_stream(&self) -> OutputStream;

    /// Signal cancelled when the client goes away.
    fn client_disconnected_token(&self) -> CancellationToken;

    /// Write a file region straight to the response.
    ///
    /// `length` is [`WHOLE_FILE`] for "until end of file". Must be called
    /// from the thread processing the request.
    fn transmit_file(&self, path: &Path, offset: i64, length: i64) -> io::Result<()>;

    fn user(&self) -> Option<Arc<dyn Principal>>;

    fn set_user(&self, user: Option<Arc<dyn Principal>>);

    /// Service lookup for the underlying worker request.
    fn worker_request(&self) -> Option<Arc<dyn WorkerRequest>> {
        None
    }
}
