//! In-memory legacy context.
//!
//! Behaves like a hosted legacy request without a server behind it: the
//! request line, variables, and certificate are fixed at build time, while
//! response state, the user slot, aborts, and file transmissions are
//! recorded so callers can inspect them afterwards.

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use super::{
    HeaderStore, InputStream, LegacyClientCertificate, LegacyContext, NameValueCollection,
    OutputStream, Principal, WorkerRequest,
};

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded [`LegacyContext::transmit_file`] invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitFileCall {
    pub path: PathBuf,
    pub offset: i64,
    pub length: i64,
}

/// Worker request carrying a fixed trace identifier.
#[derive(Debug, Clone, Copy)]
pub struct MemoryWorkerRequest {
    trace_identifier: Uuid,
}

impl MemoryWorkerRequest {
    pub fn new(trace_identifier: Uuid) -> Self {
        Self { trace_identifier }
    }
}

impl WorkerRequest for MemoryWorkerRequest {
    fn request_trace_identifier(&self) -> Uuid {
        self.trace_identifier
    }
}

/// A legacy context held entirely in memory.
#[derive(Debug)]
pub struct MemoryContext {
    method: String,
    url: Option<Url>,
    secure: bool,
    app_virtual_path: String,
    execution_path: String,
    path_info: String,
    server_variables: HashMap<String, String>,
    is_local: bool,
    request_headers: Arc<NameValueCollection>,
    response_headers: Arc<NameValueCollection>,
    input: Arc<Mutex<Cursor<Vec<u8>>>>,
    output: Arc<Mutex<Vec<u8>>>,
    status_code: Mutex<u16>,
    status_description: Mutex<String>,
    client_certificate: Option<LegacyClientCertificate>,
    user: Mutex<Option<Arc<dyn Principal>>>,
    worker_request: Option<Arc<MemoryWorkerRequest>>,
    disconnected: CancellationToken,
    aborted: AtomicBool,
    transmitted: Mutex<Vec<TransmitFileCall>>,
    transmit_failure: Option<io::ErrorKind>,
}

impl MemoryContext {
    pub fn builder() -> MemoryContextBuilder {
        MemoryContextBuilder::default()
    }

    /// Bytes written to the response body so far.
    pub fn written_body(&self) -> Vec<u8> {
        lock(&self.output).clone()
    }

    /// Every `transmit_file` call that reached this context.
    pub fn transmitted_files(&self) -> Vec<TransmitFileCall> {
        lock(&self.transmitted).clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Simulate the client going away.
    pub fn disconnect(&self) {
        self.disconnected.cancel();
    }

    /// Typed access to the response header store.
    pub fn response_header_store(&self) -> &NameValueCollection {
        &self.response_headers
    }
}

impl LegacyContext for MemoryContext {
    fn http_method(&self) -> String {
        self.method.clone()
    }

    fn is_secure_connection(&self) -> bool {
        self.secure
    }

    fn url(&self) -> Option<Url> {
        self.url.clone()
    }

    fn app_relative_execution_path(&self) -> String {
        self.execution_path.clone()
    }

    fn path_info(&self) -> String {
        self.path_info.clone()
    }

    fn app_virtual_path(&self) -> String {
        self.app_virtual_path.clone()
    }

    fn server_variable(&self, name: &str) -> Option<String> {
        self.server_variables.get(&name.to_ascii_uppercase()).cloned()
    }

    fn is_local(&self) -> bool {
        self.is_local
    }

    fn request_headers(&self) -> Arc<dyn HeaderStore> {
        self.request_headers.clone()
    }

    fn input_stream(&self) -> InputStream {
        self.input.clone()
    }

    fn client_certificate(&self) -> Option<LegacyClientCertificate> {
        self.client_certificate.clone()
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.disconnected.cancel();
    }

    fn status_code(&self) -> u16 {
        *lock(&self.status_code)
    }

    fn set_status_code(&self, status_code: u16) {
        *lock(&self.status_code) = status_code;
    }

    fn status_description(&self) -> String {
        lock(&self.status_description).clone()
    }

    fn set_status_description(&self, description: String) {
        *lock(&self.status_description) = description;
    }

    fn response_headers(&self) -> Arc<dyn HeaderStore> {
        self.response_headers.clone()
    }

    fn output_stream(&self) -> OutputStream {
        self.output.clone()
    }

    fn client_disconnected_token(&self) -> CancellationToken {
        self.disconnected.clone()
    }

    fn transmit_file(&self, path: &Path, offset: i64, length: i64) -> io::Result<()> {
        lock(&self.transmitted).push(TransmitFileCall {
            path: path.to_path_buf(),
            offset,
            length,
        });
        match self.transmit_failure {
            Some(kind) => Err(io::Error::new(
                kind,
                format!("cannot transmit {}", path.display()),
            )),
            None => Ok(()),
        }
    }

    fn user(&self) -> Option<Arc<dyn Principal>> {
        lock(&self.user).clone()
    }

    fn set_user(&self, user: Option<Arc<dyn Principal>>) {
        *lock(&self.user) = user;
    }

    fn worker_request(&self) -> Option<Arc<dyn WorkerRequest>> {
        self.worker_request
            .clone()
            .map(|w| w as Arc<dyn WorkerRequest>)
    }
}

/// Builder for [`MemoryContext`].
#[derive(Debug, Default)]
pub struct MemoryContextBuilder {
    method: Option<String>,
    url: Option<Url>,
    secure: Option<bool>,
    app_virtual_path: Option<String>,
    execution_path: Option<String>,
    path_info: String,
    server_variables: HashMap<String, String>,
    is_local: bool,
    request_headers: Vec<(String, String)>,
    body: Vec<u8>,
    client_certificate: Option<LegacyClientCertificate>,
    user: Option<Arc<dyn Principal>>,
    trace_identifier: Option<Uuid>,
    transmit_failure: Option<io::ErrorKind>,
}

impl MemoryContextBuilder {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Request URL. Also decides the secure flag unless [`Self::secure`] is set.
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn app_virtual_path(mut self, path: impl Into<String>) -> Self {
        self.app_virtual_path = Some(path.into());
        self
    }

    /// Overrides the execution path derived from the URL.
    pub fn execution_path(mut self, path: impl Into<String>) -> Self {
        self.execution_path = Some(path.into());
        self
    }

    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.path_info = path_info.into();
        self
    }

    pub fn server_variable(mut self, name: &str, value: impl Into<String>) -> Self {
        self.server_variables
            .insert(name.to_ascii_uppercase(), value.into());
        self
    }

    pub fn local(mut self, is_local: bool) -> Self {
        self.is_local = is_local;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn client_certificate(mut self, certificate: LegacyClientCertificate) -> Self {
        self.client_certificate = Some(certificate);
        self
    }

    pub fn user(mut self, user: Arc<dyn Principal>) -> Self {
        self.user = Some(user);
        self
    }

    /// Makes a worker request with this identifier reachable.
    pub fn trace_identifier(mut self, trace_identifier: Uuid) -> Self {
        self.trace_identifier = Some(trace_identifier);
        self
    }

    /// Every `transmit_file` call fails with this error kind.
    pub fn fail_transmit_file(mut self, kind: io::ErrorKind) -> Self {
        self.transmit_failure = Some(kind);
        self
    }

    pub fn build(self) -> MemoryContext {
        let app_virtual_path = self.app_virtual_path.unwrap_or_else(|| "/".to_string());
        let secure = self
            .secure
            .unwrap_or_else(|| self.url.as_ref().is_some_and(|u| u.scheme() == "https"));
        let execution_path = self.execution_path.unwrap_or_else(|| {
            let path = self.url.as_ref().map(Url::path).unwrap_or("/");
            app_relative(path, &app_virtual_path)
        });

        let mut server_variables = self.server_variables;
        server_variables
            .entry("SERVER_PROTOCOL".to_string())
            .or_insert_with(|| "HTTP/1.1".to_string());
        if let Some(port) = self.url.as_ref().and_then(Url::port_or_known_default) {
            server_variables
                .entry("SERVER_PORT".to_string())
                .or_insert_with(|| port.to_string());
        }

        MemoryContext {
            method: self.method.unwrap_or_else(|| "GET".to_string()),
            url: self.url,
            secure,
            app_virtual_path,
            execution_path,
            path_info: self.path_info,
            server_variables,
            is_local: self.is_local,
            request_headers: Arc::new(self.request_headers.into_iter().collect()),
            response_headers: Arc::new(NameValueCollection::new()),
            input: Arc::new(Mutex::new(Cursor::new(self.body))),
            output: Arc::new(Mutex::new(Vec::new())),
            status_code: Mutex::new(200),
            status_description: Mutex::new("OK".to_string()),
            client_certificate: self.client_certificate,
            user: Mutex::new(self.user),
            worker_request: self
                .trace_identifier
                .map(|id| Arc::new(MemoryWorkerRequest::new(id))),
            disconnected: CancellationToken::new(),
            aborted: AtomicBool::new(false),
            transmitted: Mutex::new(Vec::new()),
            transmit_failure: self.transmit_failure,
        }
    }
}

/// `~`-prefixed path of `path` relative to the application root.
fn app_relative(path: &str, app_virtual_path: &str) -> String {
    let root = app_virtual_path.trim_end_matches('/');
    let relative = path
        .strip_prefix(root)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(path);
    if relative.is_empty() {
        "~/".to_string()
    } else {
        format!("~{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn execution_path_is_app_relative() {
        let ctx = MemoryContext::builder()
            .url(url("http://example.com/shop/orders/list"))
            .app_virtual_path("/shop")
            .build();
        assert_eq!(ctx.app_relative_execution_path(), "~/orders/list");

        let root = MemoryContext::builder()
            .url(url("http://example.com/shop"))
            .app_virtual_path("/shop/")
            .build();
        assert_eq!(root.app_relative_execution_path(), "~/");
    }

    #[test]
    fn unrelated_prefix_is_not_stripped() {
        assert_eq!(app_relative("/shopping/cart", "/shop"), "~/shopping/cart");
        assert_eq!(app_relative("/a/b", "/"), "~/a/b");
    }

    #[test]
    fn secure_flag_follows_url_scheme() {
        let ctx = MemoryContext::builder()
            .url(url("https://example.com/"))
            .build();
        assert!(ctx.is_secure_connection());
        assert_eq!(ctx.server_variable("server_port").as_deref(), Some("443"));

        let forced = MemoryContext::builder()
            .url(url("https://example.com/"))
            .secure(false)
            .build();
        assert!(!forced.is_secure_connection());
    }

    #[test]
    fn streams_are_shared_handles() {
        let ctx = MemoryContext::builder().body("payload").build();

        let mut body = String::new();
        ctx.input_stream()
            .lock()
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "payload");

        ctx.output_stream().lock().unwrap().write_all(b"hello").unwrap();
        assert_eq!(ctx.written_body(), b"hello");
    }

    #[test]
    fn transmit_file_is_recorded_even_when_failing() {
        let ctx = MemoryContext::builder()
            .fail_transmit_file(io::ErrorKind::NotFound)
            .build();
        let err = ctx
            .transmit_file(Path::new("/srv/missing.bin"), 0, -1)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(ctx.transmitted_files().len(), 1);
    }

    #[test]
    fn abort_cancels_disconnect_token() {
        let ctx = MemoryContext::builder().build();
        let token = ctx.client_disconnected_token();
        assert!(!token.is_cancelled());
        ctx.abort();
        assert!(ctx.is_aborted());
        assert!(token.is_cancelled());
    }
}
