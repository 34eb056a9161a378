//! Response status, headers, and body capability.

use std::future::Future;
use std::pin::Pin;

use crate::features::{FeatureError, LegacyFeatureCollection};
use crate::http::HeaderView;
use crate::legacy::OutputStream;

/// Callback run around the moment response headers are sent.
pub type ResponseCallback = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Response information of the new abstraction.
pub trait HttpResponseFeature {
    fn status_code(&self) -> u16;
    fn set_status_code(&self, status_code: u16);

    fn reason_phrase(&self) -> String;
    fn set_reason_phrase(&self, reason_phrase: String);

    fn headers(&self) -> &HeaderView;

    fn body(&self) -> OutputStream;
    fn set_body(&self, body: OutputStream);

    /// Whether headers have been flushed to the client.
    fn has_started(&self) -> Result<bool, FeatureError>;

    fn on_starting(&self, callback: ResponseCallback) -> Result<(), FeatureError>;

    fn on_completed(&self, callback: ResponseCallback) -> Result<(), FeatureError>;
}

// The legacy layer neither reports header flushes nor offers a hook around
// them, so the three lifecycle members are permanently unsupported.
impl HttpResponseFeature for LegacyFeatureCollection {
    fn status_code(&self) -> u16 {
        self.context.status_code()
    }

    fn set_status_code(&self, status_code: u16) {
        self.context.set_status_code(status_code);
    }

    fn reason_phrase(&self) -> String {
        self.context.status_description()
    }

    fn set_reason_phrase(&self, reason_phrase: String) {
        self.context.set_status_description(reason_phrase);
    }

    fn headers(&self) -> &HeaderView {
        self.response_headers
            .get_or_init(|| HeaderView::new(self.context.response_headers()))
    }

    fn body(&self) -> OutputStream {
        self.context.output_stream()
    }

    fn set_body(&self, _body: OutputStream) {}

    fn has_started(&self) -> Result<bool, FeatureError> {
        tracing::debug!("has_started queried on legacy response");
        Err(FeatureError::NotSupported("HasStarted"))
    }

    fn on_starting(&self, _callback: ResponseCallback) -> Result<(), FeatureError> {
        tracing::debug!("on_starting registration rejected");
        Err(FeatureError::NotSupported("OnStarting"))
    }

    fn on_completed(&self, _callback: ResponseCallback) -> Result<(), FeatureError> {
        tracing::debug!("on_completed registration rejected");
        Err(FeatureError::NotSupported("OnCompleted"))
    }
}
