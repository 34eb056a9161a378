//! Abort and cancellation capability.

use tokio_util::sync::CancellationToken;

use crate::features::LegacyFeatureCollection;

/// Request lifetime control of the new abstraction.
pub trait HttpRequestLifetimeFeature {
    /// Cancelled when the client disconnects.
    fn request_aborted(&self) -> CancellationToken;
    fn set_request_aborted(&self, token: CancellationToken);

    /// Stop processing the request.
    fn abort(&self);
}

impl HttpRequestLifetimeFeature for LegacyFeatureCollection {
    fn request_aborted(&self) -> CancellationToken {
        self.context.client_disconnected_token()
    }

    fn set_request_aborted(&self, _token: CancellationToken) {}

    fn abort(&self) {
        tracing::debug!("aborting legacy request");
        self.context.abort();
    }
}
