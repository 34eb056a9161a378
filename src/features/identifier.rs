//! Trace identifier capability.

use crate::features::LegacyFeatureCollection;

/// Request identifier of the new abstraction.
pub trait HttpRequestIdentifierFeature {
    /// Best-effort diagnostic identifier; neither guaranteed present nor unique.
    fn trace_identifier(&self) -> Option<String>;
    fn set_trace_identifier(&self, trace_identifier: String);
}

impl HttpRequestIdentifierFeature for LegacyFeatureCollection {
    fn trace_identifier(&self) -> Option<String> {
        let worker = (self.worker_requests)(self.context.as_ref())?;
        Some(worker.request_trace_identifier().to_string())
    }

    fn set_trace_identifier(&self, _trace_identifier: String) {}
}
