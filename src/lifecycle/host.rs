//! Hosts legacy requests for new-abstraction code.

use std::fmt;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::features::{HttpRequestFeature, HttpRequestLifetimeFeature};
use crate::http::HttpContext;
use crate::legacy::LegacyContext;
use crate::lifecycle::HttpModule;
use crate::observability::metrics;

/// Runs registered modules and a handler against one context per request.
pub struct RequestHost {
    config: BridgeConfig,
    modules: Vec<Arc<dyn HttpModule>>,
}

impl RequestHost {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl HttpModule + 'static) -> Self {
        self.register(Arc::new(module));
        self
    }

    pub fn register(&mut self, module: Arc<dyn HttpModule>) {
        tracing::debug!(module = module.name(), "registering module");
        self.modules.push(module);
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn active_modules(&self) -> &[Arc<dyn HttpModule>] {
        if self.config.host.modules_enabled {
            &self.modules
        } else {
            &[]
        }
    }

    /// Process one legacy request.
    ///
    /// The legacy context is borrowed for the duration of the call and is
    /// never aborted or disposed by the host itself.
    pub fn process<F, T>(&self, legacy: Arc<dyn LegacyContext>, handler: F) -> T
    where
        F: FnOnce(&HttpContext) -> T,
    {
        let context = HttpContext::from_legacy_with_config(legacy, &self.config);
        let features = context.features();

        let span = tracing::info_span!(
            "request",
            method = %HttpRequestFeature::method(features),
            path = %HttpRequestFeature::path(features),
            trace_id = context.trace_identifier().as_deref().unwrap_or("-"),
        );
        let _entered = span.enter();

        tracing::info!(modules = self.active_modules().len(), "request started");
        metrics::record_request_phase("begin");
        for module in self.active_modules() {
            tracing::trace!(module = module.name(), "begin_request");
            module.begin_request(&context);
        }

        let output = handler(&context);

        for module in self.active_modules() {
            tracing::trace!(module = module.name(), "end_request");
            module.end_request(&context);
        }

        if HttpRequestLifetimeFeature::request_aborted(features).is_cancelled() {
            tracing::info!("request aborted");
            metrics::record_request_phase("aborted");
        }
        tracing::info!(status = context.response().status_code(), "request finished");
        metrics::record_request_phase("end");

        output
    }
}

impl Default for RequestHost {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl fmt::Debug for RequestHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHost")
            .field("config", &self.config)
            .field(
                "modules",
                &self.modules.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
