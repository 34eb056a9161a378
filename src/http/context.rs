//! Typed request context built from the capability registry.
//!
//! # Responsibilities
//! - Create a new-abstraction context from a legacy one
//! - Resolve capabilities through the registry, not around it
//! - Produce a serializable snapshot for diagnostics
//!
//! # Design Decisions
//! - Capabilities that are always present return plain references; the
//!   conditional one (TLS) returns `Option`

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::BridgeConfig;
use crate::features::{
    HttpAuthenticationFeature, HttpConnectionFeature, HttpRequestIdentifierFeature,
    HttpRequestLifetimeFeature, HttpRequestFeature, HttpResponseFeature, HttpSendFileFeature,
    LegacyFeatureCollection, TlsConnectionFeature,
};
use crate::http::StringValues;
use crate::legacy::LegacyContext;
use crate::security::{ClaimsPrincipal, ClientCertificate};

/// A request as seen by new-abstraction code.
#[derive(Debug)]
pub struct HttpContext {
    features: LegacyFeatureCollection,
}

impl HttpContext {
    pub fn new(features: LegacyFeatureCollection) -> Self {
        Self { features }
    }

    /// Wrap a legacy context with default server variable names.
    pub fn from_legacy(context: Arc<dyn LegacyContext>) -> Self {
        Self::new(LegacyFeatureCollection::new(context))
    }

    /// Wrap a legacy context using the names configured for this host.
    pub fn from_legacy_with_config(context: Arc<dyn LegacyContext>, config: &BridgeConfig) -> Self {
        Self::new(
            LegacyFeatureCollection::new(context)
                .with_server_variables(config.server_variables.clone()),
        )
    }

    pub fn features(&self) -> &LegacyFeatureCollection {
        &self.features
    }

    pub fn into_features(self) -> LegacyFeatureCollection {
        self.features
    }

    pub fn request(&self) -> &dyn HttpRequestFeature {
        &self.features
    }

    pub fn response(&self) -> &dyn HttpResponseFeature {
        &self.features
    }

    pub fn connection(&self) -> &dyn HttpConnectionFeature {
        &self.features
    }

    pub fn send_file(&self) -> &dyn HttpSendFileFeature {
        &self.features
    }

    /// Present only on https requests.
    pub fn tls(&self) -> Option<&dyn TlsConnectionFeature> {
        self.features.get_feature::<dyn TlsConnectionFeature>()
    }

    pub fn trace_identifier(&self) -> Option<String> {
        HttpRequestIdentifierFeature::trace_identifier(&self.features)
    }

    pub fn user(&self) -> Option<Arc<ClaimsPrincipal>> {
        HttpAuthenticationFeature::user(&self.features)
    }

    pub fn set_user(&self, user: Option<ClaimsPrincipal>) {
        HttpAuthenticationFeature::set_user(&self.features, user);
    }

    pub fn abort(&self) {
        HttpRequestLifetimeFeature::abort(&self.features);
    }

    pub fn request_aborted(&self) -> CancellationToken {
        HttpRequestLifetimeFeature::request_aborted(&self.features)
    }

    /// Capture everything the registry currently exposes.
    ///
    /// Connection values that cannot be read are recorded as `None`.
    pub fn snapshot(&self) -> ContextSnapshot {
        let request = self.request();
        let connection = self.connection();
        let user = self.user();

        ContextSnapshot {
            features: self
                .features
                .iter()
                .map(|(key, _)| key.name())
                .collect(),
            protocol: request.protocol(),
            scheme: request.scheme(),
            method: request.method(),
            path_base: request.path_base(),
            path: request.path(),
            query_string: request.query_string(),
            request_headers: request.headers().iter().collect(),
            status_code: self.response().status_code(),
            reason_phrase: self.response().reason_phrase(),
            remote_ip_address: connection.remote_ip_address().ok().map(|ip| ip.to_string()),
            remote_port: connection.remote_port().ok(),
            local_ip_address: connection.local_ip_address().ok().map(|ip| ip.to_string()),
            local_port: connection.local_port().ok(),
            is_local: connection.is_local(),
            trace_identifier: self.trace_identifier(),
            user: user.as_deref().cloned(),
            client_certificate: self.tls().and_then(|tls| tls.client_certificate()),
        }
    }
}

/// Serializable projection of an [`HttpContext`].
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    pub features: Vec<&'static str>,
    pub protocol: String,
    pub scheme: String,
    pub method: String,
    pub path_base: String,
    pub path: String,
    pub query_string: String,
    pub request_headers: BTreeMap<String, StringValues>,
    pub status_code: u16,
    pub reason_phrase: String,
    pub remote_ip_address: Option<String>,
    pub remote_port: Option<u16>,
    pub local_ip_address: Option<String>,
    pub local_port: Option<u16>,
    pub is_local: bool,
    pub trace_identifier: Option<String>,
    pub user: Option<ClaimsPrincipal>,
    pub client_certificate: Option<ClientCertificate>,
}
