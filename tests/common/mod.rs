//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use feature_bridge::legacy::{MemoryContext, MemoryContextBuilder};
use feature_bridge::LegacyFeatureCollection;
use rcgen::{CertificateParams, KeyPair};
use tempfile::NamedTempFile;
use url::Url;

/// Builder preset with a URL and the usual connection variables.
pub fn request(url: &str) -> MemoryContextBuilder {
    MemoryContext::builder()
        .url(Url::parse(url).unwrap())
        .server_variable("REMOTE_ADDR", "192.0.2.10")
        .server_variable("REMOTE_PORT", "51000")
        .server_variable("LOCAL_ADDR", "192.0.2.1")
}

/// Build the context and an adapter over it, keeping a handle to both.
pub fn adapt(builder: MemoryContextBuilder) -> (Arc<MemoryContext>, LegacyFeatureCollection) {
    let context = Arc::new(builder.build());
    let features = LegacyFeatureCollection::new(context.clone());
    (context, features)
}

/// Self-signed certificate for `name`, as PEM text and DER bytes.
pub fn certificate(name: &str) -> (String, Vec<u8>) {
    let key = KeyPair::generate().unwrap();
    let cert = CertificateParams::new(vec![name.to_string()])
        .unwrap()
        .self_signed(&key)
        .unwrap();
    (cert.pem(), cert.der().to_vec())
}

/// Temporary file holding `contents`.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
