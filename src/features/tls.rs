//! Client certificate capability, advertised on https requests only.

use std::future::{self, Ready};

use tokio_util::sync::CancellationToken;

use crate::features::LegacyFeatureCollection;
use crate::security::ClientCertificate;

/// TLS connection details of the new abstraction.
pub trait TlsConnectionFeature {
    fn client_certificate(&self) -> Option<ClientCertificate>;
    fn set_client_certificate(&self, certificate: Option<ClientCertificate>);

    /// Resolves immediately; the legacy layer already holds the certificate.
    fn get_client_certificate(&self, cancellation: &CancellationToken)
        -> Ready<Option<ClientCertificate>>;
}

impl LegacyFeatureCollection {
    /// Parsed fresh on every call. Unparseable bytes count as no certificate.
    fn load_client_certificate(&self) -> Option<ClientCertificate> {
        let slot = self
            .context
            .client_certificate()
            .filter(|slot| slot.is_present)?;

        match ClientCertificate::from_bytes(&slot.certificate) {
            Ok(certificate) => Some(certificate),
            Err(error) => {
                tracing::debug!(%error, "client certificate unreadable, treating as absent");
                None
            }
        }
    }
}

impl TlsConnectionFeature for LegacyFeatureCollection {
    fn client_certificate(&self) -> Option<ClientCertificate> {
        self.load_client_certificate()
    }

    fn set_client_certificate(&self, _certificate: Option<ClientCertificate>) {}

    fn get_client_certificate(
        &self,
        _cancellation: &CancellationToken,
    ) -> Ready<Option<ClientCertificate>> {
        future::ready(self.load_client_certificate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::{LegacyClientCertificate, MemoryContext};
    use rcgen::{CertificateParams, KeyPair};
    use std::sync::Arc;
    use url::Url;

    fn https(certificate: Option<LegacyClientCertificate>) -> LegacyFeatureCollection {
        let mut builder = MemoryContext::builder().url(Url::parse("https://h/").unwrap());
        if let Some(certificate) = certificate {
            builder = builder.client_certificate(certificate);
        }
        LegacyFeatureCollection::new(Arc::new(builder.build()))
    }

    fn der() -> Vec<u8> {
        let key = KeyPair::generate().unwrap();
        CertificateParams::new(vec!["client.local".to_string()])
            .unwrap()
            .self_signed(&key)
            .unwrap()
            .der()
            .to_vec()
    }

    #[tokio::test]
    async fn present_certificate_is_parsed() {
        let raw = der();
        let f = https(Some(LegacyClientCertificate::present(raw.clone())));

        let sync = f.client_certificate().unwrap();
        assert_eq!(sync.der(), raw.as_slice());

        let fetched = f.get_client_certificate(&CancellationToken::new()).await;
        assert_eq!(fetched, Some(sync));
    }

    #[tokio::test]
    async fn malformed_certificate_is_absent() {
        let f = https(Some(LegacyClientCertificate::present(b"not a certificate".to_vec())));
        assert!(f.client_certificate().is_none());
        assert!(f
            .get_client_certificate(&CancellationToken::new())
            .await
            .is_none());
    }

    #[test]
    fn slot_flagged_not_present_is_absent() {
        let f = https(Some(LegacyClientCertificate {
            is_present: false,
            certificate: der(),
        }));
        assert!(f.client_certificate().is_none());
    }

    #[test]
    fn no_slot_is_absent() {
        assert!(https(None).client_certificate().is_none());
    }
}
