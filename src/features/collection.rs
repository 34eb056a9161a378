//! The feature collection adapter over a legacy context.
//!
//! # Responsibilities
//! - Hold the legacy context for one request
//! - Own the lazily built header views and wrapped principal
//! - Answer registry lookups and enumeration from a fixed table
//!
//! # Design Decisions
//! - One adapter per request, driven by one task at a time; interior caches
//!   use `OnceCell`/`RefCell`, which keeps the type `!Sync` but `Send`, so a
//!   request task may move between runtime threads
//! - The table order is the enumeration order
//! - TLS is the only entry with a run-time availability check

use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::sync::Arc;

use crate::config::ServerVariableNames;
use crate::features::{
    AuthenticationHandler, FeatureError, FeatureKey, HttpAuthenticationFeature,
    HttpConnectionFeature, HttpRequestFeature, HttpRequestIdentifierFeature,
    HttpRequestLifetimeFeature, HttpResponseFeature, HttpSendFileFeature, TlsConnectionFeature,
};
use crate::http::HeaderView;
use crate::legacy::{LegacyContext, WorkerRequest};
use crate::observability::metrics;
use crate::security::ClaimsPrincipal;

/// Looks up the worker request behind a legacy context.
pub type WorkerRequestProvider =
    Box<dyn Fn(&dyn LegacyContext) -> Option<Arc<dyn WorkerRequest>> + Send>;

/// One row of the capability table.
struct FeatureEntry {
    key: fn() -> FeatureKey,
    is_available: fn(&LegacyFeatureCollection) -> bool,
}

fn always(_: &LegacyFeatureCollection) -> bool {
    true
}

static FEATURE_TABLE: [FeatureEntry; 8] = [
    FeatureEntry {
        key: FeatureKey::request,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::response,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::connection,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::request_identifier,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::lifetime,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::send_file,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::authentication,
        is_available: always,
    },
    FeatureEntry {
        key: FeatureKey::tls,
        is_available: LegacyFeatureCollection::supports_client_certificates,
    },
];

/// Projection of the adapter onto one capability trait.
pub trait AsFeature<F: ?Sized> {
    fn as_feature(&self) -> &F;
}

macro_rules! as_feature {
    ($($feature:ident),+ $(,)?) => {
        $(
            impl AsFeature<dyn $feature> for LegacyFeatureCollection {
                fn as_feature(&self) -> &(dyn $feature + 'static) {
                    self
                }
            }
        )+
    };
}

as_feature!(
    HttpRequestFeature,
    HttpResponseFeature,
    HttpConnectionFeature,
    HttpRequestIdentifierFeature,
    HttpRequestLifetimeFeature,
    HttpSendFileFeature,
    HttpAuthenticationFeature,
    TlsConnectionFeature,
);

/// Capability registry backed by a legacy context.
///
/// Every supported capability resolves to this same object.
pub struct LegacyFeatureCollection {
    pub(super) context: Arc<dyn LegacyContext>,
    pub(super) variables: ServerVariableNames,
    pub(super) worker_requests: WorkerRequestProvider,
    pub(super) request_headers: OnceCell<HeaderView>,
    pub(super) response_headers: OnceCell<HeaderView>,
    pub(super) user: RefCell<Option<Arc<ClaimsPrincipal>>>,
    pub(super) handler: RefCell<Option<Arc<dyn AuthenticationHandler>>>,
}

impl LegacyFeatureCollection {
    pub fn new(context: Arc<dyn LegacyContext>) -> Self {
        Self {
            context,
            variables: ServerVariableNames::default(),
            worker_requests: Box::new(|context: &dyn LegacyContext| context.worker_request()),
            request_headers: OnceCell::new(),
            response_headers: OnceCell::new(),
            user: RefCell::new(None),
            handler: RefCell::new(None),
        }
    }

    /// Use server variable names other than the IIS defaults.
    pub fn with_server_variables(mut self, variables: ServerVariableNames) -> Self {
        self.variables = variables;
        self
    }

    /// Replace the legacy service lookup used for the trace identifier.
    pub fn with_worker_request_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&dyn LegacyContext) -> Option<Arc<dyn WorkerRequest>> + Send + 'static,
    {
        self.worker_requests = Box::new(provider);
        self
    }

    /// The adapted context.
    pub fn context(&self) -> &dyn LegacyContext {
        self.context.as_ref()
    }

    /// Returns this adapter if it currently supports `key`.
    pub fn get(&self, key: FeatureKey) -> Option<&Self> {
        let supported = FEATURE_TABLE
            .iter()
            .find(|entry| (entry.key)() == key)
            .is_some_and(|entry| (entry.is_available)(self));

        tracing::trace!(feature = %key, supported, "feature lookup");
        metrics::record_feature_lookup(key.name(), supported);

        supported.then_some(self)
    }

    /// Typed lookup, e.g. `get_feature::<dyn TlsConnectionFeature>()`.
    pub fn get_feature<F>(&self) -> Option<&F>
    where
        F: ?Sized + 'static,
        Self: AsFeature<F>,
    {
        self.get(FeatureKey::of::<F>())
            .map(|this| <Self as AsFeature<F>>::as_feature(this))
    }

    /// The registry is read-only: always fails.
    pub fn set(&self, key: FeatureKey, _value: Box<dyn Any>) -> Result<(), FeatureError> {
        tracing::debug!(feature = %key, "attempt to replace a feature");
        Err(FeatureError::NotSupported("replacing features"))
    }

    /// Currently supported capabilities, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &Self)> + '_ {
        FEATURE_TABLE
            .iter()
            .filter(move |entry| (entry.is_available)(self))
            .map(move |entry| ((entry.key)(), self))
    }

    /// Always `0`; the collection never changes after construction.
    pub fn revision(&self) -> u64 {
        0
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    /// TLS details are only meaningful on https requests.
    fn supports_client_certificates(&self) -> bool {
        HttpRequestFeature::scheme(self).eq_ignore_ascii_case("https")
    }
}

impl fmt::Debug for LegacyFeatureCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyFeatureCollection")
            .field("variables", &self.variables)
            .field("request_headers_cached", &self.request_headers.get().is_some())
            .field("response_headers_cached", &self.response_headers.get().is_some())
            .field("user_cached", &self.user.borrow().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::MemoryContext;
    use url::Url;

    fn collection(url: &str) -> LegacyFeatureCollection {
        let context = MemoryContext::builder()
            .url(Url::parse(url).unwrap())
            .build();
        LegacyFeatureCollection::new(Arc::new(context))
    }

    fn keys(features: &LegacyFeatureCollection) -> Vec<FeatureKey> {
        features.iter().map(|(key, _)| key).collect()
    }

    #[test]
    fn enumeration_order_without_tls() {
        let features = collection("http://example.com/");
        assert_eq!(
            keys(&features),
            vec![
                FeatureKey::request(),
                FeatureKey::response(),
                FeatureKey::connection(),
                FeatureKey::request_identifier(),
                FeatureKey::lifetime(),
                FeatureKey::send_file(),
                FeatureKey::authentication(),
            ]
        );
    }

    #[test]
    fn tls_is_enumerated_last_on_https() {
        let features = collection("https://example.com/");
        let keys = keys(&features);
        assert_eq!(keys.len(), 8);
        assert_eq!(keys.last(), Some(&FeatureKey::tls()));
    }

    #[test]
    fn get_agrees_with_iter() {
        for url in ["http://example.com/", "https://example.com/"] {
            let features = collection(url);
            let enumerated = keys(&features);
            for entry in FEATURE_TABLE.iter() {
                let key = (entry.key)();
                let found = features.get(key);
                assert_eq!(found.is_some(), enumerated.contains(&key), "{key} on {url}");
                if let Some(found) = found {
                    assert!(std::ptr::eq(found, &features));
                }
            }
        }
    }

    #[test]
    fn unknown_keys_are_unsupported() {
        let features = collection("https://example.com/");
        assert!(features.get(FeatureKey::of::<String>()).is_none());
        assert!(features.get(FeatureKey::of::<dyn std::error::Error>()).is_none());
    }

    #[test]
    fn set_always_fails() {
        let features = collection("http://example.com/");
        for (key, _) in features.iter().collect::<Vec<_>>() {
            let err = features.set(key, Box::new(42u8)).unwrap_err();
            assert!(matches!(err, FeatureError::NotSupported(_)));
        }
        assert!(features
            .set(FeatureKey::of::<String>(), Box::new(()))
            .is_err());
    }

    #[test]
    fn typed_lookup_tracks_scheme() {
        let plain = collection("http://example.com/");
        assert!(plain.get_feature::<dyn TlsConnectionFeature>().is_none());
        assert!(plain.get_feature::<dyn HttpRequestFeature>().is_some());

        let secure = collection("https://example.com/");
        assert!(secure.get_feature::<dyn TlsConnectionFeature>().is_some());
    }

    #[tokio::test]
    async fn adapter_moves_into_spawned_task() {
        let features = collection("https://example.com/");
        let count = tokio::spawn(async move {
            tokio::task::yield_now().await;
            features.iter().count()
        })
        .await
        .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn registry_is_immutable() {
        let features = collection("http://example.com/");
        assert_eq!(features.revision(), 0);
        assert!(features.is_read_only());
    }
}
