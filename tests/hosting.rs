//! Hosting requests with configuration loaded from disk.

use std::sync::{Arc, Mutex};

use feature_bridge::config::load_config;
use feature_bridge::legacy::HeaderStore;
use feature_bridge::{HttpContext, HttpModule, RequestHost};

mod common;

struct ServerHeader;

impl HttpModule for ServerHeader {
    fn name(&self) -> &str {
        "server-header"
    }

    fn begin_request(&self, context: &HttpContext) {
        context.response().headers().set("Server", "feature-bridge");
    }
}

#[derive(Default)]
struct Audit {
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

impl HttpModule for Audit {
    fn name(&self) -> &str {
        "audit"
    }

    fn end_request(&self, context: &HttpContext) {
        self.seen
            .lock()
            .unwrap()
            .push(context.user().and_then(|u| u.identity()?.name().map(str::to_string)));
    }
}

#[test]
fn configured_variable_names_drive_connection_info() {
    let file = common::temp_file(
        r#"
        [server_variables]
        remote_addr = "HTTP_X_FORWARDED_FOR"
        remote_port = "HTTP_X_FORWARDED_PORT"
        "#,
    );
    let config = load_config(file.path()).unwrap();
    let host = RequestHost::new(config);

    let legacy = Arc::new(
        common::request("http://example.com/")
            .server_variable("HTTP_X_FORWARDED_FOR", "2001:db8::7")
            .server_variable("HTTP_X_FORWARDED_PORT", "443")
            .build(),
    );

    let (ip, port) = host.process(legacy, |context| {
        let connection = context.connection();
        (
            connection.remote_ip_address().unwrap().to_string(),
            connection.remote_port().unwrap(),
        )
    });

    assert_eq!(ip, "2001:db8::7");
    assert_eq!(port, 443);
}

#[test]
fn modules_see_the_same_request() {
    let audit = Audit::default();
    let seen = audit.seen.clone();
    let host = RequestHost::default()
        .with_module(ServerHeader)
        .with_module(audit);

    let legacy = Arc::new(
        common::request("http://example.com/")
            .user(Arc::new(feature_bridge::legacy::GenericPrincipal::new("erin", "Forms")))
            .build(),
    );

    host.process(legacy.clone(), |context| {
        assert_eq!(
            context.response().headers().first("server").as_deref(),
            Some("feature-bridge")
        );
        context.set_user(None);
    });

    assert_eq!(*seen.lock().unwrap(), vec![None]);
    assert_eq!(
        legacy.response_header_store().values("Server"),
        Some(vec!["feature-bridge".to_string()])
    );
}

#[test]
fn inspect_snapshot_of_secure_request() {
    let (pem, _) = common::certificate("inspect.example");
    let legacy = Arc::new(
        common::request("https://example.com/api/v1?verbose")
            .client_certificate(feature_bridge::legacy::LegacyClientCertificate::present(
                pem.into_bytes(),
            ))
            .build(),
    );

    let snapshot = RequestHost::default().process(legacy, |context| context.snapshot());

    assert_eq!(snapshot.scheme, "https");
    assert_eq!(snapshot.query_string, "verbose");
    assert_eq!(snapshot.features.last(), Some(&"TlsConnectionFeature"));
    assert_eq!(snapshot.remote_ip_address.as_deref(), Some("192.0.2.10"));
    assert_eq!(snapshot.local_port, Some(443));
    assert!(snapshot.client_certificate.is_some());
}
