//! Request-line and body capability.

use crate::features::LegacyFeatureCollection;
use crate::http::HeaderView;
use crate::legacy::InputStream;

/// Request information of the new abstraction.
pub trait HttpRequestFeature {
    fn protocol(&self) -> String;
    fn set_protocol(&self, protocol: String);

    fn scheme(&self) -> String;
    fn set_scheme(&self, scheme: String);

    fn method(&self) -> String;
    fn set_method(&self, method: String);

    fn path_base(&self) -> String;
    fn set_path_base(&self, path_base: String);

    fn path(&self) -> String;
    fn set_path(&self, path: String);

    /// Query string without the leading `?`.
    fn query_string(&self) -> String;
    fn set_query_string(&self, query_string: String);

    fn headers(&self) -> &HeaderView;

    fn body(&self) -> InputStream;
    fn set_body(&self, body: InputStream);
}

/// Strip one trailing `/`.
fn normalize_path_base(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Query plus fragment without the leading `?`.
///
/// The legacy URL parser treats an unescaped `#` inside a query as the start
/// of a fragment, so the fragment is folded back into the query.
fn fold_query(query: Option<&str>, fragment: Option<&str>) -> String {
    let mut combined = String::new();
    if let Some(query) = query {
        combined.push('?');
        combined.push_str(query);
    }
    if let Some(fragment) = fragment {
        combined.push('#');
        combined.push_str(fragment);
    }
    if combined.len() <= 1 {
        return String::new();
    }
    combined.split_off(1)
}

fn without_first_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

// Request-line data is fixed by the legacy layer; setters are ignored.
impl HttpRequestFeature for LegacyFeatureCollection {
    fn protocol(&self) -> String {
        self.context
            .server_variable(&self.variables.protocol)
            .unwrap_or_default()
    }

    fn set_protocol(&self, _protocol: String) {}

    fn scheme(&self) -> String {
        if self.context.is_secure_connection() {
            "https".to_string()
        } else {
            "http".to_string()
        }
    }

    fn set_scheme(&self, _scheme: String) {}

    fn method(&self) -> String {
        self.context.http_method()
    }

    fn set_method(&self, _method: String) {}

    fn path_base(&self) -> String {
        normalize_path_base(&self.context.app_virtual_path()).to_string()
    }

    fn set_path_base(&self, _path_base: String) {}

    fn path(&self) -> String {
        let execution_path = self.context.app_relative_execution_path();
        let mut path = without_first_char(&execution_path).to_string();
        path.push_str(&self.context.path_info());
        path
    }

    fn set_path(&self, _path: String) {}

    fn query_string(&self) -> String {
        match self.context.url() {
            Some(url) => fold_query(url.query(), url.fragment()),
            None => String::new(),
        }
    }

    fn set_query_string(&self, _query_string: String) {}

    fn headers(&self) -> &HeaderView {
        self.request_headers
            .get_or_init(|| HeaderView::new(self.context.request_headers()))
    }

    fn body(&self) -> InputStream {
        self.context.input_stream()
    }

    fn set_body(&self, _body: InputStream) {}
}
