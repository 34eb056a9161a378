//! Per-request hooks.

use crate::http::HttpContext;

/// Code that runs around every hosted request.
pub trait HttpModule: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn begin_request(&self, _context: &HttpContext) {}

    fn end_request(&self, _context: &HttpContext) {}
}
