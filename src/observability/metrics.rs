//! Metrics collection.
//!
//! # Metrics
//! - `feature_bridge_feature_lookups_total` (counter): lookups by feature, outcome
//! - `feature_bridge_send_file_total` (counter): send-file calls by outcome
//! - `feature_bridge_requests_total` (counter): host phases by phase
//!
//! # Design Decisions
//! - Labels are static strings; no per-request cardinality

pub const FEATURE_LOOKUPS_TOTAL: &str = "feature_bridge_feature_lookups_total";
pub const SEND_FILE_TOTAL: &str = "feature_bridge_send_file_total";
pub const REQUESTS_TOTAL: &str = "feature_bridge_requests_total";

/// Count a registry lookup.
pub fn record_feature_lookup(feature: &'static str, supported: bool) {
    let outcome = if supported { "supported" } else { "unsupported" };
    ::metrics::counter!(FEATURE_LOOKUPS_TOTAL, "feature" => feature, "outcome" => outcome)
        .increment(1);
}

/// Count a send-file call; `outcome` is one of "sent", "failed", "cancelled".
pub fn record_send_file(outcome: &'static str) {
    ::metrics::counter!(SEND_FILE_TOTAL, "outcome" => outcome).increment(1);
}

/// Count a host phase: "begin", "end", "aborted".
pub fn record_request_phase(phase: &'static str) {
    ::metrics::counter!(REQUESTS_TOTAL, "phase" => phase).increment(1);
}
