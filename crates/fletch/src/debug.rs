//! Per-call debug telemetry.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;

use crate::payload::Payload;

/// Emit a summary of a completed call, success or failure.
///
/// Gated on the builder's debug flag; emission never affects the call's
/// result.
pub(crate) fn log_call(
    enabled: bool,
    method: &Method,
    url: &str,
    headers: &HashMap<String, String>,
    elapsed: Duration,
    timeout: Duration,
    payload: Option<&Payload>,
) {
    if !enabled {
        return;
    }

    tracing::debug!(
        %method,
        url,
        headers = ?headers,
        elapsed_ms = elapsed.as_millis() as u64,
        timeout_secs = timeout.as_secs(),
        payload = ?payload,
        "http request completed"
    );
}
