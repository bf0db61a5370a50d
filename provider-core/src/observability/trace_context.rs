//! W3C trace context on outbound provider calls.
//!
//! Only meaningful when the OTLP layer is installed; without it the current
//! span has no valid OpenTelemetry context and nothing is added.

use opentelemetry::trace::TraceContextExt;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Headers carrying the current span's trace context, empty when there is none.
pub fn trace_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let context = Span::current().context();
    let span = context.span();
    let span_context = span.span_context();

    if !span_context.is_valid() {
        return headers;
    }

    let traceparent = format_traceparent(
        &span_context.trace_id().to_string(),
        &span_context.span_id().to_string(),
        span_context.trace_flags().to_u8(),
    );
    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let tracestate = span_context.trace_state().header();
    if !tracestate.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&tracestate) {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }

    headers
}

/// `version-trace_id-span_id-flags`, version always `00`.
fn format_traceparent(trace_id: &str, span_id: &str, flags: u8) -> String {
    format!("00-{}-{}-{:02x}", trace_id, span_id, flags)
}
