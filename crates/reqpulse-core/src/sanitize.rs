//! Credential masking for request query strings.
//!
//! Values of sensitive query parameters (configured on [`MonitorConfig`])
//! are replaced with a fixed mask token before any request data leaves the
//! instrumentation boundary. Matching is on key identity, never on value
//! content, so `?word=password` passes through untouched.

use crate::adapter::InboundRequest;
use crate::config::MonitorConfig;
use std::borrow::Cow;

/// A safe, loggable view of one request, derived at dispatch entry.
///
/// The query string is already masked; the descriptor can be handed to
/// category policies, logs, and sinks without further scrubbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request path without query string.
    pub path: String,
    /// Masked query string, absent when the request carried none.
    pub query: Option<String>,
}

impl RequestDescriptor {
    /// Build a descriptor from an inbound request view.
    pub fn from_request<R: InboundRequest + ?Sized>(
        request: &R,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            method: request.method().to_string(),
            path: request.path().to_string(),
            query: request
                .raw_query()
                .map(|raw| mask_credentials(raw, config).into_owned()),
        }
    }
}

/// Mask the values of sensitive parameters in a raw query string.
///
/// Splits on `&` and replaces the value of every `key=value` segment whose
/// key matches a configured sensitive name, regardless of the value's
/// length, position, or how often the key repeats. Segments without `=` or
/// with an empty key pass through unchanged, as does a leading `?`.
///
/// Pure and idempotent: the mask token is guaranteed by config validation
/// to never equal a sensitive key, so masking a masked string is a no-op.
pub fn mask_credentials<'a>(raw: &'a str, config: &MonitorConfig) -> Cow<'a, str> {
    let (prefix, query) = match raw.strip_prefix('?') {
        Some(rest) => ("?", rest),
        None => ("", raw),
    };

    if !query
        .split('&')
        .any(|segment| is_sensitive_segment(segment, config))
    {
        return Cow::Borrowed(raw);
    }

    let masked: Vec<Cow<'_, str>> = query
        .split('&')
        .map(|segment| match segment.find('=') {
            Some(idx) if idx > 0 && config.is_sensitive_key(&segment[..idx]) => {
                Cow::Owned(format!("{}={}", &segment[..idx], config.mask_token))
            }
            _ => Cow::Borrowed(segment),
        })
        .collect();

    Cow::Owned(format!("{}{}", prefix, masked.join("&")))
}

fn is_sensitive_segment(segment: &str, config: &MonitorConfig) -> bool {
    match segment.find('=') {
        Some(0) | None => false,
        Some(idx) => config.is_sensitive_key(&segment[..idx]),
    }
}
