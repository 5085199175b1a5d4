use crate::ErrorKind;
use http::Method;
use std::time::Duration;

pub(crate) struct InFlightGuard {
    gauge: metrics::Gauge,
}

impl InFlightGuard {
    pub(crate) fn new() -> Self {
        let gauge = metrics::gauge!("network_kit_inflight");
        gauge.increment(1.0);
        Self { gauge }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidUrl => "invalid_url",
        ErrorKind::Encoding => "encoding",
        ErrorKind::Transport => "transport",
        ErrorKind::MalformedResponse => "malformed_response",
        ErrorKind::Http => "http",
        ErrorKind::EmptyBody => "empty_body",
        ErrorKind::Decoding => "decoding",
        ErrorKind::MissingToken => "missing_token",
        ErrorKind::ServerError => "server_error",
        ErrorKind::InvalidConfig => "invalid_config",
    }
}

fn method_label(method: &Method) -> metrics::SharedString {
    match method {
        &Method::GET => "GET".into(),
        &Method::POST => "POST".into(),
        &Method::DELETE => "DELETE".into(),
        &Method::PATCH => "PATCH".into(),
        other => other.to_string().into(),
    }
}

/// `status` is `None` when no response was received.
pub(crate) fn record_outcome(
    method: &Method,
    status: Option<u16>,
    latency: Duration,
    error_kind: Option<ErrorKind>,
) {
    let method = method_label(method);
    let status_class = status.map(status_class).unwrap_or("transport");

    metrics::counter!(
        "network_kit_requests_total",
        "method" => method.clone(),
        "status_class" => status_class
    )
    .increment(1);
    metrics::histogram!(
        "network_kit_request_duration_seconds",
        "method" => method.clone(),
        "status_class" => status_class
    )
    .record(latency);

    if let Some(kind) = error_kind {
        metrics::counter!(
            "network_kit_errors_total",
            "method" => method,
            "kind" => error_kind_label(kind)
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_cover_quirk_band() {
        assert_eq!(status_class(210), "2xx");
        assert_eq!(status_class(211), "2xx");
        assert_eq!(status_class(0), "other");
    }
}
