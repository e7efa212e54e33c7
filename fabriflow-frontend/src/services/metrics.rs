use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PAYMENT_SUBMISSIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static AUTH_REJECTIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Builds and registers every collector. Safe to call more than once; only
/// the first call takes effect.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;

    let request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )?;

    let payment_submissions = IntCounterVec::new(
        Opts::new(
            "payment_submissions_total",
            "Payment batch submissions by outcome",
        ),
        &["outcome"],
    )?;

    let auth_rejections = IntCounterVec::new(
        Opts::new(
            "auth_rejections_total",
            "Requests bounced to the login page by the auth gate",
        ),
        &["reason"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration.clone()))?;
    registry.register(Box::new(payment_submissions.clone()))?;
    registry.register(Box::new(auth_rejections.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(request_duration);
    let _ = PAYMENT_SUBMISSIONS_TOTAL.set(payment_submissions);
    let _ = AUTH_REJECTIONS_TOTAL.set(auth_rejections);
    Ok(())
}

pub fn record_http_request(method: &str, path: &str, status: u16, seconds: f64) {
    let status = status.to_string();
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, path, &status]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[method, path, &status])
            .observe(seconds);
    }
}

pub fn record_payment_submission(outcome: &str) {
    if let Some(counter) = PAYMENT_SUBMISSIONS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_auth_rejection(reason: &str) {
    if let Some(counter) = AUTH_REJECTIONS_TOTAL.get() {
        counter.with_label_values(&[reason]).inc();
    }
}

/// Prometheus text exposition of the registry, empty before `init_metrics`.
pub fn get_metrics() -> Result<String, prometheus::Error> {
    let Some(registry) = REGISTRY.get() else {
        return Ok(String::new());
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        init_metrics().unwrap();
        record_payment_submission("submitted");
        record_auth_rejection("missing_token");
        record_http_request("GET", "/dashboard", 200, 0.01);

        let text = get_metrics().unwrap();
        assert!(text.contains("payment_submissions_total{outcome=\"submitted\"}"));
        assert!(text.contains("auth_rejections_total{reason=\"missing_token\"}"));
        assert!(text.contains("http_requests_total"));
    }
}
