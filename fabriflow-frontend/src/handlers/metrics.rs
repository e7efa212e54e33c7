use axum::{http::header, response::IntoResponse};
use service_core::error::AppError;

pub async fn metrics() -> Result<impl IntoResponse, AppError> {
    let body = crate::services::metrics::get_metrics().map_err(anyhow::Error::from)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
