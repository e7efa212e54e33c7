use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Paths that only ever return machine-readable bodies.
fn is_machine_route(path: &str) -> bool {
    path == "/health" || path == "/metrics" || path.ends_with("/summary")
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let machine_route = is_machine_route(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if machine_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    } else {
        // Server-rendered pages load htmx from unpkg and use inline styles.
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' https://unpkg.com; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data: https:; \
                 frame-ancestors 'none'",
            ),
        );
    }

    response
}
