use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use fabriflow_frontend::config::{PaymentSettings, ServerSettings};
use fabriflow_frontend::handlers::auth::PENDING_APPROVAL_MESSAGE;
use fabriflow_frontend::handlers::payments::DialogSummary;
use fabriflow_frontend::models::{BackendUser, CompanyRegistration, Invoice, VendorRegistration};
use fabriflow_frontend::payments::PaymentBatch;
use fabriflow_frontend::services::api_client::{ApiError, CallContext};
use fabriflow_frontend::services::auth_client::{AuthService, LoginData};
use fabriflow_frontend::services::catalog::SampleCatalog;
use fabriflow_frontend::services::metrics::init_metrics;
use fabriflow_frontend::services::payment_sink::PaymentSink;
use fabriflow_frontend::startup::build_router;
use fabriflow_frontend::AppState;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::Secret;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

const TOKEN: &str = "token-abc";

struct StubAuth {
    status: Mutex<Option<String>>,
    accept_tokens: AtomicBool,
}

impl StubAuth {
    fn active() -> Self {
        Self::with_status("active")
    }

    fn with_status(status: &str) -> Self {
        Self {
            status: Mutex::new(Some(status.to_string())),
            accept_tokens: AtomicBool::new(true),
        }
    }

    fn set_status(&self, status: &str) {
        *self.status.lock().unwrap() = Some(status.to_string());
    }

    fn set_accept_tokens(&self, accept: bool) {
        self.accept_tokens.store(accept, Ordering::SeqCst);
    }

    fn user(&self, email: &str) -> BackendUser {
        BackendUser {
            id: "u-1".to_string(),
            email: email.to_string(),
            company: "Textiles del Norte S.A. de C.V.".to_string(),
            user: Some(email.to_string()),
            role: Some("admin".to_string()),
            permissions: Some(vec!["payments".to_string()]),
            status: self.status.lock().unwrap().clone(),
            last_login: None,
            created_at: None,
        }
    }
}

#[async_trait]
impl AuthService for StubAuth {
    async fn login(
        &self,
        email: &str,
        _password: &Secret<String>,
        _company: &str,
        _ctx: &CallContext,
    ) -> Result<LoginData, ApiError> {
        if email == "wrong@fabriflow.com" {
            return Err(ApiError::Rejected("Credenciales inválidas".to_string()));
        }
        Ok(LoginData {
            token: TOKEN.to_string(),
            user: self.user(email),
        })
    }

    async fn resolve_user(&self, ctx: &CallContext) -> Result<BackendUser, ApiError> {
        match ctx.access_token.as_deref() {
            Some(TOKEN) if self.accept_tokens.load(Ordering::SeqCst) => {
                Ok(self.user("admin@fabriflow.com"))
            }
            _ => Err(ApiError::Unauthorized),
        }
    }

    async fn companies(&self, _ctx: &CallContext) -> Result<Vec<String>, ApiError> {
        Ok(vec!["Textiles del Norte S.A. de C.V.".to_string()])
    }

    async fn register_company(
        &self,
        _payload: &CompanyRegistration,
        _ctx: &CallContext,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn register_vendor(
        &self,
        _payload: &VendorRegistration,
        _ctx: &CallContext,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<PaymentBatch>>,
}

#[async_trait]
impl PaymentSink for RecordingSink {
    async fn submit(&self, batch: &PaymentBatch, _ctx: &CallContext) -> Result<(), ApiError> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

fn invoice(uuid: &str, total: &str, status: &str) -> Invoice {
    serde_json::from_value(serde_json::json!({
        "uuid": uuid,
        "folio": format!("F-{uuid}"),
        "company": "Textiles del Norte S.A. de C.V.",
        "issuerName": "Proveedor de Algodón Industrial",
        "invoiceDate": "2024-01-15",
        "total": total,
        "currency": "MXN",
        "status": status
    }))
    .unwrap()
}

fn server_settings() -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        secure_cookies: false,
        session_inactivity_days: 7,
    }
}

fn app_with(auth: Arc<StubAuth>, sink: Arc<RecordingSink>) -> Router {
    init_metrics().unwrap();
    let catalog = SampleCatalog::with_invoices(vec![
        invoice("inv1", "100", "pending"),
        invoice("inv2", "250", "pending"),
        invoice("inv3", "89.99", "paid"),
    ]);
    let state = AppState::new(
        auth,
        Arc::new(catalog),
        sink,
        server_settings(),
        PaymentSettings::default(),
    );
    build_router(state)
}

fn app() -> Router {
    app_with(Arc::new(StubAuth::active()), Arc::new(RecordingSink::default()))
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            "email=admin%40fabriflow.com&password=secret123&company=Textiles+del+Norte",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-redirect"], "/dashboard");
    session_cookie(&response)
}

#[tokio::test]
async fn health_check_works() {
    let response = app().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn protected_pages_redirect_to_login_without_session() {
    let app = app();
    for uri in ["/dashboard", "/invoices", "/providers", "/payments/dialog"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}

#[tokio::test]
async fn root_redirects_anonymous_visitors_to_login() {
    let response = app().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn login_requires_credentials_and_company() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_form("/login", "email=admin%40fabriflow.com&password=", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Email y contraseña son requeridos"));

    let response = app
        .oneshot(post_form(
            "/login",
            "email=admin%40fabriflow.com&password=secret123",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Por favor selecciona una empresa"));
}

#[tokio::test]
async fn login_surfaces_backend_rejection() {
    let response = app()
        .oneshot(post_form(
            "/login",
            "email=wrong%40fabriflow.com&password=secret123&company=Textiles",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!response.headers().contains_key("hx-redirect"));
    assert!(body_text(response).await.contains("Credenciales inválidas"));
}

#[tokio::test]
async fn login_refuses_users_awaiting_approval() {
    for status in ["pending", "rechazado"] {
        let app = app_with(
            Arc::new(StubAuth::with_status(status)),
            Arc::new(RecordingSink::default()),
        );
        let response = app
            .oneshot(post_form(
                "/login",
                "email=vendor%40fabriflow.com&password=secret123&company=Textiles",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains(PENDING_APPROVAL_MESSAGE));
    }
}

#[tokio::test]
async fn signed_in_session_reaches_dashboard_until_logout() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Pago múltiple"));

    let response = app
        .clone()
        .oneshot(get("/register", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    let response = app
        .clone()
        .oneshot(post_form("/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let response = app.oneshot(get("/dashboard", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn revoked_token_destroys_session() {
    let auth = Arc::new(StubAuth::active());
    let app = app_with(auth.clone(), Arc::new(RecordingSink::default()));
    let cookie = sign_in(&app).await;

    auth.set_accept_tokens(false);
    let response = app
        .clone()
        .oneshot(get("/invoices", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    // The session was flushed, so the old cookie stays signed out
    auth.set_accept_tokens(true);
    let response = app.oneshot(get("/invoices", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn user_rejected_after_login_loses_access() {
    let auth = Arc::new(StubAuth::active());
    let app = app_with(auth.clone(), Arc::new(RecordingSink::default()));
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    auth.set_status("rechazado");
    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    auth.set_status("active");
    let response = app.oneshot(get("/dashboard", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn oversized_allocation_keeps_dialog_usable() {
    let app = app();
    let cookie = sign_in(&app).await;

    app.clone()
        .oneshot(get("/payments/dialog", Some(&cookie)))
        .await
        .unwrap();
    for body in ["id=inv1", "id=inv2"] {
        app.clone()
            .oneshot(post_form("/payments/dialog/toggle", body, Some(&cookie)))
            .await
            .unwrap();
    }
    for id in ["inv1", "inv2"] {
        let response = app
            .clone()
            .oneshot(post_form(
                "/payments/dialog/allocation",
                &format!("id={id}&amount=79228162514264337593543950335"),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get("/payments/dialog/summary", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary: DialogSummary = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(summary.reconciliation.total_allocated, Decimal::ZERO);
    assert!(!summary.is_valid);
}

#[tokio::test]
async fn unknown_invoice_is_not_found() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(get("/invoices/inv1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/invoices/missing", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let body = "companyType=client&providerType=&company=Textiles&email=ana%40example.com\
                &name=Ana&lastname=Lopez&rfc=ABC123456789&phone=5550000000\
                &password=secret123&confirmPassword=secret999";
    let response = app().oneshot(post_form("/register", body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Las contraseñas no coinciden"));
}

#[tokio::test]
async fn payment_dialog_allocates_and_submits() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(Arc::new(StubAuth::active()), sink.clone());
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(get("/payments/dialog", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("F-inv1"));
    assert!(!html.contains("F-inv3"));

    for step in [
        ("/payments/dialog/toggle", "id=inv2"),
        ("/payments/dialog/toggle", "id=inv1"),
        (
            "/payments/dialog/details",
            "payment_amount=350&payment_method=transfer&payment_reference=+REF-2024-001+",
        ),
        ("/payments/dialog/auto-allocate", ""),
    ] {
        let response = app
            .clone()
            .oneshot(post_form(step.0, step.1, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", step.0);
    }

    let response = app
        .clone()
        .oneshot(get("/payments/dialog/summary", Some(&cookie)))
        .await
        .unwrap();
    let summary: DialogSummary = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(summary.selected_invoice_ids, ["inv2", "inv1"]);
    assert_eq!(summary.allocations["inv2"], Decimal::from(250));
    assert_eq!(summary.allocations["inv1"], Decimal::from(100));
    assert_eq!(summary.reconciliation.remaining, Decimal::ZERO);
    assert!(summary.is_valid);

    let response = app
        .clone()
        .oneshot(post_form("/payments/dialog/submit", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "payment-dialog-closed");

    {
        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].payment_reference, "REF-2024-001");
        assert_eq!(batches[0].allocations.len(), 2);
    }

    // Submitting again finds no open dialog
    let response = app
        .oneshot(post_form("/payments/dialog/submit", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn incomplete_dialog_stays_open() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(Arc::new(StubAuth::active()), sink.clone());
    let cookie = sign_in(&app).await;

    app.clone()
        .oneshot(get("/payments/dialog", Some(&cookie)))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_form(
            "/payments/dialog/details",
            "payment_amount=500&payment_method=cash&payment_reference=R-1",
            Some(&cookie),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_form("/payments/dialog/select-all", "checked=on", Some(&cookie)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_form("/payments/dialog/submit", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("hx-trigger"));
    assert!(sink.batches.lock().unwrap().is_empty());

    let response = app
        .oneshot(get("/payments/dialog/summary", Some(&cookie)))
        .await
        .unwrap();
    let summary: DialogSummary = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(summary.selected_invoice_ids, ["inv1", "inv2"]);
    assert_eq!(
        summary.reconciliation.remaining,
        Decimal::from_str("500").unwrap()
    );
    assert!(!summary.is_valid);
}

#[tokio::test]
async fn metrics_endpoint_exposes_request_counters() {
    let app = app();
    app.clone().oneshot(get("/health", None)).await.unwrap();

    let response = app.oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("http_requests_total"));
}
