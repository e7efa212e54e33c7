use dotenvy::dotenv;
use fabriflow_frontend::config::{get_configuration, SinkKind};
use fabriflow_frontend::services::api_client::ApiClient;
use fabriflow_frontend::services::auth_client::AuthClient;
use fabriflow_frontend::services::catalog::SampleCatalog;
use fabriflow_frontend::services::payment_sink::{ApiPaymentSink, LoggingPaymentSink, PaymentSink};
use fabriflow_frontend::startup::build_router;
use fabriflow_frontend::AppState;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "fabriflow-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    fabriflow_frontend::services::metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let auth = Arc::new(AuthClient::new(ApiClient::new(configuration.backend.clone())));
    let catalog = Arc::new(
        SampleCatalog::load().map_err(|e| anyhow::anyhow!("Failed to load sample catalog: {}", e))?,
    );
    let payment_sink: Arc<dyn PaymentSink> = match configuration.payments.sink {
        SinkKind::Logging => Arc::new(LoggingPaymentSink),
        SinkKind::Api => Arc::new(ApiPaymentSink::new(
            ApiClient::new(configuration.backend.clone()),
            configuration.payments.submit_path.clone(),
        )),
    };

    info!(
        backend = %configuration.backend.url,
        close_policy = ?configuration.payments.close_policy,
        sink = ?configuration.payments.sink,
        "Configuration loaded"
    );

    let state = AppState::new(
        auth,
        catalog,
        payment_sink,
        configuration.server.clone(),
        configuration.payments.clone(),
    );
    let app = build_router(state);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting fabriflow-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
