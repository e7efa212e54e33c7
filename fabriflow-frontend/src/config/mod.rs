use serde::Deserialize;

use crate::payments::ClosePolicy;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub payments: PaymentSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Send the session cookie only over HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_inactivity_days")]
    pub session_inactivity_days: i64,
}

fn default_session_inactivity_days() -> i64 {
    7
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the FabriFlow REST API, without trailing slash.
    pub url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Record batches in the log only.
    #[default]
    Logging,
    /// Post batches to the backend.
    Api,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PaymentSettings {
    #[serde(default)]
    pub close_policy: ClosePolicy,
    #[serde(default)]
    pub sink: SinkKind,
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
}

fn default_submit_path() -> String {
    "/api/payments/batch".to_string()
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            close_policy: ClosePolicy::default(),
            sink: SinkKind::default(),
            submit_path: default_submit_path(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector. Spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to determine the current directory: {e}")))?;

    // Running from the workspace root or from inside the crate
    let configuration_directory = if base_path.ends_with("fabriflow-frontend") {
        base_path.join("config")
    } else {
        base_path.join("fabriflow-frontend").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let settings = config::Config::builder()
            .set_override("server.host", "127.0.0.1")
            .unwrap()
            .set_override("server.port", 8080)
            .unwrap()
            .set_override("backend.url", "http://localhost:3000")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.server.session_inactivity_days, 7);
        assert!(!settings.server.secure_cookies);
        assert_eq!(settings.payments.close_policy, ClosePolicy::Always);
        assert_eq!(settings.payments.sink, SinkKind::Logging);
        assert_eq!(settings.telemetry.log_level, "info");
        assert!(settings.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn close_policy_reads_snake_case() {
        let settings = config::Config::builder()
            .set_override("close_policy", "on_success")
            .unwrap()
            .set_override("sink", "api")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<PaymentSettings>()
            .unwrap();

        assert_eq!(settings.close_policy, ClosePolicy::OnSuccess);
        assert_eq!(settings.sink, SinkKind::Api);
        assert_eq!(settings.submit_path, "/api/payments/batch");
    }
}
