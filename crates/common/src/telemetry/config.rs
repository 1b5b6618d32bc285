use opentelemetry_sdk::{logs::LoggerProvider, trace::TracerProvider as SdkTracerProvider};

pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// What `init_telemetry` installs
///
/// JSON console logging is always on. OTLP export of spans and log records is
/// added only when `otel_enabled` is set.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Reported as the OTel `service.name` resource
    pub service_name: String,
    pub otel_endpoint: String,
    pub otel_enabled: bool,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
}

impl TelemetryConfig {
    /// Console logging only
    pub fn console(service_name: impl Into<String>, log_level: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            otel_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            otel_enabled: false,
            log_level: log_level.into(),
        }
    }

    /// Also export over OTLP/gRPC to `endpoint`
    pub fn with_otlp(mut self, endpoint: impl Into<String>) -> Self {
        self.otel_endpoint = endpoint.into();
        self.otel_enabled = true;
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::console("particle-monitor", "info")
    }
}

/// OTel providers kept alive until shutdown flushes them
pub struct TelemetryProviders {
    pub tracer_provider: SdkTracerProvider,
    pub logger_provider: LoggerProvider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_otlp_enables_export() {
        let config = TelemetryConfig::console("particle-monitor", "debug")
            .with_otlp("http://collector:4317");

        assert!(config.otel_enabled);
        assert_eq!(config.otel_endpoint, "http://collector:4317");
        assert_eq!(config.log_level, "debug");
    }
}
