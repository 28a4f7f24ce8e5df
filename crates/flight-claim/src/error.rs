use crate::claims::upstream::UpstreamError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use std::fmt;
use std::net::SocketAddr;

/// Failures that stop the service or the CLI before or while it runs.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    Serve(std::io::Error),
    Gateway(UpstreamError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Bind { addr, source } => write!(f, "cannot listen on {}: {}", addr, source),
            AppError::Serve(err) => write!(f, "http server stopped: {}", err),
            AppError::Gateway(err) => write!(f, "claims api error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Bind { source, .. } => Some(source),
            AppError::Serve(err) => Some(err),
            AppError::Gateway(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<UpstreamError> for AppError {
    fn from(value: UpstreamError) -> Self {
        Self::Gateway(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_names_the_failing_layer() {
        let err = AppError::from(ConfigError::InvalidNumber {
            var: "APP_UPSTREAM_TIMEOUT_MS",
        });
        assert_eq!(
            err.to_string(),
            "configuration error: APP_UPSTREAM_TIMEOUT_MS must be a non-negative integer"
        );

        let err = AppError::from(UpstreamError::Timeout);
        assert_eq!(err.to_string(), "claims api error: claims api timed out");
    }

    #[test]
    fn bind_failures_name_the_address() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().expect("valid addr");
        let err = AppError::Bind {
            addr,
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };

        assert_eq!(
            err.to_string(),
            "cannot listen on 127.0.0.1:8080: address in use"
        );
        assert!(err.source().is_some());
    }
}
