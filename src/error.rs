use kl_base::{FetchError, StartupError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to set up logging at {path}: {reason}")]
    Logging { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_passes_through() {
        let err = AppError::from(FetchError::Status { url: "https://kcp/api".into(), status: 500, body: "boom".into() });
        assert_eq!(err.to_string(), "https://kcp/api returned HTTP 500: boom");
    }

    #[test]
    fn test_startup_error_passes_through() {
        assert_eq!(AppError::from(StartupError::NoContexts).to_string(), "kubeconfig defines no contexts");
    }
}
