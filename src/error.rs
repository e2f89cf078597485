//! Error types for the FinancePro dashboard

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, FinanceError>;

#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Staged audit generator failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("an audit report is already being generated")]
    AlreadyRunning,

    #[error("audit generation was cancelled")]
    Cancelled,
}

/// Report delivery failures
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("download target unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown theme '{0}' (expected 'corporate' or 'cyberpunk')")]
    InvalidTheme(String),

    #[error("invalid stage delay '{0}' (expected 'fixed' or 'jitter:<min_ms>-<max_ms>')")]
    InvalidDelay(String),

    #[error("invalid bind address '{0}'")]
    InvalidAddress(String),

    #[error("invalid tick interval '{0}'")]
    InvalidTick(String),
}
