use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The hub refused the maintenance login
    #[error("Login to hub at {address} rejected: {reason}")]
    AuthError { address: String, reason: String },
    /// HTTP transport failure, bad status or unsuccessful structured response
    #[error("{method} request to {path} failed: {reason}")]
    RequestError {
        method: &'static str,
        path: String,
        reason: String,
    },
    /// The hub reported no backups at all
    #[error("No backups found. Make sure backups are enabled on http://{address}/hub/backup")]
    EmptyBackupList { address: String },
    /// Malformed date/time string reported by the hub
    #[error("Parse error: {0}")]
    ParseError(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid hub address: {err}"))
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
