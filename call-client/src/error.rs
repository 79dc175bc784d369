use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallError {
    /// The call connection no longer exists, usually because the caller hung up.
    #[error("Call connection not found: {0}")]
    NotFound(String),

    /// The service reported that the call was already terminated.
    #[error("Call already terminated: {message}")]
    CallTerminated { message: String },

    #[error("API error (HTTP {status}){}: {message}", .code.as_ref().map(|c| format!(" [{}]", c)).unwrap_or_default())]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Request failed: {0}")]
    Request(String),

    #[error(
        "Access token not found for {endpoint}. Set {env_var} environment variable or add to config."
    )]
    MissingCredentials { endpoint: String, env_var: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CallError>;
