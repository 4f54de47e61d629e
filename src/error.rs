use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error taxonomy for everything the client does.
///
/// `Validation` and `Shape` are raised and rendered at the widget/form
/// boundary; `Unauthorized` is handled globally (session cleared, login
/// redirect) and carries a fixed user-facing message. No variant implies a
/// retry: one request is one attempt.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-side rejection. Never reaches the backend.
    #[error("{0}")]
    Validation(String),

    /// Network or timeout failure from the transport.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response with the best message the body offered.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose body is missing expected fields.
    #[error("unexpected response from server: {0}")]
    Shape(String),

    /// HTTP 401. The session has already been cleared and the login
    /// redirect issued by the time this surfaces.
    #[error("Your session has expired. Please log in again.")]
    Unauthorized,
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ClientError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn shape(message: impl Into<String>) -> Self {
        ClientError::Shape(message.into())
    }
}
