#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The service refused the call. `message` is shown to users as-is.
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("backend misconfigured: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from backend: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl BackendError {
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The credentials presented with the call were not accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
