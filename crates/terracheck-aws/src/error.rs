use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectorError {
    /// The resource is not (yet) visible on the control plane. Retried
    /// internally with backoff, since a freshly applied resource may take
    /// a moment to become consistent.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Throttling or a 5xx from the service. Retried with backoff.
    #[error("transient service error: {0}")]
    Transient(String),

    /// Authentication or authorization failure. Fatal, never retried.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other structured API error. Fatal.
    #[error("api error {kind}: {message}")]
    Api { kind: String, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("http request failed: {0}")]
    Http(String),
}

impl InspectorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InspectorError::NotFound(_) | InspectorError::Transient(_) | InspectorError::Http(_)
        )
    }
}
