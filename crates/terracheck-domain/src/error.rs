use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid resource name: {0}")]
    InvalidResourceName(String),

    #[error("invalid region: {0}")]
    InvalidRegion(String),
}
