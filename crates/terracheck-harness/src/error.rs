use terracheck_aws::InspectorError;
use terracheck_terraform::TerraformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("apply failed: {0}")]
    Apply(#[source] TerraformError),

    #[error("inspection failed: {0}")]
    Inspect(#[from] InspectorError),

    #[error("checks body panicked: {0}")]
    ChecksPanicked(String),
}
