use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::error::InspectorError;

#[derive(Clone, Debug)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials, InspectorError>;
}

// ── Environment variables ─────────────────────────────────────────────────────

/// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
/// `AWS_SESSION_TOKEN` on every call.
pub struct EnvCredentialsProvider;

#[async_trait]
impl CredentialsProvider for EnvCredentialsProvider {
    async fn credentials(&self) -> Result<Credentials, InspectorError> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").map_err(|_| {
            InspectorError::PermissionDenied("AWS_ACCESS_KEY_ID is not set".into())
        })?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            InspectorError::PermissionDenied("AWS_SECRET_ACCESS_KEY is not set".into())
        })?;
        Ok(Credentials {
            access_key_id,
            secret_access_key,
            session_token: std::env::var("AWS_SESSION_TOKEN").ok(),
        })
    }
}

// ── AWS CLI fallback ──────────────────────────────────────────────────────────

/// Shells out to `aws sts get-session-token` for workstations that have a
/// configured CLI but no credentials in the environment.
pub struct CliCredentialsProvider;

#[async_trait]
impl CredentialsProvider for CliCredentialsProvider {
    async fn credentials(&self) -> Result<Credentials, InspectorError> {
        debug!("resolving credentials via aws CLI");
        let output = Command::new("aws")
            .args([
                "sts",
                "get-session-token",
                "--duration-seconds",
                "3600",
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|e| {
                InspectorError::PermissionDenied(format!(
                    "aws CLI not found: {}. Install the AWS CLI or set credential env vars.",
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InspectorError::PermissionDenied(format!(
                "aws sts get-session-token failed: {}. Run 'aws configure' first.",
                stderr.trim()
            )));
        }

        let resp: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| InspectorError::Decode(format!("aws CLI output: {}", e)))?;

        let creds = &resp["Credentials"];
        Ok(Credentials {
            access_key_id: creds["AccessKeyId"].as_str().unwrap_or("").to_string(),
            secret_access_key: creds["SecretAccessKey"].as_str().unwrap_or("").to_string(),
            session_token: creds["SessionToken"].as_str().map(str::to_string),
        })
    }
}

// ── Static credentials ────────────────────────────────────────────────────────

/// Fixed credentials, injected programmatically (or by tests).
pub struct StaticCredentialsProvider {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn credentials(&self) -> Result<Credentials, InspectorError> {
        Ok(Credentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
        })
    }
}

/// Default resolution order: env vars when both keys are present,
/// otherwise the aws CLI.
pub fn default_provider() -> Box<dyn CredentialsProvider> {
    let has_env = std::env::var("AWS_ACCESS_KEY_ID").is_ok()
        && std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
    if has_env {
        Box::new(EnvCredentialsProvider)
    } else {
        Box::new(CliCredentialsProvider)
    }
}
