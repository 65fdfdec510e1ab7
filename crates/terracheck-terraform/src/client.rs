use std::path::Path;

use terracheck_domain::{ProvisioningRequest, ResourceHandle, RetryPolicy};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::TerraformError;

/// Output substrings that mark a nonzero exit as transient. Rate limiting,
/// connection drops, and provider eventual-consistency races all clear up
/// on their own; anything else fails the run on the first attempt.
pub const DEFAULT_RETRYABLE: &[&str] = &[
    "Throttling",
    "RequestError: send request failed",
    "connection reset by peer",
    "TLS handshake timeout",
    "timeout while waiting for state",
    "ServiceUnavailable",
    "ResourceNotReady",
];

const TIMEOUT_SECS: u64 = 1800;

// ── TerraformClient ──────────────────────────────────────────────────────────

/// Drives an external `terraform`-compatible binary through the
/// init/apply/destroy lifecycle of one configuration directory.
///
/// Each sub-command is a blocking (minutes-long) subprocess run with
/// combined stdout+stderr capture. Nonzero exits whose output matches the
/// retryable whitelist are retried with exponential backoff up to the
/// policy's attempt bound; all other failures abort immediately and carry
/// the tool's diagnostics verbatim.
pub struct TerraformClient {
    binary: String,
    retry: RetryPolicy,
    retryable: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Init,
    Apply,
    Destroy,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Init => "init",
            Op::Apply => "apply",
            Op::Destroy => "destroy",
        }
    }

    fn args(self, req: &ProvisioningRequest) -> Vec<String> {
        let mut args: Vec<String> = match self {
            Op::Init => vec!["init".into(), "-no-color".into(), "-input=false".into()],
            Op::Apply => vec![
                "apply".into(),
                "-auto-approve".into(),
                "-no-color".into(),
                "-input=false".into(),
            ],
            Op::Destroy => vec![
                "destroy".into(),
                "-auto-approve".into(),
                "-no-color".into(),
                "-input=false".into(),
            ],
        };
        // `init` takes no input variables.
        if !matches!(self, Op::Init) {
            args.extend(req.var_args());
        }
        args
    }

    fn error(self, binary: &str, code: i32, output: String) -> TerraformError {
        let binary = binary.to_string();
        match self {
            Op::Init => TerraformError::Init { binary, code, output },
            Op::Apply => TerraformError::Apply { binary, code, output },
            Op::Destroy => TerraformError::Destroy { binary, code, output },
        }
    }
}

impl Default for TerraformClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TerraformClient {
    pub fn new() -> Self {
        Self::with_binary("terraform")
    }

    /// Use a different binary: `tofu`, or a stub script in tests.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            retry: RetryPolicy::default(),
            retryable: DEFAULT_RETRYABLE.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Add a project-specific transient-error substring to the whitelist.
    pub fn retryable_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.retryable.push(pattern.into());
        self
    }

    /// Run `init` then `apply` against the request's directory. Creates
    /// real billable resources on success; a nonzero apply may still have
    /// created some, which is why the orchestrator destroys on every path.
    pub async fn init_and_apply(
        &self,
        req: &ProvisioningRequest,
    ) -> Result<ResourceHandle, TerraformError> {
        info!(
            binary = %self.binary,
            dir = %req.dir.display(),
            resource = %req.resource_name,
            "initializing and applying configuration"
        );
        self.run_retrying(req, Op::Init).await?;
        self.run_retrying(req, Op::Apply).await?;
        Ok(req.handle())
    }

    /// Run `destroy` against the request's directory.
    pub async fn destroy(&self, req: &ProvisioningRequest) -> Result<(), TerraformError> {
        info!(
            binary = %self.binary,
            dir = %req.dir.display(),
            resource = %req.resource_name,
            "destroying configuration"
        );
        self.run_retrying(req, Op::Destroy).await?;
        Ok(())
    }

    fn is_retryable(&self, output: &str) -> bool {
        self.retryable.iter().any(|p| output.contains(p))
    }

    async fn run_retrying(
        &self,
        req: &ProvisioningRequest,
        op: Op,
    ) -> Result<String, TerraformError> {
        let args = op.args(req);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let (code, output) = self.run(&req.dir, &args, op).await?;
            if code == 0 {
                return Ok(output);
            }
            if attempt < self.retry.max_attempts && self.is_retryable(&output) {
                let delay = self.retry.delay(attempt);
                warn!(
                    op = op.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient provisioning failure, retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }
            return Err(op.error(&self.binary, code, output));
        }
    }

    /// Run one sub-command, capturing combined stdout+stderr.
    /// Returns (exit_code, combined_log).
    async fn run(
        &self,
        dir: &Path,
        args: &[String],
        op: Op,
    ) -> Result<(i32, String), TerraformError> {
        debug!(binary = %self.binary, ?args, dir = %dir.display(), "running provisioning command");

        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(dir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            // Disable interactive prompts
            .env("TF_IN_AUTOMATION", "1")
            .env("TF_INPUT", "0");

        let mut child = cmd.spawn().map_err(|e| TerraformError::Spawn {
            binary: self.binary.clone(),
            source: e,
        })?;

        let stdout = child.stdout.take().expect("stdout piped");
        let stderr = child.stderr.take().expect("stderr piped");

        // Merge stdout and stderr by reading them concurrently into a shared
        // log buffer. Each line is also mirrored to tracing.
        let mut log = String::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

        let tx1 = tx.clone();
        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx1.send(line);
            }
        });

        let tx2 = tx.clone();
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx2.send(line);
            }
        });

        drop(tx); // close our own sender so rx finishes when both tasks finish

        // Collect lines as they arrive, with a hard timeout. No apply or
        // destroy should run longer than 30 minutes; past that the child
        // is killed and a clear error returned.
        let collect = async {
            while let Some(line) = rx.recv().await {
                debug!(target: "terracheck::iac", "{}", line);
                log.push_str(&line);
                log.push('\n');
            }
        };
        let timed_out = tokio::time::timeout(
            std::time::Duration::from_secs(TIMEOUT_SECS),
            collect,
        )
        .await
        .is_err();

        stdout_task.await.ok();
        stderr_task.await.ok();

        if timed_out {
            let _ = child.kill().await;
            return Err(TerraformError::TimedOut {
                binary: self.binary.clone(),
                subcommand: op.name().to_string(),
                minutes: TIMEOUT_SECS / 60,
            });
        }

        let status = child
            .wait()
            .await
            .map_err(|e| TerraformError::Internal(format!("wait {}: {}", self.binary, e)))?;

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            warn!(binary = %self.binary, op = op.name(), code, "provisioning command exited non-zero");
        }
        Ok((code, log))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use terracheck_domain::{Region, ResourceName};
    use tempfile::TempDir;

    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("terraform-stub.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn recording_stub(dir: &Path) -> (PathBuf, PathBuf) {
        let log = dir.join("invocations.log");
        let body = format!(r#"echo "$@" >> "{}""#, log.display());
        (write_stub(dir, &body), log)
    }

    fn request(dir: &Path) -> ProvisioningRequest {
        ProvisioningRequest::new(
            dir,
            Region::new("us-east-1"),
            ResourceName::new("terracheck-table-abc123"),
        )
        .var("table_name", "terracheck-table-abc123")
        .var("region", "us-east-1")
    }

    fn invocations(log: &Path) -> Vec<String> {
        std::fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn init_and_apply_runs_init_then_apply() {
        let tmp = TempDir::new().unwrap();
        let (stub, log) = recording_stub(tmp.path());
        let client = TerraformClient::with_binary(stub.display().to_string());

        let handle = client.init_and_apply(&request(tmp.path())).await.unwrap();
        assert_eq!(handle.name.as_str(), "terracheck-table-abc123");

        let lines = invocations(&log);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("init "));
        assert!(lines[1].starts_with("apply "));
        assert!(lines[1].contains("-var table_name=terracheck-table-abc123"));
        assert!(lines[1].contains("-var region=us-east-1"));
        assert!(!lines[0].contains("-var"), "init takes no variables");
    }

    #[tokio::test]
    async fn transient_apply_error_is_retried() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("invocations.log");
        let count = tmp.path().join("apply-count");
        let body = format!(
            r#"echo "$@" >> "{log}"
case "$1" in
apply)
  n=0
  [ -f "{count}" ] && n=$(cat "{count}")
  n=$((n+1))
  echo "$n" > "{count}"
  if [ "$n" -eq 1 ]; then
    echo "Error: ThrottlingException: Rate exceeded" >&2
    exit 1
  fi
  ;;
esac"#,
            log = log.display(),
            count = count.display(),
        );
        let stub = write_stub(tmp.path(), &body);
        let client = TerraformClient::with_binary(stub.display().to_string())
            .retry_policy(RetryPolicy::fast(3));

        client.init_and_apply(&request(tmp.path())).await.unwrap();

        let applies = invocations(&log)
            .iter()
            .filter(|l| l.starts_with("apply "))
            .count();
        assert_eq!(applies, 2, "first apply fails, second succeeds");
    }

    #[tokio::test]
    async fn non_retryable_failure_aborts_on_first_attempt() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("invocations.log");
        let body = format!(
            r#"echo "$@" >> "{log}"
if [ "$1" = "apply" ]; then
  echo "Error: Unsupported argument" >&2
  exit 1
fi"#,
            log = log.display(),
        );
        let stub = write_stub(tmp.path(), &body);
        let client = TerraformClient::with_binary(stub.display().to_string())
            .retry_policy(RetryPolicy::fast(3));

        let err = client.init_and_apply(&request(tmp.path())).await.unwrap_err();
        match err {
            TerraformError::Apply { code, output, .. } => {
                assert_eq!(code, 1);
                assert!(output.contains("Unsupported argument"));
            }
            other => panic!("expected Apply error, got: {other}"),
        }

        let applies = invocations(&log)
            .iter()
            .filter(|l| l.starts_with("apply "))
            .count();
        assert_eq!(applies, 1, "non-whitelisted failure must not be retried");
    }

    #[tokio::test]
    async fn destroy_passes_variables() {
        let tmp = TempDir::new().unwrap();
        let (stub, log) = recording_stub(tmp.path());
        let client = TerraformClient::with_binary(stub.display().to_string());

        client.destroy(&request(tmp.path())).await.unwrap();

        let lines = invocations(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("destroy "));
        assert!(lines[0].contains("-auto-approve"));
        assert!(lines[0].contains("-var table_name=terracheck-table-abc123"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let client = TerraformClient::with_binary("/nonexistent/terraform-binary");

        let err = client.init_and_apply(&request(tmp.path())).await.unwrap_err();
        assert!(matches!(err, TerraformError::Spawn { .. }));
    }

    #[test]
    fn retryable_whitelist_matches_substrings() {
        let client = TerraformClient::new();
        assert!(client.is_retryable("read tcp: connection reset by peer"));
        assert!(client.is_retryable("ThrottlingException: Rate exceeded"));
        assert!(!client.is_retryable("Error: Unsupported argument"));

        let client = client.retryable_pattern("custom flake");
        assert!(client.is_retryable("a custom flake happened"));
    }
}
