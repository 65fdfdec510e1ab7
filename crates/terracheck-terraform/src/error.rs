use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerraformError {
    /// `init` exited nonzero with output the retry whitelist did not match.
    #[error("{binary} init exited with code {code}:\n{output}")]
    Init {
        binary: String,
        code: i32,
        output: String,
    },

    /// `apply` exited nonzero with output the retry whitelist did not match.
    #[error("{binary} apply exited with code {code}:\n{output}")]
    Apply {
        binary: String,
        code: i32,
        output: String,
    },

    /// `destroy` exited nonzero. Surfaced loudly by the orchestrator but
    /// never allowed to mask an earlier failure.
    #[error("{binary} destroy exited with code {code}:\n{output}")]
    Destroy {
        binary: String,
        code: i32,
        output: String,
    },

    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} {subcommand} timed out after {minutes} minutes")]
    TimedOut {
        binary: String,
        subcommand: String,
        minutes: u64,
    },

    #[error("internal provisioning error: {0}")]
    Internal(String),
}
