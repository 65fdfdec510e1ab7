use std::future::Future;

use chrono::Utc;
use terracheck_domain::{ProvisioningRequest, ResourceHandle};
use terracheck_expect::{ExpectationReport, Expectations};
use terracheck_terraform::TerraformClient;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::HarnessError;
use crate::report::{Phase, ScenarioReport};

/// One provisioning verification scenario: apply a configuration, run the
/// caller's inspection checks against the live resource, then destroy.
///
/// Scenarios are self-contained values with no shared state; concurrently
/// running scenarios in the same account are isolated purely by their
/// uniquely generated resource names.
pub struct Scenario {
    name: String,
    client: TerraformClient,
    request: ProvisioningRequest,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        client: TerraformClient,
        request: ProvisioningRequest,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            request,
        }
    }

    /// Execute the scenario. Destroy runs on every exit path: after
    /// passing checks, after failed expectations, after an inspection
    /// error, after a panic inside `checks`, and after a failed apply
    /// (which may have created resources before dying). The checks body
    /// runs inside its own task so a panic is caught, not propagated.
    ///
    /// The orchestrator never retries; retries live inside the
    /// provisioning client and the inspector.
    pub async fn run<F, Fut>(self, checks: F) -> ScenarioReport
    where
        F: FnOnce(ResourceHandle) -> Fut,
        Fut: Future<Output = Result<Expectations, HarnessError>> + Send + 'static,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(scenario = %self.name, %run_id, resource = %self.request.resource_name, "scenario starting");

        let mut phase = Phase::Init;
        let mut expectations = ExpectationReport::default();
        let mut failure: Option<String> = None;

        match self.client.init_and_apply(&self.request).await {
            Ok(handle) => {
                phase = Phase::Applied;
                match tokio::spawn(checks(handle)).await {
                    Ok(Ok(evaluated)) => {
                        phase = Phase::Inspected;
                        debug!(scenario = %self.name, phase = ?phase, evaluated = evaluated.len(), "checks returned");
                        expectations = evaluated.into_report();
                        phase = Phase::Asserted;
                    }
                    Ok(Err(e)) => {
                        failure = Some(e.to_string());
                    }
                    Err(join_err) => {
                        let msg = match join_err.try_into_panic() {
                            Ok(payload) => payload
                                .downcast_ref::<&'static str>()
                                .map(|s| s.to_string())
                                .or_else(|| payload.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| "panic payload of unknown type".into()),
                            Err(e) => format!("checks task aborted: {}", e),
                        };
                        failure = Some(HarnessError::ChecksPanicked(msg).to_string());
                    }
                }
            }
            Err(e) => {
                failure = Some(HarnessError::Apply(e).to_string());
            }
        }

        // Guaranteed cleanup: a partial apply may have created resources,
        // so destroy runs even when apply itself reported failure.
        let destroy_failure = match self.client.destroy(&self.request).await {
            Ok(()) => {
                phase = Phase::Destroyed;
                None
            }
            Err(e) => {
                warn!(scenario = %self.name, error = %e, "destroy failed; reported alongside the original result");
                Some(e.to_string())
            }
        };

        let report = ScenarioReport {
            scenario: self.name,
            run_id,
            started_at,
            finished_at: Utc::now(),
            phase,
            expectations,
            failure,
            destroy_failure,
        };

        if report.passed() {
            info!(scenario = %report.scenario, %run_id, "scenario passed");
        } else {
            warn!(scenario = %report.scenario, %run_id, "scenario failed");
        }
        report
    }
}
