pub mod error;
pub mod report;
pub mod scenario;
pub mod telemetry;

pub use error::HarnessError;
pub use report::{Phase, ScenarioFailure, ScenarioReport};
pub use scenario::Scenario;
pub use telemetry::init_tracing;
