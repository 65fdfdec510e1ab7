//! Declarative expectation sets evaluated against inspected resource
//! state. Evaluation never short-circuits: every record is checked and the
//! report lists all mismatches, so one wrong field does not hide another.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One evaluated expectation: a human label plus the rendered expected and
/// actual values. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationRecord {
    pub label: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

impl fmt::Display for ExpectationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            write!(f, "{}: ok", self.label)
        } else {
            write!(
                f,
                "{}: expected {}, got {}",
                self.label, self.expected, self.actual
            )
        }
    }
}

/// An accumulating set of expectations. Each `expect_*` call evaluates
/// eagerly and records the outcome; nothing stops at the first failure.
#[derive(Debug, Default)]
pub struct Expectations {
    records: Vec<ExpectationRecord>,
}

impl Expectations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect two values to compare equal.
    pub fn expect_eq<T>(&mut self, label: &str, expected: T, actual: T)
    where
        T: fmt::Debug + PartialEq,
    {
        let passed = expected == actual;
        self.push(label, format!("{:?}", expected), format!("{:?}", actual), passed);
    }

    /// Expect two collections to contain the same elements, ignoring
    /// order but respecting multiplicity. Used for key schemas and tags,
    /// which the control plane returns in unspecified order.
    pub fn expect_set_eq<T>(&mut self, label: &str, expected: &[T], actual: &[T])
    where
        T: fmt::Debug + PartialEq,
    {
        let mut remaining: Vec<&T> = actual.iter().collect();
        let mut matched = true;
        for item in expected {
            match remaining.iter().position(|r| *r == item) {
                Some(pos) => {
                    remaining.swap_remove(pos);
                }
                None => {
                    matched = false;
                    break;
                }
            }
        }
        let passed = matched && remaining.is_empty();
        self.push(label, format!("{:?}", expected), format!("{:?}", actual), passed);
    }

    fn push(&mut self, label: &str, expected: String, actual: String, passed: bool) {
        if !passed {
            debug!(label, %expected, %actual, "expectation failed");
        }
        self.records.push(ExpectationRecord {
            label: label.to_string(),
            expected,
            actual,
            passed,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_report(self) -> ExpectationReport {
        ExpectationReport {
            records: self.records,
        }
    }
}

/// The consumed form of an [`Expectations`] set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectationReport {
    pub records: Vec<ExpectationRecord>,
}

impl ExpectationReport {
    pub fn passed(&self) -> bool {
        self.records.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExpectationRecord> {
        self.records.iter().filter(|r| !r.passed)
    }
}

impl fmt::Display for ExpectationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<&ExpectationRecord> = self.failures().collect();
        if failed.is_empty() {
            write!(f, "all {} expectations passed", self.records.len())
        } else {
            writeln!(
                f,
                "{} of {} expectations failed:",
                failed.len(),
                self.records.len()
            )?;
            for record in failed {
                writeln!(f, "  {}", record)?;
            }
            Ok(())
        }
    }
}
