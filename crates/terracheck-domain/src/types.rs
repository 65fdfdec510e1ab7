use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::DomainError;

// ── Identifiers ──────────────────────────────────────────────────────────────

/// Name of the primary resource a scenario provisions (e.g. a table name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceName(pub String);

impl ResourceName {
    pub fn new(s: impl Into<String>) -> Self {
        ResourceName(s.into())
    }

    /// Validated constructor: 3-255 characters, alphanumeric plus `_ . -`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let len_ok = (3..=255).contains(&s.len());
        let chars_ok = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if len_ok && chars_ok {
            Ok(ResourceName(s.to_string()))
        } else {
            Err(DomainError::InvalidResourceName(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cloud region or zone the scenario targets, e.g. "us-east-1".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region(pub String);

impl Region {
    pub fn new(s: impl Into<String>) -> Self {
        Region(s.into())
    }

    /// Validated constructor: non-empty lowercase alphanumeric plus `-`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let ok = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if ok {
            Ok(Region(s.to_string()))
        } else {
            Err(DomainError::InvalidRegion(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ProvisioningRequest ──────────────────────────────────────────────────────

/// Everything needed to drive one apply/destroy cycle of a configuration
/// directory. Built once per scenario; immutable once the run starts.
///
/// `resource_name` records the primary resource the configuration creates,
/// so the apply step can mint a [`ResourceHandle`] without parsing tool
/// output. The name still has to be passed as an input variable under
/// whatever key the configuration expects (`var()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    pub dir: PathBuf,
    pub region: Region,
    pub resource_name: ResourceName,
    pub vars: BTreeMap<String, String>,
}

impl ProvisioningRequest {
    pub fn new(dir: impl Into<PathBuf>, region: Region, resource_name: ResourceName) -> Self {
        Self {
            dir: dir.into(),
            region,
            resource_name,
            vars: BTreeMap::new(),
        }
    }

    /// Add an input variable, builder style.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Render the variables as `-var key=value` argument pairs, in sorted
    /// key order. Values are passed as separate argv elements, so no shell
    /// quoting is involved.
    pub fn var_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.vars.len() * 2);
        for (k, v) in &self.vars {
            args.push("-var".to_string());
            args.push(format!("{}={}", k, v));
        }
        args
    }

    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle {
            name: self.resource_name.clone(),
            region: self.region.clone(),
        }
    }
}

// ── ResourceHandle ───────────────────────────────────────────────────────────

/// Opaque reference to a provisioned resource, used for control-plane
/// lookups. Owned by the orchestrator; lives no longer than its scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub name: ResourceName,
    pub region: Region,
}

impl ResourceHandle {
    pub fn new(name: ResourceName, region: Region) -> Self {
        Self { name, region }
    }
}
