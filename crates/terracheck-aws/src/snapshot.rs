//! Typed views of control-plane responses. Deserialized straight off the
//! wire; fetched fresh per query and never cached.

use serde::Deserialize;

/// Current state of a provisioned table: status, key schema, encryption.
/// The subset of `DescribeTable` the harness asserts on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableSnapshot {
    pub table_name: String,
    pub table_status: String,
    pub table_arn: Option<String>,
    #[serde(default)]
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(rename = "SSEDescription")]
    pub sse_description: Option<SseDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    /// `HASH` or `RANGE`.
    pub key_type: String,
}

impl KeySchemaElement {
    pub fn hash(attribute: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute.into(),
            key_type: "HASH".into(),
        }
    }

    pub fn range(attribute: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute.into(),
            key_type: "RANGE".into(),
        }
    }
}

/// Server-side encryption descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SseDescription {
    pub status: Option<String>,
    #[serde(rename = "SSEType")]
    pub sse_type: Option<String>,
    #[serde(rename = "KMSMasterKeyArn")]
    pub kms_master_key_arn: Option<String>,
}

/// Time-to-live configuration as reported by `DescribeTimeToLive`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TtlDescription {
    pub attribute_name: Option<String>,
    pub time_to_live_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
