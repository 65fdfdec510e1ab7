use std::collections::HashSet;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::types::{ProvisioningRequest, Region, ResourceName};
use crate::unique::{unique_id, unique_name};

// ── unique identifiers ───────────────────────────────────────────────────────

#[test]
fn unique_ids_do_not_collide() {
    let ids: HashSet<String> = (0..1000).map(|_| unique_id()).collect();
    assert_eq!(ids.len(), 1000, "generated ids must be distinct");
}

#[test]
fn unique_id_is_alphanumeric_and_short() {
    let id = unique_id();
    assert_eq!(id.len(), 6);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn unique_name_keeps_prefix() {
    let name = unique_name("terracheck-dynamodb");
    assert!(name.as_str().starts_with("terracheck-dynamodb-"));
    assert_eq!(name.as_str().len(), "terracheck-dynamodb-".len() + 6);
}

// ── validated constructors ───────────────────────────────────────────────────

#[test]
fn resource_name_parse_accepts_table_names() {
    assert!(ResourceName::parse("terracheck-example-table-abc123").is_ok());
    assert!(ResourceName::parse("a_b.c-d").is_ok());
}

#[test]
fn resource_name_parse_rejects_bad_input() {
    assert!(ResourceName::parse("ab").is_err(), "too short");
    assert!(ResourceName::parse("has space").is_err());
    assert!(ResourceName::parse(&"x".repeat(256)).is_err(), "too long");
}

#[test]
fn region_parse_rejects_uppercase() {
    assert!(Region::parse("us-east-1").is_ok());
    assert!(Region::parse("").is_err());
    assert!(Region::parse("US-EAST-1").is_err());
}

// ── provisioning request ─────────────────────────────────────────────────────

#[test]
fn var_args_are_sorted_pairs() {
    let req = ProvisioningRequest::new(
        "/tmp/example",
        Region::new("us-east-1"),
        ResourceName::new("tbl"),
    )
    .var("table_name", "tbl")
    .var("region", "us-east-1");

    assert_eq!(
        req.var_args(),
        vec!["-var", "region=us-east-1", "-var", "table_name=tbl"]
    );
}

#[test]
fn handle_carries_name_and_region() {
    let req = ProvisioningRequest::new(
        "/tmp/example",
        Region::new("eu-west-1"),
        ResourceName::new("tbl-x"),
    );
    let handle = req.handle();
    assert_eq!(handle.name.as_str(), "tbl-x");
    assert_eq!(handle.region.as_str(), "eu-west-1");
}

// ── retry policy ─────────────────────────────────────────────────────────────

#[test]
fn retry_delay_doubles_and_caps() {
    let policy = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(10),
    };
    assert_eq!(policy.delay(1), Duration::from_secs(2));
    assert_eq!(policy.delay(2), Duration::from_secs(4));
    assert_eq!(policy.delay(3), Duration::from_secs(8));
    assert_eq!(policy.delay(4), Duration::from_secs(10));
    assert_eq!(policy.delay(10), Duration::from_secs(10));
}
