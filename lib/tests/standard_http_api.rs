/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde_json::json;

use groundwork::{
    Error, LogicalId, ResourceKind, Stack, StackProps, StandardHttpApi, StandardHttpApiProps,
};

fn stack() -> Stack {
    Stack::new(StackProps {
        name: "test-stack".parse().unwrap(),
        region: Some("us-west-2".to_string()),
        account: None,
        monitoring: None,
        tags: BTreeMap::new(),
    })
}

fn id(s: &str) -> LogicalId {
    s.parse().unwrap()
}

fn props() -> StandardHttpApiProps {
    StandardHttpApiProps {
        domain_prefix: "api".to_string(),
        domain_zone: "example.com".to_string(),
        api_name: None,
        create_record: None,
        record_weight: None,
        record_latency: None,
        evaluate_target_health: None,
    }
}

#[test]
fn default_api_synthesizes_certificate_domain_record_and_api() {
    let mut stack = stack();
    let api = StandardHttpApi::new(&mut stack, &id("Api"), props()).unwrap();
    assert!(api.record_id.is_some());
    assert_eq!(api.domain_name.domain(), "api.example.com");

    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Certificate), 1);
    assert_eq!(template.count_of(ResourceKind::DomainName), 1);
    assert_eq!(template.count_of(ResourceKind::RecordSet), 1);
    assert_eq!(template.count_of(ResourceKind::HttpApi), 1);

    let record = template.get(&id("ApiRecord")).unwrap();
    assert_eq!(record.properties["Name"], json!("api.example.com"));
    assert_eq!(record.properties["HostedZoneName"], json!("example.com."));
    assert!(record.properties.get("Weight").is_none());
    assert!(record.properties.get("Region").is_none());
}

#[test]
fn weighted_records_carry_weight_and_set_identifier() {
    let mut stack = stack();
    StandardHttpApi::new(
        &mut stack,
        &id("Api"),
        StandardHttpApiProps {
            record_weight: Some(10),
            ..props()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let record = template.get(&id("ApiRecord")).unwrap();
    assert_eq!(record.properties["Weight"], json!(10));
    assert_eq!(record.properties["SetIdentifier"], json!("test-stack"));
    assert_eq!(record.properties["EvaluateTargetHealth"], json!(true));
}

#[test]
fn latency_records_carry_the_stack_region() {
    let mut stack = stack();
    StandardHttpApi::new(
        &mut stack,
        &id("Api"),
        StandardHttpApiProps {
            record_latency: Some(true),
            ..props()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let record = template.get(&id("ApiRecord")).unwrap();
    assert_eq!(record.properties["Region"], json!("us-west-2"));
    assert!(record.properties.get("Weight").is_none());
}

#[test]
fn weight_and_latency_together_fail_synthesis() {
    let mut stack = stack();
    let result = StandardHttpApi::new(
        &mut stack,
        &id("Api"),
        StandardHttpApiProps {
            record_weight: Some(10),
            record_latency: Some(true),
            ..props()
        },
    );
    assert!(matches!(result, Err(Error::ConflictingRecordRouting(_))));
    // Fail-fast: nothing was synthesized.
    assert!(stack.template().is_empty());
}

#[test]
fn record_creation_can_be_disabled() {
    let mut stack = stack();
    let api = StandardHttpApi::new(
        &mut stack,
        &id("Api"),
        StandardHttpApiProps {
            create_record: Some(false),
            ..props()
        },
    )
    .unwrap();
    assert!(api.record_id.is_none());
    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::RecordSet), 0);
    assert_eq!(template.count_of(ResourceKind::Certificate), 1);
}
