/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde_json::json;

use groundwork::alarms::MonitoringFacadeProps;
use groundwork::{
    DashboardProps, DestinationBucketOptions, Error, LogicalId, ReplicationRole,
    ReplicationRoleProps, ResourceKind, Stack, StackProps, StandardBucket, StandardBucketProps,
};

fn stack() -> Stack {
    Stack::new(StackProps {
        name: "test-stack".parse().unwrap(),
        region: Some("eu-west-1".to_string()),
        account: Some("111122223333".to_string()),
        monitoring: Some(MonitoringFacadeProps::default()),
        tags: BTreeMap::new(),
    })
}

fn id(s: &str) -> LogicalId {
    s.parse().unwrap()
}

fn destination(name: &str) -> DestinationBucketOptions {
    DestinationBucketOptions {
        bucket_name: name.to_string(),
        region: None,
        account: None,
    }
}

#[test]
fn default_bucket_blocks_public_access_and_encrypts() {
    let mut stack = stack();
    StandardBucket::new(&mut stack, &id("Media"), StandardBucketProps::default()).unwrap();
    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Bucket), 1);
    assert_eq!(template.count_of(ResourceKind::Alarm), 0);
    let bucket = template.get(&id("MediaDefault")).unwrap();
    assert_eq!(
        bucket.properties["PublicAccessBlockConfiguration"]["BlockPublicAcls"],
        json!(true)
    );
    assert_eq!(
        bucket.properties["BucketEncryption"]["ServerSideEncryptionConfiguration"][0]
            ["ServerSideEncryptionByDefault"]["SSEAlgorithm"],
        json!("AES256")
    );
}

#[test]
fn replication_role_carries_exactly_four_statements() {
    let mut stack = stack();
    ReplicationRole::new(
        &mut stack,
        &id("Replication"),
        ReplicationRoleProps {
            source_bucket_name: "source-bucket".to_string(),
            destination_buckets: vec![destination("dest-bucket")],
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let role = template.get(&id("ReplicationDefault")).unwrap();
    let statements = role.properties["Policies"][0]["PolicyDocument"]["Statement"]
        .as_array()
        .unwrap();
    assert_eq!(statements.len(), 4);
    assert!(statements[0]["Action"]
        .as_array()
        .unwrap()
        .contains(&json!("s3:ListBucket")));
    assert_eq!(
        statements[1]["Action"],
        json!(["s3:Replicate*", "s3:ObjectOwnerOverrideToBucketOwner"])
    );
    assert_eq!(statements[2]["Action"], json!(["kms:Encrypt"]));
    assert_eq!(
        statements[3]["Resource"],
        json!(["arn:aws:kms:eu-west-1:111122223333:key/*"])
    );
}

#[test]
fn replication_requires_a_destination() {
    let mut stack = stack();
    let result = ReplicationRole::new(
        &mut stack,
        &id("Replication"),
        ReplicationRoleProps {
            source_bucket_name: "source-bucket".to_string(),
            destination_buckets: vec![],
        },
    );
    assert!(matches!(
        result,
        Err(Error::MissingReplicationDestination(_))
    ));
}

#[test]
fn replicated_bucket_is_versioned_and_references_the_role() {
    let mut stack = stack();
    let bucket = StandardBucket::new(
        &mut stack,
        &id("Media"),
        StandardBucketProps {
            bucket_name: Some("media-bucket".to_string()),
            replication_destinations: vec![destination("media-replica")],
            ..StandardBucketProps::default()
        },
    )
    .unwrap();
    assert!(bucket.replication_role.is_some());
    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Role), 1);
    let bucket = template.get(&id("MediaDefault")).unwrap();
    assert_eq!(
        bucket.properties["VersioningConfiguration"]["Status"],
        json!("Enabled")
    );
    assert_eq!(
        bucket.properties["ReplicationConfiguration"]["Rules"][0]["Destination"]["Bucket"],
        json!("arn:aws:s3:::media-replica")
    );
}

#[test]
fn bucket_monitoring_lands_on_the_dashboard() {
    let mut stack = Stack::new(StackProps {
        name: "test-stack".parse().unwrap(),
        region: None,
        account: None,
        monitoring: Some(MonitoringFacadeProps {
            alarm_name_prefix: None,
            dashboard: Some(DashboardProps::default()),
        }),
        tags: BTreeMap::new(),
    });
    StandardBucket::new(&mut stack, &id("Media"), StandardBucketProps::default()).unwrap();
    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Dashboard), 1);
    let dashboard = template.get(&id("MonitoringDashboard")).unwrap();
    assert_eq!(
        dashboard.properties["DashboardName"],
        json!("test-stack-dashboard")
    );
}
