/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use ordered_float::NotNan;
use serde_json::json;

use groundwork::alarms::{Alarms, AlarmsOptions, MonitoringFacadeProps};
use groundwork::{
    Error, LogicalId, QueueAlarmCategoryOptions, ResourceKind, Stack, StackProps, StandardQueue,
    StandardQueueProps,
};

fn stack() -> Stack {
    Stack::new(StackProps {
        name: "test-stack".parse().unwrap(),
        region: None,
        account: None,
        monitoring: Some(MonitoringFacadeProps::default()),
        tags: BTreeMap::new(),
    })
}

fn id(s: &str) -> LogicalId {
    s.parse().unwrap()
}

#[test]
fn default_queue_carries_dead_letter_queue_and_default_alarms() {
    let mut stack = stack();
    let queue = StandardQueue::new(&mut stack, &id("Work"), StandardQueueProps::default()).unwrap();
    assert!(queue.dead_letter_queue_id.is_some());
    assert_eq!(queue.alarms.get_critical_alarms().len(), 2);
    assert!(queue.alarms.get_warning_alarms().is_empty());

    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Queue), 2);
    assert_eq!(template.count_of(ResourceKind::Alarm), 2);

    let main = template.get(&id("WorkDefault")).unwrap();
    assert_eq!(main.properties["MessageRetentionPeriod"], json!(1209600));
    assert_eq!(main.properties["VisibilityTimeout"], json!(30));
    assert_eq!(
        main.properties["RedrivePolicy"]["maxReceiveCount"],
        json!(3)
    );
}

#[test]
fn dead_letter_queue_defaults_to_zero_tolerance() {
    let mut stack = stack();
    StandardQueue::new(&mut stack, &id("Work"), StandardQueueProps::default()).unwrap();
    let template = stack.synth().unwrap();
    let alarm = template.get(&id("WorkDeadLetterMaxSizeCritical")).unwrap();
    assert_eq!(alarm.kind, ResourceKind::Alarm);
    assert_eq!(alarm.properties["Threshold"], json!(0.0));
    assert_eq!(
        alarm.properties["MetricName"],
        json!("ApproximateNumberOfMessagesVisible")
    );
    assert_eq!(
        alarm.properties["Dimensions"][0]["Value"],
        json!("WorkDlq")
    );
}

#[test]
fn negative_receive_count_disables_the_dead_letter_queue() {
    let mut stack = stack();
    let queue = StandardQueue::new(
        &mut stack,
        &id("Work"),
        StandardQueueProps {
            max_receive_count: Some(-1),
            ..StandardQueueProps::default()
        },
    )
    .unwrap();
    assert!(queue.dead_letter_queue_id.is_none());
    assert_eq!(queue.alarms.get_critical_alarms().len(), 1);

    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Queue), 1);
    assert_eq!(template.count_of(ResourceKind::Alarm), 1);
    let main = template.get(&id("WorkDefault")).unwrap();
    assert!(main.properties.get("RedrivePolicy").is_none());
}

#[test]
fn explicit_age_threshold_replaces_the_default() {
    let mut stack = stack();
    StandardQueue::new(
        &mut stack,
        &id("Work"),
        StandardQueueProps {
            alarms: AlarmsOptions {
                critical: Some(QueueAlarmCategoryOptions {
                    max_age_in_seconds: Some(NotNan::new(30.0).unwrap()),
                    ..QueueAlarmCategoryOptions::default()
                }),
                ..AlarmsOptions::default()
            },
            ..StandardQueueProps::default()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let alarm = template.get(&id("WorkMaxAgeCritical")).unwrap();
    assert_eq!(alarm.properties["Threshold"], json!(30.0));
}

#[test]
fn warning_thresholds_create_their_own_alarms() {
    let mut stack = stack();
    let queue = StandardQueue::new(
        &mut stack,
        &id("Work"),
        StandardQueueProps {
            alarms: AlarmsOptions {
                warning: Some(QueueAlarmCategoryOptions {
                    max_size: Some(NotNan::new(1000.0).unwrap()),
                    ..QueueAlarmCategoryOptions::default()
                }),
                ..AlarmsOptions::default()
            },
            ..StandardQueueProps::default()
        },
    )
    .unwrap();
    assert_eq!(queue.alarms.get_warning_alarms().len(), 1);
    let template = stack.synth().unwrap();
    let alarm = template.get(&id("WorkMaxSizeWarning")).unwrap();
    assert_eq!(alarm.properties["Threshold"], json!(1000.0));
    assert_eq!(
        alarm.properties["ComparisonOperator"],
        json!("GreaterThanThreshold")
    );
}

#[test]
fn custom_encryption_key_switches_the_queue_to_kms() {
    let mut stack = stack();
    StandardQueue::new(
        &mut stack,
        &id("Work"),
        StandardQueueProps {
            encryption_key: Some(groundwork::KeyRef::new("alias/custom".to_string())),
            ..StandardQueueProps::default()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let main = template.get(&id("WorkDefault")).unwrap();
    assert_eq!(main.properties["KmsMasterKeyId"], json!("alias/custom"));
    assert_eq!(main.properties["KmsDataKeyReusePeriodSeconds"], json!(900));
}

#[test]
fn queue_alarms_require_a_monitoring_facade() {
    let mut stack = Stack::new(StackProps {
        name: "test-stack".parse().unwrap(),
        region: None,
        account: None,
        monitoring: None,
        tags: BTreeMap::new(),
    });
    let result = StandardQueue::new(&mut stack, &id("Work"), StandardQueueProps::default());
    assert!(matches!(result, Err(Error::MissingMonitoringFacade(_))));
}
