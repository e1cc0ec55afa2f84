/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use ordered_float::NotNan;
use serde_json::json;

use groundwork::{
    LogicalId, ResourceKind, Stack, StackProps, StandardDeadLetterQueue,
    StandardDeadLetterQueueProps,
};

fn stack() -> Stack {
    // The standalone dead-letter queue does not require a monitoring
    // facade; its alarm is fixed.
    Stack::new(StackProps {
        name: "test-stack".parse().unwrap(),
        region: None,
        account: None,
        monitoring: None,
        tags: BTreeMap::new(),
    })
}

fn id(s: &str) -> LogicalId {
    s.parse().unwrap()
}

#[test]
fn default_dead_letter_queue_alarms_on_the_first_message() {
    let mut stack = stack();
    let queue = StandardDeadLetterQueue::new(
        &mut stack,
        &id("Failed"),
        StandardDeadLetterQueueProps::default(),
    )
    .unwrap();
    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Queue), 1);
    assert_eq!(template.count_of(ResourceKind::Alarm), 1);

    let alarm = template.get(&queue.alarm_id).unwrap();
    assert_eq!(alarm.properties["Threshold"], json!(1.0));
    assert_eq!(
        alarm.properties["ComparisonOperator"],
        json!("GreaterThanOrEqualToThreshold")
    );
    assert_eq!(alarm.properties["TreatMissingData"], json!("ignore"));
    assert_eq!(alarm.properties["EvaluationPeriods"], json!(1));
}

#[test]
fn retention_defaults_to_fourteen_days() {
    let mut stack = stack();
    StandardDeadLetterQueue::new(
        &mut stack,
        &id("Failed"),
        StandardDeadLetterQueueProps::default(),
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let queue = template.get(&id("FailedDefault")).unwrap();
    assert_eq!(queue.properties["MessageRetentionPeriod"], json!(1209600));
    assert_eq!(queue.properties["ReceiveMessageWaitTimeSeconds"], json!(20));
}

#[test]
fn alarm_threshold_is_configurable() {
    let mut stack = stack();
    StandardDeadLetterQueue::new(
        &mut stack,
        &id("Failed"),
        StandardDeadLetterQueueProps {
            alarm_threshold: Some(NotNan::new(5.0).unwrap()),
            ..StandardDeadLetterQueueProps::default()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let alarm = template.get(&id("FailedAlarm")).unwrap();
    assert_eq!(alarm.properties["Threshold"], json!(5.0));
}
