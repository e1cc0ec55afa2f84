/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use ordered_float::NotNan;
use serde_json::json;

use groundwork::alarms::{Alarms, AlarmsOptions, MonitoringFacadeProps};
use groundwork::{
    BillingMode, Error, GlobalSecondaryIndex, LogicalId, ResourceKind, Stack, StackProps,
    StandardTable, StandardTableProps, TableAlarmCategoryOptions, TableAttribute,
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
fn default_table_synthesizes_one_table_one_index_three_alarms() {
    let mut stack = stack();
    let table =
        StandardTable::new(&mut stack, &id("Data"), StandardTableProps::default()).unwrap();
    assert_eq!(table.alarms.get_critical_alarms().len(), 3);
    assert!(table.alarms.get_warning_alarms().is_empty());

    let template = stack.synth().unwrap();
    assert_eq!(template.count_of(ResourceKind::Table), 1);
    assert_eq!(template.count_of(ResourceKind::Alarm), 3);

    let table = template.get(&id("DataDefault")).unwrap();
    assert_eq!(table.properties["BillingMode"], json!("PAY_PER_REQUEST"));
    assert_eq!(
        table.properties["KeySchema"],
        json!([
            { "AttributeName": "Pk", "KeyType": "HASH" },
            { "AttributeName": "Sk", "KeyType": "RANGE" },
        ])
    );
    let indexes = table.properties["GlobalSecondaryIndexes"].as_array().unwrap();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0]["IndexName"], json!("Gs1"));
}

#[test]
fn default_alarms_have_zero_tolerance_for_errors_and_throttles() {
    let mut stack = stack();
    StandardTable::new(&mut stack, &id("Data"), StandardTableProps::default()).unwrap();
    let template = stack.synth().unwrap();
    for alarm in [
        "DataReadThrottledEventsCritical",
        "DataWriteThrottledEventsCritical",
        "DataSystemErrorsCritical",
    ] {
        let alarm = template.get(&id(alarm)).unwrap();
        assert_eq!(alarm.kind, ResourceKind::Alarm);
        assert_eq!(alarm.properties["Threshold"], json!(0.0));
    }
}

#[test]
fn adding_an_index_twice_fails() {
    let mut stack = stack();
    let mut table =
        StandardTable::new(&mut stack, &id("Data"), StandardTableProps::default()).unwrap();
    let result = table.add_global_secondary_index(
        &mut stack,
        GlobalSecondaryIndex {
            index_name: "Gs1".parse().unwrap(),
            partition_key: TableAttribute::string("Other"),
            sort_key: None,
        },
    );
    assert!(matches!(result, Err(Error::DuplicateIndex(_, _))));
}

#[test]
fn additional_indexes_extend_the_table_descriptor() {
    let mut stack = stack();
    let mut table =
        StandardTable::new(&mut stack, &id("Data"), StandardTableProps::default()).unwrap();
    table
        .add_global_secondary_index(
            &mut stack,
            GlobalSecondaryIndex {
                index_name: "Gs2".parse().unwrap(),
                partition_key: TableAttribute::string("Gs2Pk"),
                sort_key: None,
            },
        )
        .unwrap();
    let template = stack.synth().unwrap();
    let table = template.get(&id("DataDefault")).unwrap();
    let indexes = table.properties["GlobalSecondaryIndexes"].as_array().unwrap();
    assert_eq!(indexes.len(), 2);
}

#[test]
fn provisioned_billing_carries_capacity_defaults() {
    let mut stack = stack();
    StandardTable::new(
        &mut stack,
        &id("Data"),
        StandardTableProps {
            billing_mode: Some(BillingMode::Provisioned),
            ..StandardTableProps::default()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let table = template.get(&id("DataDefault")).unwrap();
    assert_eq!(
        table.properties["ProvisionedThroughput"],
        json!({ "ReadCapacityUnits": 5, "WriteCapacityUnits": 5 })
    );
}

#[test]
fn latency_thresholds_create_average_alarms() {
    let mut stack = stack();
    StandardTable::new(
        &mut stack,
        &id("Data"),
        StandardTableProps {
            alarms: AlarmsOptions {
                critical: Some(TableAlarmCategoryOptions {
                    average_query_latency: Some(groundwork::Duration::seconds(2)),
                    ..TableAlarmCategoryOptions::default()
                }),
                ..AlarmsOptions::default()
            },
            ..StandardTableProps::default()
        },
    )
    .unwrap();
    let template = stack.synth().unwrap();
    let alarm = template.get(&id("DataQueryLatencyCritical")).unwrap();
    assert_eq!(alarm.properties["Statistic"], json!("Average"));
    assert_eq!(alarm.properties["Threshold"], json!(2));
    assert_eq!(alarm.properties["Dimensions"][0]["Value"], json!("Query"));
}

#[test]
fn disabled_system_error_alarm_is_omitted() {
    let mut stack = stack();
    let table = StandardTable::new(
        &mut stack,
        &id("Data"),
        StandardTableProps {
            alarms: AlarmsOptions {
                critical: Some(TableAlarmCategoryOptions {
                    max_system_errors: Some(NotNan::new(-1.0).unwrap()),
                    ..TableAlarmCategoryOptions::default()
                }),
                ..AlarmsOptions::default()
            },
            ..StandardTableProps::default()
        },
    )
    .unwrap();
    assert_eq!(table.alarms.get_critical_alarms().len(), 2);
    let template = stack.synth().unwrap();
    assert!(template.get(&id("DataSystemErrorsCritical")).is_none());
}
