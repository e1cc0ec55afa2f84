/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;
use std::str::FromStr;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::alarms::{
    AlarmCategory, Alarms, AlarmsCategoryOptions, AlarmsOptions, DashboardPlacement,
    MonitoredSubject, TableIndexMonitoring, TableMonitoring, Threshold,
};
use crate::duration::Duration;
use crate::error::{Error, Result};
use crate::ids::{ActionRef, AlarmName, IndexName, KeyRef, LogicalId, MetricField, TopicRef};
use crate::stack::Stack;
use crate::template::{Resource, ResourceKind};

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct TableAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl TableAttribute {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: AttributeType::String,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct GlobalSecondaryIndex {
    pub index_name: IndexName,
    pub partition_key: TableAttribute,
    #[serde(default)]
    pub sort_key: Option<TableAttribute>,
}

#[derive(Serialize, Deserialize, Default, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    #[default]
    PayPerRequest,
    Provisioned,
}

impl BillingMode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::PayPerRequest => "PAY_PER_REQUEST",
            Self::Provisioned => "PROVISIONED",
        }
    }
}

/// Thresholds for one severity category of table alarms.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct TableAlarmCategoryOptions {
    pub max_consumed_read_capacity: Option<NotNan<f64>>,
    pub max_consumed_write_capacity: Option<NotNan<f64>>,
    /// Defaults to 0 for the critical alarm.
    pub max_read_throttled_events: Option<NotNan<f64>>,
    /// Defaults to 0 for the critical alarm.
    pub max_write_throttled_events: Option<NotNan<f64>>,
    /// Defaults to 0 for the critical alarm.
    pub max_system_errors: Option<NotNan<f64>>,
    pub average_get_records_latency: Option<Duration>,
    pub average_query_latency: Option<Duration>,
    pub average_scan_latency: Option<Duration>,
    pub average_put_item_latency: Option<Duration>,
    pub average_get_item_latency: Option<Duration>,
    pub average_update_item_latency: Option<Duration>,
    pub average_delete_item_latency: Option<Duration>,
    pub average_batch_get_item_latency: Option<Duration>,
    pub average_batch_write_item_latency: Option<Duration>,
    pub notify_topics: Vec<TopicRef>,
    pub notify_actions: Vec<ActionRef>,
}

impl AlarmsCategoryOptions for TableAlarmCategoryOptions {
    fn notify_topics(&self) -> &[TopicRef] {
        &self.notify_topics
    }

    fn notify_actions(&self) -> &[ActionRef] {
        &self.notify_actions
    }
}

pub struct TableAlarmsProps {
    pub table: MonitoredSubject,
    pub options: AlarmsOptions<TableAlarmCategoryOptions>,
}

/// Registers the table metric catalog with the monitoring facade.
pub struct TableAlarms {
    scope: LogicalId,
    table: MonitoredSubject,
    placement: DashboardPlacement,
    created: BTreeMap<AlarmCategory, Vec<AlarmName>>,
}

impl TableAlarms {
    pub fn new(stack: &mut Stack, scope: &LogicalId, props: TableAlarmsProps) -> Result<Self> {
        let (template, monitoring) = stack.monitoring_parts(scope)?;
        let options = &props.options;
        let zero = Threshold::count(0.0)?;
        let latency = |field: &'static str,
                       threshold: fn(&TableAlarmCategoryOptions) -> Option<Duration>| {
            options.to_record(
                MetricField::new_static(field),
                move |o| threshold(o).map(Threshold::from),
                None,
                None,
            )
        };
        let monitoring_props = TableMonitoring {
            consumed_read_capacity: options.to_record(
                MetricField::new_static("maxConsumedCapacityUnits"),
                |o| o.max_consumed_read_capacity.map(Threshold::from),
                None,
                None,
            ),
            consumed_write_capacity: options.to_record(
                MetricField::new_static("maxConsumedCapacityUnits"),
                |o| o.max_consumed_write_capacity.map(Threshold::from),
                None,
                None,
            ),
            read_throttled_events: options.to_record(
                MetricField::new_static("maxThrottledEventsThreshold"),
                |o| o.max_read_throttled_events.map(Threshold::from),
                Some(zero),
                None,
            ),
            write_throttled_events: options.to_record(
                MetricField::new_static("maxThrottledEventsThreshold"),
                |o| o.max_write_throttled_events.map(Threshold::from),
                Some(zero),
                None,
            ),
            system_errors: options.to_record(
                MetricField::new_static("maxErrorCount"),
                |o| o.max_system_errors.map(Threshold::from),
                Some(zero),
                None,
            ),
            get_records_latency: latency("maxLatency", |o| o.average_get_records_latency),
            query_latency: latency("maxLatency", |o| o.average_query_latency),
            scan_latency: latency("maxLatency", |o| o.average_scan_latency),
            put_item_latency: latency("maxLatency", |o| o.average_put_item_latency),
            get_item_latency: latency("maxLatency", |o| o.average_get_item_latency),
            update_item_latency: latency("maxLatency", |o| o.average_update_item_latency),
            delete_item_latency: latency("maxLatency", |o| o.average_delete_item_latency),
            batch_get_item_latency: latency("maxLatency", |o| o.average_batch_get_item_latency),
            batch_write_item_latency: latency("maxLatency", |o| o.average_batch_write_item_latency),
            table: props.table.clone(),
            placement: options.placement(),
        };
        let placement = options.placement();
        let created = monitoring.monitor_table(template, scope, monitoring_props)?;
        Ok(Self {
            scope: scope.clone(),
            table: props.table,
            placement,
            created,
        })
    }

    /// Register dashboard monitoring for a secondary index.
    pub fn add_index_monitoring(&self, stack: &mut Stack, index_name: IndexName) -> Result<()> {
        let (_, monitoring) = stack.monitoring_parts(&self.scope)?;
        monitoring.monitor_table_index(TableIndexMonitoring {
            table: self.table.clone(),
            index_name,
            placement: self.placement,
        });
        Ok(())
    }
}

impl Alarms for TableAlarms {
    fn created_alarms(&self) -> &BTreeMap<AlarmCategory, Vec<AlarmName>> {
        &self.created
    }
}

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct StandardTableProps {
    /// Partition key. Defaults to a string attribute named `Pk`.
    pub partition_key: Option<TableAttribute>,
    /// Sort key. Defaults to a string attribute named `Sk`.
    pub sort_key: Option<TableAttribute>,
    /// Defaults to pay-per-request.
    pub billing_mode: Option<BillingMode>,
    /// Read capacity when billing is provisioned. Defaults to 5.
    pub read_capacity: Option<u64>,
    /// Write capacity when billing is provisioned. Defaults to 5.
    pub write_capacity: Option<u64>,
    /// Customer-managed encryption key. Without one, provider-managed
    /// encryption applies.
    pub encryption_key: Option<KeyRef>,
    pub point_in_time_recovery: Option<bool>,
    /// Name of the time-to-live attribute.
    pub time_to_live_attribute: Option<String>,
    pub alarms: AlarmsOptions<TableAlarmCategoryOptions>,
    pub suppress_tagging: Option<bool>,
}

/// A table with a defined primary key, a default secondary index and the
/// standard alarm catalog. Intended to fit most development use cases.
pub struct StandardTable {
    pub table_id: LogicalId,
    pub alarms: TableAlarms,
    indexes: Vec<IndexName>,
}

impl StandardTable {
    pub fn new(stack: &mut Stack, id: &LogicalId, props: StandardTableProps) -> Result<Self> {
        let table_id = id.child("Default")?;
        let partition_key = props
            .partition_key
            .clone()
            .unwrap_or_else(|| TableAttribute::string("Pk"));
        let sort_key = props
            .sort_key
            .clone()
            .unwrap_or_else(|| TableAttribute::string("Sk"));
        let billing_mode = props.billing_mode.unwrap_or_default();

        let mut properties = json!({
            "KeySchema": key_schema(&partition_key, Some(&sort_key)),
            "AttributeDefinitions": attribute_definitions(&partition_key, Some(&sort_key)),
            "BillingMode": billing_mode.as_str(),
            "GlobalSecondaryIndexes": [],
        });
        if billing_mode == BillingMode::Provisioned {
            properties["ProvisionedThroughput"] = json!({
                "ReadCapacityUnits": props.read_capacity.unwrap_or(5),
                "WriteCapacityUnits": props.write_capacity.unwrap_or(5),
            });
        }
        match &props.encryption_key {
            Some(key) => {
                properties["SSESpecification"] = json!({
                    "SSEEnabled": true,
                    "SSEType": "KMS",
                    "KMSMasterKeyId": key,
                });
            }
            None => {
                properties["SSESpecification"] = json!({ "SSEEnabled": true });
            }
        }
        if props.point_in_time_recovery.unwrap_or(false) {
            properties["PointInTimeRecoverySpecification"] =
                json!({ "PointInTimeRecoveryEnabled": true });
        }
        if let Some(attribute) = &props.time_to_live_attribute {
            properties["TimeToLiveSpecification"] = json!({
                "AttributeName": attribute,
                "Enabled": true,
            });
        }
        if !props.suppress_tagging.unwrap_or(false) {
            properties["Tags"] = stack.tags().to_property();
        }
        stack
            .template_mut()
            .add_resource(table_id.clone(), Resource::new(ResourceKind::Table, properties))?;

        let alarms = TableAlarms::new(
            stack,
            id,
            TableAlarmsProps {
                table: MonitoredSubject::new(
                    props
                        .alarms
                        .alarm_name_prefix
                        .clone()
                        .unwrap_or_else(|| table_id.to_string()),
                    "AWS/DynamoDB",
                    BTreeMap::from([("TableName".to_string(), table_id.to_string())]),
                ),
                options: props.alarms,
            },
        )?;

        let mut table = Self {
            table_id,
            alarms,
            indexes: Vec::new(),
        };
        table.add_global_secondary_index(
            stack,
            GlobalSecondaryIndex {
                index_name: IndexName::from_str("Gs1")?,
                partition_key: TableAttribute::string("Gs1Pk"),
                sort_key: Some(TableAttribute::string("Gs1Sk")),
            },
        )?;
        Ok(table)
    }

    /// Append a global secondary index to the table and register its
    /// monitoring.
    pub fn add_global_secondary_index(
        &mut self,
        stack: &mut Stack,
        index: GlobalSecondaryIndex,
    ) -> Result<()> {
        if self.indexes.contains(&index.index_name) {
            return Err(Error::DuplicateIndex(
                self.table_id.clone(),
                index.index_name,
            ));
        }
        let resource = stack.template_mut().get_mut(&self.table_id)?;
        let descriptor = json!({
            "IndexName": index.index_name,
            "KeySchema": key_schema(&index.partition_key, index.sort_key.as_ref()),
            "Projection": { "ProjectionType": "ALL" },
        });
        if !resource.properties["GlobalSecondaryIndexes"].is_array() {
            resource.properties["GlobalSecondaryIndexes"] = Value::Array(Vec::new());
        }
        if let Some(indexes) = resource.properties["GlobalSecondaryIndexes"].as_array_mut() {
            indexes.push(descriptor);
        }
        for attribute in std::iter::once(&index.partition_key).chain(index.sort_key.as_ref()) {
            let definition = json!({
                "AttributeName": attribute.name,
                "AttributeType": attribute.attribute_type.as_str(),
            });
            if let Some(definitions) = resource.properties["AttributeDefinitions"].as_array_mut() {
                if !definitions.contains(&definition) {
                    definitions.push(definition);
                }
            }
        }
        self.alarms
            .add_index_monitoring(stack, index.index_name.clone())?;
        self.indexes.push(index.index_name);
        Ok(())
    }
}

fn key_schema(partition_key: &TableAttribute, sort_key: Option<&TableAttribute>) -> Value {
    Value::Array(
        std::iter::once(json!({ "AttributeName": partition_key.name, "KeyType": "HASH" }))
            .chain(sort_key.map(|key| json!({ "AttributeName": key.name, "KeyType": "RANGE" })))
            .collect(),
    )
}

fn attribute_definitions(partition_key: &TableAttribute, sort_key: Option<&TableAttribute>) -> Value {
    Value::Array(
        std::iter::once(partition_key)
            .chain(sort_key)
            .map(|attribute| {
                json!({
                    "AttributeName": attribute.name,
                    "AttributeType": attribute.attribute_type.as_str(),
                })
            })
            .collect(),
    )
}
