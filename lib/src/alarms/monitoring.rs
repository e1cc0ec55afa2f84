/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::dashboard::{DashboardFactory, DashboardProps, Widget};
use crate::error::Result;
use crate::ids::{AlarmName, IndexName, LogicalId, MetricField, StackName};
use crate::template::{Resource, ResourceKind, Template};

use super::facade::{AlarmThreshold, Threshold, ThresholdRecord};
use super::options::{AlarmCategory, DashboardPlacement};

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct MonitoringFacadeProps {
    /// Prefix used for generated alarm names. Defaults to the stack name.
    pub alarm_name_prefix: Option<String>,
    /// Dashboard generation. Without this, no dashboard resource is
    /// synthesized.
    pub dashboard: Option<DashboardProps>,
}

/// The resource a set of alarms observes: an alarm-friendly name, the
/// metric namespace and the dimensions identifying the resource within it.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct MonitoredSubject {
    pub name: String,
    pub namespace: String,
    pub dimensions: BTreeMap<String, String>,
}

impl MonitoredSubject {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        dimensions: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            dimensions,
        }
    }
}

/// An alarm registered with the facade, retrievable by category.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct AlarmRecord {
    pub name: AlarmName,
    pub logical_id: LogicalId,
    pub category: AlarmCategory,
    pub field: MetricField,
    pub value: Threshold,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Statistic {
    Average,
    Sum,
    Maximum,
    P50,
    P90,
    P99,
}

impl Statistic {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Sum => "Sum",
            Self::Maximum => "Maximum",
            Self::P50 => "p50",
            Self::P90 => "p90",
            Self::P99 => "p99",
        }
    }
}

/// One alarm kind of a monitored resource: a unique label (used in names
/// and logical ids), the observed metric and the resolved record.
struct Slot {
    label: &'static str,
    metric: &'static str,
    statistic: Statistic,
    namespace: Option<&'static str>,
    operation: Option<&'static str>,
    record: Option<ThresholdRecord>,
}

impl Slot {
    fn new(
        label: &'static str,
        metric: &'static str,
        statistic: Statistic,
        record: Option<ThresholdRecord>,
    ) -> Self {
        Self {
            label,
            metric,
            statistic,
            namespace: None,
            operation: None,
            record,
        }
    }

    fn with_namespace(mut self, namespace: &'static str) -> Self {
        self.namespace = Some(namespace);
        self
    }

    fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = Some(operation);
        self
    }
}

pub struct QueueMonitoring {
    pub queue: MonitoredSubject,
    pub dead_letter_queue: Option<MonitoredSubject>,
    pub min_size: Option<ThresholdRecord>,
    pub max_size: Option<ThresholdRecord>,
    pub max_age: Option<ThresholdRecord>,
    pub max_time_to_drain: Option<ThresholdRecord>,
    pub min_incoming: Option<ThresholdRecord>,
    pub max_incoming: Option<ThresholdRecord>,
    pub dead_letter_max_size: Option<ThresholdRecord>,
    pub dead_letter_max_age: Option<ThresholdRecord>,
    pub dead_letter_max_incoming: Option<ThresholdRecord>,
    pub placement: DashboardPlacement,
}

pub struct TableMonitoring {
    pub table: MonitoredSubject,
    pub consumed_read_capacity: Option<ThresholdRecord>,
    pub consumed_write_capacity: Option<ThresholdRecord>,
    pub read_throttled_events: Option<ThresholdRecord>,
    pub write_throttled_events: Option<ThresholdRecord>,
    pub system_errors: Option<ThresholdRecord>,
    pub get_records_latency: Option<ThresholdRecord>,
    pub query_latency: Option<ThresholdRecord>,
    pub scan_latency: Option<ThresholdRecord>,
    pub put_item_latency: Option<ThresholdRecord>,
    pub get_item_latency: Option<ThresholdRecord>,
    pub update_item_latency: Option<ThresholdRecord>,
    pub delete_item_latency: Option<ThresholdRecord>,
    pub batch_get_item_latency: Option<ThresholdRecord>,
    pub batch_write_item_latency: Option<ThresholdRecord>,
    pub placement: DashboardPlacement,
}

pub struct TableIndexMonitoring {
    pub table: MonitoredSubject,
    pub index_name: IndexName,
    pub placement: DashboardPlacement,
}

pub struct FunctionMonitoring {
    pub function: MonitoredSubject,
    pub p50_latency: Option<ThresholdRecord>,
    pub p90_latency: Option<ThresholdRecord>,
    pub p99_latency: Option<ThresholdRecord>,
    pub fault_count: Option<ThresholdRecord>,
    pub fault_rate: Option<ThresholdRecord>,
    pub min_tps: Option<ThresholdRecord>,
    pub max_tps: Option<ThresholdRecord>,
    pub throttles_count: Option<ThresholdRecord>,
    pub throttles_rate: Option<ThresholdRecord>,
    pub concurrent_executions: Option<ThresholdRecord>,
    pub iterator_age: Option<ThresholdRecord>,
    pub max_cpu_time: Option<ThresholdRecord>,
    pub p90_cpu_time: Option<ThresholdRecord>,
    pub avg_cpu_time: Option<ThresholdRecord>,
    pub max_memory: Option<ThresholdRecord>,
    pub p90_memory: Option<ThresholdRecord>,
    pub avg_memory: Option<ThresholdRecord>,
    pub placement: DashboardPlacement,
}

pub struct LogPatternMonitoring {
    pub log_group: String,
    pub pattern: String,
    pub metric_name: String,
    pub category: AlarmCategory,
    pub threshold: Threshold,
    pub evaluation_periods: u32,
    pub datapoints_to_alarm: u32,
}

pub struct BucketMonitoring {
    pub bucket: MonitoredSubject,
    pub placement: DashboardPlacement,
}

/// Shared entry point through which all alarms of a deployment unit are
/// registered. Synthesizes one alarm resource per resolved metric and
/// category, collects dashboard widgets and keeps the registry of created
/// alarms keyed by category.
pub struct MonitoringFacade {
    prefix: String,
    dashboard: Option<DashboardFactory>,
    created: BTreeMap<AlarmCategory, Vec<AlarmRecord>>,
}

impl MonitoringFacade {
    pub fn new(stack_name: &StackName, props: MonitoringFacadeProps) -> Self {
        Self {
            prefix: props
                .alarm_name_prefix
                .unwrap_or_else(|| stack_name.to_string()),
            dashboard: props
                .dashboard
                .map(|props| DashboardFactory::new(stack_name, props)),
            created: BTreeMap::new(),
        }
    }

    pub fn alarm_name_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn created_alarms(&self, category: AlarmCategory) -> &[AlarmRecord] {
        self.created
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn created(&self) -> &BTreeMap<AlarmCategory, Vec<AlarmRecord>> {
        &self.created
    }

    pub fn dashboard(&self) -> Option<&DashboardFactory> {
        self.dashboard.as_ref()
    }

    pub(crate) fn synthesize_dashboard(&self, template: &mut Template) -> Result<()> {
        match &self.dashboard {
            Some(dashboard) if !dashboard.is_empty() => dashboard.synthesize(template),
            _ => Ok(()),
        }
    }

    pub fn monitor_queue(
        &mut self,
        template: &mut Template,
        scope: &LogicalId,
        props: QueueMonitoring,
    ) -> Result<BTreeMap<AlarmCategory, Vec<AlarmName>>> {
        self.add_metric_widget(props.placement, &props.queue);
        let mut created = self.monitor_slots(
            template,
            scope,
            &props.queue,
            vec![
                Slot::new(
                    "MinSize",
                    "ApproximateNumberOfMessagesVisible",
                    Statistic::Maximum,
                    props.min_size,
                ),
                Slot::new(
                    "MaxSize",
                    "ApproximateNumberOfMessagesVisible",
                    Statistic::Maximum,
                    props.max_size,
                ),
                Slot::new(
                    "MaxAge",
                    "ApproximateAgeOfOldestMessage",
                    Statistic::Maximum,
                    props.max_age,
                ),
                Slot::new(
                    "MaxTimeToDrain",
                    "TimeToDrain",
                    Statistic::Maximum,
                    props.max_time_to_drain,
                ),
                Slot::new(
                    "MinIncoming",
                    "NumberOfMessagesSent",
                    Statistic::Sum,
                    props.min_incoming,
                ),
                Slot::new(
                    "MaxIncoming",
                    "NumberOfMessagesSent",
                    Statistic::Sum,
                    props.max_incoming,
                ),
            ],
        )?;
        match &props.dead_letter_queue {
            Some(dead_letter_queue) => {
                self.add_metric_widget(props.placement, dead_letter_queue);
                let dead_letter = self.monitor_slots(
                    template,
                    scope,
                    dead_letter_queue,
                    vec![
                        Slot::new(
                            "DeadLetterMaxSize",
                            "ApproximateNumberOfMessagesVisible",
                            Statistic::Maximum,
                            props.dead_letter_max_size,
                        ),
                        Slot::new(
                            "DeadLetterMaxAge",
                            "ApproximateAgeOfOldestMessage",
                            Statistic::Maximum,
                            props.dead_letter_max_age,
                        ),
                        Slot::new(
                            "DeadLetterMaxIncoming",
                            "NumberOfMessagesSent",
                            Statistic::Sum,
                            props.dead_letter_max_incoming,
                        ),
                    ],
                )?;
                for (category, names) in dead_letter {
                    created.entry(category).or_default().extend(names);
                }
            }
            None => {
                if props.dead_letter_max_size.is_some()
                    || props.dead_letter_max_age.is_some()
                    || props.dead_letter_max_incoming.is_some()
                {
                    log::warn!(
                        "dead-letter alarm thresholds configured for {scope} \
			 without a dead-letter queue"
                    );
                }
            }
        }
        Ok(created)
    }

    pub fn monitor_table(
        &mut self,
        template: &mut Template,
        scope: &LogicalId,
        props: TableMonitoring,
    ) -> Result<BTreeMap<AlarmCategory, Vec<AlarmName>>> {
        self.add_metric_widget(props.placement, &props.table);
        self.monitor_slots(
            template,
            scope,
            &props.table,
            vec![
                Slot::new(
                    "ConsumedReadCapacity",
                    "ConsumedReadCapacityUnits",
                    Statistic::Sum,
                    props.consumed_read_capacity,
                ),
                Slot::new(
                    "ConsumedWriteCapacity",
                    "ConsumedWriteCapacityUnits",
                    Statistic::Sum,
                    props.consumed_write_capacity,
                ),
                Slot::new(
                    "ReadThrottledEvents",
                    "ReadThrottleEvents",
                    Statistic::Sum,
                    props.read_throttled_events,
                ),
                Slot::new(
                    "WriteThrottledEvents",
                    "WriteThrottleEvents",
                    Statistic::Sum,
                    props.write_throttled_events,
                ),
                Slot::new(
                    "SystemErrors",
                    "SystemErrors",
                    Statistic::Sum,
                    props.system_errors,
                ),
                Slot::new(
                    "GetRecordsLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.get_records_latency,
                )
                .with_operation("GetRecords"),
                Slot::new(
                    "QueryLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.query_latency,
                )
                .with_operation("Query"),
                Slot::new(
                    "ScanLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.scan_latency,
                )
                .with_operation("Scan"),
                Slot::new(
                    "PutItemLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.put_item_latency,
                )
                .with_operation("PutItem"),
                Slot::new(
                    "GetItemLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.get_item_latency,
                )
                .with_operation("GetItem"),
                Slot::new(
                    "UpdateItemLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.update_item_latency,
                )
                .with_operation("UpdateItem"),
                Slot::new(
                    "DeleteItemLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.delete_item_latency,
                )
                .with_operation("DeleteItem"),
                Slot::new(
                    "BatchGetItemLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.batch_get_item_latency,
                )
                .with_operation("BatchGetItem"),
                Slot::new(
                    "BatchWriteItemLatency",
                    "SuccessfulRequestLatency",
                    Statistic::Average,
                    props.batch_write_item_latency,
                )
                .with_operation("BatchWriteItem"),
            ],
        )
    }

    /// Index monitoring is dashboards only; no alarms are defined for
    /// secondary indexes.
    pub fn monitor_table_index(&mut self, props: TableIndexMonitoring) {
        if props.placement.any() {
            if let Some(dashboard) = &mut self.dashboard {
                let mut dimensions = props.table.dimensions.clone();
                dimensions.insert(
                    "GlobalSecondaryIndexName".to_string(),
                    props.index_name.to_string(),
                );
                dashboard.add_widget(Widget::Metric {
                    title: format!("{} {}", props.table.name, props.index_name),
                    namespace: props.table.namespace.clone(),
                    dimensions,
                });
            }
        }
    }

    pub fn monitor_function(
        &mut self,
        template: &mut Template,
        scope: &LogicalId,
        props: FunctionMonitoring,
    ) -> Result<BTreeMap<AlarmCategory, Vec<AlarmName>>> {
        const INSIGHTS: &str = "LambdaInsights";
        self.add_metric_widget(props.placement, &props.function);
        self.monitor_slots(
            template,
            scope,
            &props.function,
            vec![
                Slot::new("LatencyP50", "Duration", Statistic::P50, props.p50_latency),
                Slot::new("LatencyP90", "Duration", Statistic::P90, props.p90_latency),
                Slot::new("LatencyP99", "Duration", Statistic::P99, props.p99_latency),
                Slot::new("FaultCount", "Errors", Statistic::Sum, props.fault_count),
                Slot::new("FaultRate", "Errors", Statistic::Average, props.fault_rate),
                Slot::new("LowTps", "Invocations", Statistic::Sum, props.min_tps),
                Slot::new("HighTps", "Invocations", Statistic::Sum, props.max_tps),
                Slot::new(
                    "ThrottlesCount",
                    "Throttles",
                    Statistic::Sum,
                    props.throttles_count,
                ),
                Slot::new(
                    "ThrottlesRate",
                    "Throttles",
                    Statistic::Average,
                    props.throttles_rate,
                ),
                Slot::new(
                    "ConcurrentExecutions",
                    "ConcurrentExecutions",
                    Statistic::Maximum,
                    props.concurrent_executions,
                ),
                Slot::new(
                    "IteratorAge",
                    "IteratorAge",
                    Statistic::Maximum,
                    props.iterator_age,
                ),
                Slot::new(
                    "MaxCpuTime",
                    "cpu_total_time",
                    Statistic::Maximum,
                    props.max_cpu_time,
                )
                .with_namespace(INSIGHTS),
                Slot::new(
                    "P90CpuTime",
                    "cpu_total_time",
                    Statistic::P90,
                    props.p90_cpu_time,
                )
                .with_namespace(INSIGHTS),
                Slot::new(
                    "AvgCpuTime",
                    "cpu_total_time",
                    Statistic::Average,
                    props.avg_cpu_time,
                )
                .with_namespace(INSIGHTS),
                Slot::new(
                    "MaxMemory",
                    "memory_utilization",
                    Statistic::Maximum,
                    props.max_memory,
                )
                .with_namespace(INSIGHTS),
                Slot::new(
                    "P90Memory",
                    "memory_utilization",
                    Statistic::P90,
                    props.p90_memory,
                )
                .with_namespace(INSIGHTS),
                Slot::new(
                    "AvgMemory",
                    "memory_utilization",
                    Statistic::Average,
                    props.avg_memory,
                )
                .with_namespace(INSIGHTS),
            ],
        )
    }

    /// A single alarm on the count of log events matching a pattern.
    pub fn monitor_log_pattern(
        &mut self,
        template: &mut Template,
        scope: &LogicalId,
        props: LogPatternMonitoring,
    ) -> Result<AlarmName> {
        let id = scope.child(&props.metric_name)?;
        let name = AlarmName::new(format!("{}-{}", self.prefix, props.metric_name));
        template.add_resource(
            id.clone(),
            Resource::new(
                ResourceKind::Alarm,
                json!({
                    "AlarmName": name,
                    "Namespace": "LogMetrics",
                    "MetricName": props.metric_name,
                    "Statistic": Statistic::Sum.as_str(),
                    "Dimensions": [{ "Name": "LogGroupName", "Value": props.log_group }],
                    "Pattern": props.pattern,
                    "Threshold": props.threshold.to_property(),
                    "ComparisonOperator": "GreaterThanOrEqualToThreshold",
                    "EvaluationPeriods": props.evaluation_periods,
                    "DatapointsToAlarm": props.datapoints_to_alarm,
                    "ActionsEnabled": true,
                }),
            ),
        )?;
        self.created
            .entry(props.category)
            .or_default()
            .push(AlarmRecord {
                name: name.clone(),
                logical_id: id,
                category: props.category,
                field: MetricField::new_static("maxLogCount"),
                value: props.threshold,
            });
        Ok(name)
    }

    /// A log-insights widget on the dashboard; no alarm is created.
    pub fn monitor_log_insights(&mut self, log_group: &str, pattern: &str) {
        if let Some(dashboard) = &mut self.dashboard {
            dashboard.add_widget(Widget::LogInsights {
                title: format!("Monitor {log_group}"),
                log_group: log_group.to_string(),
                pattern: pattern.to_string(),
            });
        }
    }

    /// Bucket monitoring is dashboards only.
    pub fn monitor_bucket(&mut self, props: BucketMonitoring) {
        self.add_metric_widget(props.placement, &props.bucket);
    }

    fn add_metric_widget(&mut self, placement: DashboardPlacement, subject: &MonitoredSubject) {
        if placement.any() {
            if let Some(dashboard) = &mut self.dashboard {
                dashboard.add_widget(Widget::Metric {
                    title: subject.name.clone(),
                    namespace: subject.namespace.clone(),
                    dimensions: subject.dimensions.clone(),
                });
            }
        }
    }

    fn monitor_slots(
        &mut self,
        template: &mut Template,
        scope: &LogicalId,
        subject: &MonitoredSubject,
        slots: Vec<Slot>,
    ) -> Result<BTreeMap<AlarmCategory, Vec<AlarmName>>> {
        let mut created = BTreeMap::new();
        for slot in slots {
            let Some(record) = &slot.record else {
                continue;
            };
            for (category, threshold) in record {
                let name = self.put_alarm(template, scope, subject, &slot, *category, threshold)?;
                created
                    .entry(*category)
                    .or_insert_with(Vec::new)
                    .push(name);
            }
        }
        Ok(created)
    }

    fn put_alarm(
        &mut self,
        template: &mut Template,
        scope: &LogicalId,
        subject: &MonitoredSubject,
        slot: &Slot,
        category: AlarmCategory,
        threshold: &AlarmThreshold,
    ) -> Result<AlarmName> {
        let id = scope.child(&format!("{}{category}", slot.label))?;
        let name = AlarmName::new(format!(
            "{}-{}-{}-{category}",
            self.prefix, subject.name, slot.label
        ));
        let mut dimensions = subject.dimensions.clone();
        if let Some(operation) = slot.operation {
            dimensions.insert("Operation".to_string(), operation.to_string());
        }
        let comparison = if threshold.field.is_lower_bound() {
            "LessThanThreshold"
        } else {
            "GreaterThanThreshold"
        };
        template.add_resource(
            id.clone(),
            Resource::new(
                ResourceKind::Alarm,
                json!({
                    "AlarmName": name,
                    "Namespace": slot.namespace.unwrap_or(&subject.namespace),
                    "MetricName": slot.metric,
                    "Statistic": slot.statistic.as_str(),
                    "Dimensions": dimensions
                        .iter()
                        .map(|(key, value)| json!({ "Name": key, "Value": value }))
                        .collect::<Vec<_>>(),
                    "Threshold": threshold.value.to_property(),
                    "ComparisonOperator": comparison,
                    "EvaluationPeriods": 1,
                    "ActionsEnabled": threshold.actions_enabled,
                    "AlarmActions": threshold
                        .action_override
                        .iter()
                        .map(|action| action.target())
                        .collect::<Vec<_>>(),
                }),
            ),
        )?;
        self.created.entry(category).or_default().push(AlarmRecord {
            name: name.clone(),
            logical_id: id,
            category,
            field: threshold.field.clone(),
            value: threshold.value,
        });
        Ok(name)
    }
}
