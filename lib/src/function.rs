/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use itertools::Itertools;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::alarms::{
    AlarmCategory, Alarms, AlarmsCategoryOptions, AlarmsOptions, FunctionMonitoring,
    LogPatternMonitoring, MonitoredSubject, Threshold,
};
use crate::duration::Duration;
use crate::error::Result;
use crate::ids::{ActionRef, AlarmName, KeyRef, LogicalId, MetricField, TopicRef};
use crate::stack::Stack;
use crate::template::{Resource, ResourceKind};

/// Default patterns for the log metric alarms and the dashboard log
/// widget.
pub const DEFAULT_CRITICAL_LOG_PATTERN: &str = "ERROR";
pub const DEFAULT_WARNING_LOG_PATTERN: &str = "WARNING";
pub const DEFAULT_LOG_INSIGHTS_PATTERN: &str = "ERROR|WARNING";

/// Thresholds for one severity category of function alarms.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct FunctionAlarmCategoryOptions {
    /// Maximum 50th percentile latency.
    pub p50_latency: Option<Duration>,
    /// Maximum 90th percentile latency.
    pub p90_latency: Option<Duration>,
    /// Maximum 99th percentile latency.
    pub p99_latency: Option<Duration>,
    /// Maximum number of faults. Defaults to 0 for the critical alarm.
    pub max_faults: Option<NotNan<f64>>,
    /// Average number of faults.
    pub avg_faults: Option<NotNan<f64>>,
    /// Minimum transactions.
    pub min_tps: Option<NotNan<f64>>,
    /// Maximum transactions.
    pub max_tps: Option<NotNan<f64>>,
    /// Maximum number of throttles. Defaults to 0 for the critical alarm.
    pub max_throttles: Option<NotNan<f64>>,
    /// Average number of throttles.
    pub avg_throttles: Option<NotNan<f64>>,
    pub max_concurrent_executions: Option<NotNan<f64>>,
    /// How long event source records wait before the function processes
    /// them.
    pub max_iterator_age: Option<NotNan<f64>>,
    pub max_cpu_time: Option<Duration>,
    pub p90_cpu_time: Option<Duration>,
    pub avg_cpu_time: Option<Duration>,
    pub max_memory: Option<NotNan<f64>>,
    pub p90_memory: Option<NotNan<f64>>,
    pub avg_memory: Option<NotNan<f64>>,
    /// Log pattern matched by the log count alarm. Defaults to `ERROR`
    /// for critical, `WARNING` for warning.
    pub metric_log_pattern: Option<String>,
    /// Maximum number of matching log events. Defaults to 1 for the
    /// critical alarm.
    pub max_log_count: Option<NotNan<f64>>,
    /// Defaults to 2.
    pub log_evaluation_periods: Option<u32>,
    /// Defaults to 1.
    pub log_datapoints_to_alarm: Option<u32>,
    /// Log pattern shown on the dashboard.
    pub dashboard_log_pattern: Option<String>,
    pub notify_topics: Vec<TopicRef>,
    pub notify_actions: Vec<ActionRef>,
}

impl AlarmsCategoryOptions for FunctionAlarmCategoryOptions {
    fn notify_topics(&self) -> &[TopicRef] {
        &self.notify_topics
    }

    fn notify_actions(&self) -> &[ActionRef] {
        &self.notify_actions
    }
}

pub struct FunctionAlarmsProps {
    pub function: MonitoredSubject,
    pub log_group: String,
    pub options: AlarmsOptions<FunctionAlarmCategoryOptions>,
}

/// Registers the function metric catalog, the log pattern alarms and the
/// dashboard log widget.
pub struct FunctionAlarms {
    created: BTreeMap<AlarmCategory, Vec<AlarmName>>,
}

impl FunctionAlarms {
    pub fn new(stack: &mut Stack, scope: &LogicalId, props: FunctionAlarmsProps) -> Result<Self> {
        let (template, monitoring) = stack.monitoring_parts(scope)?;
        let options = &props.options;
        let zero = Threshold::count(0.0)?;
        let monitoring_props = FunctionMonitoring {
            p50_latency: options.to_record(
                MetricField::new_static("maxLatency"),
                |o| o.p50_latency.map(Threshold::from),
                None,
                None,
            ),
            p90_latency: options.to_record(
                MetricField::new_static("maxLatency"),
                |o| o.p90_latency.map(Threshold::from),
                None,
                None,
            ),
            p99_latency: options.to_record(
                MetricField::new_static("maxLatency"),
                |o| o.p99_latency.map(Threshold::from),
                None,
                None,
            ),
            fault_count: options.to_record(
                MetricField::new_static("maxErrorCount"),
                |o| o.max_faults.map(Threshold::from),
                Some(zero),
                None,
            ),
            fault_rate: options.to_record(
                MetricField::new_static("maxErrorRate"),
                |o| o.avg_faults.map(Threshold::from),
                None,
                None,
            ),
            min_tps: options.to_record(
                MetricField::new_static("minTps"),
                |o| o.min_tps.map(Threshold::from),
                None,
                None,
            ),
            max_tps: options.to_record(
                MetricField::new_static("maxTps"),
                |o| o.max_tps.map(Threshold::from),
                None,
                None,
            ),
            throttles_count: options.to_record(
                MetricField::new_static("maxErrorCount"),
                |o| o.max_throttles.map(Threshold::from),
                Some(zero),
                None,
            ),
            throttles_rate: options.to_record(
                MetricField::new_static("maxErrorRate"),
                |o| o.avg_throttles.map(Threshold::from),
                None,
                None,
            ),
            concurrent_executions: options.to_record(
                MetricField::new_static("maxRunningTasks"),
                |o| o.max_concurrent_executions.map(Threshold::from),
                None,
                None,
            ),
            iterator_age: options.to_record(
                MetricField::new_static("maxAgeInMillis"),
                |o| o.max_iterator_age.map(Threshold::from),
                None,
                None,
            ),
            max_cpu_time: options.to_record(
                MetricField::new_static("maxDuration"),
                |o| o.max_cpu_time.map(Threshold::from),
                None,
                None,
            ),
            p90_cpu_time: options.to_record(
                MetricField::new_static("maxDuration"),
                |o| o.p90_cpu_time.map(Threshold::from),
                None,
                None,
            ),
            avg_cpu_time: options.to_record(
                MetricField::new_static("maxDuration"),
                |o| o.avg_cpu_time.map(Threshold::from),
                None,
                None,
            ),
            max_memory: options.to_record(
                MetricField::new_static("maxUsagePercent"),
                |o| o.max_memory.map(Threshold::from),
                None,
                None,
            ),
            p90_memory: options.to_record(
                MetricField::new_static("maxUsagePercent"),
                |o| o.p90_memory.map(Threshold::from),
                None,
                None,
            ),
            avg_memory: options.to_record(
                MetricField::new_static("maxUsagePercent"),
                |o| o.avg_memory.map(Threshold::from),
                None,
                None,
            ),
            function: props.function,
            placement: options.placement(),
        };
        let mut created = monitoring.monitor_function(template, scope, monitoring_props)?;

        monitoring.monitor_log_insights(&props.log_group, &dashboard_pattern(options));

        for (category, default_threshold) in [
            (AlarmCategory::Critical, Some(Threshold::count(1.0)?)),
            (AlarmCategory::Warning, None),
        ] {
            let category_options = options.category(category);
            let threshold = category_options
                .and_then(|o| o.max_log_count.map(Threshold::from))
                .or(default_threshold);
            // Log alarms only fire on a strictly positive count.
            let Some(threshold @ Threshold::Count(count)) = threshold else {
                continue;
            };
            if count.into_inner() <= 0.0 {
                continue;
            }
            let name = monitoring.monitor_log_pattern(
                template,
                scope,
                LogPatternMonitoring {
                    log_group: props.log_group.clone(),
                    pattern: category_options
                        .and_then(|o| o.metric_log_pattern.clone())
                        .unwrap_or_else(|| default_log_pattern(category).to_string()),
                    metric_name: format!("{category}LogCount"),
                    category,
                    threshold,
                    evaluation_periods: category_options
                        .and_then(|o| o.log_evaluation_periods)
                        .unwrap_or(2),
                    datapoints_to_alarm: category_options
                        .and_then(|o| o.log_datapoints_to_alarm)
                        .unwrap_or(1),
                },
            )?;
            created.entry(category).or_default().push(name);
        }

        Ok(Self { created })
    }
}

impl Alarms for FunctionAlarms {
    fn created_alarms(&self) -> &BTreeMap<AlarmCategory, Vec<AlarmName>> {
        &self.created
    }
}

fn default_log_pattern(category: AlarmCategory) -> &'static str {
    match category {
        AlarmCategory::Critical => DEFAULT_CRITICAL_LOG_PATTERN,
        AlarmCategory::Warning => DEFAULT_WARNING_LOG_PATTERN,
    }
}

fn dashboard_pattern(options: &AlarmsOptions<FunctionAlarmCategoryOptions>) -> String {
    let overrides = AlarmCategory::categories()
        .filter_map(|category| {
            options
                .category(category)
                .and_then(|o| o.dashboard_log_pattern.as_deref())
        })
        .collect::<Vec<_>>();
    if overrides.is_empty() {
        DEFAULT_LOG_INSIGHTS_PATTERN.to_string()
    } else {
        overrides.into_iter().join("|")
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct StandardFunctionProps {
    /// Entry point of the function.
    pub handler: String,
    /// Defaults to `nodejs20.x`.
    #[serde(default)]
    pub runtime: Option<String>,
    /// Defaults to 768 MiB.
    #[serde(default)]
    pub memory_size: Option<u64>,
    /// Defaults to 30 seconds.
    #[serde(default)]
    pub timeout: Option<Duration>,
    /// Defaults to `arm64`.
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Customer-managed key for environment encryption.
    #[serde(default)]
    pub encryption_key: Option<KeyRef>,
    /// Log retention. Defaults to 30 days.
    #[serde(default)]
    pub log_retention: Option<Duration>,
    #[serde(default)]
    pub alarms: AlarmsOptions<FunctionAlarmCategoryOptions>,
    #[serde(default)]
    pub suppress_tagging: Option<bool>,
}

/// A function with a dedicated log group, organization defaults and the
/// standard alarm catalog.
pub struct StandardFunction {
    pub function_id: LogicalId,
    pub log_group_id: LogicalId,
    pub alarms: FunctionAlarms,
}

impl StandardFunction {
    pub fn new(stack: &mut Stack, id: &LogicalId, props: StandardFunctionProps) -> Result<Self> {
        let function_id = id.child("Default")?;
        let log_group_id = id.child("LogGroup")?;
        let log_group = format!("/aws/lambda/{function_id}");
        let tags = (!props.suppress_tagging.unwrap_or(false))
            .then(|| stack.tags().to_property());

        let mut log_properties = json!({
            "LogGroupName": log_group,
            "RetentionInDays":
                props.log_retention.unwrap_or(Duration::days(30)).as_seconds() / 86400,
        });
        if let Some(tags) = &tags {
            log_properties["Tags"] = tags.clone();
        }
        stack.template_mut().add_resource(
            log_group_id.clone(),
            Resource::new(ResourceKind::LogGroup, log_properties),
        )?;

        let mut properties = json!({
            "Handler": props.handler,
            "Runtime": props.runtime.as_deref().unwrap_or("nodejs20.x"),
            "MemorySize": props.memory_size.unwrap_or(768),
            "Timeout": props.timeout.unwrap_or(Duration::seconds(30)).as_seconds(),
            "Architectures": [props.architecture.as_deref().unwrap_or("arm64")],
            "LoggingConfig": { "LogGroup": log_group },
        });
        if !props.environment.is_empty() {
            properties["Environment"] = json!({ "Variables": props.environment });
        }
        if let Some(key) = &props.encryption_key {
            properties["KmsKeyArn"] = json!(key);
        }
        if let Some(tags) = tags {
            properties["Tags"] = tags;
        }
        stack.template_mut().add_resource(
            function_id.clone(),
            Resource::new(ResourceKind::Function, properties),
        )?;

        let alarms = FunctionAlarms::new(
            stack,
            id,
            FunctionAlarmsProps {
                function: MonitoredSubject::new(
                    props
                        .alarms
                        .alarm_name_prefix
                        .clone()
                        .unwrap_or_else(|| function_id.to_string()),
                    "AWS/Lambda",
                    BTreeMap::from([("FunctionName".to_string(), function_id.to_string())]),
                ),
                log_group,
                options: props.alarms,
            },
        )?;

        Ok(Self {
            function_id,
            log_group_id,
            alarms,
        })
    }
}
