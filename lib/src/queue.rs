/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::alarms::{
    AlarmCategory, Alarms, AlarmsCategoryOptions, AlarmsOptions, MonitoredSubject,
    QueueMonitoring, Threshold,
};
use crate::duration::Duration;
use crate::error::Result;
use crate::ids::{ActionRef, AlarmName, KeyRef, LogicalId, MetricField, TopicRef};
use crate::stack::Stack;
use crate::template::{Resource, ResourceKind, Template};

/// Thresholds for one severity category of queue alarms.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct QueueAlarmCategoryOptions {
    /// Minimum number of messages visible.
    pub min_size: Option<NotNan<f64>>,
    /// Maximum number of messages visible.
    pub max_size: Option<NotNan<f64>>,
    /// Maximum approximate age of the oldest message in the queue.
    /// Defaults to 15 for the critical alarm.
    pub max_age_in_seconds: Option<NotNan<f64>>,
    /// Maximum time to drain the queue.
    pub max_time_to_drain: Option<Duration>,
    /// Minimum number of incoming messages.
    pub min_incoming: Option<NotNan<f64>>,
    /// Maximum number of incoming messages.
    pub max_incoming: Option<NotNan<f64>>,
    /// Maximum number of visible messages in the dead-letter queue.
    /// Defaults to 0 for the critical alarm.
    pub dead_letter_queue_max_size: Option<NotNan<f64>>,
    /// Maximum age of the oldest message in the dead-letter queue.
    pub dead_letter_queue_max_age_in_seconds: Option<NotNan<f64>>,
    /// Maximum number of incoming messages in the dead-letter queue.
    pub dead_letter_queue_max_incoming: Option<NotNan<f64>>,
    pub notify_topics: Vec<TopicRef>,
    pub notify_actions: Vec<ActionRef>,
}

impl AlarmsCategoryOptions for QueueAlarmCategoryOptions {
    fn notify_topics(&self) -> &[TopicRef] {
        &self.notify_topics
    }

    fn notify_actions(&self) -> &[ActionRef] {
        &self.notify_actions
    }
}

pub struct QueueAlarmsProps {
    pub queue: MonitoredSubject,
    pub dead_letter_queue: Option<MonitoredSubject>,
    pub options: AlarmsOptions<QueueAlarmCategoryOptions>,
}

/// Registers the queue metric catalog with the monitoring facade.
pub struct QueueAlarms {
    created: BTreeMap<AlarmCategory, Vec<AlarmName>>,
}

impl QueueAlarms {
    pub fn new(stack: &mut Stack, scope: &LogicalId, props: QueueAlarmsProps) -> Result<Self> {
        let (template, monitoring) = stack.monitoring_parts(scope)?;
        let options = &props.options;
        let has_dead_letter_queue = props.dead_letter_queue.is_some();
        let default_max_age = Threshold::count(15.0)?;
        let dead_letter_zero_tolerance = Threshold::count(0.0)?;
        let monitoring_props = QueueMonitoring {
            min_size: options.to_record(
                MetricField::new_static("minMessageCount"),
                |o| o.min_size.map(Threshold::from),
                None,
                None,
            ),
            max_size: options.to_record(
                MetricField::new_static("maxMessageCount"),
                |o| o.max_size.map(Threshold::from),
                None,
                None,
            ),
            max_age: options.to_record(
                MetricField::new_static("maxAgeInSeconds"),
                |o| o.max_age_in_seconds.map(Threshold::from),
                Some(default_max_age),
                None,
            ),
            max_time_to_drain: options.to_record(
                MetricField::new_static("maxTimeToDrain"),
                |o| o.max_time_to_drain.map(Threshold::from),
                None,
                None,
            ),
            min_incoming: options.to_record(
                MetricField::new_static("minIncomingMessagesCount"),
                |o| o.min_incoming.map(Threshold::from),
                None,
                None,
            ),
            max_incoming: options.to_record(
                MetricField::new_static("maxIncomingMessagesCount"),
                |o| o.max_incoming.map(Threshold::from),
                None,
                None,
            ),
            dead_letter_max_size: has_dead_letter_queue
                .then(|| {
                    options.to_record(
                        MetricField::new_static("maxMessageCount"),
                        |o| o.dead_letter_queue_max_size.map(Threshold::from),
                        Some(dead_letter_zero_tolerance),
                        None,
                    )
                })
                .flatten(),
            dead_letter_max_age: options.to_record(
                MetricField::new_static("maxAgeInSeconds"),
                |o| o.dead_letter_queue_max_age_in_seconds.map(Threshold::from),
                None,
                None,
            ),
            dead_letter_max_incoming: options.to_record(
                MetricField::new_static("maxIncomingMessagesCount"),
                |o| o.dead_letter_queue_max_incoming.map(Threshold::from),
                None,
                None,
            ),
            queue: props.queue,
            dead_letter_queue: props.dead_letter_queue,
            placement: options.placement(),
        };
        let created = monitoring.monitor_queue(template, scope, monitoring_props)?;
        Ok(Self { created })
    }
}

impl Alarms for QueueAlarms {
    fn created_alarms(&self) -> &BTreeMap<AlarmCategory, Vec<AlarmName>> {
        &self.created
    }
}

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct StandardQueueProps {
    /// How long messages are retained. Defaults to 14 days.
    pub retention_period: Option<Duration>,
    /// How long a consumed message stays invisible to other consumers.
    /// Defaults to 30 seconds.
    pub visibility_timeout: Option<Duration>,
    /// Customer-managed encryption key. Without one, the provider-managed
    /// key is used.
    pub encryption_key: Option<KeyRef>,
    /// How long a data key is reused before a new one is requested.
    /// Defaults to 15 minutes. Only relevant with a customer-managed key.
    pub data_key_reuse: Option<Duration>,
    /// How many receives a message survives before it moves to the
    /// dead-letter queue. Set to -1 to disable the dead-letter queue.
    /// Defaults to 3.
    pub max_receive_count: Option<i64>,
    pub fifo: Option<bool>,
    pub alarms: AlarmsOptions<QueueAlarmCategoryOptions>,
    pub suppress_tagging: Option<bool>,
}

/// A queue with organization defaults: managed encryption, 14-day
/// retention, a dead-letter queue with zero-tolerance alarms, and the
/// standard monitoring catalog.
pub struct StandardQueue {
    pub queue_id: LogicalId,
    pub dead_letter_queue_id: Option<LogicalId>,
    pub alarms: QueueAlarms,
}

impl StandardQueue {
    pub const DEFAULT_MAX_RECEIVE_COUNT: i64 = 3;
    pub const DEFAULT_RETENTION_PERIOD: Duration = Duration::days(14);

    pub fn new(stack: &mut Stack, id: &LogicalId, props: StandardQueueProps) -> Result<Self> {
        let max_receive_count = props
            .max_receive_count
            .unwrap_or(Self::DEFAULT_MAX_RECEIVE_COUNT);
        let data_key_reuse = props.data_key_reuse.unwrap_or(Duration::minutes(15));
        let tags = (!props.suppress_tagging.unwrap_or(false))
            .then(|| stack.tags().to_property());

        let dead_letter_queue_id = (max_receive_count > 0)
            .then(|| id.child("Dlq"))
            .transpose()?;
        if let Some(dead_letter_queue_id) = &dead_letter_queue_id {
            let properties = queue_properties(
                &props.encryption_key,
                data_key_reuse,
                Self::DEFAULT_RETENTION_PERIOD,
                None,
                props.fifo.unwrap_or(false),
                tags.clone(),
            );
            stack.template_mut().add_resource(
                dead_letter_queue_id.clone(),
                Resource::new(ResourceKind::Queue, properties),
            )?;
        }

        let queue_id = id.child("Default")?;
        let mut properties = queue_properties(
            &props.encryption_key,
            data_key_reuse,
            props
                .retention_period
                .unwrap_or(Self::DEFAULT_RETENTION_PERIOD),
            Some(props.visibility_timeout.unwrap_or(Duration::seconds(30))),
            props.fifo.unwrap_or(false),
            tags,
        );
        if let Some(dead_letter_queue_id) = &dead_letter_queue_id {
            properties["RedrivePolicy"] = json!({
                "deadLetterTargetArn": { "Fn::GetAtt": [dead_letter_queue_id, "Arn"] },
                "maxReceiveCount": max_receive_count,
            });
        }
        stack
            .template_mut()
            .add_resource(queue_id.clone(), Resource::new(ResourceKind::Queue, properties))?;

        let alarms = QueueAlarms::new(
            stack,
            id,
            QueueAlarmsProps {
                queue: queue_subject(&props.alarms, &queue_id),
                dead_letter_queue: dead_letter_queue_id
                    .as_ref()
                    .map(|dead_letter_queue_id| queue_subject(&props.alarms, dead_letter_queue_id)),
                options: props.alarms,
            },
        )?;

        Ok(Self {
            queue_id,
            dead_letter_queue_id,
            alarms,
        })
    }
}

fn queue_subject(
    options: &AlarmsOptions<QueueAlarmCategoryOptions>,
    queue_id: &LogicalId,
) -> MonitoredSubject {
    MonitoredSubject::new(
        options
            .alarm_name_prefix
            .clone()
            .unwrap_or_else(|| queue_id.to_string()),
        "AWS/SQS",
        BTreeMap::from([("QueueName".to_string(), queue_id.to_string())]),
    )
}

fn queue_properties(
    encryption_key: &Option<KeyRef>,
    data_key_reuse: Duration,
    retention_period: Duration,
    visibility_timeout: Option<Duration>,
    fifo: bool,
    tags: Option<Value>,
) -> Value {
    let mut properties = match encryption_key {
        Some(key) => json!({
            "KmsMasterKeyId": key,
            "KmsDataKeyReusePeriodSeconds": data_key_reuse.as_seconds(),
        }),
        None => json!({ "KmsMasterKeyId": "alias/aws/sqs" }),
    };
    properties["MessageRetentionPeriod"] = retention_period.as_seconds().into();
    if let Some(visibility_timeout) = visibility_timeout {
        properties["VisibilityTimeout"] = visibility_timeout.as_seconds().into();
    }
    if fifo {
        properties["FifoQueue"] = true.into();
    }
    if let Some(tags) = tags {
        properties["Tags"] = tags;
    }
    properties
}

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct StandardDeadLetterQueueProps {
    /// How long messages are retained. Defaults to 14 days.
    pub retention_period: Option<Duration>,
    pub encryption_key: Option<KeyRef>,
    pub data_key_reuse: Option<Duration>,
    /// How long a receive call waits for messages. Defaults to 20
    /// seconds.
    pub receive_message_wait_time: Option<Duration>,
    pub fifo: Option<bool>,
    /// Number of visible messages that trips the alarm. Defaults to 1.
    pub alarm_threshold: Option<NotNan<f64>>,
    pub suppress_tagging: Option<bool>,
}

/// A standalone dead-letter queue with a direct alarm on any visible
/// message. Unlike the facade-driven catalogs, the alarm here is fixed and
/// does not require a monitoring facade on the stack.
pub struct StandardDeadLetterQueue {
    pub queue_id: LogicalId,
    pub alarm_id: LogicalId,
}

impl StandardDeadLetterQueue {
    pub fn new(
        stack: &mut Stack,
        id: &LogicalId,
        props: StandardDeadLetterQueueProps,
    ) -> Result<Self> {
        let tags = (!props.suppress_tagging.unwrap_or(false))
            .then(|| stack.tags().to_property());
        let queue_id = id.child("Default")?;
        let mut properties = queue_properties(
            &props.encryption_key,
            props.data_key_reuse.unwrap_or(Duration::minutes(5)),
            props.retention_period.unwrap_or(Duration::days(14)),
            None,
            props.fifo.unwrap_or(false),
            tags,
        );
        properties["ReceiveMessageWaitTimeSeconds"] = props
            .receive_message_wait_time
            .unwrap_or(Duration::seconds(20))
            .as_seconds()
            .into();
        stack
            .template_mut()
            .add_resource(queue_id.clone(), Resource::new(ResourceKind::Queue, properties))?;

        let alarm_id = id.child("Alarm")?;
        let threshold = props
            .alarm_threshold
            .map(Threshold::from)
            .unwrap_or(Threshold::count(1.0)?);
        add_visible_messages_alarm(stack.template_mut(), &alarm_id, &queue_id, threshold)?;
        Ok(Self { queue_id, alarm_id })
    }
}

fn add_visible_messages_alarm(
    template: &mut Template,
    alarm_id: &LogicalId,
    queue_id: &LogicalId,
    threshold: Threshold,
) -> Result<()> {
    template.add_resource(
        alarm_id.clone(),
        Resource::new(
            ResourceKind::Alarm,
            json!({
                "Namespace": "AWS/SQS",
                "MetricName": "ApproximateNumberOfMessagesVisible",
                "Statistic": "Maximum",
                "Dimensions": [{ "Name": "QueueName", "Value": queue_id }],
                "Threshold": threshold.to_property(),
                "ComparisonOperator": "GreaterThanOrEqualToThreshold",
                "EvaluationPeriods": 1,
                "TreatMissingData": "ignore",
            }),
        ),
    )
}
