/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

pub mod alarms;

pub(crate) mod bucket;
pub(crate) mod dashboard;
pub(crate) mod domain;
pub(crate) mod duration;
pub(crate) mod error;
pub(crate) mod function;
pub(crate) mod ids;
pub(crate) mod queue;
pub(crate) mod stack;
pub(crate) mod table;
pub(crate) mod tags;
pub(crate) mod template;

pub use error::{Error, Result};
pub use ids::{
    ActionRef, AlarmName, IndexName, KeyRef, LogicalId, MetricField, StackName, TopicRef,
};

pub use bucket::{
    BucketAlarmCategoryOptions, BucketAlarms, BucketAlarmsProps, DestinationBucketOptions,
    ReplicationRole, ReplicationRoleProps, StandardBucket, StandardBucketProps,
};
pub use dashboard::{DashboardFactory, DashboardProps, Widget};
pub use domain::{StandardDomainName, StandardHttpApi, StandardHttpApiProps};
pub use duration::Duration;
pub use function::{
    FunctionAlarmCategoryOptions, FunctionAlarms, FunctionAlarmsProps, StandardFunction,
    StandardFunctionProps, DEFAULT_CRITICAL_LOG_PATTERN, DEFAULT_LOG_INSIGHTS_PATTERN,
    DEFAULT_WARNING_LOG_PATTERN,
};
pub use queue::{
    QueueAlarmCategoryOptions, QueueAlarms, QueueAlarmsProps, StandardDeadLetterQueue,
    StandardDeadLetterQueueProps, StandardQueue, StandardQueueProps,
};
pub use stack::{Stack, StackProps};
pub use table::{
    AttributeType, BillingMode, GlobalSecondaryIndex, StandardTable, StandardTableProps,
    TableAlarmCategoryOptions, TableAlarms, TableAlarmsProps, TableAttribute,
};
pub use tags::StandardTags;
pub use template::{Resource, ResourceKind, Template};
