/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

mod actions;
mod facade;
mod monitoring;
mod options;

#[cfg(test)]
mod test;

pub use actions::{combine_actions, AlarmAction};
pub use facade::{AlarmFacade, AlarmFacadeSet, AlarmThreshold, Threshold, ThresholdRecord};
pub use monitoring::{
    AlarmRecord, BucketMonitoring, FunctionMonitoring, LogPatternMonitoring, MonitoredSubject,
    MonitoringFacade, MonitoringFacadeProps, QueueMonitoring, TableIndexMonitoring,
    TableMonitoring,
};
pub use options::{AlarmCategory, Alarms, AlarmsCategoryOptions, AlarmsOptions, DashboardPlacement};
