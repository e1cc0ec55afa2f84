/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::Error;
use crate::ids::{ActionRef, AlarmName, MetricField, TopicRef};

use super::facade::{AlarmFacadeSet, Threshold, ThresholdRecord};

/// Severity tier of an alarm. The two tiers are configured independently
/// and disambiguate the alarms registered for the same metric.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug,
)]
pub enum AlarmCategory {
    Warning,
    Critical,
}

impl AlarmCategory {
    pub fn categories() -> impl Iterator<Item = Self> {
        [Self::Critical, Self::Warning].into_iter()
    }
}

impl Display for AlarmCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

impl FromStr for AlarmCategory {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "Critical" => Ok(Self::Critical),
            "Warning" => Ok(Self::Warning),
            _ => Err(Error::InvalidAlarmCategory(s.to_string())),
        }
    }
}

/// Access to the notification targets of one category's option bag. Each
/// resource kind supplies its own concrete options struct with named
/// threshold fields next to these targets.
pub trait AlarmsCategoryOptions {
    fn notify_topics(&self) -> &[TopicRef];
    fn notify_actions(&self) -> &[ActionRef];
}

/// Shared alarm configuration: one option bag per category plus settings
/// that apply to every alarm created for the resource.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct AlarmsOptions<C> {
    /// Thresholds for critical alarms.
    pub critical: Option<C>,
    /// Thresholds for warning alarms.
    pub warning: Option<C>,
    /// Add widgets to the alarm dashboard.
    pub add_to_alarm_dashboard: Option<bool>,
    /// Add widgets to the detail dashboard.
    pub add_to_detail_dashboard: Option<bool>,
    /// Add widgets to the summary dashboard.
    pub add_to_summary_dashboard: Option<bool>,
    /// Prefix for generated alarm names. Defaults to the stack name.
    pub alarm_name_prefix: Option<String>,
}

impl<C> Default for AlarmsOptions<C> {
    fn default() -> Self {
        Self {
            critical: None,
            warning: None,
            add_to_alarm_dashboard: None,
            add_to_detail_dashboard: None,
            add_to_summary_dashboard: None,
            alarm_name_prefix: None,
        }
    }
}

impl<C: AlarmsCategoryOptions> AlarmsOptions<C> {
    pub fn category(&self, category: AlarmCategory) -> Option<&C> {
        match category {
            AlarmCategory::Critical => self.critical.as_ref(),
            AlarmCategory::Warning => self.warning.as_ref(),
        }
    }

    pub fn placement(&self) -> DashboardPlacement {
        DashboardPlacement {
            alarm: self.add_to_alarm_dashboard.unwrap_or(true),
            detail: self.add_to_detail_dashboard.unwrap_or(true),
            summary: self.add_to_summary_dashboard.unwrap_or(true),
        }
    }

    /// Resolve both categories of one metric into a threshold record.
    pub fn to_record(
        &self,
        field: MetricField,
        threshold: impl Fn(&C) -> Option<Threshold>,
        default_critical: Option<Threshold>,
        default_warning: Option<Threshold>,
    ) -> Option<ThresholdRecord> {
        AlarmFacadeSet::new(self)
            .add_alarms(field, threshold, default_critical, default_warning)
            .to_record()
    }
}

/// Which dashboards receive widgets for a monitored resource.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub struct DashboardPlacement {
    pub alarm: bool,
    pub detail: bool,
    pub summary: bool,
}

impl Default for DashboardPlacement {
    fn default() -> Self {
        Self {
            alarm: true,
            detail: true,
            summary: true,
        }
    }
}

impl DashboardPlacement {
    pub fn any(&self) -> bool {
        self.alarm || self.detail || self.summary
    }
}

/// Read access to the alarms a resource-specific alarms construct
/// registered with the monitoring facade.
pub trait Alarms {
    fn created_alarms(&self) -> &BTreeMap<AlarmCategory, Vec<AlarmName>>;

    fn get_alarms(&self, category: AlarmCategory) -> &[AlarmName] {
        self.created_alarms()
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn get_critical_alarms(&self) -> &[AlarmName] {
        self.get_alarms(AlarmCategory::Critical)
    }

    fn get_warning_alarms(&self) -> &[AlarmName] {
        self.get_alarms(AlarmCategory::Warning)
    }
}
