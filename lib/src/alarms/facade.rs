/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use ordered_float::NotNan;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::duration::Duration;
use crate::error::{Error, Result};
use crate::ids::{ActionRef, MetricField, TopicRef};

use super::actions::{combine_actions, AlarmAction};
use super::options::{AlarmCategory, AlarmsCategoryOptions, AlarmsOptions};

/// An alarm threshold: either a plain count or a time value. A count of
/// `-1` (or below) and a zero time are the documented sentinels for
/// disabling the alarm.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[serde(untagged)]
pub enum Threshold {
    Count(NotNan<f64>),
    Time(Duration),
}

impl Threshold {
    pub fn count(value: f64) -> Result<Self> {
        NotNan::new(value)
            .map(Self::Count)
            .map_err(|_| Error::InvalidThreshold(value))
    }

    pub const fn time(value: Duration) -> Self {
        Self::Time(value)
    }

    /// Whether this value denotes an active alarm. Counts must exceed
    /// `-1`, times must be non-zero; anything else is a disable sentinel.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Count(value) => value.into_inner() > -1.0,
            Self::Time(duration) => duration.as_seconds() > 0,
        }
    }

    /// The numeric value set on the synthesized alarm resource. Times are
    /// expressed in seconds.
    pub fn to_property(&self) -> Value {
        match self {
            Self::Count(value) => Value::from(value.into_inner()),
            Self::Time(duration) => Value::from(duration.as_seconds()),
        }
    }
}

impl From<NotNan<f64>> for Threshold {
    fn from(value: NotNan<f64>) -> Self {
        Self::Count(value)
    }
}

impl From<Duration> for Threshold {
    fn from(value: Duration) -> Self {
        Self::Time(value)
    }
}

/// The resolved threshold descriptor for one metric and category, handed
/// to the monitoring integration to materialize an alarm resource.
#[derive(PartialEq, Clone, Debug)]
pub struct AlarmThreshold {
    pub field: MetricField,
    pub value: Threshold,
    pub actions_enabled: bool,
    pub action_override: Vec<AlarmAction>,
}

/// Serialized with the metric field as the key of the threshold value, the
/// shape the monitoring integration consumes.
impl Serialize for AlarmThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.serialize_entry("actionsEnabled", &self.actions_enabled)?;
        map.serialize_entry("actionOverride", &self.action_override)?;
        map.end()
    }
}

/// Threshold descriptors by category for a single metric. A category key
/// is present only when a threshold was resolved for it.
pub type ThresholdRecord = BTreeMap<AlarmCategory, AlarmThreshold>;

/// Resolves a single metric's threshold into a descriptor, or nothing.
pub struct AlarmFacade {
    field: MetricField,
    threshold: Option<Threshold>,
    default_threshold: Option<Threshold>,
    actions: Vec<AlarmAction>,
}

impl AlarmFacade {
    pub fn new(
        field: MetricField,
        threshold: Option<Threshold>,
        default_threshold: Option<Threshold>,
        actions: &[ActionRef],
        topics: &[TopicRef],
    ) -> Self {
        Self {
            field,
            threshold,
            default_threshold,
            actions: combine_actions(actions, topics),
        }
    }

    pub fn actions(&self) -> &[AlarmAction] {
        &self.actions
    }

    /// The explicit threshold wins over the default. No value, or a
    /// disable sentinel, yields nothing.
    pub fn resolve(self) -> Option<AlarmThreshold> {
        let value = self.threshold.or(self.default_threshold)?;
        value.is_enabled().then(|| AlarmThreshold {
            field: self.field,
            value,
            actions_enabled: true,
            action_override: self.actions,
        })
    }
}

/// Builds the per-category record for one metric from the category option
/// bags of an [AlarmsOptions].
pub struct AlarmFacadeSet<'a, C> {
    critical: Option<&'a C>,
    warning: Option<&'a C>,
    record: ThresholdRecord,
}

impl<'a, C: AlarmsCategoryOptions> AlarmFacadeSet<'a, C> {
    pub fn new(options: &'a AlarmsOptions<C>) -> Self {
        Self {
            critical: options.critical.as_ref(),
            warning: options.warning.as_ref(),
            record: ThresholdRecord::new(),
        }
    }

    /// Add one category's alarm for the metric. The threshold accessor
    /// reads the explicit value from the category's option bag.
    pub fn add_alarm(
        mut self,
        category: AlarmCategory,
        field: MetricField,
        threshold: impl FnOnce(&C) -> Option<Threshold>,
        default_threshold: Option<Threshold>,
    ) -> Self {
        let options = match category {
            AlarmCategory::Critical => self.critical,
            AlarmCategory::Warning => self.warning,
        };
        let resolved = AlarmFacade::new(
            field,
            options.and_then(threshold),
            default_threshold,
            options.map(AlarmsCategoryOptions::notify_actions).unwrap_or_default(),
            options.map(AlarmsCategoryOptions::notify_topics).unwrap_or_default(),
        )
        .resolve();
        if let Some(resolved) = resolved {
            self.record.insert(category, resolved);
        }
        self
    }

    pub fn add_critical_alarm(
        self,
        field: MetricField,
        threshold: impl FnOnce(&C) -> Option<Threshold>,
        default_threshold: Option<Threshold>,
    ) -> Self {
        self.add_alarm(AlarmCategory::Critical, field, threshold, default_threshold)
    }

    pub fn add_warning_alarm(
        self,
        field: MetricField,
        threshold: impl FnOnce(&C) -> Option<Threshold>,
        default_threshold: Option<Threshold>,
    ) -> Self {
        self.add_alarm(AlarmCategory::Warning, field, threshold, default_threshold)
    }

    /// Add both categories for the metric, with independent defaults. This
    /// is the common case.
    pub fn add_alarms(
        self,
        field: MetricField,
        threshold: impl Fn(&C) -> Option<Threshold>,
        default_critical: Option<Threshold>,
        default_warning: Option<Threshold>,
    ) -> Self {
        self.add_critical_alarm(field.clone(), &threshold, default_critical)
            .add_warning_alarm(field, &threshold, default_warning)
    }

    /// The accumulated record, or nothing if no alarm was resolved, so
    /// callers can omit the monitoring call entirely.
    pub fn to_record(self) -> Option<ThresholdRecord> {
        (!self.record.is_empty()).then_some(self.record)
    }
}
