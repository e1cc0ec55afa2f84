/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::{Error, Result};

/// Identifies a synthesized resource inside a template. Logical ids are
/// strictly alphanumeric so that generated names survive every naming
/// context they end up in (templates, alarm names, dashboard widgets).
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug,
)]
pub struct LogicalId(String);

impl LogicalId {
    /// Append a suffix, yielding the logical id of a child resource.
    pub fn child(&self, suffix: &str) -> Result<Self> {
        Self::from_str(&format!("{}{}", self.0, suffix))
    }
}

impl Display for LogicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogicalId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        (!s.is_empty()
            && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && s.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| Self(s.to_string()))
        .ok_or_else(|| Error::InvalidLogicalId(s.to_string()))
    }
}

#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug,
)]
pub struct StackName(String);

impl Display for StackName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StackName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        (!s.is_empty()
            && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-'))
        .then(|| Self(s.to_string()))
        .ok_or_else(|| Error::InvalidStackName(s.to_string()))
    }
}

/// A field of a threshold descriptor (e.g. `maxAgeInSeconds`). Field names
/// double as map keys in the emitted record, so they carry the same
/// character restrictions as logical ids.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug,
)]
pub struct MetricField(String);

impl MetricField {
    /// Known-good field names from the built-in catalogs.
    pub(crate) fn new_static(s: &'static str) -> Self {
        Self(s.to_string())
    }

    /// Whether this field expresses a lower bound (alarms fire when the
    /// observed value drops below the threshold).
    pub fn is_lower_bound(&self) -> bool {
        self.0.starts_with("min")
    }
}

impl Display for MetricField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MetricField {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        (!s.is_empty()
            && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && s.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| Self(s.to_string()))
        .ok_or_else(|| Error::InvalidMetricField(s.to_string()))
    }
}

#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug,
)]
pub struct IndexName(String);

impl Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IndexName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        (!s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
        .then(|| Self(s.to_string()))
        .ok_or_else(|| Error::InvalidIndexName(s.to_string()))
    }
}

/// The name under which an alarm resource is registered with the
/// monitoring facade.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct AlarmName(String);

impl AlarmName {
    pub fn new(name: String) -> Self {
        Self(name)
    }
}

impl Display for AlarmName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a notification topic, by ARN or exported name.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct TopicRef(String);

impl TopicRef {
    pub fn new(topic: String) -> Self {
        Self(topic)
    }
}

impl Display for TopicRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a pre-built alarm action.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct ActionRef(String);

impl ActionRef {
    pub fn new(action: String) -> Self {
        Self(action)
    }
}

impl Display for ActionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a customer-managed encryption key.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct KeyRef(String);

impl KeyRef {
    pub fn new(key: String) -> Self {
        Self(key)
    }
}

impl Display for KeyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
