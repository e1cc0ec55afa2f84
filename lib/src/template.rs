/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::{Error, Result};
use crate::ids::LogicalId;

/// The resource kinds this library synthesizes. The canonical type string
/// is what ends up in the emitted template and what tests count on.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug,
)]
pub enum ResourceKind {
    Queue,
    Table,
    Function,
    LogGroup,
    Bucket,
    Alarm,
    Dashboard,
    Role,
    RecordSet,
    DomainName,
    HttpApi,
    Certificate,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => "AWS::SQS::Queue",
            Self::Table => "AWS::DynamoDB::Table",
            Self::Function => "AWS::Lambda::Function",
            Self::LogGroup => "AWS::Logs::LogGroup",
            Self::Bucket => "AWS::S3::Bucket",
            Self::Alarm => "AWS::CloudWatch::Alarm",
            Self::Dashboard => "AWS::CloudWatch::Dashboard",
            Self::Role => "AWS::IAM::Role",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::DomainName => "AWS::ApiGatewayV2::DomainName",
            Self::HttpApi => "AWS::ApiGatewayV2::Api",
            Self::Certificate => "AWS::CertificateManager::Certificate",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        [
            Self::Queue,
            Self::Table,
            Self::Function,
            Self::LogGroup,
            Self::Bucket,
            Self::Alarm,
            Self::Dashboard,
            Self::Role,
            Self::RecordSet,
            Self::DomainName,
            Self::HttpApi,
            Self::Certificate,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .ok_or_else(|| Error::InvalidResourceKind(s.to_string()))
    }
}

/// A single synthesized resource descriptor.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: ResourceKind,
    #[serde(rename = "Properties")]
    pub properties: Value,
}

impl Resource {
    pub fn new(kind: ResourceKind, properties: Value) -> Self {
        Self { kind, properties }
    }
}

/// The synthesized deployment template: an ordered map of logical ids to
/// resource descriptors. This is the output boundary of the library; the
/// template compiler consuming it lives elsewhere.
#[derive(Default, PartialEq, Debug)]
pub struct Template {
    resources: BTreeMap<LogicalId, Resource>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Logical ids are unique per template; a
    /// collision aborts synthesis.
    pub fn add_resource(&mut self, id: LogicalId, resource: Resource) -> Result<()> {
        match self.resources.entry(id) {
            std::collections::btree_map::Entry::Occupied(entry) => {
                Err(Error::DuplicateLogicalId(entry.key().clone()))
            }
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(resource);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Mutable access for constructs that amend their own resources after
    /// creation (e.g. appending a secondary index).
    pub(crate) fn get_mut(&mut self, id: &LogicalId) -> Result<&mut Resource> {
        self.resources
            .get_mut(id)
            .ok_or_else(|| Error::MissingResource(id.clone()))
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter()
    }

    pub fn count_of(&self, kind: ResourceKind) -> usize {
        self.resources
            .values()
            .filter(|resource| resource.kind == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::EncodeTemplate)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("Resources", &self.resources)?;
        map.end()
    }
}
