/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Identifies resources created by this library in billing and inventory
/// tooling.
pub const AUTOMATION_COMPONENT_TAG: &str = "automation:component-id";
pub const AUTOMATION_URL_TAG: &str = "automation:component-url";
pub const AUTOMATION_VENDOR_TAG: &str = "automation:component-vendor";

pub const COMPONENT_URL: &str = "https://github.com/groundwork-io/Groundwork";
pub const COMPONENT_VENDOR: &str = "Groundwork";

/// Organization-standard tag set applied to every synthesized resource
/// unless a construct suppresses tagging.
#[derive(Serialize, Deserialize, Default, PartialEq, Eq, Clone, Debug)]
pub struct StandardTags(BTreeMap<String, String>);

impl StandardTags {
    /// The automation component tags plus any user-supplied stack tags.
    /// User tags win on key collision.
    pub fn with_defaults(component_id: &str, user: BTreeMap<String, String>) -> Self {
        let mut tags = BTreeMap::from([
            (
                AUTOMATION_COMPONENT_TAG.to_string(),
                component_id.to_string(),
            ),
            (AUTOMATION_URL_TAG.to_string(), COMPONENT_URL.to_string()),
            (
                AUTOMATION_VENDOR_TAG.to_string(),
                COMPONENT_VENDOR.to_string(),
            ),
        ]);
        tags.extend(user);
        Self(tags)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.0.insert(key, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// The `Tags` property value expected by resource descriptors.
    pub fn to_property(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|(key, value)| json!({ "Key": key, "Value": value }))
                .collect(),
        )
    }
}
