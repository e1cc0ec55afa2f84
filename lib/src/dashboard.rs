/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::ids::{LogicalId, StackName};
use crate::template::{Resource, ResourceKind, Template};

#[derive(Serialize, Deserialize, Default, PartialEq, Eq, Clone, Debug)]
#[serde(default)]
pub struct DashboardProps {
    /// Dashboard name. Defaults to `<stack>-dashboard`.
    pub name: Option<String>,
}

/// A dashboard widget collected during monitoring registration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Widget {
    Metric {
        title: String,
        namespace: String,
        dimensions: BTreeMap<String, String>,
    },
    LogInsights {
        title: String,
        log_group: String,
        pattern: String,
    },
}

/// Collects widgets from the monitoring facade and synthesizes a single
/// dashboard resource once the stack is finalized. No factory, no
/// dashboard.
#[derive(PartialEq, Clone, Debug)]
pub struct DashboardFactory {
    name: String,
    widgets: Vec<Widget>,
}

impl DashboardFactory {
    pub fn new(stack_name: &StackName, props: DashboardProps) -> Self {
        Self {
            name: props
                .name
                .unwrap_or_else(|| format!("{stack_name}-dashboard")),
            widgets: Vec::new(),
        }
    }

    pub fn add_widget(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub(crate) fn synthesize(&self, template: &mut Template) -> Result<()> {
        let body = serde_json::to_string(&json!({ "widgets": self.widgets }))
            .map_err(Error::EncodeTemplate)?;
        template.add_resource(
            LogicalId::from_str("MonitoringDashboard")?,
            Resource::new(
                ResourceKind::Dashboard,
                json!({
                    "DashboardName": self.name,
                    "DashboardBody": body,
                }),
            ),
        )
    }
}
