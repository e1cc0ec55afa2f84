/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::alarms::{MonitoringFacade, MonitoringFacadeProps};
use crate::error::{Error, Result};
use crate::ids::{LogicalId, StackName};
use crate::tags::StandardTags;
use crate::template::Template;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct StackProps {
    pub name: StackName,
    /// Region the stack deploys into. Left unset, synthesized ARNs carry
    /// the region pseudo parameter.
    #[serde(default)]
    pub region: Option<String>,
    /// Account the stack deploys into. Same fallback as `region`.
    #[serde(default)]
    pub account: Option<String>,
    /// Monitoring entry point shared by all constructs in the stack.
    /// Constructs that create alarms fail without it.
    #[serde(default)]
    pub monitoring: Option<MonitoringFacadeProps>,
    /// Stack-level tags merged into the organization defaults.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// The synthesis scope: owns the template being built, the stack-wide tag
/// set and the optional shared monitoring facade. Constructs receive the
/// stack as an explicit argument; there is no implicit scope discovery.
pub struct Stack {
    name: StackName,
    region: Option<String>,
    account: Option<String>,
    template: Template,
    tags: StandardTags,
    monitoring: Option<MonitoringFacade>,
}

impl Stack {
    pub fn new(props: StackProps) -> Self {
        let monitoring = props
            .monitoring
            .map(|monitoring| MonitoringFacade::new(&props.name, monitoring));
        Self {
            tags: StandardTags::with_defaults(&props.name.to_string(), props.tags),
            name: props.name,
            region: props.region,
            account: props.account,
            template: Template::new(),
            monitoring,
        }
    }

    pub fn name(&self) -> &StackName {
        &self.name
    }

    /// The region to embed in synthesized ARNs, or the pseudo parameter.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or("${AWS::Region}")
    }

    pub fn account(&self) -> &str {
        self.account.as_deref().unwrap_or("${AWS::AccountId}")
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn template_mut(&mut self) -> &mut Template {
        &mut self.template
    }

    pub fn tags(&self) -> &StandardTags {
        &self.tags
    }

    pub fn monitoring(&self) -> Option<&MonitoringFacade> {
        self.monitoring.as_ref()
    }

    /// Template and monitoring facade together, as constructs creating
    /// alarms need both. A missing facade is a hard error naming the
    /// construct that required it.
    pub(crate) fn monitoring_parts(
        &mut self,
        scope: &LogicalId,
    ) -> Result<(&mut Template, &mut MonitoringFacade)> {
        match &mut self.monitoring {
            Some(monitoring) => Ok((&mut self.template, monitoring)),
            None => Err(Error::MissingMonitoringFacade(scope.clone())),
        }
    }

    /// Finalize the stack: synthesize the dashboard, if any widgets were
    /// collected, and hand out the template.
    pub fn synth(mut self) -> Result<Template> {
        if let Some(monitoring) = &self.monitoring {
            monitoring.synthesize_dashboard(&mut self.template)?;
        }
        log::debug!(
            "synthesized stack {} with {} resources",
            self.name,
            self.template.resources().count()
        );
        Ok(self.template)
    }
}
