/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::ids::LogicalId;
use crate::stack::Stack;
use crate::template::{Resource, ResourceKind};

/// A domain name with its certificate, ready to front an API.
pub struct StandardDomainName {
    pub certificate_id: LogicalId,
    pub domain_name_id: LogicalId,
    domain: String,
    zone: String,
}

impl StandardDomainName {
    pub fn new(stack: &mut Stack, id: &LogicalId, prefix: &str, zone: &str) -> Result<Self> {
        let domain = format!("{prefix}.{zone}");
        let certificate_id = id.child("Certificate")?;
        stack.template_mut().add_resource(
            certificate_id.clone(),
            Resource::new(
                ResourceKind::Certificate,
                json!({
                    "DomainName": domain,
                    "ValidationMethod": "DNS",
                }),
            ),
        )?;
        let domain_name_id = id.child("DomainName")?;
        stack.template_mut().add_resource(
            domain_name_id.clone(),
            Resource::new(
                ResourceKind::DomainName,
                json!({
                    "DomainName": domain,
                    "DomainNameConfigurations": [{
                        "CertificateArn": { "Fn::GetAtt": [certificate_id, "Arn"] },
                        "SecurityPolicy": "TLS_1_2",
                    }],
                }),
            ),
        )?;
        Ok(Self {
            certificate_id,
            domain_name_id,
            domain,
            zone: zone.to_string(),
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// A plain alias record pointing at the domain name.
    pub fn create_record(&self, stack: &mut Stack, id: &LogicalId) -> Result<LogicalId> {
        self.put_record(stack, id, json!({}))
    }

    /// A weighted alias record. The record set identifier is derived from
    /// the stack name so parallel stacks can share the domain.
    pub fn create_weighted_record(
        &self,
        stack: &mut Stack,
        id: &LogicalId,
        weight: u64,
        evaluate_target_health: bool,
    ) -> Result<LogicalId> {
        let set_identifier = stack.name().to_string();
        self.put_record(
            stack,
            id,
            json!({
                "Weight": weight,
                "SetIdentifier": set_identifier,
                "EvaluateTargetHealth": evaluate_target_health,
            }),
        )
    }

    /// A latency alias record for the stack's region.
    pub fn create_latency_record(
        &self,
        stack: &mut Stack,
        id: &LogicalId,
        evaluate_target_health: bool,
    ) -> Result<LogicalId> {
        let region = stack.region().to_string();
        let set_identifier = stack.name().to_string();
        self.put_record(
            stack,
            id,
            json!({
                "Region": region,
                "SetIdentifier": set_identifier,
                "EvaluateTargetHealth": evaluate_target_health,
            }),
        )
    }

    fn put_record(
        &self,
        stack: &mut Stack,
        id: &LogicalId,
        routing: serde_json::Value,
    ) -> Result<LogicalId> {
        let record_id = id.child("Record")?;
        let mut properties = json!({
            "Name": self.domain,
            "Type": "A",
            "HostedZoneName": format!("{}.", self.zone),
            "AliasTarget": {
                "DNSName": { "Fn::GetAtt": [self.domain_name_id, "RegionalDomainName"] },
            },
        });
        if let Some(routing) = routing.as_object() {
            for (key, value) in routing {
                properties[key] = value.clone();
            }
        }
        stack
            .template_mut()
            .add_resource(record_id.clone(), Resource::new(ResourceKind::RecordSet, properties))?;
        Ok(record_id)
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct StandardHttpApiProps {
    /// The prefix of the domain to create the certificate and record for.
    pub domain_prefix: String,
    /// The zone of the domain to create the certificate and record for.
    pub domain_zone: String,
    /// Name of the API. Generated from the stack name when omitted.
    #[serde(default)]
    pub api_name: Option<String>,
    /// Whether a record is created for the API. Defaults to true.
    #[serde(default)]
    pub create_record: Option<bool>,
    /// Creates a weighted record. May not be combined with
    /// `record_latency`.
    #[serde(default)]
    pub record_weight: Option<u64>,
    /// Creates a latency record. May not be combined with
    /// `record_weight`.
    #[serde(default)]
    pub record_latency: Option<bool>,
    /// Evaluate target health on weighted and latency records. Defaults
    /// to true.
    #[serde(default)]
    pub evaluate_target_health: Option<bool>,
}

/// An HTTP API fronted by a custom domain, its certificate and a routing
/// record.
pub struct StandardHttpApi {
    pub api_id: LogicalId,
    pub domain_name: StandardDomainName,
    pub record_id: Option<LogicalId>,
}

impl StandardHttpApi {
    pub fn new(stack: &mut Stack, id: &LogicalId, props: StandardHttpApiProps) -> Result<Self> {
        // A record cannot carry two routing policies; reject the
        // combination before any resource is synthesized.
        if props.record_weight.is_some() && props.record_latency.unwrap_or(false) {
            return Err(Error::ConflictingRecordRouting(id.clone()));
        }

        let domain_name =
            StandardDomainName::new(stack, id, &props.domain_prefix, &props.domain_zone)?;

        let record_id = if props.create_record.unwrap_or(true) {
            let evaluate_target_health = props.evaluate_target_health.unwrap_or(true);
            Some(if let Some(weight) = props.record_weight {
                domain_name.create_weighted_record(stack, id, weight, evaluate_target_health)?
            } else if props.record_latency.unwrap_or(false) {
                domain_name.create_latency_record(stack, id, evaluate_target_health)?
            } else {
                domain_name.create_record(stack, id)?
            })
        } else {
            None
        };

        let api_id = id.child("Default")?;
        let api_name = props
            .api_name
            .unwrap_or_else(|| format!("{}Gateway", stack.name()));
        stack.template_mut().add_resource(
            api_id.clone(),
            Resource::new(
                ResourceKind::HttpApi,
                json!({
                    "Name": api_name,
                    "ProtocolType": "HTTP",
                    "DomainName": domain_name.domain(),
                }),
            ),
        )?;

        Ok(Self {
            api_id,
            domain_name,
            record_id,
        })
    }
}
