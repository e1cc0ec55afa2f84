/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::alarms::{
    AlarmCategory, Alarms, AlarmsCategoryOptions, AlarmsOptions, BucketMonitoring,
    MonitoredSubject,
};
use crate::error::{Error, Result};
use crate::ids::{ActionRef, AlarmName, KeyRef, LogicalId, TopicRef};
use crate::stack::Stack;
use crate::template::{Resource, ResourceKind};

/// Buckets carry no threshold catalog; the category options exist for the
/// notification targets only.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct BucketAlarmCategoryOptions {
    pub notify_topics: Vec<TopicRef>,
    pub notify_actions: Vec<ActionRef>,
}

impl AlarmsCategoryOptions for BucketAlarmCategoryOptions {
    fn notify_topics(&self) -> &[TopicRef] {
        &self.notify_topics
    }

    fn notify_actions(&self) -> &[ActionRef] {
        &self.notify_actions
    }
}

pub struct BucketAlarmsProps {
    pub bucket: MonitoredSubject,
    pub options: AlarmsOptions<BucketAlarmCategoryOptions>,
}

/// Dashboard-only monitoring for buckets.
pub struct BucketAlarms {
    created: BTreeMap<AlarmCategory, Vec<AlarmName>>,
}

impl BucketAlarms {
    pub fn new(stack: &mut Stack, scope: &LogicalId, props: BucketAlarmsProps) -> Result<Self> {
        let (_, monitoring) = stack.monitoring_parts(scope)?;
        monitoring.monitor_bucket(BucketMonitoring {
            bucket: props.bucket,
            placement: props.options.placement(),
        });
        Ok(Self {
            created: BTreeMap::new(),
        })
    }
}

impl Alarms for BucketAlarms {
    fn created_alarms(&self) -> &BTreeMap<AlarmCategory, Vec<AlarmName>> {
        &self.created
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct DestinationBucketOptions {
    pub bucket_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct ReplicationRoleProps {
    pub source_bucket_name: String,
    pub destination_buckets: Vec<DestinationBucketOptions>,
}

/// The role assumed by the storage service to replicate objects. The
/// policy carries exactly four statements: source and destination
/// list/get, replicate, encrypt on the destination keys, decrypt on the
/// source keys.
pub struct ReplicationRole {
    pub role_id: LogicalId,
}

impl ReplicationRole {
    pub fn new(stack: &mut Stack, id: &LogicalId, props: ReplicationRoleProps) -> Result<Self> {
        if props.destination_buckets.is_empty() {
            return Err(Error::MissingReplicationDestination(id.clone()));
        }
        let role_id = id.child("Default")?;
        let region = stack.region().to_string();
        let account = stack.account().to_string();
        let source = &props.source_bucket_name;
        let statements = vec![
            json!({
                "Effect": "Allow",
                "Action": [
                    "s3:ListBucket",
                    "s3:GetReplicationConfiguration",
                    "s3:GetObjectVersionForReplication",
                    "s3:GetObjectVersionAcl",
                    "s3:GetObjectVersionTagging",
                    "s3:GetObjectRetention",
                    "s3:GetObjectLegalHold",
                ],
                "Resource": std::iter::once(format!("arn:aws:s3:::{source}"))
                    .chain(std::iter::once(format!("arn:aws:s3:::{source}/*")))
                    .chain(props.destination_buckets.iter().map(|destination| {
                        format!("arn:aws:s3:::{}", destination.bucket_name)
                    }))
                    .chain(props.destination_buckets.iter().map(|destination| {
                        format!("arn:aws:s3:::{}/*", destination.bucket_name)
                    }))
                    .collect::<Vec<_>>(),
            }),
            json!({
                "Effect": "Allow",
                "Action": ["s3:Replicate*", "s3:ObjectOwnerOverrideToBucketOwner"],
                "Resource": std::iter::once(format!("arn:aws:s3:::{source}/*"))
                    .chain(props.destination_buckets.iter().map(|destination| {
                        format!("arn:aws:s3:::{}/*", destination.bucket_name)
                    }))
                    .collect::<Vec<_>>(),
            }),
            json!({
                "Effect": "Allow",
                "Action": ["kms:Encrypt"],
                "Resource": props
                    .destination_buckets
                    .iter()
                    .map(|destination| {
                        format!(
                            "arn:aws:kms:{}:{}:key/*",
                            destination.region.as_deref().unwrap_or(&region),
                            destination.account.as_deref().unwrap_or(&account),
                        )
                    })
                    .collect::<Vec<_>>(),
            }),
            json!({
                "Effect": "Allow",
                "Action": ["kms:Decrypt"],
                "Resource": [format!("arn:aws:kms:{region}:{account}:key/*")],
            }),
        ];
        stack.template_mut().add_resource(
            role_id.clone(),
            Resource::new(
                ResourceKind::Role,
                json!({
                    "AssumeRolePolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Principal": { "Service": "s3.amazonaws.com" },
                            "Action": "sts:AssumeRole",
                        }],
                    },
                    "Policies": [{
                        "PolicyName": "replication",
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": statements,
                        },
                    }],
                }),
            ),
        )?;
        Ok(Self { role_id })
    }
}

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct StandardBucketProps {
    /// Physical bucket name; generated when omitted.
    pub bucket_name: Option<String>,
    pub versioned: Option<bool>,
    /// Customer-managed encryption key. Without one, provider-managed
    /// encryption applies.
    pub encryption_key: Option<KeyRef>,
    /// Replicate objects to these buckets. Enables versioning and creates
    /// the replication role.
    pub replication_destinations: Vec<DestinationBucketOptions>,
    pub alarms: AlarmsOptions<BucketAlarmCategoryOptions>,
    pub suppress_tagging: Option<bool>,
}

/// A bucket with organization defaults: managed encryption, public access
/// blocked, optional replication, dashboard monitoring.
pub struct StandardBucket {
    pub bucket_id: LogicalId,
    pub replication_role: Option<ReplicationRole>,
    pub alarms: BucketAlarms,
}

impl StandardBucket {
    pub fn new(stack: &mut Stack, id: &LogicalId, props: StandardBucketProps) -> Result<Self> {
        let bucket_id = id.child("Default")?;
        let bucket_name = props
            .bucket_name
            .clone()
            .unwrap_or_else(|| bucket_id.to_string().to_lowercase());
        let replicated = !props.replication_destinations.is_empty();

        let replication_role = replicated
            .then(|| {
                ReplicationRole::new(
                    stack,
                    &id.child("ReplicationRole")?,
                    ReplicationRoleProps {
                        source_bucket_name: bucket_name.clone(),
                        destination_buckets: props.replication_destinations.clone(),
                    },
                )
            })
            .transpose()?;

        let mut properties = json!({
            "BucketName": bucket_name,
            "BucketEncryption": { "ServerSideEncryptionConfiguration": [{
                "ServerSideEncryptionByDefault": encryption_default(&props.encryption_key),
            }]},
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true,
            },
        });
        if props.versioned.unwrap_or(false) || replicated {
            properties["VersioningConfiguration"] = json!({ "Status": "Enabled" });
        }
        if let Some(role) = &replication_role {
            properties["ReplicationConfiguration"] = json!({
                "Role": { "Fn::GetAtt": [role.role_id, "Arn"] },
                "Rules": props
                    .replication_destinations
                    .iter()
                    .map(|destination| json!({
                        "Status": "Enabled",
                        "Destination": {
                            "Bucket": format!("arn:aws:s3:::{}", destination.bucket_name),
                        },
                    }))
                    .collect::<Vec<_>>(),
            });
        }
        if !props.suppress_tagging.unwrap_or(false) {
            properties["Tags"] = stack.tags().to_property();
        }
        stack
            .template_mut()
            .add_resource(bucket_id.clone(), Resource::new(ResourceKind::Bucket, properties))?;

        let alarms = BucketAlarms::new(
            stack,
            id,
            BucketAlarmsProps {
                bucket: MonitoredSubject::new(
                    props
                        .alarms
                        .alarm_name_prefix
                        .clone()
                        .unwrap_or_else(|| bucket_id.to_string()),
                    "AWS/S3",
                    BTreeMap::from([("BucketName".to_string(), bucket_name)]),
                ),
                options: props.alarms,
            },
        )?;

        Ok(Self {
            bucket_id,
            replication_role,
            alarms,
        })
    }
}

fn encryption_default(encryption_key: &Option<KeyRef>) -> Value {
    match encryption_key {
        Some(key) => json!({ "SSEAlgorithm": "aws:kms", "KMSMasterKeyID": key }),
        None => json!({ "SSEAlgorithm": "AES256" }),
    }
}
