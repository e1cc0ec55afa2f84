/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use crate::ids::{IndexName, LogicalId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid logical id: {0}")]
    InvalidLogicalId(String),
    #[error("invalid stack name: {0}")]
    InvalidStackName(String),
    #[error("invalid metric field: {0}")]
    InvalidMetricField(String),
    #[error("invalid index name: {0}")]
    InvalidIndexName(String),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("invalid alarm category: {0}")]
    InvalidAlarmCategory(String),
    #[error("threshold value must be a number: {0}")]
    InvalidThreshold(f64),
    #[error("invalid resource kind: {0}")]
    InvalidResourceKind(String),
    #[error("duplicate logical id: {0}")]
    DuplicateLogicalId(LogicalId),
    #[error("missing resource: {0}")]
    MissingResource(LogicalId),
    #[error(
        "MonitoringFacade must be provided on the stack \
	 before alarms can be created for {0}"
    )]
    MissingMonitoringFacade(LogicalId),
    #[error("index {1} already exists on table {0}")]
    DuplicateIndex(LogicalId, IndexName),
    #[error("a record cannot be both weighted and latency-based: {0}")]
    ConflictingRecordRouting(LogicalId),
    #[error("replication requires at least one destination bucket: {0}")]
    MissingReplicationDestination(LogicalId),
    #[error("failed to encode template: {0}")]
    EncodeTemplate(serde_json::Error),
}
