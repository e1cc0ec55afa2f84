/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Groundwork(#[from] groundwork::Error),
    #[error("failed to read manifest: {0}: {1}")]
    ReadManifest(PathBuf, std::io::Error),
    #[error("failed to decode manifest: {0}: {1}")]
    DecodeManifestJson(PathBuf, serde_json::Error),
    #[error("failed to decode manifest: {0}: {1}")]
    DecodeManifestYaml(PathBuf, serde_yaml::Error),
    #[error("failed to encode output: {0}")]
    EncodeOutput(serde_json::Error),
    #[error("no monitoring facade configured in manifest")]
    NoMonitoring,
}
