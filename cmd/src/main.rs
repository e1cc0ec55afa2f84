/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

mod error;
mod manifest;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;

use error::{Error, Result};
use manifest::StackManifest;

/// Synthesize Groundwork stacks from the command line.
#[derive(clap::Parser)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Synth(SynthArgs),
    Alarms(AlarmsArgs),
}

/// Synthesize a stack manifest into a deployment template.
#[derive(clap::Args)]
struct SynthArgs {
    /// Path to the stack manifest (json or yaml).
    manifest: PathBuf,
}

/// Show the alarms the monitoring facade registered for a manifest.
#[derive(clap::Args)]
struct AlarmsArgs {
    /// Path to the stack manifest (json or yaml).
    manifest: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let res = match &args.cmd {
        Command::Synth(args) => synth(args),
        Command::Alarms(args) => alarms(args),
    };

    if let Err(e) = res {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn synth(args: &SynthArgs) -> Result<()> {
    let stack = load_manifest(&args.manifest)?.build()?;
    let template = stack.synth()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&template).map_err(Error::EncodeOutput)?
    );
    Ok(())
}

fn alarms(args: &AlarmsArgs) -> Result<()> {
    let stack = load_manifest(&args.manifest)?.build()?;
    let monitoring = stack.monitoring().ok_or(Error::NoMonitoring)?;
    println!(
        "{}",
        serde_json::to_string_pretty(monitoring.created()).map_err(Error::EncodeOutput)?
    );
    Ok(())
}

fn load_manifest(path: &Path) -> Result<StackManifest> {
    let data =
        std::fs::read_to_string(path).map_err(|e| Error::ReadManifest(path.to_path_buf(), e))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&data)
            .map_err(|e| Error::DecodeManifestYaml(path.to_path_buf(), e)),
        _ => serde_json::from_str(&data)
            .map_err(|e| Error::DecodeManifestJson(path.to_path_buf(), e)),
    }
}
