// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! JSON capability snapshot for offline inspection.
//!
//! Runs the same two queries as `inspect` but records each device's output
//! in a JSON document that can be versioned alongside board configs and
//! diffed between kernel or driver upgrades. The snapshot reflects what the
//! V4L2 layer exposes to userspace at the moment it was taken.

use crate::error::CliError;
use clap::Args as ClapArgs;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use vidcaps::backend::{Backend, CapabilityProvider, QueryMode};
use vidcaps::discover;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Device directory to scan for video* nodes
    #[arg(long, default_value = discover::DEVICE_ROOT, value_name = "DIR")]
    dev_root: PathBuf,

    /// Write the snapshot to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Snapshot {
    tool: &'static str,
    v4l2_ctl: String,
    devices: Vec<DeviceSnapshot>,
}

#[derive(Debug, Serialize)]
struct DeviceSnapshot {
    device: String,
    all: String,
    formats_ext: String,
}

pub fn execute(args: Args) -> Result<(), CliError> {
    log::debug!("Executing snapshot command: {:?}", args);

    let backend = Backend::locate()?;

    let discovery = discover::scan_dir(&args.dev_root).map_err(|e| {
        CliError::General(format!("cannot scan {}: {}", args.dev_root.display(), e))
    })?;

    let mut snapshot = Snapshot {
        tool: "vidcaps_snapshot",
        v4l2_ctl: backend.path().display().to_string(),
        devices: Vec::with_capacity(discovery.len()),
    };

    for device in &discovery.devices {
        snapshot.devices.push(DeviceSnapshot {
            device: device.display().to_string(),
            all: collect_query(&backend, device, QueryMode::All),
            formats_ext: collect_query(&backend, device, QueryMode::FormatsExt),
        });
    }

    let json_str = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        CliError::General(format!("cannot create {}: {}", parent.display(), e))
                    })?;
                }
            }
            fs::write(path, json_str).map_err(|e| {
                CliError::General(format!("cannot write {}: {}", path.display(), e))
            })?;
            println!("Wrote capability snapshot to {}", path.display());
        }
        None => println!("{}", json_str),
    }

    Ok(())
}

/// Run one query and collect its output as a string.
///
/// Failures become an `ERROR ...` string in the snapshot field rather than
/// aborting the run, so one misbehaving device cannot hide the others.
fn collect_query(backend: &Backend, device: &Path, mode: QueryMode) -> String {
    let mut sink = Vec::new();
    match backend.query(device, mode, &mut sink) {
        Ok(outcome) if outcome.success() => String::from_utf8_lossy(&sink).into_owned(),
        Ok(outcome) => {
            log::warn!(
                "{} failed for {}: {}",
                mode.flag(),
                device.display(),
                outcome.stderr
            );
            match outcome.code {
                Some(code) => format!("ERROR (exit {}): {}", code, outcome.stderr),
                None => format!("ERROR (signal): {}", outcome.stderr),
            }
        }
        Err(err) => {
            log::warn!("{} failed for {}: {}", mode.flag(), device.display(), err);
            format!("ERROR: {}", err)
        }
    }
}
