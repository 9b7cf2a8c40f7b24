// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Video device listing with text and JSON output.

use crate::error::CliError;
use clap::Args as ClapArgs;
use serde::Serialize;
use std::path::PathBuf;
use vidcaps::discover;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Device directory to scan for video* nodes
    #[arg(long, default_value = discover::DEVICE_ROOT, value_name = "DIR")]
    dev_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct DevicesOutput {
    devices: Vec<String>,
    summary: Summary,
}

#[derive(Debug, Serialize)]
struct Summary {
    /// Entries matching the video* name pattern, including non-devices
    matched: usize,
    /// Entries that are character special files
    character_devices: usize,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing devices command: {:?}", args);

    let discovery = discover::scan_dir(&args.dev_root).map_err(|e| {
        CliError::General(format!("cannot scan {}: {}", args.dev_root.display(), e))
    })?;

    if json {
        let output = DevicesOutput {
            devices: discovery
                .devices
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            summary: Summary {
                matched: discovery.matched,
                character_devices: discovery.len(),
            },
        };
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;
        println!("{}", json_str);
        return Ok(());
    }

    if discovery.is_empty() {
        println!(
            "No video character devices found under {}.",
            args.dev_root.display()
        );
        return Ok(());
    }

    println!("Discovered video devices:");
    for device in &discovery.devices {
        println!("  - {}", device.display());
    }
    println!();
    println!(
        "{} character device(s), {} name match(es) total",
        discovery.len(),
        discovery.matched
    );

    Ok(())
}
