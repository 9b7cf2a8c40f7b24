// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Full inspection run: locate backend, discover devices, report each one.
//!
//! This is the tool's core operation. It performs a single pass over the
//! device set and never watches for changes; re-run it after reattaching a
//! camera. Exit status is 0 for a completed run (including "no camera
//! found") and 1 when the v4l2-ctl backend cannot be located.

use crate::error::CliError;
use clap::Args as ClapArgs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use vidcaps::backend::Backend;
use vidcaps::{discover, report};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Device directory to scan for video* nodes
    #[arg(long, default_value = discover::DEVICE_ROOT, value_name = "DIR")]
    dev_root: PathBuf,
}

pub fn execute(args: Args) -> Result<(), CliError> {
    log::debug!("Executing inspect command: {:?}", args);

    // Without a backend no device can be queried; abort before scanning.
    let backend = Backend::locate()?;
    log::debug!("using backend at {}", backend.path().display());

    let discovery = discover::scan_dir(&args.dev_root).map_err(|e| {
        CliError::General(format!("cannot scan {}: {}", args.dev_root.display(), e))
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&mut out, &backend, &args.dev_root, &discovery)
        .map_err(|e| CliError::General(format!("failed to write report: {}", e)))
}

/// Drive the report for one run, writing to `out`.
fn run(
    out: &mut dyn Write,
    backend: &Backend,
    dev_root: &Path,
    discovery: &discover::Discovery,
) -> io::Result<()> {
    print_context(out)?;

    if discovery.matched == 0 {
        writeln!(
            out,
            "No {}* devices found under {}. Is a camera connected and recognized?",
            discover::DEVICE_PREFIX,
            dev_root.display()
        )?;
        return Ok(());
    }

    if discovery.is_empty() {
        writeln!(
            out,
            "No character-device {}* nodes found under {}.",
            discover::DEVICE_PREFIX,
            dev_root.display()
        )?;
        return Ok(());
    }

    writeln!(out, "Discovered video devices:")?;
    for device in &discovery.devices {
        writeln!(out, "  - {}", device.display())?;
    }
    writeln!(out)?;

    for device in &discovery.devices {
        report::report_device(out, backend, device)?;
    }

    Ok(())
}

/// Fixed startup banner and context block
fn print_context(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "V4L2 Camera Device Inspection")?;
    writeln!(out, "-----------------------------")?;
    writeln!(out)?;
    writeln!(out, "Context:")?;
    writeln!(
        out,
        "- /dev/video* nodes are exposed by the Linux kernel's V4L2 subsystem."
    )?;
    writeln!(
        out,
        "- Drivers (e.g. `uvcvideo` for USB cameras) register these device nodes."
    )?;
    writeln!(
        out,
        "- This tool uses `v4l2-ctl` as a front-end to the V4L2 ioctls and reports"
    )?;
    writeln!(
        out,
        "  the driver- and hardware-exposed capabilities to userspace."
    )?;
    writeln!(out)
}
