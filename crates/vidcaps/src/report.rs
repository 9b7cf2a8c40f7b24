// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Per-device capability report rendering
//!
//! For one device the report is a banner naming the device followed by two
//! labeled sections, one per [`QueryMode`], each carrying the backend's raw
//! output. The layout is fixed regardless of backend verbosity so the report
//! stays scrapeable:
//!
//! ```text
//! ================================ (80 chars) ===================
//! DEVICE: /dev/video0
//! ================================ (80 chars) ===================
//!
//! >>> BASIC INFORMATION AND CAPABILITIES (v4l2-ctl --all)
//! <backend output, or "(no output)">
//!
//! >>> SUPPORTED FORMATS AND RESOLUTIONS (v4l2-ctl --list-formats-ext)
//! <backend output, or "(no output)">
//! ```
//!
//! A query failure is recorded inline in its section and never aborts the
//! device or the run, so one wedged driver cannot hide the other devices.

use std::io::{self, Write};
use std::path::Path;

use crate::backend::{CapabilityProvider, QueryMode, BACKEND_TOOL};

/// Width of the `=` rules delimiting a device banner
pub const RULE_WIDTH: usize = 80;

/// Marker emitted when a query succeeds but produces no output
pub const NO_OUTPUT_MARKER: &str = "(no output)";

/// Render the full capability report for one device.
///
/// Backend output streams straight through to `out`; nothing is buffered
/// past a single line.
///
/// # Errors
///
/// Only sink write failures propagate. Backend failures are recorded in the
/// report text itself.
pub fn report_device(
    out: &mut dyn Write,
    provider: &dyn CapabilityProvider,
    device: &Path,
) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(out, "DEVICE: {}", device.display())?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    for mode in QueryMode::MODES {
        writeln!(out, "{}", mode.label())?;
        write_section(out, provider, device, mode)?;
        writeln!(out)?;
    }

    Ok(())
}

/// Run one query and write its section body.
fn write_section(
    out: &mut dyn Write,
    provider: &dyn CapabilityProvider,
    device: &Path,
    mode: QueryMode,
) -> io::Result<()> {
    match provider.query(device, mode, out) {
        Ok(outcome) => {
            // Empty stdout always gets the marker, even when the backend
            // failed, so a section never goes blank.
            if outcome.bytes == 0 {
                writeln!(out, "{}", NO_OUTPUT_MARKER)?;
            }

            if !outcome.success() {
                match outcome.code {
                    Some(code) => {
                        writeln!(out, "({} exited with status {})", BACKEND_TOOL, code)?
                    }
                    None => writeln!(out, "({} terminated by signal)", BACKEND_TOOL)?,
                }
                log::warn!(
                    "{} {} failed for {}: {}",
                    BACKEND_TOOL,
                    mode.flag(),
                    device.display(),
                    if outcome.stderr.is_empty() {
                        "no diagnostic output"
                    } else {
                        outcome.stderr.as_str()
                    }
                );
            } else if !outcome.stderr.is_empty() {
                log::debug!(
                    "{} {} stderr for {}: {}",
                    BACKEND_TOOL,
                    mode.flag(),
                    device.display(),
                    outcome.stderr
                );
            }
        }
        Err(err) => {
            // Keep going; the failure belongs to this section only.
            writeln!(out, "(error: {})", err)?;
            log::warn!(
                "{} query failed for {}: {}",
                mode.flag(),
                device.display(),
                err
            );
        }
    }

    Ok(())
}
