// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Camera Capability Inspection Library
//!
//! Read-only discovery and capability reporting for V4L2 video devices on
//! embedded Linux. The library locates the `v4l2-ctl` tool from v4l-utils,
//! scans `/dev` for `video*` character devices, and renders a sectioned,
//! per-device capability report from the tool's output. It never opens a
//! device for streaming and never captures frames.
//!
//! # Quick Start
//!
//! ```no_run
//! use vidcaps::backend::Backend;
//! use vidcaps::{discover, report};
//!
//! let backend = Backend::locate()?;
//! let discovery = discover::scan()?;
//!
//! let mut stdout = std::io::stdout().lock();
//! for device in &discovery.devices {
//!     report::report_device(&mut stdout, &backend, device)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design
//!
//! - Capability queries go through the [`backend::CapabilityProvider`] trait,
//!   so the `v4l2-ctl` subprocess backend can later be swapped for an
//!   in-process V4L2 query without touching discovery or reporting.
//! - Backend output is forwarded line-by-line with bounded memory; a report
//!   for one device is never held in memory while the next is processed.
//! - A failing query on one device never aborts the run; the failure is
//!   recorded inline in that device's report section.

use std::{error, fmt, io, path::PathBuf};

/// Error type for capability inspection operations
#[derive(Debug)]
pub enum Error {
    /// The `v4l2-ctl` tool could not be found on the executable search path
    BackendNotFound,

    /// The backend process could not be spawned
    Spawn {
        /// Path to the tool that failed to start
        tool: PathBuf,
        /// Underlying spawn error
        source: io::Error,
    },

    /// I/O error from filesystem scanning or child process streams
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BackendNotFound => {
                write!(f, "`{}` not found in PATH", backend::BACKEND_TOOL)
            }
            Error::Spawn { tool, source } => {
                write!(f, "failed to run {}: {}", tool.display(), source)
            }
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::BackendNotFound => None,
            Error::Spawn { source, .. } => Some(source),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// The backend module locates the external `v4l2-ctl` tool and drives it.
pub mod backend;

/// The discover module scans the device namespace for video character devices.
pub mod discover;

/// The report module renders per-device capability reports.
pub mod report;
