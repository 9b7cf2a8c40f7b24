// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Capability-query backend
//!
//! This module locates the external `v4l2-ctl` tool (from v4l-utils) on the
//! executable search path and exposes it through the [`CapabilityProvider`]
//! trait. The tool is resolved once per run and treated as immutable
//! afterwards.
//!
//! `v4l2-ctl` talks to the kernel's V4L2 layer via ioctls; this crate stays
//! deliberately on the other side of that boundary and only orchestrates the
//! tool and its text output.
//!
//! # Example
//!
//! ```no_run
//! use vidcaps::backend::{Backend, CapabilityProvider, QueryMode};
//! use std::path::Path;
//!
//! let backend = Backend::locate()?;
//! let mut text = Vec::new();
//! let outcome = backend.query(Path::new("/dev/video0"), QueryMode::All, &mut text)?;
//! println!("{} bytes, exit code {:?}", outcome.bytes, outcome.code);
//! # Ok::<(), vidcaps::Error>(())
//! ```

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::Error;

/// Name of the external capability-query tool
pub const BACKEND_TOOL: &str = "v4l2-ctl";

/// The two capability queries issued per device, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMode {
    /// Overall device information and capabilities (`--all`)
    All,
    /// Supported pixel formats and resolutions (`--list-formats-ext`)
    FormatsExt,
}

impl QueryMode {
    /// Fixed query order for a device report
    pub const MODES: [QueryMode; 2] = [QueryMode::All, QueryMode::FormatsExt];

    /// The `v4l2-ctl` flag selecting this query
    pub fn flag(&self) -> &'static str {
        match self {
            QueryMode::All => "--all",
            QueryMode::FormatsExt => "--list-formats-ext",
        }
    }

    /// Section label introducing this query's output in a report
    pub fn label(&self) -> &'static str {
        match self {
            QueryMode::All => ">>> BASIC INFORMATION AND CAPABILITIES (v4l2-ctl --all)",
            QueryMode::FormatsExt => {
                ">>> SUPPORTED FORMATS AND RESOLUTIONS (v4l2-ctl --list-formats-ext)"
            }
        }
    }
}

/// Outcome of a single backend query
#[derive(Debug)]
pub struct QueryOutput {
    /// Bytes of backend stdout forwarded to the sink
    pub bytes: u64,
    /// Exit code of the backend process, `None` if killed by a signal
    pub code: Option<i32>,
    /// Trimmed stderr text from the backend, empty if it produced none
    pub stderr: String,
}

impl QueryOutput {
    /// True when the backend exited with status zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Narrow interface over "ask the device what it can do"
///
/// Implementations stream the raw query output into `sink` and report how
/// the query went. Keeping this seam narrow allows the subprocess backend to
/// be replaced by a direct in-process V4L2 query without changing the
/// discovery or reporting code.
pub trait CapabilityProvider {
    /// Run one capability query for `device`, forwarding its output to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error when the query could not be started or its output
    /// stream could not be read or forwarded. A query that runs but exits
    /// nonzero is not an `Err`; the caller inspects [`QueryOutput::code`].
    fn query(
        &self,
        device: &Path,
        mode: QueryMode,
        sink: &mut dyn Write,
    ) -> Result<QueryOutput, Error>;
}

/// Located `v4l2-ctl` backend
///
/// Resolved once from the process search path via [`Backend::locate`]; the
/// path is held for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Backend {
    path: PathBuf,
}

impl Backend {
    /// Locate `v4l2-ctl` on the process search path.
    ///
    /// Returns the first search-path entry containing an executable file
    /// named `v4l2-ctl`, mirroring shell lookup order.
    ///
    /// # Errors
    ///
    /// [`Error::BackendNotFound`] when `PATH` is unset, empty, or contains
    /// no executable `v4l2-ctl`.
    pub fn locate() -> Result<Self, Error> {
        Self::locate_in(env::var_os("PATH"))
    }

    /// Locate `v4l2-ctl` in an explicit search-path value.
    ///
    /// Split out from [`Backend::locate`] so lookup can be exercised without
    /// mutating the process environment.
    pub fn locate_in(search_path: Option<OsString>) -> Result<Self, Error> {
        let search_path = search_path.ok_or(Error::BackendNotFound)?;

        for dir in env::split_paths(&search_path) {
            if dir.as_os_str().is_empty() {
                continue;
            }

            let candidate = dir.join(BACKEND_TOOL);
            if is_executable(&candidate) {
                log::debug!("located {} at {}", BACKEND_TOOL, candidate.display());
                return Ok(Backend { path: candidate });
            }
        }

        Err(Error::BackendNotFound)
    }

    /// Construct a backend from a known tool path (used by tests)
    pub fn from_path(path: PathBuf) -> Self {
        Backend { path }
    }

    /// Absolute path to the located tool
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CapabilityProvider for Backend {
    fn query(
        &self,
        device: &Path,
        mode: QueryMode,
        sink: &mut dyn Write,
    ) -> Result<QueryOutput, Error> {
        log::debug!(
            "querying {} with {} {}",
            device.display(),
            BACKEND_TOOL,
            mode.flag()
        );

        let mut child = Command::new(&self.path)
            .arg("--device")
            .arg(device)
            .arg(mode.flag())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                tool: self.path.clone(),
                source,
            })?;

        // Drain stdout and stderr before waiting, and always wait so the
        // child is reaped even when forwarding fails mid-stream.
        let forwarded = forward_stdout(&mut child, sink);
        let stderr = read_stderr(&mut child);
        let status = child.wait();

        let bytes = forwarded?;
        let status = status.map_err(Error::Io)?;

        Ok(QueryOutput {
            bytes,
            code: status.code(),
            stderr,
        })
    }
}

/// Forward the child's stdout to the sink line-by-line.
///
/// Uses a single reusable line buffer so memory stays bounded by the longest
/// output line rather than the full query output.
fn forward_stdout(child: &mut Child, sink: &mut dyn Write) -> Result<u64, Error> {
    let stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => return Ok(0),
    };

    let mut reader = BufReader::new(stdout);
    let mut line = Vec::with_capacity(256);
    let mut bytes = 0u64;

    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).map_err(Error::Io)?;
        if n == 0 {
            break;
        }
        sink.write_all(&line).map_err(Error::Io)?;
        bytes += n as u64;
    }

    Ok(bytes)
}

/// Collect the child's stderr as lossy UTF-8, trimmed.
///
/// Read after stdout is drained; v4l2-ctl's diagnostics are short, so the
/// pipe buffer holds them until then.
fn read_stderr(child: &mut Child) -> String {
    let mut buf = Vec::new();
    if let Some(stderr) = child.stderr.as_mut() {
        let _ = stderr.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).trim().to_string()
}

fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
