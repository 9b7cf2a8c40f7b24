// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Video device discovery
//!
//! Scans the device namespace (`/dev`) for entries named `video*` and keeps
//! the ones that are character special files. V4L2 drivers register their
//! device nodes under this namespace, but the name pattern can transiently
//! match other artifacts (stale files, renamed nodes), so everything that is
//! not a character device is silently excluded rather than reported as an
//! error.
//!
//! Discovery order is lexical, matching shell glob expansion, so repeated
//! runs against an unchanged namespace enumerate devices identically.

use std::fs;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use crate::Error;

/// Fixed device-namespace root scanned by [`scan`]
pub const DEVICE_ROOT: &str = "/dev";

/// Name prefix of V4L2 video device nodes
pub const DEVICE_PREFIX: &str = "video";

/// Result of one device-namespace scan
#[derive(Debug, Default)]
pub struct Discovery {
    /// Entries whose name matched the `video*` pattern, before type filtering
    pub matched: usize,
    /// Character-device paths, in lexical order
    pub devices: Vec<PathBuf>,
}

impl Discovery {
    /// True when no character device was found
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of discovered character devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }
}

/// Scan `/dev` for `video*` character devices.
///
/// # Errors
///
/// Returns [`Error::Io`] only when the device root itself cannot be read;
/// individual entries that disappear or cannot be stat'ed are skipped.
pub fn scan() -> Result<Discovery, Error> {
    scan_dir(Path::new(DEVICE_ROOT))
}

/// Scan an explicit device root for `video*` character devices.
///
/// The root is a parameter so discovery can be exercised against a synthetic
/// namespace; production callers use [`scan`].
pub fn scan_dir(root: &Path) -> Result<Discovery, Error> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(root)? {
        // Entries that vanish mid-scan are not errors.
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };

        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(DEVICE_PREFIX)
        {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    let matched = candidates.len();

    let devices: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|path| is_char_device(path))
        .collect();

    log::debug!(
        "scanned {}: {} name matches, {} character devices",
        root.display(),
        matched,
        devices.len()
    );

    Ok(Discovery { matched, devices })
}

/// True when the path resolves to a character special file.
///
/// Uses `fs::metadata`, which follows symlinks, so a link into the real
/// device namespace counts while a link to a regular file does not.
fn is_char_device(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.file_type().is_char_device(),
        Err(_) => false,
    }
}
