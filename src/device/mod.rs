//! Keyboard device discovery
//!
//! Finds keyboard event nodes through the stable symlinks udev creates
//! under /dev/input/by-path and opens them for reading and injecting.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::config::DeviceConfig;

/// List keyboard event devices
///
/// Entries of `search_dir` whose file name ends with `suffix` are resolved
/// through their symlinks. The result is sorted and free of duplicates.
pub fn find_keyboards(config: &DeviceConfig) -> Result<Vec<PathBuf>> {
    let dir = Path::new(&config.search_dir);
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot scan {}", dir.display()))?;

    let mut devices = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !name.ends_with(&config.suffix) {
            continue;
        }
        match std::fs::canonicalize(&path) {
            Ok(target) => {
                debug!("Keyboard: {} -> {}", path.display(), target.display());
                devices.push(target);
            }
            Err(e) => warn!("Cannot resolve {}: {}", path.display(), e),
        }
    }

    devices.sort();
    devices.dedup();
    Ok(devices)
}

/// Pick the device to use: the configured path, else the first keyboard found
pub fn resolve(config: &DeviceConfig) -> Result<PathBuf> {
    if !config.path.is_empty() {
        return Ok(PathBuf::from(&config.path));
    }
    find_keyboards(config)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            anyhow!(
                "No keyboard found in {} (entries ending in \"{}\"). Check permissions or set device.path.",
                config.search_dir,
                config.suffix
            )
        })
}

/// Open an event device for blocking reads and writes
pub fn open(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)
        .with_context(|| format!("Cannot open keyboard device {}", path.display()))?;
    info!("Opened keyboard device {}", path.display());
    Ok(file)
}
