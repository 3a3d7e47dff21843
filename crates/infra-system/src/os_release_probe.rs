// Platform probe implementation
// reason: sysinfo for distribution id/version, os-release for the code name
use std::path::{Path, PathBuf};
use tracing::debug;

use sysmanage_core::domain::{Distro, Platform, System};
use sysmanage_core::error::{AppError, Result};
use sysmanage_core::port::PlatformProbe;

const OS_RELEASE: &str = "/etc/os-release";

/// Detects the running platform
pub struct OsReleaseProbe {
    os_release: PathBuf,
}

impl OsReleaseProbe {
    pub fn new() -> Self {
        Self::with_os_release(OS_RELEASE)
    }

    /// Read the code name from another os-release file (chroots, tests)
    pub fn with_os_release(path: impl Into<PathBuf>) -> Self {
        Self {
            os_release: path.into(),
        }
    }

    fn linux(&self) -> Platform {
        let mut platform = Platform::new(
            System::Linux,
            Distro::from_os_release_id(&sysinfo::System::distribution_id()),
        );
        platform.version = sysinfo::System::os_version();

        let fields = read_os_release(&self.os_release);
        platform.codename = os_release_field(&fields, "VERSION_CODENAME");
        if platform.version.is_none() {
            platform.version = os_release_field(&fields, "VERSION_ID");
        }
        platform
    }
}

impl Default for OsReleaseProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProbe for OsReleaseProbe {
    fn detect(&self) -> Result<Platform> {
        let system = System::current()
            .ok_or_else(|| AppError::NotFound("unsupported operating system".to_string()))?;

        let platform = match system {
            System::Linux => self.linux(),
            other => {
                let mut platform = Platform::new(other, Distro::Unknown);
                platform.version = sysinfo::System::os_version();
                platform
            }
        };

        debug!(
            system = %platform.system,
            distro = %platform.distro,
            version = ?platform.version,
            codename = ?platform.codename,
            "Platform detected"
        );
        Ok(platform)
    }
}

/// KEY=value pairs of an os-release file; missing file = no fields
fn read_os_release(path: &Path) -> Vec<(String, String)> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_os_release(&contents),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "os-release unreadable");
            Vec::new()
        }
    }
}

fn parse_os_release(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), unquote(v.trim()).to_string()))
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn os_release_field(fields: &[(String, String)], key: &str) -> Option<String> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}
