// Provider Configuration

use std::path::PathBuf;
use std::time::Duration;

use super::constants::{DEFAULT_ELEVATION, DEFAULT_KEYSERVER, PACKAGE_TIMEOUT, SERVICE_TIMEOUT};

const DEFAULT_APT_KEYRINGS: &str = "/usr/share/keyrings";
const DEFAULT_APT_SOURCES: &str = "/etc/apt/sources.list.d";
const DEFAULT_YUM_REPOS: &str = "/etc/yum.repos.d";
const DEFAULT_PACMAN_CONF: &str = "/etc/pacman.conf";
const DEFAULT_GPG: &str = "gpg";

/// Persisted repository state touched by providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    pub apt_keyrings: PathBuf,
    pub apt_sources: PathBuf,
    pub yum_repos: PathBuf,
    pub pacman_conf: PathBuf,
}

impl Default for RepoPaths {
    fn default() -> Self {
        Self {
            apt_keyrings: PathBuf::from(DEFAULT_APT_KEYRINGS),
            apt_sources: PathBuf::from(DEFAULT_APT_SOURCES),
            yum_repos: PathBuf::from(DEFAULT_YUM_REPOS),
            pacman_conf: PathBuf::from(DEFAULT_PACMAN_CONF),
        }
    }
}

impl RepoPaths {
    /// All repository state rooted under `root` (for tests and chroots)
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let rel = |p: &str| root.join(p.trim_start_matches('/'));
        Self {
            apt_keyrings: rel(DEFAULT_APT_KEYRINGS),
            apt_sources: rel(DEFAULT_APT_SOURCES),
            yum_repos: rel(DEFAULT_YUM_REPOS),
            pacman_conf: rel(DEFAULT_PACMAN_CONF),
        }
    }
}

/// Provider configuration, fixed when the dispatcher builds a provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Elevation command (`None` runs everything as the current user)
    pub elevation: Option<String>,
    /// Timeout for package commands (zero = none)
    pub package_timeout: Duration,
    /// Timeout for service commands
    pub service_timeout: Duration,
    pub gpg: String,
    pub default_keyserver: String,
    /// Distribution code name used in apt source lines
    pub codename: Option<String>,
    pub paths: RepoPaths,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            elevation: Some(DEFAULT_ELEVATION.to_string()),
            package_timeout: PACKAGE_TIMEOUT,
            service_timeout: SERVICE_TIMEOUT,
            gpg: DEFAULT_GPG.to_string(),
            default_keyserver: DEFAULT_KEYSERVER.to_string(),
            codename: None,
            paths: RepoPaths::default(),
        }
    }
}
