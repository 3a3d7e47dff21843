// Backend identity (package managers and service managers)

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;

/// Package management system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageType {
    // Linux
    Deb,
    Dnf,
    Ebuild,
    Pacman,
    Rpm,
    Yum,
    Zypp,

    // BSD
    Brew,
    Pkg,
}

impl PackageType {
    /// Executable name looked up on `$PATH`
    pub fn executable(&self) -> &'static str {
        match self {
            PackageType::Deb => "apt-get",
            PackageType::Dnf => "dnf",
            PackageType::Ebuild => "emerge",
            PackageType::Pacman => "pacman",
            PackageType::Rpm => "rpm",
            PackageType::Yum => "yum",
            PackageType::Zypp => "zypper",
            PackageType::Brew => "brew",
            PackageType::Pkg => "pkg",
        }
    }

    /// Canonical absolute path of the executable
    pub fn default_path(&self) -> &'static str {
        match self {
            PackageType::Deb => "/usr/bin/apt-get",
            PackageType::Dnf => "/usr/bin/dnf",
            PackageType::Ebuild => "/usr/bin/emerge",
            PackageType::Pacman => "/usr/bin/pacman",
            PackageType::Rpm => "/usr/bin/rpm",
            PackageType::Yum => "/usr/bin/yum",
            PackageType::Zypp => "/usr/bin/zypper",
            PackageType::Brew => "/usr/local/bin/brew",
            PackageType::Pkg => "/usr/sbin/pkg",
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageType::Deb => write!(f, "Deb"),
            PackageType::Dnf => write!(f, "DNF"),
            PackageType::Ebuild => write!(f, "Ebuild"),
            PackageType::Pacman => write!(f, "Pacman"),
            PackageType::Rpm => write!(f, "RPM"),
            PackageType::Yum => write!(f, "YUM"),
            PackageType::Zypp => write!(f, "ZYpp"),
            PackageType::Brew => write!(f, "brew"),
            PackageType::Pkg => write!(f, "pkg"),
        }
    }
}

impl FromStr for PackageType {
    type Err = AppError;

    /// Accepts the executable name ("apt-get", "zypper") or the type name ("deb", "zypp")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apt-get" | "deb" => Ok(PackageType::Deb),
            "dnf" => Ok(PackageType::Dnf),
            "emerge" | "ebuild" => Ok(PackageType::Ebuild),
            "pacman" => Ok(PackageType::Pacman),
            "rpm" => Ok(PackageType::Rpm),
            "yum" => Ok(PackageType::Yum),
            "zypper" | "zypp" => Ok(PackageType::Zypp),
            "brew" => Ok(PackageType::Brew),
            "pkg" => Ok(PackageType::Pkg),
            _ => Err(AppError::InvalidInput(format!("invalid package type: {}", s))),
        }
    }
}

/// Service management system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// systemd (`systemctl`)
    Systemd,
    /// BSD rc.d (`service` + `sysrc`)
    Rc,
    /// macOS launchd (`launchctl`)
    Launchd,
    /// Windows Service Control Manager (`net` + `sc`)
    WindowsScm,
}

impl ServiceType {
    /// Executable used to probe for this service manager
    pub fn executable(&self) -> &'static str {
        match self {
            ServiceType::Systemd => "systemctl",
            ServiceType::Rc => "service",
            ServiceType::Launchd => "launchctl",
            ServiceType::WindowsScm => "sc",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::Systemd => write!(f, "systemd"),
            ServiceType::Rc => write!(f, "rc.d"),
            ServiceType::Launchd => write!(f, "launchd"),
            ServiceType::WindowsScm => write!(f, "Windows SCM"),
        }
    }
}
