// Platform Domain Model
// System and Linux distribution as classified by an external detector

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum System {
    Linux,
    FreeBSD,
    MacOS,
    Windows,
}

impl System {
    /// System this binary was compiled for
    ///
    /// Returns `None` on targets without a supported package/service stack.
    pub fn current() -> Option<System> {
        if cfg!(target_os = "linux") {
            Some(System::Linux)
        } else if cfg!(target_os = "freebsd") {
            Some(System::FreeBSD)
        } else if cfg!(target_os = "macos") {
            Some(System::MacOS)
        } else if cfg!(target_os = "windows") {
            Some(System::Windows)
        } else {
            None
        }
    }
}

impl std::fmt::Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            System::Linux => write!(f, "Linux"),
            System::FreeBSD => write!(f, "FreeBSD"),
            System::MacOS => write!(f, "macOS"),
            System::Windows => write!(f, "Windows"),
        }
    }
}

/// Linux distribution (only meaningful when System = Linux)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distro {
    Debian,
    Ubuntu,
    Fedora,
    CentOS,
    OpenSUSE,
    Arch,
    Manjaro,
    Unknown,
}

impl Distro {
    /// Map the `ID` field of os-release to a distribution
    pub fn from_os_release_id(id: &str) -> Distro {
        match id.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "debian" => Distro::Debian,
            "ubuntu" => Distro::Ubuntu,
            "fedora" => Distro::Fedora,
            "centos" => Distro::CentOS,
            "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" => Distro::OpenSUSE,
            "arch" => Distro::Arch,
            "manjaro" => Distro::Manjaro,
            _ => Distro::Unknown,
        }
    }
}

impl std::fmt::Display for Distro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distro::Debian => write!(f, "Debian"),
            Distro::Ubuntu => write!(f, "Ubuntu"),
            Distro::Fedora => write!(f, "Fedora"),
            Distro::CentOS => write!(f, "CentOS"),
            Distro::OpenSUSE => write!(f, "openSUSE"),
            Distro::Arch => write!(f, "Arch"),
            Distro::Manjaro => write!(f, "Manjaro"),
            Distro::Unknown => write!(f, "unknown distribution"),
        }
    }
}

/// Detected platform identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub system: System,
    pub distro: Distro,
    /// Release version (`VERSION_ID` on Linux), e.g. "8.4"
    pub version: Option<String>,
    /// Release code name (`VERSION_CODENAME` on Linux), e.g. "bookworm"
    pub codename: Option<String>,
}

impl Platform {
    pub fn new(system: System, distro: Distro) -> Self {
        Self {
            system,
            distro,
            version: None,
            codename: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_codename(mut self, codename: impl Into<String>) -> Self {
        self.codename = Some(codename.into());
        self
    }

    /// Leading integer of the release version ("8.4" -> 8)
    pub fn major_version(&self) -> Result<u32> {
        let version = self
            .version
            .as_deref()
            .ok_or_else(|| AppError::InvalidVersion(format!("no version known for {}", self.distro)))?;

        let digits: String = version
            .trim()
            .trim_matches('"')
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        digits
            .parse()
            .map_err(|_| AppError::InvalidVersion(version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distro_from_os_release_id() {
        assert_eq!(Distro::from_os_release_id("debian"), Distro::Debian);
        assert_eq!(Distro::from_os_release_id("\"centos\""), Distro::CentOS);
        assert_eq!(
            Distro::from_os_release_id("opensuse-tumbleweed"),
            Distro::OpenSUSE
        );
        assert_eq!(Distro::from_os_release_id("Manjaro"), Distro::Manjaro);
        assert_eq!(Distro::from_os_release_id("gentoo"), Distro::Unknown);
    }

    #[test]
    fn test_major_version() {
        let p = Platform::new(System::Linux, Distro::CentOS).with_version("8.4");
        assert_eq!(p.major_version().unwrap(), 8);

        let p = Platform::new(System::Linux, Distro::Fedora).with_version("\"39\"");
        assert_eq!(p.major_version().unwrap(), 39);
    }

    #[test]
    fn test_major_version_invalid() {
        let p = Platform::new(System::Linux, Distro::CentOS);
        assert!(matches!(p.major_version(), Err(AppError::InvalidVersion(_))));

        let p = p.with_version("stream");
        assert!(matches!(p.major_version(), Err(AppError::InvalidVersion(_))));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(System::MacOS.to_string(), "macOS");
        assert_eq!(Distro::OpenSUSE.to_string(), "openSUSE");
    }

    #[test]
    fn test_platform_json_shape() {
        let p = Platform::new(System::Linux, Distro::Debian)
            .with_version("12")
            .with_codename("bookworm");

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["system"], "Linux");
        assert_eq!(json["distro"], "Debian");
        assert_eq!(json["codename"], "bookworm");

        let back: Platform = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
