// Provider constants (no magic values)
use std::time::Duration;

/// Default elevation command prefixed to privileged invocations
pub const DEFAULT_ELEVATION: &str = "sudo";

/// Wait before killing a service command (90 seconds)
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(90);

/// Package commands run without a timeout by default (zero = none)
pub const PACKAGE_TIMEOUT: Duration = Duration::ZERO;

/// Keyserver used when a keyserver import names none
pub const DEFAULT_KEYSERVER: &str = "hkp://keyserver.ubuntu.com:80";

/// Stable, parseable locale forced on every package-manager invocation
pub const LOCALE_ENV: (&str, &str) = ("LANG", "C");

/// Debian front-end that never prompts
pub const DEBIAN_FRONTEND_ENV: (&str, &str) = ("DEBIAN_FRONTEND", "noninteractive");

// Acceptance sets: exit codes each tool documents as "not really an error"

/// apt-get
pub const DEB_ACCEPTED_EXIT_CODES: &[i32] = &[100];

/// https://dnf.readthedocs.io/en/latest/command_ref.html
pub const DNF_ACCEPTED_EXIT_CODES: &[i32] = &[1, 3, 200];

pub const YUM_ACCEPTED_EXIT_CODES: &[i32] = &[1, 2, 3, 16];

/// zypper(8); 104 = no further action needed
pub const ZYPP_ACCEPTED_EXIT_CODES: &[i32] = &[1, 2, 3, 4, 5, 104];

pub const PACMAN_ACCEPTED_EXIT_CODES: &[i32] = &[1];

/// FreeBSD pkg
pub const PKG_ACCEPTED_EXIT_CODES: &[i32] = &[1];

pub const BREW_ACCEPTED_EXIT_CODES: &[i32] = &[1];

/// `systemctl is-active`: 3 = inactive, 4 = no such unit
pub const SYSTEMCTL_IS_ACTIVE_EXIT_CODES: &[i32] = &[3, 4];
