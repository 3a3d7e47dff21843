// Dispatcher
// Platform -> package/service backend, by table or by probing PATH

use std::sync::Arc;
use tracing::{debug, info};

use super::package::{PackageBackend, PackageManager, ProviderContext};
use super::service::ServiceBackend;
use crate::domain::{Distro, PackageType, Platform, ServiceType, System};
use crate::error::{AppError, Result};
use crate::port::ExecutableLocator;

/// Probe order when the distribution is unknown
const LINUX_PROBE_ORDER: &[PackageType] = &[
    PackageType::Deb,
    PackageType::Dnf,
    PackageType::Yum,
    PackageType::Zypp,
    PackageType::Pacman,
    PackageType::Ebuild,
    PackageType::Rpm,
];
const FREEBSD_PROBE_ORDER: &[PackageType] = &[PackageType::Pkg];
const MACOS_PROBE_ORDER: &[PackageType] = &[PackageType::Brew];

/// First Fedora release shipping dnf as the default
const FEDORA_DNF_SINCE: u32 = 22;
/// First CentOS release shipping dnf as the default
const CENTOS_DNF_SINCE: u32 = 8;

pub struct Dispatcher {
    ctx: ProviderContext,
    locator: Arc<dyn ExecutableLocator>,
}

impl Dispatcher {
    pub fn new(ctx: ProviderContext, locator: Arc<dyn ExecutableLocator>) -> Self {
        Self { ctx, locator }
    }

    pub fn context(&self) -> &ProviderContext {
        &self.ctx
    }

    /// Package type for a detected platform
    ///
    /// # Errors
    /// - AppError::NotFound for an unknown distribution or Windows
    /// - AppError::InvalidVersion when a version is needed and unparseable
    pub fn package_type_for(platform: &Platform) -> Result<PackageType> {
        match platform.system {
            System::Linux => match platform.distro {
                Distro::Debian | Distro::Ubuntu => Ok(PackageType::Deb),
                Distro::OpenSUSE => Ok(PackageType::Zypp),
                Distro::Arch | Distro::Manjaro => Ok(PackageType::Pacman),
                Distro::CentOS => Ok(dnf_or_yum(platform.major_version()?, CENTOS_DNF_SINCE)),
                Distro::Fedora => Ok(dnf_or_yum(platform.major_version()?, FEDORA_DNF_SINCE)),
                Distro::Unknown => Err(AppError::NotFound(format!(
                    "no package manager known for {}",
                    platform.distro
                ))),
            },
            System::MacOS => Ok(PackageType::Brew),
            System::FreeBSD => Ok(PackageType::Pkg),
            System::Windows => Err(AppError::NotFound(
                "no package manager available on Windows".to_string(),
            )),
        }
    }

    /// Backend chosen from the platform table, with its canonical path
    pub fn resolve(&self, platform: &Platform) -> Result<PackageBackend> {
        let pkg = Self::package_type_for(platform)?;
        info!(system = %platform.system, distro = %platform.distro, backend = %pkg, "Resolved package manager");
        Ok(PackageBackend::new(pkg, &self.context_for(platform)))
    }

    /// First package manager found on `PATH` for `system`
    ///
    /// A located path different from the canonical one becomes the backend's
    /// executable path.
    pub fn detect(&self, system: System) -> Result<PackageBackend> {
        let candidates: &[PackageType] = match system {
            System::Linux => LINUX_PROBE_ORDER,
            System::FreeBSD => FREEBSD_PROBE_ORDER,
            System::MacOS => MACOS_PROBE_ORDER,
            System::Windows => &[],
        };

        for &pkg in candidates {
            let Some(path) = self.locator.locate(pkg.executable()) else {
                debug!(executable = pkg.executable(), "Not on PATH");
                continue;
            };

            let mut backend = PackageBackend::new(pkg, &self.ctx);
            let path = path.display().to_string();
            if path != pkg.default_path() {
                backend.set_exec_path(path);
            }
            info!(system = %system, backend = %pkg, path = %backend.exec_path(), "Detected package manager");
            return Ok(backend);
        }

        Err(AppError::NotFound("no package manager found".to_string()))
    }

    /// `resolve` for a known distribution, `detect` otherwise
    ///
    /// A known distribution whose version cannot pick between dnf and yum
    /// is probed as well.
    pub fn select(&self, platform: &Platform) -> Result<PackageBackend> {
        if platform.system == System::Linux && platform.distro == Distro::Unknown {
            return self.detect_for(platform);
        }

        match self.resolve(platform) {
            Err(AppError::InvalidVersion(version)) => {
                debug!(distro = %platform.distro, version = %version, "Ambiguous version, probing PATH");
                self.detect_for(platform)
            }
            resolved => resolved,
        }
    }

    fn detect_for(&self, platform: &Platform) -> Result<PackageBackend> {
        let backend = match self.detect(platform.system)? {
            PackageBackend::Deb(apt) => {
                PackageBackend::Deb(apt.with_codename(platform.codename.clone()))
            }
            other => other,
        };
        Ok(backend)
    }

    /// Backend for an explicitly chosen package type
    #[allow(clippy::wrong_self_convention)]
    pub fn from_type(&self, pkg: PackageType, platform: Option<&Platform>) -> PackageBackend {
        match platform {
            Some(platform) => PackageBackend::new(pkg, &self.context_for(platform)),
            None => PackageBackend::new(pkg, &self.ctx),
        }
    }

    pub fn service_type_for(system: System) -> ServiceType {
        match system {
            System::Linux => ServiceType::Systemd,
            System::FreeBSD => ServiceType::Rc,
            System::MacOS => ServiceType::Launchd,
            System::Windows => ServiceType::WindowsScm,
        }
    }

    pub fn resolve_service(&self, system: System) -> ServiceBackend {
        ServiceBackend::new(Self::service_type_for(system), &self.ctx)
    }

    /// Service backend whose tool is present on `PATH`
    pub fn detect_service(&self, system: System) -> Result<ServiceBackend> {
        let service = Self::service_type_for(system);
        if self.locator.locate(service.executable()).is_none() {
            return Err(AppError::NotFound(format!(
                "{} not found ({})",
                service.executable(),
                service
            )));
        }
        Ok(ServiceBackend::new(service, &self.ctx))
    }

    fn context_for(&self, platform: &Platform) -> ProviderContext {
        let mut ctx = self.ctx.clone();
        if platform.codename.is_some() {
            ctx.config.codename = platform.codename.clone();
        }
        ctx
    }
}

fn dnf_or_yum(major: u32, dnf_since: u32) -> PackageType {
    if major >= dnf_since {
        PackageType::Dnf
    } else {
        PackageType::Yum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::package::test_support::context;
    use crate::application::service::ServiceManager;
    use crate::port::executable_locator::mocks::MockExecutableLocator;
    use crate::port::process_runner::mocks::MockProcessRunner;

    fn dispatcher(locator: MockExecutableLocator) -> Dispatcher {
        Dispatcher::new(context(&MockProcessRunner::new()), Arc::new(locator))
    }

    fn linux(distro: Distro, version: &str) -> Platform {
        Platform::new(System::Linux, distro).with_version(version)
    }

    #[test]
    fn test_resolve_table() {
        let cases = [
            (linux(Distro::Debian, "12"), PackageType::Deb),
            (linux(Distro::Ubuntu, "22.04"), PackageType::Deb),
            (linux(Distro::OpenSUSE, "15.5"), PackageType::Zypp),
            (linux(Distro::Arch, "rolling"), PackageType::Pacman),
            (linux(Distro::Manjaro, "23"), PackageType::Pacman),
            (linux(Distro::CentOS, "7"), PackageType::Yum),
            (linux(Distro::CentOS, "8.4"), PackageType::Dnf),
            (linux(Distro::Fedora, "21"), PackageType::Yum),
            (linux(Distro::Fedora, "22"), PackageType::Dnf),
            (Platform::new(System::MacOS, Distro::Unknown), PackageType::Brew),
            (Platform::new(System::FreeBSD, Distro::Unknown), PackageType::Pkg),
        ];

        for (platform, expected) in cases {
            assert_eq!(
                Dispatcher::package_type_for(&platform).unwrap(),
                expected,
                "{platform:?}"
            );
        }
    }

    #[test]
    fn test_resolve_failures() {
        let d = dispatcher(MockExecutableLocator::new());

        let err = d.resolve(&linux(Distro::Unknown, "1")).unwrap_err();
        assert!(err.is_not_found());

        let err = d
            .resolve(&Platform::new(System::Windows, Distro::Unknown))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = d
            .resolve(&linux(Distro::CentOS, "stream"))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidVersion(_)));
    }

    #[test]
    fn test_resolve_uses_canonical_path() {
        let d = dispatcher(MockExecutableLocator::new());
        let backend = d.resolve(&linux(Distro::CentOS, "7")).unwrap();

        assert_eq!(backend.package_type(), PackageType::Yum);
        assert_eq!(backend.exec_path(), "/usr/bin/yum");
    }

    #[test]
    fn test_detect_follows_probe_order() {
        let d = dispatcher(
            MockExecutableLocator::new()
                .with("rpm", "/usr/bin/rpm")
                .with("dnf", "/usr/bin/dnf"),
        );

        let backend = d.detect(System::Linux).unwrap();
        assert_eq!(backend.package_type(), PackageType::Dnf);
        assert_eq!(backend.exec_path(), "/usr/bin/dnf");
    }

    #[test]
    fn test_detect_overrides_exec_path() {
        let d = dispatcher(MockExecutableLocator::new().with("brew", "/opt/homebrew/bin/brew"));

        let backend = d.detect(System::MacOS).unwrap();
        assert_eq!(backend.package_type(), PackageType::Brew);
        assert_eq!(backend.exec_path(), "/opt/homebrew/bin/brew");
    }

    #[test]
    fn test_detect_per_system() {
        let d = dispatcher(
            MockExecutableLocator::new()
                .with("pkg", "/usr/sbin/pkg")
                .with("brew", "/usr/local/bin/brew"),
        );

        assert_eq!(
            d.detect(System::FreeBSD).unwrap().package_type(),
            PackageType::Pkg
        );
        assert_eq!(
            d.detect(System::MacOS).unwrap().package_type(),
            PackageType::Brew
        );
        assert!(d.detect(System::Windows).unwrap_err().is_not_found());
        assert!(d.detect(System::Linux).unwrap_err().is_not_found());
    }

    #[test]
    fn test_select_falls_back_to_detect() {
        let d = dispatcher(MockExecutableLocator::new().with("zypper", "/usr/bin/zypper"));

        let unknown = linux(Distro::Unknown, "1");
        assert_eq!(d.select(&unknown).unwrap().package_type(), PackageType::Zypp);

        let known = linux(Distro::Debian, "12");
        assert_eq!(d.select(&known).unwrap().package_type(), PackageType::Deb);
    }

    #[test]
    fn test_select_probes_when_version_is_ambiguous() {
        let d = dispatcher(MockExecutableLocator::new().with("dnf", "/usr/bin/dnf"));

        let stream = linux(Distro::CentOS, "stream");
        assert!(matches!(d.resolve(&stream), Err(AppError::InvalidVersion(_))));
        assert_eq!(d.select(&stream).unwrap().package_type(), PackageType::Dnf);

        let unversioned = Platform::new(System::Linux, Distro::Fedora);
        assert_eq!(
            d.select(&unversioned).unwrap().package_type(),
            PackageType::Dnf
        );
    }

    #[test]
    fn test_select_ambiguous_version_without_tools() {
        let d = dispatcher(MockExecutableLocator::new());

        let err = d.select(&linux(Distro::Fedora, "rawhide")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolved_apt_carries_codename() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockProcessRunner::new();
        let mut ctx = context(&runner);
        ctx.config.paths = crate::application::config::RepoPaths::under(dir.path());
        let d = Dispatcher::new(ctx, Arc::new(MockExecutableLocator::new()));

        let backend = d
            .resolve(&linux(Distro::Debian, "12").with_codename("bookworm"))
            .unwrap();
        backend
            .add_repo("example", &["https://example.org/debian"])
            .await
            .unwrap();

        let PackageBackend::Deb(apt) = &backend else {
            panic!("expected apt backend");
        };
        let list = std::fs::read_to_string(apt.repository("example")).unwrap();
        assert!(list.contains(" bookworm main"));
    }

    #[tokio::test]
    async fn test_service_resolution() {
        let d = dispatcher(MockExecutableLocator::new().with("systemctl", "/usr/bin/systemctl"));

        assert_eq!(
            d.resolve_service(System::FreeBSD).service_type(),
            ServiceType::Rc
        );
        assert_eq!(
            d.detect_service(System::Linux).unwrap().service_type(),
            ServiceType::Systemd
        );
        assert!(d
            .detect_service(System::MacOS)
            .unwrap_err()
            .is_not_found());
    }
}
