//! Dispatcher Tests
//!
//! Backend selection against a real filesystem search path

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use sysmanage_core::application::{Dispatcher, PackageManager, ProviderConfig, ProviderContext};
use sysmanage_core::domain::{Distro, PackageType, Platform, System};
use sysmanage_core::port::key_fetcher::mocks::MockKeyFetcher;
use sysmanage_core::port::process_runner::mocks::MockProcessRunner;
use sysmanage_core::port::PlatformProbe;
use sysmanage_infra_system::{OsReleaseProbe, WhichLocator};

fn install_fake(dir: &Path, name: &str) {
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn dispatcher(runner: &MockProcessRunner, locator: WhichLocator) -> Dispatcher {
    let ctx = ProviderContext::new(
        Arc::new(runner.clone()),
        Arc::new(MockKeyFetcher::new()),
        ProviderConfig::default(),
    );
    Dispatcher::new(ctx, Arc::new(locator))
}

/// Test 1: detect picks the first tool in probe order and uses its real path
#[tokio::test]
async fn test_detect_uses_located_path() {
    let dir = tempfile::tempdir().unwrap();
    install_fake(dir.path(), "pacman");
    install_fake(dir.path(), "rpm");

    let runner = MockProcessRunner::new();
    let d = dispatcher(&runner, WhichLocator::with_search_path(dir.path()));

    let backend = d.detect(System::Linux).unwrap();
    assert_eq!(backend.package_type(), PackageType::Pacman);

    let expected = dir.path().join("pacman").display().to_string();
    assert_eq!(backend.exec_path(), expected);

    backend.update_index().await.unwrap();
    assert_eq!(runner.invocations()[0].args, vec![expected, "-Sy".to_string()]);
}

/// Test 2: nothing on the search path
#[test]
fn test_detect_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    let runner = MockProcessRunner::new();
    let d = dispatcher(&runner, WhichLocator::with_search_path(dir.path()));

    let err = d.detect(System::Linux).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("no package manager found"));
}

/// Test 3: select falls back to detect only for unknown distributions
#[test]
fn test_select_unknown_distro() {
    let dir = tempfile::tempdir().unwrap();
    install_fake(dir.path(), "emerge");

    let runner = MockProcessRunner::new();
    let d = dispatcher(&runner, WhichLocator::with_search_path(dir.path()));

    let gentoo = Platform::new(System::Linux, Distro::Unknown);
    assert_eq!(d.select(&gentoo).unwrap().package_type(), PackageType::Ebuild);

    // table lookup ignores what is installed
    let centos7 = Platform::new(System::Linux, Distro::CentOS).with_version("7.9.2009");
    let backend = d.select(&centos7).unwrap();
    assert_eq!(backend.package_type(), PackageType::Yum);
    assert_eq!(backend.exec_path(), "/usr/bin/yum");
}

/// Test 4: the real probe yields a platform the dispatcher can handle
#[test]
fn test_real_platform_probe() {
    let platform = OsReleaseProbe::new().detect().unwrap();
    assert_eq!(Some(platform.system), System::current());

    let service = Dispatcher::service_type_for(platform.system);
    assert!(!service.executable().is_empty());
}
