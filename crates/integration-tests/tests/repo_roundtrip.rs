//! Repository Round-Trip Tests
//!
//! add_repo / remove_repo through the dispatcher against a temporary root

use std::sync::Arc;

use sysmanage_core::application::{
    Dispatcher, PackageBackend, PackageManager, ProviderConfig, ProviderContext, RepoPaths,
};
use sysmanage_core::domain::{Distro, Platform, System};
use sysmanage_core::port::executable_locator::mocks::MockExecutableLocator;
use sysmanage_core::port::key_fetcher::mocks::MockKeyFetcher;
use sysmanage_core::port::process_runner::mocks::MockProcessRunner;
use sysmanage_core::AppError;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

struct Harness {
    root: TempDir,
    runner: MockProcessRunner,
    fetcher: MockKeyFetcher,
    dispatcher: Dispatcher,
}

impl Harness {
    fn new(fetcher: MockKeyFetcher) -> Self {
        let root = tempfile::tempdir().unwrap();
        let runner = MockProcessRunner::new();
        let config = ProviderConfig {
            paths: RepoPaths::under(root.path()),
            ..Default::default()
        };
        let ctx = ProviderContext::new(Arc::new(runner.clone()), Arc::new(fetcher.clone()), config);
        let dispatcher = Dispatcher::new(ctx, Arc::new(MockExecutableLocator::new()));

        Self {
            root,
            runner,
            fetcher,
            dispatcher,
        }
    }

    fn paths(&self) -> RepoPaths {
        RepoPaths::under(self.root.path())
    }

    fn backend(&self, platform: Platform) -> PackageBackend {
        self.dispatcher.resolve(&platform).unwrap()
    }
}

/// Test 1: apt key + repository lifecycle
#[tokio::test]
async fn test_apt_repository_lifecycle() {
    let key_url = "https://download.example.org/linux/debian/gpg.key";
    let h = Harness::new(MockKeyFetcher::new().serve(key_url, "-----BEGIN PGP PUBLIC KEY BLOCK-----"));
    let apt = h.backend(
        Platform::new(System::Linux, Distro::Debian)
            .with_version("12")
            .with_codename("bookworm"),
    );

    assert_ok!(apt.import_key("example", key_url).await);
    assert_ok!(
        apt.add_repo(
            "example",
            &[
                "https://download.example.org/linux/debian",
                "https://mirror.example.org/debian"
            ]
        )
        .await
    );

    let list_path = h.paths().apt_sources.join("example.list");
    let keyring = h.paths().apt_keyrings.join("example-archive-keyring.gpg");
    let list = std::fs::read_to_string(&list_path).unwrap();
    assert_eq!(
        list,
        format!(
            "deb [signed-by={k}] https://download.example.org/linux/debian bookworm main\n\
             deb [signed-by={k}] https://mirror.example.org/debian bookworm main\n",
            k = keyring.display()
        )
    );

    assert_ok!(apt.remove_repo("example").await);
    assert!(!list_path.exists());

    let err = assert_err!(apt.remove_repo("example").await);
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(h.fetcher.requested(), vec![key_url]);
    let lines = h.runner.command_lines();
    assert!(lines[0].starts_with("sudo gpg --batch --yes --dearmor --output "));
    assert_eq!(lines[1], "sudo /usr/bin/apt-get update -qq");
    assert_eq!(lines[2], "sudo /usr/bin/apt-get update -qq");
    assert_eq!(lines.len(), 3);
}

/// Test 2: a failed key download leaves nothing behind and spawns nothing
#[tokio::test]
async fn test_apt_key_download_failure() {
    let h = Harness::new(MockKeyFetcher::new());
    let apt = h.backend(Platform::new(System::Linux, Distro::Ubuntu).with_codename("jammy"));

    let err = assert_err!(apt.import_key("missing", "https://example.org/missing.asc").await);
    assert!(matches!(err, AppError::Download(_)));
    assert_eq!(h.runner.call_count(), 0);
}

/// Test 3: dnf .repo file written from a stanza and from a downloaded file
#[tokio::test]
async fn test_dnf_repository_files() {
    let repo_url = "https://example.org/example.repo";
    let h = Harness::new(MockKeyFetcher::new().serve(repo_url, "[example-upstream]\nbaseurl=https://x\n"));
    let dnf = h.backend(Platform::new(System::Linux, Distro::Fedora).with_version("39"));

    assert_ok!(dnf.add_repo("stanza", &["https://example.org/fedora/39"]).await);
    assert_ok!(dnf.add_repo("upstream", &[repo_url]).await);

    let repos = h.paths().yum_repos;
    let stanza = std::fs::read_to_string(repos.join("stanza.repo")).unwrap();
    assert!(stanza.starts_with("[stanza]\n"));
    assert!(stanza.contains("baseurl=https://example.org/fedora/39\n"));
    assert_eq!(
        std::fs::read_to_string(repos.join("upstream.repo")).unwrap(),
        "[example-upstream]\nbaseurl=https://x\n"
    );

    assert_ok!(dnf.remove_repo("stanza").await);
    assert!(!repos.join("stanza.repo").exists());
    assert!(dnf.remove_repo("stanza").await.unwrap_err().is_not_found());
}

/// Test 4: pacman.conf section added and removed without touching the rest
#[tokio::test]
async fn test_pacman_conf_section() {
    let h = Harness::new(MockKeyFetcher::new());
    let conf_path = h.paths().pacman_conf;
    let original = "[options]\nHoldPkg = pacman glibc\n\n[core]\nInclude = /etc/pacman.d/mirrorlist\n\n[extra]\nInclude = /etc/pacman.d/mirrorlist\n";
    std::fs::create_dir_all(conf_path.parent().unwrap()).unwrap();
    std::fs::write(&conf_path, original).unwrap();

    let pacman = h.backend(Platform::new(System::Linux, Distro::Arch));

    assert_ok!(pacman.add_repo("custom", &["https://repo.example.org/$repo/$arch"]).await);
    let conf = std::fs::read_to_string(&conf_path).unwrap();
    assert!(conf.starts_with(original));
    assert!(conf.ends_with("[custom]\nServer = https://repo.example.org/$repo/$arch\n"));

    assert_ok!(pacman.remove_repo("custom").await);
    assert_eq!(std::fs::read_to_string(&conf_path).unwrap(), original);
}

/// Test 5: repository operations on backends without them
#[tokio::test]
async fn test_unsupported_repository_operations() {
    let h = Harness::new(MockKeyFetcher::new());
    let pkg = h.backend(Platform::new(System::FreeBSD, Distro::Unknown));

    let err = assert_err!(pkg.add_repo("custom", &["https://pkg.example.org"]).await);
    assert!(err.is_unsupported());
    assert_eq!(h.runner.call_count(), 0);
}
