// Package Providers
// One backend per package manager, all behind the PackageManager contract

use async_trait::async_trait;
use std::sync::Arc;

use super::command::CommandSpec;
use super::config::ProviderConfig;
use super::constants::LOCALE_ENV;
use crate::domain::PackageType;
use crate::error::{AppError, Result};
use crate::port::{KeyFetcher, ProcessRunner};

pub mod apt;
pub mod brew;
pub mod dnf;
pub mod emerge;
pub mod freebsd_pkg;
pub mod pacman;
pub mod rpm;
pub mod yum;
pub mod zypper;

mod repo_file;

pub use apt::AptManager;
pub use brew::BrewManager;
pub use dnf::DnfManager;
pub use emerge::EmergeManager;
pub use freebsd_pkg::FreeBsdPkgManager;
pub use pacman::PacmanManager;
pub use rpm::RpmManager;
pub use yum::YumManager;
pub use zypper::ZypperManager;

/// Collaborators shared by every provider
#[derive(Clone)]
pub struct ProviderContext {
    pub runner: Arc<dyn ProcessRunner>,
    pub fetcher: Arc<dyn KeyFetcher>,
    pub config: ProviderConfig,
}

impl ProviderContext {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        fetcher: Arc<dyn KeyFetcher>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            runner,
            fetcher,
            config,
        }
    }
}

/// Package manager contract
///
/// Each method builds the backend's argument vector, runs it through the
/// provider's [`CommandSpec`] and returns a uniform error. Capabilities a
/// backend lacks return `AppError::Unsupported` (the default bodies below).
#[async_trait]
pub trait PackageManager: Send + Sync {
    fn package_type(&self) -> PackageType;

    /// Base command descriptor (program = executable path)
    fn command(&self) -> &CommandSpec;

    /// Override the executable path (e.g. the one found on `$PATH`)
    fn set_exec_path(&mut self, path: String);

    fn exec_path(&self) -> &str {
        self.command().program()
    }

    /// Install packages
    async fn install(&self, names: &[&str]) -> Result<()>;

    /// Remove packages
    async fn remove(&self, names: &[&str]) -> Result<()>;

    /// Remove packages and their configuration files
    ///
    /// Same as `remove` unless the backend has a distinct purge verb.
    async fn purge(&self, names: &[&str]) -> Result<()> {
        self.remove(names).await
    }

    /// Resynchronize the package index files from their sources
    async fn update_index(&self) -> Result<()>;

    /// Upgrade all installed packages
    async fn upgrade(&self) -> Result<()>;

    /// Erase downloaded packages and orphaned dependencies
    async fn clean(&self) -> Result<()>;

    /// Download an OpenPGP key and add it to the system
    async fn import_key(&self, _alias: &str, _url: &str) -> Result<()> {
        Err(AppError::unsupported(self.package_type(), "import_key"))
    }

    /// Import an OpenPGP key from a keyserver (empty `server` = default)
    async fn import_key_from_keyserver(
        &self,
        _alias: &str,
        _server: &str,
        _key_id: &str,
    ) -> Result<()> {
        Err(AppError::unsupported(
            self.package_type(),
            "import_key_from_keyserver",
        ))
    }

    async fn remove_key(&self, _alias: &str) -> Result<()> {
        Err(AppError::unsupported(self.package_type(), "remove_key"))
    }

    async fn add_repo(&self, _alias: &str, _urls: &[&str]) -> Result<()> {
        Err(AppError::unsupported(self.package_type(), "add_repo"))
    }

    async fn remove_repo(&self, _alias: &str) -> Result<()> {
        Err(AppError::unsupported(self.package_type(), "remove_repo"))
    }
}

/// Closed set of package backends
pub enum PackageBackend {
    Deb(AptManager),
    Dnf(DnfManager),
    Ebuild(EmergeManager),
    Pacman(PacmanManager),
    Rpm(RpmManager),
    Yum(YumManager),
    Zypp(ZypperManager),
    Brew(BrewManager),
    Pkg(FreeBsdPkgManager),
}

impl PackageBackend {
    /// Build the backend for a package type
    pub fn new(pkg: PackageType, ctx: &ProviderContext) -> Self {
        match pkg {
            PackageType::Deb => PackageBackend::Deb(AptManager::new(ctx)),
            PackageType::Dnf => PackageBackend::Dnf(DnfManager::new(ctx)),
            PackageType::Ebuild => PackageBackend::Ebuild(EmergeManager::new(ctx)),
            PackageType::Pacman => PackageBackend::Pacman(PacmanManager::new(ctx)),
            PackageType::Rpm => PackageBackend::Rpm(RpmManager::new(ctx)),
            PackageType::Yum => PackageBackend::Yum(YumManager::new(ctx)),
            PackageType::Zypp => PackageBackend::Zypp(ZypperManager::new(ctx)),
            PackageType::Brew => PackageBackend::Brew(BrewManager::new(ctx)),
            PackageType::Pkg => PackageBackend::Pkg(FreeBsdPkgManager::new(ctx)),
        }
    }

    pub fn as_manager(&self) -> &dyn PackageManager {
        match self {
            PackageBackend::Deb(m) => m,
            PackageBackend::Dnf(m) => m,
            PackageBackend::Ebuild(m) => m,
            PackageBackend::Pacman(m) => m,
            PackageBackend::Rpm(m) => m,
            PackageBackend::Yum(m) => m,
            PackageBackend::Zypp(m) => m,
            PackageBackend::Brew(m) => m,
            PackageBackend::Pkg(m) => m,
        }
    }

    fn as_manager_mut(&mut self) -> &mut dyn PackageManager {
        match self {
            PackageBackend::Deb(m) => m,
            PackageBackend::Dnf(m) => m,
            PackageBackend::Ebuild(m) => m,
            PackageBackend::Pacman(m) => m,
            PackageBackend::Rpm(m) => m,
            PackageBackend::Yum(m) => m,
            PackageBackend::Zypp(m) => m,
            PackageBackend::Brew(m) => m,
            PackageBackend::Pkg(m) => m,
        }
    }
}

impl std::fmt::Debug for PackageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageBackend")
            .field("type", &self.package_type())
            .field("exec_path", &self.exec_path())
            .finish()
    }
}

#[async_trait]
impl PackageManager for PackageBackend {
    fn package_type(&self) -> PackageType {
        self.as_manager().package_type()
    }

    fn command(&self) -> &CommandSpec {
        self.as_manager().command()
    }

    fn set_exec_path(&mut self, path: String) {
        self.as_manager_mut().set_exec_path(path)
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        self.as_manager().install(names).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        self.as_manager().remove(names).await
    }

    async fn purge(&self, names: &[&str]) -> Result<()> {
        self.as_manager().purge(names).await
    }

    async fn update_index(&self) -> Result<()> {
        self.as_manager().update_index().await
    }

    async fn upgrade(&self) -> Result<()> {
        self.as_manager().upgrade().await
    }

    async fn clean(&self) -> Result<()> {
        self.as_manager().clean().await
    }

    async fn import_key(&self, alias: &str, url: &str) -> Result<()> {
        self.as_manager().import_key(alias, url).await
    }

    async fn import_key_from_keyserver(
        &self,
        alias: &str,
        server: &str,
        key_id: &str,
    ) -> Result<()> {
        self.as_manager()
            .import_key_from_keyserver(alias, server, key_id)
            .await
    }

    async fn remove_key(&self, alias: &str) -> Result<()> {
        self.as_manager().remove_key(alias).await
    }

    async fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        self.as_manager().add_repo(alias, urls).await
    }

    async fn remove_repo(&self, alias: &str) -> Result<()> {
        self.as_manager().remove_repo(alias).await
    }
}

// ============================================================================
// Helpers shared by the backends
// ============================================================================

/// Base descriptor for a package manager: LANG=C, configured timeout and
/// elevation, the backend's acceptance set
pub(crate) fn base_command(
    pkg: PackageType,
    config: &ProviderConfig,
    accepted: &[i32],
) -> CommandSpec {
    CommandSpec::new(pkg.default_path())
        .env(LOCALE_ENV.0, LOCALE_ENV.1)
        .timeout(config.package_timeout)
        .accept_exit_codes(accepted.iter().copied())
        .elevate(config.elevation.clone())
}

/// Package names must be present and must not look like options
pub(crate) fn check_names(names: &[&str]) -> Result<()> {
    if names.is_empty() {
        return Err(AppError::InvalidInput("no package names given".to_string()));
    }
    if let Some(bad) = names.iter().find(|n| n.is_empty() || n.starts_with('-')) {
        return Err(AppError::InvalidInput(format!("invalid package name: {:?}", bad)));
    }
    Ok(())
}

/// Aliases end up in file names: no separators, no parent references
pub(crate) fn check_alias(alias: &str) -> Result<()> {
    if alias.is_empty()
        || alias.starts_with('-')
        || alias.starts_with('.')
        || alias.contains(['/', '\\'])
        || alias.contains(char::is_whitespace)
    {
        return Err(AppError::InvalidInput(format!("invalid alias: {:?}", alias)));
    }
    Ok(())
}

pub(crate) fn check_urls(urls: &[&str]) -> Result<()> {
    if urls.is_empty() {
        return Err(AppError::InvalidInput("no repository URL given".to_string()));
    }
    if let Some(bad) = urls.iter().find(|u| u.is_empty() || u.starts_with('-')) {
        return Err(AppError::InvalidInput(format!("invalid URL: {:?}", bad)));
    }
    Ok(())
}
