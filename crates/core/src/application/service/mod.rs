// Service Providers
// Start/stop/enable system services through the platform's service manager

use async_trait::async_trait;

use super::command::CommandSpec;
use super::config::ProviderConfig;
use super::constants::LOCALE_ENV;
use super::package::ProviderContext;
use crate::domain::ServiceType;
use crate::error::{AppError, Result};

pub mod launchd;
pub mod rc;
pub mod scm;
pub mod systemd;

pub use launchd::LaunchdManager;
pub use rc::RcManager;
pub use scm::WindowsScmManager;
pub use systemd::SystemdManager;

/// Service manager contract
#[async_trait]
pub trait ServiceManager: Send + Sync {
    fn service_type(&self) -> ServiceType;

    async fn start(&self, name: &str) -> Result<()>;

    /// Stop a service; stopping a service that is not running succeeds
    async fn stop(&self, name: &str) -> Result<()>;

    /// Stop then start, unless the backend has a native restart
    async fn restart(&self, name: &str) -> Result<()> {
        self.stop(name).await?;
        self.start(name).await
    }

    /// Start the service at boot
    async fn enable(&self, name: &str) -> Result<()>;

    async fn disable(&self, name: &str) -> Result<()>;
}

/// Closed set of service backends
pub enum ServiceBackend {
    Systemd(SystemdManager),
    Rc(RcManager),
    Launchd(LaunchdManager),
    WindowsScm(WindowsScmManager),
}

impl ServiceBackend {
    pub fn new(service: ServiceType, ctx: &ProviderContext) -> Self {
        match service {
            ServiceType::Systemd => ServiceBackend::Systemd(SystemdManager::new(ctx)),
            ServiceType::Rc => ServiceBackend::Rc(RcManager::new(ctx)),
            ServiceType::Launchd => ServiceBackend::Launchd(LaunchdManager::new(ctx)),
            ServiceType::WindowsScm => ServiceBackend::WindowsScm(WindowsScmManager::new(ctx)),
        }
    }

    pub fn as_manager(&self) -> &dyn ServiceManager {
        match self {
            ServiceBackend::Systemd(m) => m,
            ServiceBackend::Rc(m) => m,
            ServiceBackend::Launchd(m) => m,
            ServiceBackend::WindowsScm(m) => m,
        }
    }
}

impl std::fmt::Debug for ServiceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ServiceBackend")
            .field(&self.service_type())
            .finish()
    }
}

#[async_trait]
impl ServiceManager for ServiceBackend {
    fn service_type(&self) -> ServiceType {
        self.as_manager().service_type()
    }

    async fn start(&self, name: &str) -> Result<()> {
        self.as_manager().start(name).await
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.as_manager().stop(name).await
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.as_manager().restart(name).await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        self.as_manager().enable(name).await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        self.as_manager().disable(name).await
    }
}

/// Base descriptor for a service tool: LANG=C, service timeout, elevation
pub(crate) fn service_command(program: &str, config: &ProviderConfig) -> CommandSpec {
    CommandSpec::new(program)
        .env(LOCALE_ENV.0, LOCALE_ENV.1)
        .timeout(config.service_timeout)
        .elevate(config.elevation.clone())
}

pub(crate) fn check_service(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('-') || name.contains(char::is_whitespace) {
        return Err(AppError::InvalidInput(format!(
            "invalid service name: {:?}",
            name
        )));
    }
    Ok(())
}
