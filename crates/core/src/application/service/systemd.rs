// System: Linux with systemd

use async_trait::async_trait;
use tracing::{debug, info};

use super::{check_service, service_command, ServiceManager};
use crate::application::command::CommandSpec;
use crate::application::constants::SYSTEMCTL_IS_ACTIVE_EXIT_CODES;
use crate::application::package::ProviderContext;
use crate::domain::ServiceType;
use crate::error::Result;

pub struct SystemdManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl SystemdManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        Self {
            cmd: service_command(ServiceType::Systemd.executable(), &ctx.config),
            ctx: ctx.clone(),
        }
    }

    async fn run(&self, verb: &str, name: &str) -> Result<()> {
        self.cmd
            .derive([verb, name])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    /// `systemctl is-active`: inactive (3) and unknown (4) units are not errors
    pub async fn is_active(&self, name: &str) -> Result<bool> {
        check_service(name)?;
        let output = self
            .cmd
            .derive(["is-active", name])
            .accept_exit_codes(SYSTEMCTL_IS_ACTIVE_EXIT_CODES.iter().copied())
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(output.stdout.starts_with(b"active"))
    }
}

#[async_trait]
impl ServiceManager for SystemdManager {
    fn service_type(&self) -> ServiceType {
        ServiceType::Systemd
    }

    async fn start(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "systemd", service = %name, "Starting service");
        self.run("start", name).await
    }

    async fn stop(&self, name: &str) -> Result<()> {
        check_service(name)?;
        if !self.is_active(name).await? {
            debug!(service = %name, "Service not active, nothing to stop");
            return Ok(());
        }
        info!(backend = "systemd", service = %name, "Stopping service");
        self.run("stop", name).await
    }

    async fn restart(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "systemd", service = %name, "Restarting service");
        self.run("restart", name).await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "systemd", service = %name, "Enabling service");
        self.run("enable", name).await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "systemd", service = %name, "Disabling service");
        self.run("disable", name).await
    }
}
