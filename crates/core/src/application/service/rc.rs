// System: FreeBSD rc.d

use async_trait::async_trait;
use tracing::info;

use super::{check_service, service_command, ServiceManager};
use crate::application::command::CommandSpec;
use crate::application::package::ProviderContext;
use crate::domain::ServiceType;
use crate::error::Result;

const SYSRC: &str = "sysrc";

pub struct RcManager {
    cmd: CommandSpec,
    sysrc: CommandSpec,
    ctx: ProviderContext,
}

impl RcManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        let cmd = service_command(ServiceType::Rc.executable(), &ctx.config);
        let sysrc = cmd.for_program(SYSRC);

        Self {
            cmd,
            sysrc,
            ctx: ctx.clone(),
        }
    }

    async fn run(&self, name: &str, verb: &str) -> Result<()> {
        self.cmd
            .derive([name, verb])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    /// Set `<name>_enable` in rc.conf
    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let value = if enabled { "YES" } else { "NO" };
        self.sysrc
            .derive([format!("{}_enable={}", name, value)])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceManager for RcManager {
    fn service_type(&self) -> ServiceType {
        ServiceType::Rc
    }

    async fn start(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "rc", service = %name, "Starting service");
        self.run(name, "start").await
    }

    async fn stop(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "rc", service = %name, "Stopping service");
        self.run(name, "stop").await
    }

    async fn restart(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "rc", service = %name, "Restarting service");
        self.run(name, "restart").await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "rc", service = %name, "Enabling service");
        self.set_enabled(name, true).await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "rc", service = %name, "Disabling service");
        self.set_enabled(name, false).await
    }
}
