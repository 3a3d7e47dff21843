// System: macOS launchd

use async_trait::async_trait;
use tracing::info;

use super::{check_service, service_command, ServiceManager};
use crate::application::command::CommandSpec;
use crate::application::package::ProviderContext;
use crate::domain::ServiceType;
use crate::error::Result;

const ALREADY_LOADED: &str = "service already loaded";
const NOT_LOADED: &str = "Could not find specified service";
const IN_PROGRESS: &str = "Operation now in progress";

pub struct LaunchdManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl LaunchdManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        Self {
            cmd: service_command(ServiceType::Launchd.executable(), &ctx.config),
            ctx: ctx.clone(),
        }
    }
}

#[async_trait]
impl ServiceManager for LaunchdManager {
    fn service_type(&self) -> ServiceType {
        ServiceType::Launchd
    }

    async fn start(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "launchd", service = %name, "Loading service");
        self.cmd
            .derive(["load", "-F", name])
            .allow_stderr(ALREADY_LOADED)
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "launchd", service = %name, "Unloading service");
        self.cmd
            .derive(["unload", "-F", name])
            .allow_stderr(NOT_LOADED)
            .allow_stderr(IN_PROGRESS)
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn enable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "launchd", service = %name, "Enabling service");
        self.cmd
            .derive(["enable", name])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn disable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "launchd", service = %name, "Disabling service");
        self.cmd
            .derive(["disable", name])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }
}
