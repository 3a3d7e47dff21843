// System: Windows Service Control Manager
// No LANG override and no elevation prefix; the caller must already be elevated.

use async_trait::async_trait;
use tracing::info;

use super::{check_service, ServiceManager};
use crate::application::command::CommandSpec;
use crate::application::package::ProviderContext;
use crate::domain::ServiceType;
use crate::error::Result;

const NET: &str = "net";
const ALREADY_STARTED: &str = "already been started";
const NOT_STARTED: &str = "is not started";

pub struct WindowsScmManager {
    net: CommandSpec,
    sc: CommandSpec,
    ctx: ProviderContext,
}

impl WindowsScmManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        let net = CommandSpec::new(NET).timeout(ctx.config.service_timeout);
        let sc = net.for_program(ServiceType::WindowsScm.executable());

        Self {
            net,
            sc,
            ctx: ctx.clone(),
        }
    }

    /// `sc config <name> start= <mode>`; "start=" and the mode are separate arguments
    async fn set_start_mode(&self, name: &str, mode: &str) -> Result<()> {
        self.sc
            .derive(["config", name, "start=", mode])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceManager for WindowsScmManager {
    fn service_type(&self) -> ServiceType {
        ServiceType::WindowsScm
    }

    async fn start(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "scm", service = %name, "Starting service");
        self.net
            .derive(["start", name])
            .allow_stderr(ALREADY_STARTED)
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "scm", service = %name, "Stopping service");
        self.net
            .derive(["stop", name])
            .allow_stderr(NOT_STARTED)
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn enable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "scm", service = %name, "Enabling service");
        self.set_start_mode(name, "demand").await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        check_service(name)?;
        info!(backend = "scm", service = %name, "Disabling service");
        self.set_start_mode(name, "disabled").await
    }
}
