// Distro: openSUSE Leap / Tumbleweed

use async_trait::async_trait;
use tracing::info;

use super::{base_command, check_alias, check_names, check_urls, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::application::constants::ZYPP_ACCEPTED_EXIT_CODES;
use crate::domain::PackageType;
use crate::error::Result;

pub struct ZypperManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl ZypperManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        let cmd = base_command(PackageType::Zypp, &ctx.config, ZYPP_ACCEPTED_EXIT_CODES)
            .arg("--non-interactive");

        Self {
            cmd,
            ctx: ctx.clone(),
        }
    }

    async fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cmd.derive(args).run(self.ctx.runner.as_ref()).await?;
        Ok(())
    }
}

#[async_trait]
impl PackageManager for ZypperManager {
    fn package_type(&self) -> PackageType {
        PackageType::Zypp
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "zypper", packages = ?names, "Installing packages");
        self.run(["install", "--auto-agree-with-licenses", "-y"].iter().chain(names))
            .await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "zypper", packages = ?names, "Removing packages");
        self.run(["remove", "-y"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "zypper", "Updating package index");
        self.run(["refresh"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "zypper", "Upgrading packages");
        self.run(["up", "--auto-agree-with-licenses", "-y"]).await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "zypper", "Cleaning");
        self.run(["clean"]).await
    }

    async fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        check_alias(alias)?;
        check_urls(urls)?;
        info!(backend = "zypper", alias = %alias, urls = ?urls, "Adding repository");

        // zypper takes one URI per alias
        self.run(["addrepo", "-f", urls[0], alias]).await?;
        self.update_index().await
    }

    async fn remove_repo(&self, alias: &str) -> Result<()> {
        check_alias(alias)?;
        info!(backend = "zypper", alias = %alias, "Removing repository");

        self.run(["removerepo", alias]).await?;
        self.update_index().await
    }
}
