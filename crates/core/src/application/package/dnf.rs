// Distro: Fedora >= 22, CentOS >= 8, RHEL >= 8

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::{base_command, check_alias, check_names, check_urls, repo_file, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::application::constants::DNF_ACCEPTED_EXIT_CODES;
use crate::domain::PackageType;
use crate::error::Result;

/// Dandified YUM
pub struct DnfManager {
    cmd: CommandSpec,
    rpm: CommandSpec,
    ctx: ProviderContext,
}

impl DnfManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        let cmd = base_command(PackageType::Dnf, &ctx.config, DNF_ACCEPTED_EXIT_CODES);
        let rpm = cmd.for_program(PackageType::Rpm.default_path());

        Self {
            cmd,
            rpm,
            ctx: ctx.clone(),
        }
    }

    pub fn repository(&self, alias: &str) -> PathBuf {
        self.ctx
            .config
            .paths
            .yum_repos
            .join(format!("{}.repo", alias))
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
impl PackageManager for DnfManager {
    fn package_type(&self) -> PackageType {
        PackageType::Dnf
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "dnf", packages = ?names, "Installing packages");
        self.run(["install", "-y"].iter().chain(names)).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "dnf", packages = ?names, "Removing packages");
        self.run(["remove", "-y"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "dnf", "Updating package index");
        self.run(["check-update"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "dnf", "Upgrading packages");
        self.run(["upgrade", "-y"]).await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "dnf", "Cleaning");
        self.run(["autoremove", "-y"]).await?;
        self.run(["clean", "all"]).await
    }

    async fn import_key(&self, alias: &str, url: &str) -> Result<()> {
        check_alias(alias)?;
        check_urls(&[url])?;
        info!(backend = "dnf", alias = %alias, url = %url, "Importing key");
        self.rpm
            .derive(["--import", url])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        check_alias(alias)?;
        check_urls(urls)?;
        info!(backend = "dnf", alias = %alias, urls = ?urls, "Adding repository");

        let contents = repo_file::yum_repo(self.ctx.fetcher.as_ref(), alias, urls).await?;
        repo_file::write(&self.repository(alias), &contents).await
    }

    async fn remove_repo(&self, alias: &str) -> Result<()> {
        check_alias(alias)?;
        info!(backend = "dnf", alias = %alias, "Removing repository");
        repo_file::remove(&self.repository(alias)).await
    }
}
