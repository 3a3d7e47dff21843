// System: macOS (Homebrew)
// brew refuses to run as root, so it is never elevated.

use async_trait::async_trait;
use tracing::info;

use super::{base_command, check_names, check_urls, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::application::constants::BREW_ACCEPTED_EXIT_CODES;
use crate::domain::PackageType;
use crate::error::{AppError, Result};

pub struct BrewManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl BrewManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        let cmd = base_command(PackageType::Brew, &ctx.config, BREW_ACCEPTED_EXIT_CODES).elevate(None);

        Self {
            cmd,
            ctx: ctx.clone(),
        }
    }

    /// Taps are `user/repo` names, not file names
    fn check_tap(tap: &str) -> Result<()> {
        if tap.is_empty() || tap.starts_with('-') || tap.contains(char::is_whitespace) {
            return Err(AppError::InvalidInput(format!("invalid tap: {:?}", tap)));
        }
        Ok(())
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
impl PackageManager for BrewManager {
    fn package_type(&self) -> PackageType {
        PackageType::Brew
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "brew", packages = ?names, "Installing packages");
        self.run(["install"].iter().chain(names)).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "brew", packages = ?names, "Removing packages");
        self.run(["uninstall"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "brew", "Updating formulae");
        self.run(["update"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "brew", "Upgrading packages");
        self.run(["upgrade"]).await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "brew", "Cleaning");
        self.run(["autoremove"]).await?;
        self.run(["cleanup"]).await
    }

    async fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        Self::check_tap(alias)?;
        check_urls(urls)?;
        info!(backend = "brew", tap = %alias, url = %urls[0], "Tapping repository");
        self.run(["tap", alias, urls[0]]).await
    }

    async fn remove_repo(&self, alias: &str) -> Result<()> {
        Self::check_tap(alias)?;
        info!(backend = "brew", tap = %alias, "Untapping repository");
        self.run(["untap", alias]).await
    }
}
