// Distro: Gentoo (Portage)

use async_trait::async_trait;
use tracing::info;

use super::{base_command, check_names, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::domain::PackageType;
use crate::error::Result;

pub struct EmergeManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl EmergeManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        Self {
            cmd: base_command(PackageType::Ebuild, &ctx.config, &[]),
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
impl PackageManager for EmergeManager {
    fn package_type(&self) -> PackageType {
        PackageType::Ebuild
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "emerge", packages = ?names, "Installing packages");
        self.run(names).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "emerge", packages = ?names, "Removing packages");
        self.run(["--unmerge"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "emerge", "Syncing portage tree");
        self.run(["--sync"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "emerge", "Upgrading @world");
        self.run(["--update", "--deep", "--with-bdeps=y", "--newuse", "@world"])
            .await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "emerge", "Removing unneeded packages");
        self.run(["--depclean"]).await
    }
}
