// System: FreeBSD

use async_trait::async_trait;
use tracing::info;

use super::{base_command, check_names, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::application::constants::PKG_ACCEPTED_EXIT_CODES;
use crate::domain::PackageType;
use crate::error::Result;

pub struct FreeBsdPkgManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl FreeBsdPkgManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        Self {
            cmd: base_command(PackageType::Pkg, &ctx.config, PKG_ACCEPTED_EXIT_CODES),
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
impl PackageManager for FreeBsdPkgManager {
    fn package_type(&self) -> PackageType {
        PackageType::Pkg
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "pkg", packages = ?names, "Installing packages");
        self.run(["install", "-y"].iter().chain(names)).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "pkg", packages = ?names, "Removing packages");
        self.run(["delete", "-y"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "pkg", "Updating package index");
        self.run(["update"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "pkg", "Upgrading packages");
        self.run(["upgrade", "-y"]).await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "pkg", "Cleaning");
        self.run(["autoremove", "-y"]).await?;
        self.run(["clean", "-y"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::package::test_support::context;
    use crate::domain::ProcessOutput;
    use crate::port::process_runner::mocks::MockProcessRunner;

    #[tokio::test]
    async fn test_argument_vectors() {
        let runner = MockProcessRunner::new();
        let pkg = FreeBsdPkgManager::new(&context(&runner));

        pkg.install(&["nginx"]).await.unwrap();
        pkg.remove(&["nginx"]).await.unwrap();
        pkg.clean().await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "sudo /usr/sbin/pkg install -y nginx",
                "sudo /usr/sbin/pkg delete -y nginx",
                "sudo /usr/sbin/pkg autoremove -y",
                "sudo /usr/sbin/pkg clean -y",
            ]
        );
    }

    #[tokio::test]
    async fn test_exit_one_is_accepted() {
        let runner = MockProcessRunner::with_outputs([ProcessOutput::exit_code(1)]);
        let pkg = FreeBsdPkgManager::new(&context(&runner));

        assert!(pkg.upgrade().await.is_ok());
        assert!(pkg
            .add_repo("x", &["https://x"])
            .await
            .unwrap_err()
            .is_unsupported());
    }
}
