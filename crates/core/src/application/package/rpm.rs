// Plain RPM: local package files only, no repositories or index

use async_trait::async_trait;
use tracing::info;

use super::{base_command, check_alias, check_names, check_urls, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::domain::PackageType;
use crate::error::{AppError, Result};

pub struct RpmManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl RpmManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        Self {
            cmd: base_command(PackageType::Rpm, &ctx.config, &[]),
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
impl PackageManager for RpmManager {
    fn package_type(&self) -> PackageType {
        PackageType::Rpm
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "rpm", packages = ?names, "Installing packages");
        self.run(["-i"].iter().chain(names)).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "rpm", packages = ?names, "Removing packages");
        self.run(["-e"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        Err(AppError::unsupported(PackageType::Rpm, "update_index"))
    }

    async fn upgrade(&self) -> Result<()> {
        Err(AppError::unsupported(PackageType::Rpm, "upgrade"))
    }

    async fn clean(&self) -> Result<()> {
        Err(AppError::unsupported(PackageType::Rpm, "clean"))
    }

    async fn import_key(&self, alias: &str, url: &str) -> Result<()> {
        check_alias(alias)?;
        check_urls(&[url])?;
        info!(backend = "rpm", alias = %alias, url = %url, "Importing key");
        self.run(["--import", url]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::package::test_support::context;
    use crate::domain::ProcessOutput;
    use crate::port::process_runner::mocks::MockProcessRunner;

    #[tokio::test]
    async fn test_install_and_remove() {
        let runner = MockProcessRunner::new();
        let rpm = RpmManager::new(&context(&runner));

        rpm.install(&["./pkg.rpm"]).await.unwrap();
        rpm.purge(&["pkg"]).await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec!["sudo /usr/bin/rpm -i ./pkg.rpm", "sudo /usr/bin/rpm -e pkg"]
        );
    }

    #[tokio::test]
    async fn test_any_nonzero_exit_fails() {
        let runner = MockProcessRunner::with_outputs([ProcessOutput::exit_code(1)]);
        let rpm = RpmManager::new(&context(&runner));

        assert_eq!(rpm.remove(&["pkg"]).await.unwrap_err().exit_code(), Some(1));
    }

    #[tokio::test]
    async fn test_index_operations_unsupported() {
        let runner = MockProcessRunner::new();
        let rpm = RpmManager::new(&context(&runner));

        assert!(rpm.update_index().await.unwrap_err().is_unsupported());
        assert!(rpm.upgrade().await.unwrap_err().is_unsupported());
        assert!(rpm.clean().await.unwrap_err().is_unsupported());
        assert!(rpm.add_repo("x", &["https://x"]).await.unwrap_err().is_unsupported());
        assert_eq!(runner.call_count(), 0);
    }
}
