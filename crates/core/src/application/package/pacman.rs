// Distro: Arch Linux, Manjaro

use async_trait::async_trait;
use tracing::info;

use super::{base_command, check_alias, check_names, check_urls, repo_file, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::application::constants::PACMAN_ACCEPTED_EXIT_CODES;
use crate::domain::PackageType;
use crate::error::{AppError, Result};

/// paccache ships with pacman-contrib
const PACCACHE: &str = "paccache";

pub struct PacmanManager {
    cmd: CommandSpec,
    ctx: ProviderContext,
}

impl PacmanManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        Self {
            cmd: base_command(PackageType::Pacman, &ctx.config, PACMAN_ACCEPTED_EXIT_CODES),
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

    async fn read_conf(&self) -> Result<String> {
        let path = &self.ctx.config.paths.pacman_conf;
        match tokio::fs::read_to_string(path).await {
            Ok(conf) => Ok(conf),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PackageManager for PacmanManager {
    fn package_type(&self) -> PackageType {
        PackageType::Pacman
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "pacman", packages = ?names, "Installing packages");
        self.run(
            ["-S", "--needed", "--noconfirm", "--noprogressbar"]
                .iter()
                .chain(names),
        )
        .await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "pacman", packages = ?names, "Removing packages");
        self.run(["-Rs", "--noconfirm"].iter().chain(names)).await
    }

    async fn purge(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "pacman", packages = ?names, "Purging packages");
        self.run(["-Rsn", "--noconfirm"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "pacman", "Updating package index");
        self.run(["-Sy"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "pacman", "Upgrading packages");
        self.run(["-Syu", "--noconfirm"]).await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "pacman", "Cleaning package cache");
        self.cmd
            .for_program(PACCACHE)
            .accept_exit_codes(PACMAN_ACCEPTED_EXIT_CODES.iter().copied())
            .arg("-r")
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        check_alias(alias)?;
        check_urls(urls)?;
        info!(backend = "pacman", alias = %alias, urls = ?urls, "Adding repository");

        let conf = self.read_conf().await?;
        let updated = repo_file::pacman_add_section(&conf, alias, urls)?;
        repo_file::write(&self.ctx.config.paths.pacman_conf, updated.as_bytes()).await?;

        self.update_index().await
    }

    async fn remove_repo(&self, alias: &str) -> Result<()> {
        check_alias(alias)?;
        info!(backend = "pacman", alias = %alias, "Removing repository");

        let conf = self.read_conf().await?;
        let updated = repo_file::pacman_remove_section(&conf, alias)?;
        repo_file::write(&self.ctx.config.paths.pacman_conf, updated.as_bytes()).await?;

        self.update_index().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::{ProviderConfig, RepoPaths};
    use crate::application::package::test_support::{context, context_with};
    use crate::port::key_fetcher::mocks::MockKeyFetcher;
    use crate::port::process_runner::mocks::MockProcessRunner;

    #[tokio::test]
    async fn test_argument_vectors() {
        let runner = MockProcessRunner::new();
        let pacman = PacmanManager::new(&context(&runner));

        pacman.install(&["git"]).await.unwrap();
        pacman.remove(&["git"]).await.unwrap();
        pacman.purge(&["git"]).await.unwrap();
        pacman.clean().await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "sudo /usr/bin/pacman -S --needed --noconfirm --noprogressbar git",
                "sudo /usr/bin/pacman -Rs --noconfirm git",
                "sudo /usr/bin/pacman -Rsn --noconfirm git",
                "sudo paccache -r",
            ]
        );
    }

    #[tokio::test]
    async fn test_repo_section_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RepoPaths::under(dir.path());
        let original = "[options]\nArchitecture = auto\n\n[core]\nInclude = /etc/pacman.d/mirrorlist\n";
        std::fs::create_dir_all(paths.pacman_conf.parent().unwrap()).unwrap();
        std::fs::write(&paths.pacman_conf, original).unwrap();

        let runner = MockProcessRunner::new();
        let config = ProviderConfig {
            paths: paths.clone(),
            ..Default::default()
        };
        let pacman = PacmanManager::new(&context_with(&runner, MockKeyFetcher::new(), config));

        pacman
            .add_repo("custom", &["https://repo.example.org/$arch"])
            .await
            .unwrap();
        let conf = std::fs::read_to_string(&paths.pacman_conf).unwrap();
        assert!(conf.contains("[custom]\nServer = https://repo.example.org/$arch\n"));

        pacman.remove_repo("custom").await.unwrap();
        assert_eq!(std::fs::read_to_string(&paths.pacman_conf).unwrap(), original);

        assert!(pacman.remove_repo("custom").await.unwrap_err().is_not_found());
        assert_eq!(
            runner.command_lines(),
            vec!["sudo /usr/bin/pacman -Sy", "sudo /usr/bin/pacman -Sy"]
        );
    }

    #[tokio::test]
    async fn test_key_operations_unsupported() {
        let runner = MockProcessRunner::new();
        let pacman = PacmanManager::new(&context(&runner));

        assert!(pacman
            .import_key("x", "https://x/key.asc")
            .await
            .unwrap_err()
            .is_unsupported());
        assert!(pacman.remove_key("x").await.unwrap_err().is_unsupported());
    }
}
