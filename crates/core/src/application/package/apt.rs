// Distro: Debian, Ubuntu
// 'apt' is for the terminal; 'apt-get' gives stable, parseable output for scripts.

use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::{base_command, check_alias, check_names, check_urls, repo_file, PackageManager, ProviderContext};
use crate::application::command::CommandSpec;
use crate::application::constants::{DEBIAN_FRONTEND_ENV, DEB_ACCEPTED_EXIT_CODES};
use crate::domain::PackageType;
use crate::error::{AppError, Result};

/// Package manager of Debian-based systems
pub struct AptManager {
    cmd: CommandSpec,
    gpg: CommandSpec,
    ctx: ProviderContext,
    codename: Option<String>,
}

impl AptManager {
    pub fn new(ctx: &ProviderContext) -> Self {
        let cmd = base_command(PackageType::Deb, &ctx.config, DEB_ACCEPTED_EXIT_CODES)
            .env(DEBIAN_FRONTEND_ENV.0, DEBIAN_FRONTEND_ENV.1);
        let gpg = cmd.for_program(ctx.config.gpg.clone());

        Self {
            cmd,
            gpg,
            ctx: ctx.clone(),
            codename: ctx.config.codename.clone(),
        }
    }

    /// Override the release code name written into source lists (e.g. "bookworm")
    pub fn with_codename(mut self, codename: Option<String>) -> Self {
        self.codename = codename;
        self
    }

    pub fn keyring(&self, alias: &str) -> PathBuf {
        self.ctx
            .config
            .paths
            .apt_keyrings
            .join(format!("{}-archive-keyring.gpg", alias))
    }

    pub fn repository(&self, alias: &str) -> PathBuf {
        self.ctx
            .config
            .paths
            .apt_sources
            .join(format!("{}.list", alias))
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
impl PackageManager for AptManager {
    fn package_type(&self) -> PackageType {
        PackageType::Deb
    }

    fn command(&self) -> &CommandSpec {
        &self.cmd
    }

    fn set_exec_path(&mut self, path: String) {
        self.cmd.set_program(path);
    }

    async fn install(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "apt-get", packages = ?names, "Installing packages");
        self.run(["install", "-y"].iter().chain(names)).await
    }

    async fn remove(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "apt-get", packages = ?names, "Removing packages");
        self.run(["remove", "-y"].iter().chain(names)).await
    }

    async fn purge(&self, names: &[&str]) -> Result<()> {
        check_names(names)?;
        info!(backend = "apt-get", packages = ?names, "Purging packages");
        self.run(["purge", "-y"].iter().chain(names)).await
    }

    async fn update_index(&self) -> Result<()> {
        info!(backend = "apt-get", "Updating package index");
        self.run(["update", "-qq"]).await
    }

    async fn upgrade(&self) -> Result<()> {
        info!(backend = "apt-get", "Upgrading packages");
        self.run(["upgrade", "-y"]).await
    }

    async fn clean(&self) -> Result<()> {
        info!(backend = "apt-get", "Cleaning");
        self.run(["autoremove", "-y"]).await?;
        self.run(["clean"]).await
    }

    async fn import_key(&self, alias: &str, url: &str) -> Result<()> {
        check_alias(alias)?;
        let file = url.rsplit('/').next().unwrap_or_default();
        if !file.contains('.') {
            return Err(AppError::InvalidInput(format!(
                "the URL has no key file: {}",
                url
            )));
        }
        info!(backend = "apt-get", alias = %alias, url = %url, "Importing key");

        let key = self.ctx.fetcher.fetch(url).await?;

        // gpg reads the armored key from a file; the staging file lives until the call returns
        let mut staged = tempfile::NamedTempFile::new()?;
        staged.write_all(&key)?;
        staged.flush()?;

        let keyring = self.keyring(alias);
        self.gpg
            .derive([
                "--batch".to_string(),
                "--yes".to_string(),
                "--dearmor".to_string(),
                "--output".to_string(),
                keyring.display().to_string(),
                staged.path().display().to_string(),
            ])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn import_key_from_keyserver(
        &self,
        alias: &str,
        server: &str,
        key_id: &str,
    ) -> Result<()> {
        check_alias(alias)?;
        if key_id.is_empty() || key_id.starts_with('-') {
            return Err(AppError::InvalidInput(format!("invalid key id: {:?}", key_id)));
        }
        let server = if server.is_empty() {
            self.ctx.config.default_keyserver.as_str()
        } else {
            server
        };
        info!(backend = "apt-get", alias = %alias, server = %server, "Importing key from keyserver");

        self.gpg
            .derive([
                "--no-default-keyring".to_string(),
                "--keyring".to_string(),
                self.keyring(alias).display().to_string(),
                "--keyserver".to_string(),
                server.to_string(),
                "--recv-keys".to_string(),
                key_id.to_string(),
            ])
            .run(self.ctx.runner.as_ref())
            .await?;
        Ok(())
    }

    async fn remove_key(&self, alias: &str) -> Result<()> {
        check_alias(alias)?;
        info!(backend = "apt-get", alias = %alias, "Removing key");
        repo_file::remove(&self.keyring(alias)).await
    }

    async fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        check_alias(alias)?;
        check_urls(urls)?;
        let codename = self.codename.as_deref().ok_or_else(|| {
            AppError::InvalidInput("distribution code name unknown".to_string())
        })?;
        info!(backend = "apt-get", alias = %alias, urls = ?urls, "Adding repository");

        let keyring = self.keyring(alias);
        let contents: String = urls
            .iter()
            .map(|url| {
                format!(
                    "deb [signed-by={}] {} {} main\n",
                    keyring.display(),
                    url,
                    codename
                )
            })
            .collect();
        repo_file::write(&self.repository(alias), contents.as_bytes()).await?;

        self.update_index().await
    }

    async fn remove_repo(&self, alias: &str) -> Result<()> {
        check_alias(alias)?;
        info!(backend = "apt-get", alias = %alias, "Removing repository");

        repo_file::remove(&self.repository(alias)).await?;
        repo_file::remove_if_exists(&self.keyring(alias)).await?;

        self.update_index().await
    }
}
