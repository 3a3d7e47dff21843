//! Sysmanage CLI - package and service management across platforms
//! Composition root: wires the system adapters into the dispatcher

mod settings;
mod terminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sysmanage_core::application::{Dispatcher, PackageManager, ProviderContext, ServiceManager};
use sysmanage_core::domain::{PackageType, Platform};
use sysmanage_core::port::{PlatformProbe, ProcessRunner};
use sysmanage_infra_system::{HttpKeyFetcher, OsReleaseProbe, SubprocessRunner, WhichLocator};

use settings::GlobalOpts;
use terminal::TerminalSink;

const DEFAULT_LOG_FILTER: &str = "sysmanage=info";

#[derive(Parser)]
#[command(name = "sysmanage")]
#[command(about = "Cross-platform package and service management", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected platform and the backends selected for it
    Detect {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Package operations
    Pkg {
        /// Force a backend (apt-get, dnf, yum, zypper, pacman, emerge, rpm, brew, pkg)
        #[arg(long = "type")]
        pkg_type: Option<String>,

        #[command(subcommand)]
        op: PkgCommand,
    },

    /// Service operations
    Service {
        #[command(subcommand)]
        op: ServiceCommand,
    },
}

#[derive(Subcommand)]
enum PkgCommand {
    /// Install packages
    Install {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove packages
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove packages and their configuration
    Purge {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Refresh the package index
    Update,
    /// Upgrade installed packages
    Upgrade,
    /// Remove orphans and cached downloads
    Clean,
    /// Download a signing key and install it
    ImportKey { alias: String, url: String },
    /// Receive a signing key from a keyserver
    ImportKeyServer {
        alias: String,
        key_id: String,
        /// Keyserver (default: hkp://keyserver.ubuntu.com:80)
        #[arg(long, default_value = "")]
        server: String,
    },
    /// Remove an installed signing key
    RemoveKey { alias: String },
    /// Add a repository
    AddRepo {
        alias: String,
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Remove a repository
    RemoveRepo { alias: String },
}

#[derive(Subcommand)]
enum ServiceCommand {
    Start { name: String },
    Stop { name: String },
    Restart { name: String },
    /// Start at boot
    Enable { name: String },
    Disable { name: String },
}

#[derive(Serialize, Tabled)]
struct DetectRow {
    property: String,
    value: String,
}

#[derive(Serialize)]
struct DetectReport {
    platform: Platform,
    package_manager: Option<String>,
    package_manager_path: Option<String>,
    service_manager: String,
}

fn init_logging() {
    let log_format =
        std::env::var("SYSMANAGE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // stdout carries command results (and --json); logs go to stderr
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn done(message: impl std::fmt::Display) {
    println!("{}", format!("✓ {}", message).green().bold());
}

async fn run_pkg(dispatcher: &Dispatcher, platform: &Platform, pkg_type: Option<String>, op: PkgCommand) -> Result<()> {
    let backend = match pkg_type {
        Some(name) => {
            let pkg: PackageType = name.parse()?;
            dispatcher.from_type(pkg, Some(platform))
        }
        None => dispatcher
            .select(platform)
            .context("No package manager for this platform")?,
    };
    debug!(backend = ?backend, "Package backend selected");

    match op {
        PkgCommand::Install { names } => {
            backend.install(&strs(&names)).await.context("Install failed")?;
            done(format!("Installed {}", names.join(", ")));
        }
        PkgCommand::Remove { names } => {
            backend.remove(&strs(&names)).await.context("Remove failed")?;
            done(format!("Removed {}", names.join(", ")));
        }
        PkgCommand::Purge { names } => {
            backend.purge(&strs(&names)).await.context("Purge failed")?;
            done(format!("Purged {}", names.join(", ")));
        }
        PkgCommand::Update => {
            backend.update_index().await.context("Index update failed")?;
            done("Package index updated");
        }
        PkgCommand::Upgrade => {
            backend.upgrade().await.context("Upgrade failed")?;
            done("Packages upgraded");
        }
        PkgCommand::Clean => {
            backend.clean().await.context("Clean failed")?;
            done("Cleaned");
        }
        PkgCommand::ImportKey { alias, url } => {
            backend
                .import_key(&alias, &url)
                .await
                .with_context(|| format!("Importing key {} failed", alias))?;
            done(format!("Key {} imported", alias));
        }
        PkgCommand::ImportKeyServer { alias, key_id, server } => {
            backend
                .import_key_from_keyserver(&alias, &server, &key_id)
                .await
                .with_context(|| format!("Receiving key {} failed", key_id))?;
            done(format!("Key {} imported as {}", key_id, alias));
        }
        PkgCommand::RemoveKey { alias } => {
            backend
                .remove_key(&alias)
                .await
                .with_context(|| format!("Removing key {} failed", alias))?;
            done(format!("Key {} removed", alias));
        }
        PkgCommand::AddRepo { alias, urls } => {
            backend
                .add_repo(&alias, &strs(&urls))
                .await
                .with_context(|| format!("Adding repository {} failed", alias))?;
            done(format!("Repository {} added", alias));
        }
        PkgCommand::RemoveRepo { alias } => {
            backend
                .remove_repo(&alias)
                .await
                .with_context(|| format!("Removing repository {} failed", alias))?;
            done(format!("Repository {} removed", alias));
        }
    }

    Ok(())
}

async fn run_service(dispatcher: &Dispatcher, platform: &Platform, op: ServiceCommand) -> Result<()> {
    let backend = dispatcher
        .detect_service(platform.system)
        .context("No service manager for this platform")?;

    match op {
        ServiceCommand::Start { name } => {
            backend.start(&name).await.with_context(|| format!("Starting {} failed", name))?;
            done(format!("{} started", name));
        }
        ServiceCommand::Stop { name } => {
            backend.stop(&name).await.with_context(|| format!("Stopping {} failed", name))?;
            done(format!("{} stopped", name));
        }
        ServiceCommand::Restart { name } => {
            backend.restart(&name).await.with_context(|| format!("Restarting {} failed", name))?;
            done(format!("{} restarted", name));
        }
        ServiceCommand::Enable { name } => {
            backend.enable(&name).await.with_context(|| format!("Enabling {} failed", name))?;
            done(format!("{} enabled", name));
        }
        ServiceCommand::Disable { name } => {
            backend.disable(&name).await.with_context(|| format!("Disabling {} failed", name))?;
            done(format!("{} disabled", name));
        }
    }

    Ok(())
}

fn run_detect(dispatcher: &Dispatcher, platform: Platform, json: bool) -> Result<()> {
    let backend = dispatcher.select(&platform).ok();
    let report = DetectReport {
        package_manager: backend.as_ref().map(|b| b.package_type().to_string()),
        package_manager_path: backend.as_ref().map(|b| b.exec_path().to_string()),
        service_manager: Dispatcher::service_type_for(platform.system).to_string(),
        platform,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let none = || "-".to_string();
    let rows = vec![
        DetectRow {
            property: "System".to_string(),
            value: report.platform.system.to_string(),
        },
        DetectRow {
            property: "Distribution".to_string(),
            value: report.platform.distro.to_string(),
        },
        DetectRow {
            property: "Version".to_string(),
            value: report.platform.version.clone().unwrap_or_else(none),
        },
        DetectRow {
            property: "Code name".to_string(),
            value: report.platform.codename.clone().unwrap_or_else(none),
        },
        DetectRow {
            property: "Package manager".to_string(),
            value: report.package_manager.clone().unwrap_or_else(none),
        },
        DetectRow {
            property: "Executable".to_string(),
            value: report.package_manager_path.clone().unwrap_or_else(none),
        },
        DetectRow {
            property: "Service manager".to_string(),
            value: report.service_manager.clone(),
        },
    ];

    println!("{}", "Platform".cyan().bold());
    println!("{}", Table::new(rows));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();
    terminal::init_colors();

    // DI wiring
    let runner: Arc<dyn ProcessRunner> = if cli.global.verbose {
        Arc::new(SubprocessRunner::with_sink(Arc::new(TerminalSink)))
    } else {
        Arc::new(SubprocessRunner::new())
    };
    let fetcher = Arc::new(HttpKeyFetcher::new()?);
    let ctx = ProviderContext::new(runner, fetcher, cli.global.provider_config());
    let dispatcher = Dispatcher::new(ctx, Arc::new(WhichLocator::new()));

    let platform = OsReleaseProbe::new()
        .detect()
        .context("Platform detection failed")?;

    match cli.command {
        Commands::Detect { json } => run_detect(&dispatcher, platform, json)?,
        Commands::Pkg { pkg_type, op } => run_pkg(&dispatcher, &platform, pkg_type, op).await?,
        Commands::Service { op } => run_service(&dispatcher, &platform, op).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pkg_install() {
        let cli = Cli::try_parse_from(["sysmanage", "pkg", "--type", "dnf", "install", "vim", "git"]).unwrap();
        match cli.command {
            Commands::Pkg {
                pkg_type,
                op: PkgCommand::Install { names },
            } => {
                assert_eq!(pkg_type.as_deref(), Some("dnf"));
                assert_eq!(names, vec!["vim", "git"]);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_install_requires_names() {
        assert!(Cli::try_parse_from(["sysmanage", "pkg", "install"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sysmanage", "service", "stop", "nginx", "--no-sudo"]).unwrap();
        assert!(cli.global.no_sudo);
        assert!(matches!(
            cli.command,
            Commands::Service {
                op: ServiceCommand::Stop { .. }
            }
        ));
    }
}
