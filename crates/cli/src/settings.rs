// Provider configuration from flags and environment

use clap::Args;
use std::time::Duration;

use sysmanage_core::application::constants::DEFAULT_ELEVATION;
use sysmanage_core::application::ProviderConfig;

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Elevation command prefixed to privileged calls
    #[arg(long, env = "SYSMANAGE_SUDO", default_value = DEFAULT_ELEVATION, global = true)]
    pub sudo: String,

    /// Run every command as the current user
    #[arg(long, global = true)]
    pub no_sudo: bool,

    /// Kill package commands after this many seconds (0 = never)
    #[arg(long, env = "SYSMANAGE_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,

    /// Kill service commands after this many seconds
    #[arg(long, env = "SYSMANAGE_SERVICE_TIMEOUT_SECS", global = true)]
    pub service_timeout: Option<u64>,

    /// Echo child process output to the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::default();

        config.elevation = if self.no_sudo {
            None
        } else {
            Some(self.sudo.clone())
        };
        if let Some(secs) = self.timeout {
            config.package_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.service_timeout {
            config.service_timeout = Duration::from_secs(secs);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> GlobalOpts {
        GlobalOpts {
            sudo: DEFAULT_ELEVATION.to_string(),
            no_sudo: false,
            timeout: None,
            service_timeout: None,
            verbose: false,
        }
    }

    #[test]
    fn test_defaults_match_provider_defaults() {
        let config = opts().provider_config();
        assert_eq!(config.elevation.as_deref(), Some("sudo"));
        assert!(config.package_timeout.is_zero());
        assert_eq!(config.service_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_overrides() {
        let config = GlobalOpts {
            sudo: "doas".to_string(),
            timeout: Some(600),
            ..opts()
        }
        .provider_config();
        assert_eq!(config.elevation.as_deref(), Some("doas"));
        assert_eq!(config.package_timeout, Duration::from_secs(600));

        let config = GlobalOpts {
            no_sudo: true,
            ..opts()
        }
        .provider_config();
        assert_eq!(config.elevation, None);
    }
}
