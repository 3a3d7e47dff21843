// Sysmanage Infrastructure - System Adapters
// Implements: ProcessRunner, ExecutableLocator, PlatformProbe, KeyFetcher

pub mod http_key_fetcher;
pub mod os_release_probe;
pub mod subprocess_runner;
pub mod which_locator;

pub use http_key_fetcher::HttpKeyFetcher;
pub use os_release_probe::OsReleaseProbe;
pub use subprocess_runner::{SubprocessRunner, TracingSink};
pub use which_locator::WhichLocator;
