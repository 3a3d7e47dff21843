// Port Layer - Interfaces for external dependencies

pub mod executable_locator;
pub mod key_fetcher;
pub mod output_sink;
pub mod platform_probe;
pub mod process_runner;

// Re-exports
pub use executable_locator::ExecutableLocator;
pub use key_fetcher::KeyFetcher;
pub use output_sink::{NullSink, OutputSink};
pub use platform_probe::PlatformProbe;
pub use process_runner::ProcessRunner;
