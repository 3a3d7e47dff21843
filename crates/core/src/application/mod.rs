// Application Layer - Providers and dispatch

pub mod command;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod package;
pub mod service;

// Re-exports
pub use command::CommandSpec;
pub use config::{ProviderConfig, RepoPaths};
pub use dispatcher::Dispatcher;
pub use package::{PackageBackend, PackageManager, ProviderContext};
pub use service::{ServiceBackend, ServiceManager};
