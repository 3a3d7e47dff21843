// Domain Layer - Pure data types

pub mod backend;
pub mod invocation;
pub mod platform;

// Re-exports
pub use backend::{PackageType, ServiceType};
pub use invocation::{Invocation, InvocationStatus, ProcessOutput, StreamKind};
pub use platform::{Distro, Platform, System};
