//! Target platforms and the per-platform toolchain runner.

mod builder;
mod platform;

pub use builder::{resolve_go, BuildInvocation, TargetBuilder};
pub use platform::{TargetArch, TargetOs, TargetSelection};
