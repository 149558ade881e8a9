//! Backend selection.
//!
//! Exactly one backend is bound per build target: iOS (or the
//! `static-backend` feature) links the engine into the binary, everything
//! else loads it as a shared library at startup.

mod dynamic;
#[cfg(any(target_os = "ios", feature = "static-backend"))]
mod static_link;

pub use dynamic::DynamicBackend;
#[cfg(any(target_os = "ios", feature = "static-backend"))]
pub use static_link::StaticBackend;

use crate::{BridgeConfig, BridgeError};

/// Base name of the wrapper library, without platform prefix or extension.
pub const LIBRARY_NAME: &str = "ARWrapper";

#[cfg(any(target_os = "ios", feature = "static-backend"))]
pub type DefaultBackend = StaticBackend;

#[cfg(not(any(target_os = "ios", feature = "static-backend")))]
pub type DefaultBackend = DynamicBackend;

/// Bind the build's backend.
#[cfg(any(target_os = "ios", feature = "static-backend"))]
pub fn load(_config: &BridgeConfig) -> Result<DefaultBackend, BridgeError> {
    log::debug!("Using statically linked {}", LIBRARY_NAME);
    Ok(StaticBackend)
}

/// Bind the build's backend.
#[cfg(not(any(target_os = "ios", feature = "static-backend")))]
pub fn load(config: &BridgeConfig) -> Result<DefaultBackend, BridgeError> {
    let path = config.library_path();
    DynamicBackend::load(&path)
}
