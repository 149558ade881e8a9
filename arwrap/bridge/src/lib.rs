//! Safe bridge to the ARToolKit wrapper library.
//!
//! The engine does all the tracking work; this crate only moves data and
//! control across the native boundary. Pick a backend with
//! [`backend::load`], wrap it in a [`Session`], and drive the frame loop
//! through the session.

pub mod backend;
pub mod config;
mod error;
pub mod log_callback;
pub mod native_string;
pub mod pinning;
mod session;

pub use arw_api::*;
pub use backend::DefaultBackend;
pub use config::{load_config, BridgeConfig};
pub use error::BridgeError;
pub use log_callback::LogHandler;
pub use session::{EyeSetup, Session, StereoSetup};
