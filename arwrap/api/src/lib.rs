mod engine;
mod options;

pub use engine::NativeEngine;
pub use options::{
    ImageProcMode, LabelingMode, MarkerOption, MatrixCodeType, PatternDetectionMode,
    ThresholdMode,
};

use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::os::raw::c_char;

/// Capacity of every text buffer handed to the engine for a string result.
pub const STRING_CAPACITY: usize = 128;

/// Returned by `add_marker` when the engine rejects a marker configuration.
pub const INVALID_MARKER_ID: i32 = -1;

pub const DEFAULT_PATTERN_SIZE: i32 = 16;
pub const DEFAULT_PATTERN_COUNT_MAX: i32 = 25;

/// Floating point RGBA pixel, layout-compatible with the engine's `Color`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Packed 8-bit RGBA pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// log callback installed into the engine
pub type LogCallbackFn = unsafe extern "C" fn(message: *const c_char);

/// Verbosity of the engine's own logging.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NativeLogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    RelInfo = 4,
}

/// Lifecycle of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Stopped,
    ShutdownComplete,
}

impl SessionState {
    pub fn can_initialise(self) -> bool {
        matches!(self, Self::Uninitialized | Self::ShutdownComplete)
    }

    pub fn can_start(self) -> bool {
        matches!(self, Self::Initialized | Self::Stopped)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoParams {
    pub width: i32,
    pub height: i32,
    pub pixel_size: i32,
    pub pixel_format: String,
}

impl VideoParams {
    /// Pixels in one frame, or `None` when the engine reported a nonsensical size.
    pub fn pixel_count(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        width.checked_mul(height)
    }
}

/// Layout of one pattern inside a (possibly multi-pattern) marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub transform: Mat4,
    pub width: f32,
    pub height: f32,
    pub image_size_x: i32,
    pub image_size_y: i32,
}

impl PatternConfig {
    pub fn image_pixel_count(&self) -> Option<usize> {
        let x = usize::try_from(self.image_size_x).ok()?;
        let y = usize::try_from(self.image_size_y).ok()?;
        x.checked_mul(y)
    }
}

/// Result of loading optical see-through calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalParams {
    pub fov_y: f32,
    pub aspect: f32,
    pub view: Mat4,
    pub projection: Mat4,
}
