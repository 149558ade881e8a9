//! The call surface.
//!
//! A [`Session`] owns one backend and the lifecycle state of the tracking
//! session running inside it. Every operation is a direct forward to the
//! engine, with buffers, strings and output parameters marshaled on the way.
//! Failures come back as `false` or a sentinel; [`Session::error_code`]
//! reports the engine's reason.

mod frame;
mod markers;
mod tracker;

use arw_api::{NativeEngine, NativeLogLevel, SessionState};
use glam::Mat4;
use log::{debug, warn};
use std::cell::Cell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::log_callback::{LogCallbackGuard, LogHandler};
use crate::native_string::{self, UNKNOWN_VERSION};
use crate::{backend, BridgeConfig, BridgeError, DefaultBackend};

/// Video source and camera calibration for one eye.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyeSetup<'a> {
    /// Engine-defined video configuration string, passed through unparsed.
    pub video_config: &'a str,
    /// Camera calibration blob. Empty selects the engine's default parameters.
    pub calibration: &'a [u8],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StereoSetup<'a> {
    pub left: EyeSetup<'a>,
    pub right: EyeSetup<'a>,
    /// Left-to-right eye transform blob.
    pub transform_l2r: &'a [u8],
}

/// Pixel counts the engine writes per texture update. Read when running
/// starts, or on the first texture update if the engine did not know its
/// frame size yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameGeometry {
    left: usize,
    right: Option<usize>,
}

pub struct Session<E: NativeEngine = DefaultBackend> {
    engine: E,
    state: SessionState,
    stereo: bool,
    frames: Cell<Option<FrameGeometry>>,
    log_guard: LogCallbackGuard,
}

impl Session<DefaultBackend> {
    /// Bind the build's backend and apply the configured engine log level.
    pub fn open(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let engine = backend::load(config)?;
        let session = Self::new(engine);
        session.set_log_level(config.log_level);
        Ok(session)
    }
}

impl<E: NativeEngine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::Uninitialized,
            stereo: false,
            frames: Cell::new(None),
            log_guard: LogCallbackGuard::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, to: SessionState) {
        debug!("Session {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Logs a contract violation. The call is still forwarded; what the
    /// engine does with it is up to the engine.
    fn require_running(&self, operation: &str) {
        if self.state != SessionState::Running {
            warn!(
                "{} called while session is {:?}; expected Running",
                operation, self.state
            );
        }
    }

    /// Install a handler for engine log messages, replacing any previous one.
    /// `None` removes the current handler.
    pub fn register_log_callback(&mut self, handler: Option<LogHandler>) {
        let engine = &self.engine;
        self.log_guard.register(handler, |callback| unsafe {
            engine.register_log_callback(callback)
        });
    }

    pub fn set_log_level(&self, level: NativeLogLevel) {
        unsafe { self.engine.set_log_level(level as i32) }
    }

    pub fn initialise(&mut self, pattern_size: i32, pattern_count_max: i32) -> bool {
        if !self.state.can_initialise() {
            warn!("initialise called while session is {:?}", self.state);
            return false;
        }
        let ok = unsafe {
            self.engine
                .initialise_with_options(pattern_size, pattern_count_max)
        };
        if ok {
            self.transition(SessionState::Initialized);
        }
        ok
    }

    /// [`initialise`](Self::initialise) with the pattern limits from `config`.
    pub fn initialise_from(&mut self, config: &BridgeConfig) -> bool {
        self.initialise(config.pattern_size, config.pattern_count_max)
    }

    /// Engine version, or `"unknown"` if the engine cannot report it.
    pub fn version(&self) -> String {
        native_string::read_or(UNKNOWN_VERSION, |buffer, length| unsafe {
            self.engine.get_version(buffer, length)
        })
    }

    /// Engine error code describing the most recent failure.
    pub fn error_code(&self) -> i32 {
        unsafe { self.engine.get_error() }
    }

    pub fn shutdown(&mut self) -> bool {
        let ok = unsafe { self.engine.shutdown() };
        if ok {
            self.frames.set(None);
            self.transition(SessionState::ShutdownComplete);
        }
        ok
    }

    pub fn start_running(&mut self, setup: EyeSetup<'_>, near_plane: f32, far_plane: f32) -> bool {
        if !self.state.can_start() {
            warn!("start_running called while session is {:?}", self.state);
            return false;
        }
        let Some(video_config) = text_arg("video config", setup.video_config) else {
            return false;
        };
        let Some((calibration, calibration_len)) = blob_arg(setup.calibration) else {
            return false;
        };
        let ok = unsafe {
            self.engine.start_running(
                video_config.as_ptr(),
                calibration,
                calibration_len,
                near_plane,
                far_plane,
            )
        };
        if ok {
            self.stereo = false;
            self.frames.set(self.read_frame_geometry());
            self.transition(SessionState::Running);
        }
        ok
    }

    pub fn start_running_stereo(
        &mut self,
        setup: StereoSetup<'_>,
        near_plane: f32,
        far_plane: f32,
    ) -> bool {
        if !self.state.can_start() {
            warn!("start_running_stereo called while session is {:?}", self.state);
            return false;
        }
        let (Some(config_l), Some(config_r)) = (
            text_arg("left video config", setup.left.video_config),
            text_arg("right video config", setup.right.video_config),
        ) else {
            return false;
        };
        let (Some((calib_l, calib_l_len)), Some((calib_r, calib_r_len)), Some((l2r, l2r_len))) = (
            blob_arg(setup.left.calibration),
            blob_arg(setup.right.calibration),
            blob_arg(setup.transform_l2r),
        ) else {
            return false;
        };
        let ok = unsafe {
            self.engine.start_running_stereo(
                config_l.as_ptr(),
                calib_l,
                calib_l_len,
                config_r.as_ptr(),
                calib_r,
                calib_r_len,
                l2r,
                l2r_len,
                near_plane,
                far_plane,
            )
        };
        if ok {
            self.stereo = true;
            self.frames.set(self.read_frame_geometry());
            self.transition(SessionState::Running);
        }
        ok
    }

    /// Ask the engine for the current frame size. `None` until the video
    /// source has reported one.
    fn read_frame_geometry(&self) -> Option<FrameGeometry> {
        let geometry = if self.stereo {
            self.video_params_stereo().and_then(|(left, right)| {
                Some(FrameGeometry {
                    left: left.pixel_count()?,
                    right: Some(right.pixel_count()?),
                })
            })
        } else {
            self.video_params().and_then(|params| {
                Some(FrameGeometry {
                    left: params.pixel_count()?,
                    right: None,
                })
            })
        };
        if geometry.is_none() {
            debug!("Engine has not reported its frame size yet");
        }
        geometry
    }

    /// Live query; does not consult the session state.
    pub fn is_running(&self) -> bool {
        unsafe { self.engine.is_running() }
    }

    pub fn stop_running(&mut self) -> bool {
        if self.state != SessionState::Running {
            warn!("stop_running called while session is {:?}", self.state);
            return false;
        }
        let ok = unsafe { self.engine.stop_running() };
        if ok {
            self.frames.set(None);
            self.transition(SessionState::Stopped);
        }
        ok
    }
}

impl<E: NativeEngine> Drop for Session<E> {
    fn drop(&mut self) {
        let engine = &self.engine;
        self.log_guard.deregister(|callback| unsafe {
            engine.register_log_callback(callback)
        });
    }
}

/// Engine strings cannot carry interior NULs; reject them before any call.
fn text_arg(what: &str, text: &str) -> Option<CString> {
    match CString::new(text) {
        Ok(text) => Some(text),
        Err(_) => {
            warn!("{} contains a NUL byte; not passed to the engine", what);
            None
        }
    }
}

fn optional_text_ptr(text: Option<&CString>) -> *const c_char {
    text.map_or(ptr::null(), |text| text.as_ptr())
}

/// Pointer and length for an opaque blob. Empty blobs go across as null.
fn blob_arg(blob: &[u8]) -> Option<(*const u8, i32)> {
    let Ok(len) = i32::try_from(blob.len()) else {
        warn!("{} byte blob exceeds the engine's length limit", blob.len());
        return None;
    };
    let ptr = if blob.is_empty() {
        ptr::null()
    } else {
        blob.as_ptr()
    };
    Some((ptr, len))
}

/// Let `fill` write a column-major matrix; copy it to `out` only on success.
fn read_matrix(out: &mut Mat4, fill: impl FnOnce(*mut f32) -> bool) -> bool {
    let mut raw = [0.0f32; 16];
    let ok = fill(raw.as_mut_ptr());
    if ok {
        *out = Mat4::from_cols_array(&raw);
    }
    ok
}

fn read_matrix_pair(
    left: &mut Mat4,
    right: &mut Mat4,
    fill: impl FnOnce(*mut f32, *mut f32) -> bool,
) -> bool {
    let mut raw_l = [0.0f32; 16];
    let mut raw_r = [0.0f32; 16];
    let ok = fill(raw_l.as_mut_ptr(), raw_r.as_mut_ptr());
    if ok {
        *left = Mat4::from_cols_array(&raw_l);
        *right = Mat4::from_cols_array(&raw_r);
    }
    ok
}
