//! Scripted in-process engine for driving `Session` without the native library.
#![allow(dead_code)]

use arw_api::{Color, Color32, LogCallbackFn, NativeEngine};
use arw_bridge::pinning;
use glam::Mat4;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, MutexGuard};

pub const WIDTH: i32 = 8;
pub const HEIGHT: i32 = 4;
pub const PIXELS: usize = (WIDTH * HEIGHT) as usize;

pub const FRAME_COLOR: Color = Color::new(0.25, 0.5, 0.75, 1.0);
pub const FRAME_COLOR32: Color32 = Color32::new(10, 20, 30, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RegisterLog { installed: bool },
    SetLogLevel(i32),
    Initialise(i32, i32),
    Version,
    Error,
    Shutdown,
    StartRunning {
        video_config: String,
        calibration: Option<Vec<u8>>,
        near_plane: f32,
        far_plane: f32,
    },
    StartRunningStereo {
        video_config_l: String,
        video_config_r: String,
        transform_l2r_len: i32,
    },
    IsRunning,
    StopRunning,
    ProjectionMatrix,
    VideoParams,
    VideoParamsStereo,
    Capture,
    Update,
    /// Texture upload, with the number of buffers pinned on the calling
    /// thread while the engine had them.
    Texture { kind: &'static str, live_pins: usize },
    TextureGl(i32, Option<i32>),
    AddMarker(String),
    RemoveMarker(i32),
    RemoveAllMarkers,
    Visibility(i32),
    Transform(i32),
    PatternCount(i32),
    PatternConfig(i32, i32),
    PatternImage { live_pins: usize },
    GetOption(i32, i32),
    SetOption(i32, i32),
    Setting(&'static str),
    LoadOpticalParams { name: Option<String>, len: i32 },
}

#[derive(Debug, Clone)]
pub struct MockMarker {
    pub pattern: String,
    pub pose: Mat4,
    pub patterns: i32,
    pub image_size: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

pub struct MockState {
    pub calls: Vec<Call>,
    pub log_callback: Option<LogCallbackFn>,
    pub initialised: bool,
    pub running: bool,
    pub stereo: bool,
    pub version: Option<String>,
    pub video_params_ok: bool,
    pub pixel_format: String,
    pub pixel_format_r: String,
    pub fail_start: bool,
    pub error: i32,
    /// Pattern files the camera can currently see.
    pub scene: HashSet<String>,
    pub captured: bool,
    pub detected: HashSet<i32>,
    pub markers: BTreeMap<i32, MockMarker>,
    pub next_marker_id: i32,
    pub options: HashMap<(i32, i32), OptionValue>,
    pub ints: HashMap<&'static str, i32>,
    pub floats: HashMap<&'static str, f32>,
    pub flags: HashMap<&'static str, bool>,
    pub projection: Mat4,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            log_callback: None,
            initialised: false,
            running: false,
            stereo: false,
            version: Some("5.3.2".into()),
            video_params_ok: true,
            pixel_format: "AR_PIXEL_FORMAT_RGBA".into(),
            pixel_format_r: "AR_PIXEL_FORMAT_BGRA".into(),
            fail_start: false,
            error: 0,
            scene: HashSet::new(),
            captured: false,
            detected: HashSet::new(),
            markers: BTreeMap::new(),
            next_marker_id: 0,
            options: HashMap::new(),
            ints: HashMap::new(),
            floats: HashMap::new(),
            flags: HashMap::new(),
            projection: Mat4::perspective_rh_gl(0.8, 1.333, 0.1, 1000.0),
        }
    }
}

#[derive(Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(patterns: &[&str]) -> Self {
        let engine = Self::new();
        engine.state().scene = patterns.iter().map(|p| p.to_string()).collect();
        engine
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Call the installed log callback the way the engine would.
    pub fn emit_log(&self, message: &str) -> bool {
        let callback = self.state().log_callback;
        emit_through(callback, message)
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

pub fn emit_through(callback: Option<LogCallbackFn>, message: &str) -> bool {
    let Some(callback) = callback else {
        return false;
    };
    let message = CString::new(message).unwrap();
    unsafe { callback(message.as_ptr()) };
    true
}

unsafe fn write_text(buffer: *mut c_char, length: i32, text: &str) {
    let room = (length.max(1) - 1) as usize;
    let n = text.len().min(room);
    ptr::copy_nonoverlapping(text.as_ptr().cast::<c_char>(), buffer, n);
    *buffer.add(n) = 0;
}

unsafe fn write_matrix(out: *mut f32, m: &Mat4) {
    let cols = m.to_cols_array();
    ptr::copy_nonoverlapping(cols.as_ptr(), out, 16);
}

unsafe fn read_text(text: *const c_char) -> Option<String> {
    if text.is_null() {
        None
    } else {
        Some(CStr::from_ptr(text).to_string_lossy().into_owned())
    }
}

unsafe fn fill<T: Copy>(buffer: *mut T, value: T) {
    for i in 0..PIXELS {
        *buffer.add(i) = value;
    }
}

impl NativeEngine for MockEngine {
    unsafe fn register_log_callback(&self, callback: Option<LogCallbackFn>) {
        let mut state = self.state();
        state.calls.push(Call::RegisterLog {
            installed: callback.is_some(),
        });
        state.log_callback = callback;
    }

    unsafe fn set_log_level(&self, level: i32) {
        self.record(Call::SetLogLevel(level));
    }

    unsafe fn initialise_with_options(&self, pattern_size: i32, pattern_count_max: i32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Initialise(pattern_size, pattern_count_max));
        state.initialised = true;
        true
    }

    unsafe fn get_version(&self, buffer: *mut c_char, length: i32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Version);
        match &state.version {
            Some(version) => {
                write_text(buffer, length, version);
                true
            }
            None => {
                write_text(buffer, length, "garbage-partial");
                false
            }
        }
    }

    unsafe fn get_error(&self) -> i32 {
        let mut state = self.state();
        state.calls.push(Call::Error);
        state.error
    }

    unsafe fn shutdown(&self) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Shutdown);
        state.initialised = false;
        state.running = false;
        state.markers.clear();
        true
    }

    unsafe fn start_running(
        &self,
        video_config: *const c_char,
        calibration: *const u8,
        calibration_len: i32,
        near_plane: f32,
        far_plane: f32,
    ) -> bool {
        let mut state = self.state();
        let calibration = if calibration.is_null() {
            None
        } else {
            Some(std::slice::from_raw_parts(calibration, calibration_len as usize).to_vec())
        };
        state.calls.push(Call::StartRunning {
            video_config: read_text(video_config).unwrap_or_default(),
            calibration,
            near_plane,
            far_plane,
        });
        if state.fail_start || !state.initialised {
            state.error = -2;
            return false;
        }
        state.running = true;
        state.stereo = false;
        true
    }

    unsafe fn start_running_stereo(
        &self,
        video_config_l: *const c_char,
        _calibration_l: *const u8,
        _calibration_l_len: i32,
        video_config_r: *const c_char,
        _calibration_r: *const u8,
        _calibration_r_len: i32,
        _transform_l2r: *const u8,
        transform_l2r_len: i32,
        _near_plane: f32,
        _far_plane: f32,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::StartRunningStereo {
            video_config_l: read_text(video_config_l).unwrap_or_default(),
            video_config_r: read_text(video_config_r).unwrap_or_default(),
            transform_l2r_len,
        });
        if state.fail_start || !state.initialised {
            return false;
        }
        state.running = true;
        state.stereo = true;
        true
    }

    unsafe fn is_running(&self) -> bool {
        let mut state = self.state();
        state.calls.push(Call::IsRunning);
        state.running
    }

    unsafe fn stop_running(&self) -> bool {
        let mut state = self.state();
        state.calls.push(Call::StopRunning);
        let was_running = state.running;
        state.running = false;
        was_running
    }

    unsafe fn get_projection_matrix(&self, matrix: *mut f32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::ProjectionMatrix);
        if !state.running {
            return false;
        }
        write_matrix(matrix, &state.projection);
        true
    }

    unsafe fn get_projection_matrix_stereo(&self, matrix_l: *mut f32, matrix_r: *mut f32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::ProjectionMatrix);
        if !state.running {
            return false;
        }
        write_matrix(matrix_l, &state.projection);
        write_matrix(matrix_r, &state.projection);
        true
    }

    unsafe fn get_video_params(
        &self,
        width: *mut i32,
        height: *mut i32,
        pixel_size: *mut i32,
        pixel_format: *mut c_char,
        pixel_format_len: i32,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::VideoParams);
        *width = WIDTH;
        *height = HEIGHT;
        *pixel_size = 4;
        if !state.video_params_ok {
            write_text(pixel_format, pixel_format_len, "AR_PIX");
            return false;
        }
        write_text(pixel_format, pixel_format_len, &state.pixel_format);
        true
    }

    unsafe fn get_video_params_stereo(
        &self,
        width_l: *mut i32,
        height_l: *mut i32,
        pixel_size_l: *mut i32,
        pixel_format_l: *mut c_char,
        pixel_format_l_len: i32,
        width_r: *mut i32,
        height_r: *mut i32,
        pixel_size_r: *mut i32,
        pixel_format_r: *mut c_char,
        pixel_format_r_len: i32,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::VideoParamsStereo);
        if !state.video_params_ok {
            return false;
        }
        *width_l = WIDTH;
        *height_l = HEIGHT;
        *pixel_size_l = 4;
        *width_r = WIDTH;
        *height_r = HEIGHT;
        *pixel_size_r = 4;
        write_text(pixel_format_l, pixel_format_l_len, &state.pixel_format);
        write_text(pixel_format_r, pixel_format_r_len, &state.pixel_format_r);
        true
    }

    unsafe fn capture(&self) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Capture);
        state.captured = state.running;
        state.captured
    }

    unsafe fn update(&self) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Update);
        if !state.captured {
            return false;
        }
        let detected: HashSet<i32> = state
            .markers
            .iter()
            .filter(|(_, marker)| state.scene.contains(&marker.pattern))
            .map(|(id, _)| *id)
            .collect();
        state.detected = detected;
        state.captured = false;
        true
    }

    unsafe fn update_texture(&self, buffer: *mut Color) -> bool {
        self.record(Call::Texture {
            kind: "color",
            live_pins: pinning::live_pins(),
        });
        fill(buffer, FRAME_COLOR);
        true
    }

    unsafe fn update_texture_stereo(&self, buffer_l: *mut Color, buffer_r: *mut Color) -> bool {
        self.record(Call::Texture {
            kind: "color-stereo",
            live_pins: pinning::live_pins(),
        });
        fill(buffer_l, FRAME_COLOR);
        fill(buffer_r, FRAME_COLOR);
        true
    }

    unsafe fn update_texture32(&self, buffer: *mut Color32) -> bool {
        self.record(Call::Texture {
            kind: "color32",
            live_pins: pinning::live_pins(),
        });
        fill(buffer, FRAME_COLOR32);
        true
    }

    unsafe fn update_texture32_stereo(
        &self,
        buffer_l: *mut Color32,
        buffer_r: *mut Color32,
    ) -> bool {
        self.record(Call::Texture {
            kind: "color32-stereo",
            live_pins: pinning::live_pins(),
        });
        fill(buffer_l, FRAME_COLOR32);
        fill(buffer_r, FRAME_COLOR32);
        true
    }

    unsafe fn update_texture_gl(&self, texture_id: i32) -> bool {
        self.record(Call::TextureGl(texture_id, None));
        texture_id > 0
    }

    unsafe fn update_texture_gl_stereo(&self, texture_id_l: i32, texture_id_r: i32) -> bool {
        self.record(Call::TextureGl(texture_id_l, Some(texture_id_r)));
        texture_id_l > 0 && texture_id_r > 0
    }

    unsafe fn get_marker_pattern_count(&self, marker_id: i32) -> i32 {
        let mut state = self.state();
        state.calls.push(Call::PatternCount(marker_id));
        state.markers.get(&marker_id).map_or(0, |m| m.patterns)
    }

    unsafe fn get_marker_pattern_config(
        &self,
        marker_id: i32,
        pattern_id: i32,
        matrix: *mut f32,
        width: *mut f32,
        height: *mut f32,
        image_size_x: *mut i32,
        image_size_y: *mut i32,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::PatternConfig(marker_id, pattern_id));
        let Some(marker) = state.markers.get(&marker_id) else {
            return false;
        };
        if pattern_id < 0 || pattern_id >= marker.patterns {
            return false;
        }
        write_matrix(matrix, &Mat4::IDENTITY);
        *width = 80.0;
        *height = 80.0;
        *image_size_x = marker.image_size.0;
        *image_size_y = marker.image_size.1;
        true
    }

    unsafe fn get_marker_pattern_image(
        &self,
        marker_id: i32,
        _pattern_id: i32,
        buffer: *mut Color,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::PatternImage {
            live_pins: pinning::live_pins(),
        });
        let Some(marker) = state.markers.get(&marker_id) else {
            return false;
        };
        let pixels = (marker.image_size.0 * marker.image_size.1) as usize;
        for i in 0..pixels {
            *buffer.add(i) = Color::new(1.0, 1.0, 1.0, 1.0);
        }
        true
    }

    unsafe fn get_marker_option_bool(&self, marker_id: i32, option: i32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::GetOption(marker_id, option));
        matches!(state.options.get(&(marker_id, option)), Some(OptionValue::Bool(true)))
    }

    unsafe fn set_marker_option_bool(&self, marker_id: i32, option: i32, value: bool) {
        let mut state = self.state();
        state.calls.push(Call::SetOption(marker_id, option));
        state.options.insert((marker_id, option), OptionValue::Bool(value));
    }

    unsafe fn get_marker_option_int(&self, marker_id: i32, option: i32) -> i32 {
        let mut state = self.state();
        state.calls.push(Call::GetOption(marker_id, option));
        match state.options.get(&(marker_id, option)) {
            Some(OptionValue::Int(value)) => *value,
            _ => i32::MIN,
        }
    }

    unsafe fn set_marker_option_int(&self, marker_id: i32, option: i32, value: i32) {
        let mut state = self.state();
        state.calls.push(Call::SetOption(marker_id, option));
        state.options.insert((marker_id, option), OptionValue::Int(value));
    }

    unsafe fn get_marker_option_float(&self, marker_id: i32, option: i32) -> f32 {
        let mut state = self.state();
        state.calls.push(Call::GetOption(marker_id, option));
        match state.options.get(&(marker_id, option)) {
            Some(OptionValue::Float(value)) => *value,
            _ => f32::NAN,
        }
    }

    unsafe fn set_marker_option_float(&self, marker_id: i32, option: i32, value: f32) {
        let mut state = self.state();
        state.calls.push(Call::SetOption(marker_id, option));
        state.options.insert((marker_id, option), OptionValue::Float(value));
    }

    unsafe fn set_video_debug_mode(&self, debug: bool) {
        self.set_flag("video_debug_mode", debug);
    }

    unsafe fn get_video_debug_mode(&self) -> bool {
        self.flag("video_debug_mode")
    }

    unsafe fn set_video_threshold(&self, threshold: i32) {
        self.set_int("video_threshold", threshold);
    }

    unsafe fn get_video_threshold(&self) -> i32 {
        self.int("video_threshold")
    }

    unsafe fn set_video_threshold_mode(&self, mode: i32) {
        self.set_int("video_threshold_mode", mode);
    }

    unsafe fn get_video_threshold_mode(&self) -> i32 {
        self.int("video_threshold_mode")
    }

    unsafe fn set_labeling_mode(&self, mode: i32) {
        self.set_int("labeling_mode", mode);
    }

    unsafe fn get_labeling_mode(&self) -> i32 {
        self.int("labeling_mode")
    }

    unsafe fn set_border_size(&self, size: f32) {
        let mut state = self.state();
        state.calls.push(Call::Setting("border_size"));
        state.floats.insert("border_size", size);
    }

    unsafe fn get_border_size(&self) -> f32 {
        let mut state = self.state();
        state.calls.push(Call::Setting("border_size"));
        state.floats.get("border_size").copied().unwrap_or(0.25)
    }

    unsafe fn set_pattern_detection_mode(&self, mode: i32) {
        self.set_int("pattern_detection_mode", mode);
    }

    unsafe fn get_pattern_detection_mode(&self) -> i32 {
        self.int("pattern_detection_mode")
    }

    unsafe fn set_matrix_code_type(&self, code_type: i32) {
        self.set_int("matrix_code_type", code_type);
    }

    unsafe fn get_matrix_code_type(&self) -> i32 {
        self.int("matrix_code_type")
    }

    unsafe fn set_image_proc_mode(&self, mode: i32) {
        self.set_int("image_proc_mode", mode);
    }

    unsafe fn get_image_proc_mode(&self) -> i32 {
        self.int("image_proc_mode")
    }

    unsafe fn set_nft_multi_mode(&self, on: bool) {
        self.set_flag("nft_multi_mode", on);
    }

    unsafe fn get_nft_multi_mode(&self) -> bool {
        self.flag("nft_multi_mode")
    }

    unsafe fn add_marker(&self, config: *const c_char) -> i32 {
        let config = read_text(config).unwrap_or_default();
        let mut state = self.state();
        state.calls.push(Call::AddMarker(config.clone()));
        let fields: Vec<&str> = config.split(';').collect();
        let (patterns, pattern) = match fields.as_slice() {
            ["single", pattern, _width] => (1, pattern.to_string()),
            ["multi", config_file] => (4, config_file.to_string()),
            _ => return -1,
        };
        let id = state.next_marker_id;
        state.next_marker_id += 1;
        state.markers.insert(
            id,
            MockMarker {
                pattern,
                pose: Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -500.0)),
                patterns,
                image_size: (4, 4),
            },
        );
        id
    }

    unsafe fn remove_marker(&self, marker_id: i32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::RemoveMarker(marker_id));
        state.detected.remove(&marker_id);
        state.markers.remove(&marker_id).is_some()
    }

    unsafe fn remove_all_markers(&self) -> i32 {
        let mut state = self.state();
        state.calls.push(Call::RemoveAllMarkers);
        let removed = state.markers.len() as i32;
        state.markers.clear();
        state.detected.clear();
        removed
    }

    unsafe fn query_marker_visibility(&self, marker_id: i32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Visibility(marker_id));
        state.detected.contains(&marker_id)
    }

    unsafe fn query_marker_transformation(&self, marker_id: i32, matrix: *mut f32) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Transform(marker_id));
        if !state.detected.contains(&marker_id) {
            // Scribble to prove the bridge discards output on failure.
            *matrix = 12345.0;
            return false;
        }
        let pose = state.markers[&marker_id].pose;
        write_matrix(matrix, &pose);
        true
    }

    unsafe fn query_marker_transformation_stereo(
        &self,
        marker_id: i32,
        matrix_l: *mut f32,
        matrix_r: *mut f32,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Transform(marker_id));
        if !state.detected.contains(&marker_id) {
            *matrix_l = 12345.0;
            *matrix_r = 12345.0;
            return false;
        }
        let pose = state.markers[&marker_id].pose;
        write_matrix(matrix_l, &pose);
        write_matrix(matrix_r, &(Mat4::from_translation(glam::Vec3::X * 64.0) * pose));
        true
    }

    unsafe fn load_optical_params(
        &self,
        name: *const c_char,
        buffer: *const u8,
        buffer_len: i32,
        fov_y: *mut f32,
        aspect: *mut f32,
        view: *mut f32,
        projection: *mut f32,
    ) -> bool {
        let mut state = self.state();
        state.calls.push(Call::LoadOpticalParams {
            name: read_text(name),
            len: buffer_len,
        });
        if buffer.is_null() || buffer_len == 0 {
            return false;
        }
        *fov_y = 40.0;
        *aspect = 1.6;
        write_matrix(view, &Mat4::IDENTITY);
        write_matrix(projection, &state.projection);
        true
    }
}

impl MockEngine {
    fn set_int(&self, name: &'static str, value: i32) {
        let mut state = self.state();
        state.calls.push(Call::Setting(name));
        state.ints.insert(name, value);
    }

    fn int(&self, name: &'static str) -> i32 {
        let mut state = self.state();
        state.calls.push(Call::Setting(name));
        state.ints.get(name).copied().unwrap_or(0)
    }

    fn set_flag(&self, name: &'static str, value: bool) {
        let mut state = self.state();
        state.calls.push(Call::Setting(name));
        state.flags.insert(name, value);
    }

    fn flag(&self, name: &'static str) -> bool {
        let mut state = self.state();
        state.calls.push(Call::Setting(name));
        state.flags.get(name).copied().unwrap_or(false)
    }
}
