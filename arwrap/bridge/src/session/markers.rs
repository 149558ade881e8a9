use arw_api::{
    Color, MarkerOption, NativeEngine, OpticalParams, PatternConfig, INVALID_MARKER_ID,
};
use glam::Mat4;
use log::warn;

use super::{blob_arg, optional_text_ptr, read_matrix, read_matrix_pair, text_arg, Session};
use crate::pinning;

impl<E: NativeEngine> Session<E> {
    /// Register a marker from an engine-defined config string, e.g.
    /// `"single;Data/hiro.patt;80"`. Returns [`INVALID_MARKER_ID`] on failure.
    pub fn add_marker(&self, config: &str) -> i32 {
        self.require_running("add_marker");
        let Some(config) = text_arg("marker config", config) else {
            return INVALID_MARKER_ID;
        };
        unsafe { self.engine.add_marker(config.as_ptr()) }
    }

    pub fn remove_marker(&self, marker_id: i32) -> bool {
        self.require_running("remove_marker");
        unsafe { self.engine.remove_marker(marker_id) }
    }

    /// Remove every marker, returning how many were removed.
    pub fn remove_all_markers(&self) -> i32 {
        self.require_running("remove_all_markers");
        unsafe { self.engine.remove_all_markers() }
    }

    /// Whether the marker was found in the most recent `update`.
    pub fn marker_visible(&self, marker_id: i32) -> bool {
        self.require_running("marker_visible");
        unsafe { self.engine.query_marker_visibility(marker_id) }
    }

    /// Marker pose in camera space. `out` is left untouched on failure.
    pub fn marker_transform(&self, marker_id: i32, out: &mut Mat4) -> bool {
        self.require_running("marker_transform");
        read_matrix(out, |raw| unsafe {
            self.engine.query_marker_transformation(marker_id, raw)
        })
    }

    pub fn marker_transform_stereo(
        &self,
        marker_id: i32,
        left: &mut Mat4,
        right: &mut Mat4,
    ) -> bool {
        self.require_running("marker_transform_stereo");
        read_matrix_pair(left, right, |raw_l, raw_r| unsafe {
            self.engine
                .query_marker_transformation_stereo(marker_id, raw_l, raw_r)
        })
    }

    pub fn marker_option_bool(&self, marker_id: i32, option: MarkerOption) -> bool {
        self.require_running("marker_option_bool");
        unsafe { self.engine.get_marker_option_bool(marker_id, option.code()) }
    }

    pub fn set_marker_option_bool(&self, marker_id: i32, option: MarkerOption, value: bool) {
        self.require_running("set_marker_option_bool");
        unsafe {
            self.engine
                .set_marker_option_bool(marker_id, option.code(), value)
        }
    }

    pub fn marker_option_int(&self, marker_id: i32, option: MarkerOption) -> i32 {
        self.require_running("marker_option_int");
        unsafe { self.engine.get_marker_option_int(marker_id, option.code()) }
    }

    pub fn set_marker_option_int(&self, marker_id: i32, option: MarkerOption, value: i32) {
        self.require_running("set_marker_option_int");
        unsafe {
            self.engine
                .set_marker_option_int(marker_id, option.code(), value)
        }
    }

    pub fn marker_option_float(&self, marker_id: i32, option: MarkerOption) -> f32 {
        self.require_running("marker_option_float");
        unsafe { self.engine.get_marker_option_float(marker_id, option.code()) }
    }

    pub fn set_marker_option_float(&self, marker_id: i32, option: MarkerOption, value: f32) {
        self.require_running("set_marker_option_float");
        unsafe {
            self.engine
                .set_marker_option_float(marker_id, option.code(), value)
        }
    }

    /// Number of patterns making up a marker (1 for single markers).
    pub fn marker_pattern_count(&self, marker_id: i32) -> i32 {
        self.require_running("marker_pattern_count");
        unsafe { self.engine.get_marker_pattern_count(marker_id) }
    }

    pub fn marker_pattern_config(&self, marker_id: i32, pattern_id: i32) -> Option<PatternConfig> {
        self.require_running("marker_pattern_config");
        let mut raw = [0.0f32; 16];
        let (mut width, mut height) = (0.0f32, 0.0f32);
        let (mut image_size_x, mut image_size_y) = (0i32, 0i32);
        let ok = unsafe {
            self.engine.get_marker_pattern_config(
                marker_id,
                pattern_id,
                raw.as_mut_ptr(),
                &mut width,
                &mut height,
                &mut image_size_x,
                &mut image_size_y,
            )
        };
        ok.then(|| PatternConfig {
            transform: Mat4::from_cols_array(&raw),
            width,
            height,
            image_size_x,
            image_size_y,
        })
    }

    /// Copy a pattern's preview image into `image`, which must hold at least
    /// `image_size_x * image_size_y` pixels.
    ///
    /// Costs two engine calls: the pattern config is read first to learn the
    /// image size the engine will write.
    pub fn marker_pattern_image(&self, marker_id: i32, pattern_id: i32, image: &mut [Color]) -> bool {
        self.require_running("marker_pattern_image");
        let Some(config) = self.marker_pattern_config(marker_id, pattern_id) else {
            return false;
        };
        let Some(needed) = config.image_pixel_count() else {
            warn!(
                "Pattern {} of marker {} reports an invalid image size",
                pattern_id, marker_id
            );
            return false;
        };
        if image.len() < needed {
            warn!(
                "Pattern image buffer holds {} pixels, pattern needs {}",
                image.len(),
                needed
            );
            return false;
        }
        pinning::with_pinned(image, |buffer| unsafe {
            self.engine
                .get_marker_pattern_image(marker_id, pattern_id, buffer)
        })
    }

    /// Load optical see-through calibration. `name` identifies the display
    /// to the engine; the blob is the calibration itself.
    pub fn load_optical_params(&self, name: Option<&str>, blob: &[u8]) -> Option<OpticalParams> {
        let name = match name {
            Some(name) => Some(text_arg("optical param name", name)?),
            None => None,
        };
        let (buffer, buffer_len) = blob_arg(blob)?;
        let (mut fov_y, mut aspect) = (0.0f32, 0.0f32);
        let mut view = [0.0f32; 16];
        let mut projection = [0.0f32; 16];
        let ok = unsafe {
            self.engine.load_optical_params(
                optional_text_ptr(name.as_ref()),
                buffer,
                buffer_len,
                &mut fov_y,
                &mut aspect,
                view.as_mut_ptr(),
                projection.as_mut_ptr(),
            )
        };
        ok.then(|| OpticalParams {
            fov_y,
            aspect,
            view: Mat4::from_cols_array(&view),
            projection: Mat4::from_cols_array(&projection),
        })
    }
}
