//! Global tracker settings. Plain get/set forwards; codes are not validated.

use arw_api::{
    ImageProcMode, LabelingMode, MatrixCodeType, NativeEngine, PatternDetectionMode,
    ThresholdMode,
};

use super::Session;

impl<E: NativeEngine> Session<E> {
    /// Show the thresholded image instead of the camera image.
    pub fn set_video_debug_mode(&self, debug: bool) {
        unsafe { self.engine.set_video_debug_mode(debug) }
    }

    pub fn video_debug_mode(&self) -> bool {
        unsafe { self.engine.get_video_debug_mode() }
    }

    pub fn set_video_threshold(&self, threshold: i32) {
        unsafe { self.engine.set_video_threshold(threshold) }
    }

    pub fn video_threshold(&self) -> i32 {
        unsafe { self.engine.get_video_threshold() }
    }

    pub fn set_video_threshold_mode(&self, mode: ThresholdMode) {
        unsafe { self.engine.set_video_threshold_mode(mode.code()) }
    }

    pub fn video_threshold_mode(&self) -> ThresholdMode {
        ThresholdMode(unsafe { self.engine.get_video_threshold_mode() })
    }

    pub fn set_labeling_mode(&self, mode: LabelingMode) {
        unsafe { self.engine.set_labeling_mode(mode.code()) }
    }

    pub fn labeling_mode(&self) -> LabelingMode {
        LabelingMode(unsafe { self.engine.get_labeling_mode() })
    }

    /// Border width of square markers, as a fraction of marker width.
    pub fn set_border_size(&self, size: f32) {
        unsafe { self.engine.set_border_size(size) }
    }

    pub fn border_size(&self) -> f32 {
        unsafe { self.engine.get_border_size() }
    }

    pub fn set_pattern_detection_mode(&self, mode: PatternDetectionMode) {
        unsafe { self.engine.set_pattern_detection_mode(mode.code()) }
    }

    pub fn pattern_detection_mode(&self) -> PatternDetectionMode {
        PatternDetectionMode(unsafe { self.engine.get_pattern_detection_mode() })
    }

    pub fn set_matrix_code_type(&self, code_type: MatrixCodeType) {
        unsafe { self.engine.set_matrix_code_type(code_type.code()) }
    }

    pub fn matrix_code_type(&self) -> MatrixCodeType {
        MatrixCodeType(unsafe { self.engine.get_matrix_code_type() })
    }

    pub fn set_image_proc_mode(&self, mode: ImageProcMode) {
        unsafe { self.engine.set_image_proc_mode(mode.code()) }
    }

    pub fn image_proc_mode(&self) -> ImageProcMode {
        ImageProcMode(unsafe { self.engine.get_image_proc_mode() })
    }

    /// Track several NFT markers per frame instead of one.
    pub fn set_nft_multi_mode(&self, on: bool) {
        unsafe { self.engine.set_nft_multi_mode(on) }
    }

    pub fn nft_multi_mode(&self) -> bool {
        unsafe { self.engine.get_nft_multi_mode() }
    }
}
