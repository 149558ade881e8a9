//! The native entry-point catalog.
//!
//! Every `arw*` symbol the wrapper library exports is listed exactly once, in
//! [`native_catalog!`]. The catalog is expanded three times: here into the
//! [`NativeEngine`] trait, and in the bridge crate into the statically linked
//! extern block and the dynamically loaded symbol table. Both backends
//! therefore expose an identical signature set by construction.

/// Feeds the catalog to `$expand`, a `macro_rules!` macro accepting
/// `fn name = "symbol" (arg: Type, ...) -> Ret;` items.
#[macro_export]
macro_rules! native_catalog {
    ($expand:ident) => {
        $expand! {
            fn register_log_callback = "arwRegisterLogCallback" (callback: ::std::option::Option<$crate::LogCallbackFn>);
            fn set_log_level = "arwSetLogLevel" (level: i32);
            fn initialise_with_options = "arwInitialiseARWithOptions" (pattern_size: i32, pattern_count_max: i32) -> bool;
            fn get_version = "arwGetARToolKitVersion" (buffer: *mut ::std::os::raw::c_char, length: i32) -> bool;
            fn get_error = "arwGetError" () -> i32;
            fn shutdown = "arwShutdownAR" () -> bool;

            fn start_running = "arwStartRunningB" (
                video_config: *const ::std::os::raw::c_char,
                calibration: *const u8,
                calibration_len: i32,
                near_plane: f32,
                far_plane: f32
            ) -> bool;
            fn start_running_stereo = "arwStartRunningStereoB" (
                video_config_l: *const ::std::os::raw::c_char,
                calibration_l: *const u8,
                calibration_l_len: i32,
                video_config_r: *const ::std::os::raw::c_char,
                calibration_r: *const u8,
                calibration_r_len: i32,
                transform_l2r: *const u8,
                transform_l2r_len: i32,
                near_plane: f32,
                far_plane: f32
            ) -> bool;
            fn is_running = "arwIsRunning" () -> bool;
            fn stop_running = "arwStopRunning" () -> bool;

            fn get_projection_matrix = "arwGetProjectionMatrix" (matrix: *mut f32) -> bool;
            fn get_projection_matrix_stereo = "arwGetProjectionMatrixStereo" (matrix_l: *mut f32, matrix_r: *mut f32) -> bool;
            fn get_video_params = "arwGetVideoParams" (
                width: *mut i32,
                height: *mut i32,
                pixel_size: *mut i32,
                pixel_format: *mut ::std::os::raw::c_char,
                pixel_format_len: i32
            ) -> bool;
            fn get_video_params_stereo = "arwGetVideoParamsStereo" (
                width_l: *mut i32,
                height_l: *mut i32,
                pixel_size_l: *mut i32,
                pixel_format_l: *mut ::std::os::raw::c_char,
                pixel_format_l_len: i32,
                width_r: *mut i32,
                height_r: *mut i32,
                pixel_size_r: *mut i32,
                pixel_format_r: *mut ::std::os::raw::c_char,
                pixel_format_r_len: i32
            ) -> bool;

            fn capture = "arwCapture" () -> bool;
            fn update = "arwUpdateAR" () -> bool;
            fn update_texture = "arwUpdateTexture" (buffer: *mut $crate::Color) -> bool;
            fn update_texture_stereo = "arwUpdateTextureStereo" (buffer_l: *mut $crate::Color, buffer_r: *mut $crate::Color) -> bool;
            fn update_texture32 = "arwUpdateTexture32" (buffer: *mut $crate::Color32) -> bool;
            fn update_texture32_stereo = "arwUpdateTexture32Stereo" (buffer_l: *mut $crate::Color32, buffer_r: *mut $crate::Color32) -> bool;
            fn update_texture_gl = "arwUpdateTextureGL" (texture_id: i32) -> bool;
            fn update_texture_gl_stereo = "arwUpdateTextureGLStereo" (texture_id_l: i32, texture_id_r: i32) -> bool;

            fn get_marker_pattern_count = "arwGetMarkerPatternCount" (marker_id: i32) -> i32;
            fn get_marker_pattern_config = "arwGetMarkerPatternConfig" (
                marker_id: i32,
                pattern_id: i32,
                matrix: *mut f32,
                width: *mut f32,
                height: *mut f32,
                image_size_x: *mut i32,
                image_size_y: *mut i32
            ) -> bool;
            fn get_marker_pattern_image = "arwGetMarkerPatternImage" (marker_id: i32, pattern_id: i32, buffer: *mut $crate::Color) -> bool;

            fn get_marker_option_bool = "arwGetMarkerOptionBool" (marker_id: i32, option: i32) -> bool;
            fn set_marker_option_bool = "arwSetMarkerOptionBool" (marker_id: i32, option: i32, value: bool);
            fn get_marker_option_int = "arwGetMarkerOptionInt" (marker_id: i32, option: i32) -> i32;
            fn set_marker_option_int = "arwSetMarkerOptionInt" (marker_id: i32, option: i32, value: i32);
            fn get_marker_option_float = "arwGetMarkerOptionFloat" (marker_id: i32, option: i32) -> f32;
            fn set_marker_option_float = "arwSetMarkerOptionFloat" (marker_id: i32, option: i32, value: f32);

            fn set_video_debug_mode = "arwSetVideoDebugMode" (debug: bool);
            fn get_video_debug_mode = "arwGetVideoDebugMode" () -> bool;
            fn set_video_threshold = "arwSetVideoThreshold" (threshold: i32);
            fn get_video_threshold = "arwGetVideoThreshold" () -> i32;
            fn set_video_threshold_mode = "arwSetVideoThresholdMode" (mode: i32);
            fn get_video_threshold_mode = "arwGetVideoThresholdMode" () -> i32;
            fn set_labeling_mode = "arwSetLabelingMode" (mode: i32);
            fn get_labeling_mode = "arwGetLabelingMode" () -> i32;
            fn set_border_size = "arwSetBorderSize" (size: f32);
            fn get_border_size = "arwGetBorderSize" () -> f32;
            fn set_pattern_detection_mode = "arwSetPatternDetectionMode" (mode: i32);
            fn get_pattern_detection_mode = "arwGetPatternDetectionMode" () -> i32;
            fn set_matrix_code_type = "arwSetMatrixCodeType" (code_type: i32);
            fn get_matrix_code_type = "arwGetMatrixCodeType" () -> i32;
            fn set_image_proc_mode = "arwSetImageProcMode" (mode: i32);
            fn get_image_proc_mode = "arwGetImageProcMode" () -> i32;
            fn set_nft_multi_mode = "arwSetNFTMultiMode" (on: bool);
            fn get_nft_multi_mode = "arwGetNFTMultiMode" () -> bool;

            fn add_marker = "arwAddMarker" (config: *const ::std::os::raw::c_char) -> i32;
            fn remove_marker = "arwRemoveMarker" (marker_id: i32) -> bool;
            fn remove_all_markers = "arwRemoveAllMarkers" () -> i32;
            fn query_marker_visibility = "arwQueryMarkerVisibility" (marker_id: i32) -> bool;
            fn query_marker_transformation = "arwQueryMarkerTransformation" (marker_id: i32, matrix: *mut f32) -> bool;
            fn query_marker_transformation_stereo = "arwQueryMarkerTransformationStereo" (marker_id: i32, matrix_l: *mut f32, matrix_r: *mut f32) -> bool;

            fn load_optical_params = "arwLoadOpticalParams" (
                name: *const ::std::os::raw::c_char,
                buffer: *const u8,
                buffer_len: i32,
                fov_y: *mut f32,
                aspect: *mut f32,
                view: *mut f32,
                projection: *mut f32
            ) -> bool;
        }
    };
}

macro_rules! declare_native_engine {
    ($( fn $name:ident = $symbol:literal ( $( $arg:ident : $ty:ty ),* $(,)? ) $( -> $ret:ty )? ; )*) => {
        /// One implementation per backend.
        ///
        /// Methods map one-to-one onto the engine's C entry points and take the
        /// same raw arguments.
        ///
        /// # Safety
        ///
        /// Every pointer argument must be valid for the reads or writes the
        /// corresponding C function performs, for the duration of the call.
        pub trait NativeEngine {
            $(
                #[doc = concat!("`", $symbol, "`")]
                #[allow(clippy::too_many_arguments)]
                unsafe fn $name(&self, $( $arg: $ty ),*) $( -> $ret )?;
            )*
        }
    };
}

native_catalog!(declare_native_engine);
