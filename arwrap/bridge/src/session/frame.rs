use arw_api::{Color, Color32, NativeEngine, SessionState, VideoParams};
use glam::Mat4;
use log::warn;

use super::{read_matrix, read_matrix_pair, FrameGeometry, Session};
use crate::{native_string, pinning};

impl<E: NativeEngine> Session<E> {
    /// Size and pixel format of the mono video stream.
    pub fn video_params(&self) -> Option<VideoParams> {
        let (mut width, mut height, mut pixel_size) = (0i32, 0i32, 0i32);
        let pixel_format = native_string::read(|buffer, length| unsafe {
            self.engine
                .get_video_params(&mut width, &mut height, &mut pixel_size, buffer, length)
        })?;
        Some(VideoParams {
            width,
            height,
            pixel_size,
            pixel_format,
        })
    }

    /// Left and right stream parameters. The pixel formats are read into
    /// independent buffers.
    pub fn video_params_stereo(&self) -> Option<(VideoParams, VideoParams)> {
        let mut left = VideoParams::default();
        let mut right = VideoParams::default();
        let (format_l, format_r) = native_string::read_pair(|buf_l, len_l, buf_r, len_r| unsafe {
            self.engine.get_video_params_stereo(
                &mut left.width,
                &mut left.height,
                &mut left.pixel_size,
                buf_l,
                len_l,
                &mut right.width,
                &mut right.height,
                &mut right.pixel_size,
                buf_r,
                len_r,
            )
        })?;
        left.pixel_format = format_l;
        right.pixel_format = format_r;
        Some((left, right))
    }

    pub fn projection_matrix(&self, out: &mut Mat4) -> bool {
        read_matrix(out, |raw| unsafe { self.engine.get_projection_matrix(raw) })
    }

    pub fn projection_matrix_stereo(&self, left: &mut Mat4, right: &mut Mat4) -> bool {
        read_matrix_pair(left, right, |raw_l, raw_r| unsafe {
            self.engine.get_projection_matrix_stereo(raw_l, raw_r)
        })
    }

    /// Grab the next video frame. First step of capture → update → texture.
    pub fn capture(&self) -> bool {
        self.require_running("capture");
        unsafe { self.engine.capture() }
    }

    /// Run detection and pose estimation on the last captured frame.
    pub fn update(&self) -> bool {
        self.require_running("update");
        unsafe { self.engine.update() }
    }

    pub fn update_texture(&self, frame: &mut [Color]) -> bool {
        self.require_running("update_texture");
        if !self.frame_fits("update_texture", frame.len(), None) {
            return false;
        }
        pinning::with_pinned(frame, |buffer| unsafe { self.engine.update_texture(buffer) })
    }

    pub fn update_texture_stereo(&self, left: &mut [Color], right: &mut [Color]) -> bool {
        self.require_running("update_texture_stereo");
        if !self.frame_fits("update_texture_stereo", left.len(), Some(right.len())) {
            return false;
        }
        pinning::with_pinned_pair(left, right, |buf_l, buf_r| unsafe {
            self.engine.update_texture_stereo(buf_l, buf_r)
        })
    }

    pub fn update_texture32(&self, frame: &mut [Color32]) -> bool {
        self.require_running("update_texture32");
        if !self.frame_fits("update_texture32", frame.len(), None) {
            return false;
        }
        pinning::with_pinned(frame, |buffer| unsafe { self.engine.update_texture32(buffer) })
    }

    pub fn update_texture32_stereo(&self, left: &mut [Color32], right: &mut [Color32]) -> bool {
        self.require_running("update_texture32_stereo");
        if !self.frame_fits("update_texture32_stereo", left.len(), Some(right.len())) {
            return false;
        }
        pinning::with_pinned_pair(left, right, |buf_l, buf_r| unsafe {
            self.engine.update_texture32_stereo(buf_l, buf_r)
        })
    }

    /// Upload the frame straight into a GL texture owned by the host.
    pub fn update_texture_gl(&self, texture_id: i32) -> bool {
        self.require_running("update_texture_gl");
        unsafe { self.engine.update_texture_gl(texture_id) }
    }

    pub fn update_texture_gl_stereo(&self, texture_id_l: i32, texture_id_r: i32) -> bool {
        self.require_running("update_texture_gl_stereo");
        unsafe { self.engine.update_texture_gl_stereo(texture_id_l, texture_id_r) }
    }

    /// Frame size for the running session, asking the engine again if it
    /// was not known when running started.
    fn frame_geometry(&self) -> Option<FrameGeometry> {
        if let Some(geometry) = self.frames.get() {
            return Some(geometry);
        }
        if self.state != SessionState::Running {
            return None;
        }
        let geometry = self.read_frame_geometry();
        self.frames.set(geometry);
        geometry
    }

    /// Whether the caller's buffers can hold what the engine will write.
    fn frame_fits(&self, operation: &str, left: usize, right: Option<usize>) -> bool {
        let Some(FrameGeometry {
            left: need_l,
            right: need_r,
        }) = self.frame_geometry()
        else {
            warn!("{}: frame size unknown, not passing the buffer", operation);
            return false;
        };
        if left < need_l {
            warn!("{}: buffer holds {} pixels, frame has {}", operation, left, need_l);
            return false;
        }
        match (right, need_r) {
            (None, _) => true,
            (Some(right), Some(need_r)) if right >= need_r => true,
            (Some(right), Some(need_r)) => {
                warn!(
                    "{}: right buffer holds {} pixels, frame has {}",
                    operation, right, need_r
                );
                false
            }
            (Some(_), None) => {
                warn!("{}: session is not running in stereo", operation);
                false
            }
        }
    }
}
