//! Fixed-capacity string results.
//!
//! The engine writes NUL-terminated text into a caller-supplied buffer of
//! [`STRING_CAPACITY`] bytes and reports success with a flag. Truncation is
//! the engine's job; the buffer is never grown and the call never retried.
//! On failure the buffer contents are discarded unread.

use arw_api::STRING_CAPACITY;
use std::ffi::CStr;
use std::os::raw::c_char;

/// Fallback for version queries that fail.
pub const UNKNOWN_VERSION: &str = "unknown";

struct TextBuffer {
    bytes: [u8; STRING_CAPACITY],
}

impl TextBuffer {
    fn new() -> Self {
        Self {
            bytes: [0; STRING_CAPACITY],
        }
    }

    fn as_mut_ptr(&mut self) -> *mut c_char {
        self.bytes.as_mut_ptr().cast()
    }

    fn capacity() -> i32 {
        STRING_CAPACITY as i32
    }

    fn into_string(self) -> String {
        match CStr::from_bytes_until_nul(&self.bytes) {
            Ok(text) => text.to_string_lossy().into_owned(),
            Err(_) => {
                log::warn!(
                    "Engine filled all {} bytes without a terminator; keeping them",
                    STRING_CAPACITY
                );
                String::from_utf8_lossy(&self.bytes).into_owned()
            }
        }
    }
}

/// Run `fill` against a fresh buffer and decode the result if it succeeded.
pub fn read(fill: impl FnOnce(*mut c_char, i32) -> bool) -> Option<String> {
    let mut buffer = TextBuffer::new();
    if fill(buffer.as_mut_ptr(), TextBuffer::capacity()) {
        Some(buffer.into_string())
    } else {
        None
    }
}

/// Like [`read`], for calls that fill a left and a right buffer at once.
pub fn read_pair(
    fill: impl FnOnce(*mut c_char, i32, *mut c_char, i32) -> bool,
) -> Option<(String, String)> {
    let mut left = TextBuffer::new();
    let mut right = TextBuffer::new();
    let ok = fill(
        left.as_mut_ptr(),
        TextBuffer::capacity(),
        right.as_mut_ptr(),
        TextBuffer::capacity(),
    );
    if ok {
        Some((left.into_string(), right.into_string()))
    } else {
        None
    }
}

/// Text or `fallback` when the engine reported failure.
pub fn read_or(fallback: &str, fill: impl FnOnce(*mut c_char, i32) -> bool) -> String {
    read(fill).unwrap_or_else(|| fallback.to_string())
}
