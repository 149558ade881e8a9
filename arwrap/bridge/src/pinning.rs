//! Scoped pinning of caller-owned pixel buffers.
//!
//! A [`PinnedBuffer`] holds the exclusive borrow of a slice for exactly one
//! native call and hands out its base address. Dropping it is the unpin, so
//! the address is released on every exit path, early returns and unwinding
//! included. Because the borrow is `&mut`, the same buffer can never be
//! pinned twice at once, from this thread or any other.

use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

thread_local! {
    static LIVE_PINS: Cell<usize> = const { Cell::new(0) };
}

/// Number of buffers currently pinned on this thread.
pub fn live_pins() -> usize {
    LIVE_PINS.with(Cell::get)
}

pub struct PinnedBuffer<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    _borrow: PhantomData<&'a mut [T]>,
}

impl<'a, T> PinnedBuffer<'a, T> {
    pub fn pin(buffer: &'a mut [T]) -> Self {
        let len = buffer.len();
        // A slice pointer is never null, even for an empty slice.
        let ptr = NonNull::from(buffer).cast::<T>();
        LIVE_PINS.with(|pins| pins.set(pins.get() + 1));
        log::trace!("pinned {} elements at {:p}", len, ptr);
        Self {
            ptr,
            len,
            _borrow: PhantomData,
        }
    }

    /// Base address, valid until this handle is dropped.
    pub fn as_mut_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Drop for PinnedBuffer<'_, T> {
    fn drop(&mut self) {
        LIVE_PINS.with(|pins| pins.set(pins.get().saturating_sub(1)));
        log::trace!("unpinned {} elements at {:p}", self.len, self.ptr);
    }
}

/// Pin `buffer` for the duration of `call`.
pub fn with_pinned<T, R>(buffer: &mut [T], call: impl FnOnce(*mut T) -> R) -> R {
    let pinned = PinnedBuffer::pin(buffer);
    call(pinned.as_mut_ptr())
}

/// Pin a left/right pair for the duration of `call`. Both are released
/// afterwards regardless of the outcome.
pub fn with_pinned_pair<T, R>(
    left: &mut [T],
    right: &mut [T],
    call: impl FnOnce(*mut T, *mut T) -> R,
) -> R {
    let left = PinnedBuffer::pin(left);
    let right = PinnedBuffer::pin(right);
    call(left.as_mut_ptr(), right.as_mut_ptr())
}
