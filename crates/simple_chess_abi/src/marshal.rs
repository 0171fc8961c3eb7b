//! # Marshaling Utilities
//!
//! Conversions between foreign memory and owned Rust values. Every value
//! returned here is a copy; nothing keeps a reference into the engine's
//! memory past the call.

#![allow(unsafe_code)]

use std::mem::size_of;
use std::ptr;

/// Decodes a fixed-capacity, NUL-terminated text buffer.
///
/// Stops at the first NUL. A buffer with no NUL is decoded in full rather
/// than rejected.
///
/// Invalid UTF-8 is replaced with U+FFFD, three bytes each, so the result
/// may be longer in bytes than `buffer`. Its length only matches the NUL
/// position for valid text; the engine only writes ASCII.
#[must_use]
pub fn decode_text(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).into_owned()
}

/// Encodes `text` into a fixed buffer of `N` bytes.
///
/// Text longer than `N - 1` bytes is truncated so the buffer always ends in
/// at least one NUL.
#[must_use]
pub fn encode_text<const N: usize>(text: &str) -> [u8; N] {
    let mut buffer = [0u8; N];
    let len = text.len().min(N.saturating_sub(1));
    buffer[..len].copy_from_slice(&text.as_bytes()[..len]);
    buffer
}

/// Copies `count` elements laid out every `stride` bytes from `base`.
///
/// A null `base` or a zero `count` yields an empty vector without touching
/// memory.
///
/// # Safety
///
/// When `base` is non-null and `count` is non-zero, `base` must point to
/// `count * stride` readable bytes, each element starting at a multiple of
/// `stride` and holding a valid `T`. `stride` must be at least
/// `size_of::<T>()`.
#[must_use]
pub unsafe fn materialize_sequence<T: Copy>(base: *const u8, count: usize, stride: usize) -> Vec<T> {
    if base.is_null() || count == 0 {
        return Vec::new();
    }
    debug_assert!(stride >= size_of::<T>(), "stride smaller than element");

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        // SAFETY: caller guarantees `count` readable elements at `stride`
        let element = unsafe { ptr::read_unaligned(base.add(i * stride).cast::<T>()) };
        out.push(element);
    }
    out
}

/// Copies a contiguous array of `count` values of `T`.
///
/// # Safety
///
/// As [`materialize_sequence`] with `stride == size_of::<T>()`.
#[inline]
#[must_use]
pub unsafe fn materialize<T: Copy>(base: *const T, count: usize) -> Vec<T> {
    // SAFETY: forwarded to the caller
    unsafe { materialize_sequence(base.cast::<u8>(), count, size_of::<T>()) }
}
