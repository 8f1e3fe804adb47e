//! C ABI for hosts that embed the block from C.
//!
//! Keys are passed as `(pointer, length)` and need not be NUL-terminated.
//! Null pointers and keys that are not UTF-8 are ignored; the getter returns
//! 0 for them.

use std::os::raw::{c_char, c_double};

use crate::filter::BurstFilter;

unsafe fn key_from_raw<'a>(key: *const c_char, len: usize) -> Option<&'a str> {
    if key.is_null() {
        return None;
    }
    let bytes = std::slice::from_raw_parts(key as *const u8, len);
    std::str::from_utf8(bytes).ok()
}

#[no_mangle]
pub extern "C" fn burst_analysis_create() -> *mut BurstFilter {
    Box::into_raw(Box::new(BurstFilter::new()))
}

/// # Safety
/// `ptr` must come from [`burst_analysis_create`] and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn burst_analysis_free(ptr: *mut BurstFilter) {
    if ptr.is_null() {
        return;
    }
    drop(Box::from_raw(ptr));
}

/// # Safety
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn burst_analysis_init(ptr: *mut BurstFilter) {
    if let Some(filter) = ptr.as_mut() {
        filter.init();
    }
}

/// # Safety
/// `ptr` must be null or a live instance; `key` must be null or point to
/// `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn burst_analysis_set_config(ptr: *mut BurstFilter, key: *const c_char, len: usize, value: c_double) {
    if let (Some(filter), Some(key)) = (ptr.as_mut(), key_from_raw(key, len)) {
        filter.set_config(key, value);
    }
}

/// # Safety
/// Same contract as [`burst_analysis_set_config`].
#[no_mangle]
pub unsafe extern "C" fn burst_analysis_set_input(ptr: *mut BurstFilter, key: *const c_char, len: usize, value: c_double) {
    if let (Some(filter), Some(key)) = (ptr.as_mut(), key_from_raw(key, len)) {
        filter.set_input(key, value);
    }
}

/// # Safety
/// `ptr` must be null or a live instance.
#[no_mangle]
pub unsafe extern "C" fn burst_analysis_process(ptr: *mut BurstFilter, period_seconds: c_double) {
    if let Some(filter) = ptr.as_mut() {
        filter.process(period_seconds);
    }
}

/// # Safety
/// Same contract as [`burst_analysis_set_config`].
#[no_mangle]
pub unsafe extern "C" fn burst_analysis_get_output(ptr: *const BurstFilter, key: *const c_char, len: usize) -> c_double {
    match (ptr.as_ref(), key_from_raw(key, len)) {
        (Some(filter), Some(key)) => filter.get_output(key),
        _ => 0.0,
    }
}
