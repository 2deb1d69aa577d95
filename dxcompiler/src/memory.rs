//! Releasing strings the compiler library allocates on the caller's behalf.
//!
//! Off Windows the library ships its own adapter for these calls: task memory
//! comes from `malloc`, and a `BSTR` points just past a 32-bit byte length
//! prefix of the same allocation.

use std::ffi::c_void;

use crate::types::{BSTR, WCHAR};

#[cfg(windows)]
mod sys {
    use super::*;

    #[link(name = "ole32")]
    unsafe extern "system" {
        pub fn CoTaskMemFree(pv: *mut c_void);
    }

    #[link(name = "oleaut32")]
    unsafe extern "system" {
        pub fn SysFreeString(bstr: BSTR);
        pub fn SysStringLen(bstr: BSTR) -> u32;
    }
}

/// Frees memory returned through `LPWSTR*` or `char**` out-parameters.
///
/// # Safety
///
/// `ptr` must be null or come from the compiler library's task allocator, and
/// must not be used afterwards.
pub unsafe fn CoTaskMemFree(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }
    #[cfg(windows)]
    unsafe {
        sys::CoTaskMemFree(ptr)
    }
    #[cfg(not(windows))]
    unsafe {
        libc::free(ptr)
    }
}

/// # Safety
///
/// `bstr` must be null or a `BSTR` returned by the compiler library.
pub unsafe fn SysFreeString(bstr: BSTR) {
    if bstr.is_null() {
        return;
    }
    #[cfg(windows)]
    unsafe {
        sys::SysFreeString(bstr)
    }
    #[cfg(not(windows))]
    unsafe {
        libc::free(bstr.cast::<u8>().sub(4).cast::<c_void>())
    }
}

/// Length of a `BSTR` in characters, excluding the terminator.
///
/// # Safety
///
/// `bstr` must be null or a live `BSTR` returned by the compiler library.
pub unsafe fn SysStringLen(bstr: BSTR) -> u32 {
    if bstr.is_null() {
        return 0;
    }
    #[cfg(windows)]
    unsafe {
        sys::SysStringLen(bstr)
    }
    #[cfg(not(windows))]
    unsafe {
        let bytes = bstr.cast::<u8>().sub(4).cast::<u32>().read_unaligned();
        bytes / std::mem::size_of::<WCHAR>() as u32
    }
}
