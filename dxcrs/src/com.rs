//! Reference-counted interface pointer

use crate::{Error, HResult, Result};
use dxcompiler::{IUnknown, Interface};
use std::ffi::c_void;
use std::fmt;
use std::ops::Deref;
use std::ptr::{self, NonNull};

/// Owning pointer to a compiler interface.
///
/// Holds one reference: cloning calls `AddRef`, dropping calls `Release`.
/// Dereferences to the raw interface, so every call shim is reachable.
pub struct ComPtr<T: Interface> {
    ptr: NonNull<T>,
}

impl<T: Interface> ComPtr<T> {
    /// Takes ownership of one reference. Returns `None` for null.
    ///
    /// # Safety
    /// The pointer must be null or a live object implementing `T`.
    pub unsafe fn from_raw(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| ComPtr { ptr })
    }

    /// Takes ownership of one reference, mapping null to `Error::Com`.
    ///
    /// # Safety
    /// See [`from_raw`](Self::from_raw).
    pub(crate) unsafe fn from_raw_or_err(ptr: *mut T, operation: &'static str) -> Result<Self> {
        unsafe { Self::from_raw(ptr) }.ok_or(Error::Com {
            operation,
            hresult: HResult::E_POINTER,
        })
    }

    /// Returns the raw pointer without affecting the reference count.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Gives up ownership without releasing.
    pub fn into_raw(self) -> *mut T {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// Reinterprets as an interface this one extends, keeping the reference.
    ///
    /// # Safety
    /// `U`'s function table must be a prefix of `T`'s.
    pub(crate) unsafe fn upcast<U: Interface>(self) -> ComPtr<U> {
        ComPtr {
            ptr: self.into_nonnull().cast::<U>(),
        }
    }

    fn into_nonnull(self) -> NonNull<T> {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }

    fn unknown(&self) -> &IUnknown {
        unsafe { &*(self.ptr.as_ptr() as *const IUnknown) }
    }

    /// Requests another interface on the same object.
    pub fn cast<U: Interface>(&self) -> Result<ComPtr<U>> {
        let mut out: *mut c_void = ptr::null_mut();
        let hr = HResult(unsafe { self.unknown().QueryInterface(&U::IID, &mut out) });
        if hr.is_error() {
            return Err(Error::NoInterface {
                interface: U::NAME,
                hresult: hr,
            });
        }
        unsafe { ComPtr::from_raw_or_err(out.cast::<U>(), "QueryInterface") }
    }

    /// Fills an out-parameter through `f`, then takes ownership of the result.
    ///
    /// # Safety
    /// `f` must store either null or an owned reference to a `T`.
    pub(crate) unsafe fn from_out_param(
        operation: &'static str,
        f: impl FnOnce(*mut *mut T) -> i32,
    ) -> Result<Self> {
        let mut out: *mut T = ptr::null_mut();
        HResult(f(&mut out)).check(operation)?;
        unsafe { Self::from_raw_or_err(out, operation) }
    }

    /// Like [`from_out_param`](Self::from_out_param) for `void**` outputs typed by IID.
    ///
    /// # Safety
    /// `f` must store either null or an owned reference to a `T`.
    pub(crate) unsafe fn from_iid_out_param(
        operation: &'static str,
        f: impl FnOnce(*const dxcompiler::GUID, *mut *mut c_void) -> i32,
    ) -> Result<Self> {
        let mut out: *mut c_void = ptr::null_mut();
        HResult(f(&T::IID, &mut out)).check(operation)?;
        unsafe { Self::from_raw_or_err(out.cast::<T>(), operation) }
    }
}

impl<T: Interface> Deref for ComPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: Interface> Clone for ComPtr<T> {
    fn clone(&self) -> Self {
        unsafe { self.unknown().AddRef() };
        ComPtr { ptr: self.ptr }
    }
}

impl<T: Interface> Drop for ComPtr<T> {
    fn drop(&mut self) {
        unsafe { self.unknown().Release() };
    }
}

impl<T: Interface> fmt::Debug for ComPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComPtr<{}>({:p})", T::NAME, self.ptr)
    }
}

// Compiler objects may move between threads; concurrent use of one object is not supported.
unsafe impl<T: Interface> Send for ComPtr<T> {}
