//! RAII wrappers for compiler blobs

use crate::com::ComPtr;
use crate::wide::decode;
use crate::{Result, wide};
use dxcompiler::{
    BOOL, DXC_CP_ACP, DXC_CP_UTF8, DXC_CP_UTF16, DXC_CP_UTF32, E_NOINTERFACE, FALSE, GUID,
    HRESULT, IDxcBlob, IDxcBlobEncoding, IDxcBlobUtf8, IDxcBlobWide, IID_IDxcBlob,
    IID_IDxcBlobEncoding, IID_IUnknown, LPVOID, S_OK, SIZE_T, TRUE, UINT32,
};
use std::ffi::c_void;
use std::ops::Deref;
use std::slice;
use std::sync::atomic::{AtomicU32, Ordering};

/// Text encoding attached to a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8 (code page 65001)
    Utf8,
    /// UTF-16 (code page 1200)
    Utf16,
    /// UTF-32 (code page 12000)
    Utf32,
    /// System ANSI code page
    Acp,
    /// Any other code page
    Other(u32),
}

impl Encoding {
    /// Encoding of the compiler's `wchar_t`.
    #[cfg(windows)]
    pub const WIDE: Encoding = Encoding::Utf16;
    /// Encoding of the compiler's `wchar_t`.
    #[cfg(not(windows))]
    pub const WIDE: Encoding = Encoding::Utf32;

    pub fn code_page(self) -> u32 {
        match self {
            Encoding::Utf8 => DXC_CP_UTF8,
            Encoding::Utf16 => DXC_CP_UTF16,
            Encoding::Utf32 => DXC_CP_UTF32,
            Encoding::Acp => DXC_CP_ACP,
            Encoding::Other(cp) => cp,
        }
    }

    pub fn from_code_page(code_page: u32) -> Self {
        match code_page {
            DXC_CP_UTF8 => Encoding::Utf8,
            DXC_CP_UTF16 => Encoding::Utf16,
            DXC_CP_UTF32 => Encoding::Utf32,
            DXC_CP_ACP => Encoding::Acp,
            cp => Encoding::Other(cp),
        }
    }
}

/// RAII wrapper for IDxcBlob
///
/// Provides safe access to blob data and automatic cleanup via Drop.
/// When dropped, the blob's reference count is decremented.
#[derive(Clone)]
pub struct Blob {
    inner: ComPtr<IDxcBlob>,
}

impl Blob {
    /// Creates a new Blob from a raw pointer.
    ///
    /// # Safety
    /// The pointer must be a valid IDxcBlob pointer or null.
    /// Takes ownership of the reference count (does not AddRef).
    pub(crate) unsafe fn from_raw(ptr: *mut IDxcBlob) -> Option<Self> {
        unsafe { ComPtr::from_raw(ptr) }.map(|inner| Blob { inner })
    }

    /// Creates a blob owning `data`, implemented in Rust.
    ///
    /// No compiler library is needed. The blob answers for `IDxcBlob` and
    /// `IDxcBlobEncoding` and reports its encoding as unknown.
    pub fn from_vec(data: Vec<u8>) -> Self {
        RustBlob::create(data, None)
    }

    /// Like [`from_vec`](Self::from_vec), with a known encoding.
    pub fn from_vec_with_encoding(data: Vec<u8>, encoding: Encoding) -> Self {
        RustBlob::create(data, Some(encoding.code_page()))
    }

    /// Copies `data` into a new Rust-implemented blob.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Returns the blob data as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            let ptr = self.inner.GetBufferPointer();
            let size = self.inner.GetBufferSize();
            if ptr.is_null() || size == 0 {
                return &[];
            }
            slice::from_raw_parts(ptr as *const u8, size)
        }
    }

    /// Returns the size of the blob in bytes.
    pub fn len(&self) -> usize {
        unsafe { self.inner.GetBufferSize() }
    }

    /// Returns true if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interprets the blob as a UTF-8 string.
    ///
    /// Useful for error messages and disassembly output.
    /// Trailing null bytes are trimmed.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(trim_nulls(self.as_bytes())).map_err(Into::into)
    }

    /// Converts the blob to a String, trimming trailing nulls.
    ///
    /// Invalid UTF-8 sequences are replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(trim_nulls(self.as_bytes())).into_owned()
    }

    /// Returns the blob's encoding, or `None` if the blob does not know it.
    pub fn encoding(&self) -> Result<Option<Encoding>> {
        let Ok(encoded) = self.inner.cast::<IDxcBlobEncoding>() else {
            return Ok(None);
        };
        BlobEncoding { inner: encoded }.encoding()
    }

    /// Returns the raw pointer (for internal use with FFI).
    pub(crate) fn as_ptr(&self) -> *mut IDxcBlob {
        self.inner.as_ptr()
    }

    /// Hands one reference to the caller.
    pub(crate) fn into_raw(self) -> *mut IDxcBlob {
        self.inner.into_raw()
    }

    /// The underlying interface pointer.
    pub fn as_com(&self) -> &ComPtr<IDxcBlob> {
        &self.inner
    }
}

impl From<ComPtr<IDxcBlob>> for Blob {
    fn from(inner: ComPtr<IDxcBlob>) -> Self {
        Blob { inner }
    }
}

impl From<BlobEncoding> for Blob {
    fn from(blob: BlobEncoding) -> Self {
        Blob {
            inner: unsafe { blob.inner.upcast() },
        }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Blob::from_vec(data)
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.len())
            .field("ptr", &self.as_ptr())
            .finish()
    }
}

// Blob contents are immutable once handed out and reference counts are atomic.
unsafe impl Send for Blob {}
unsafe impl Sync for Blob {}

fn trim_nulls(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .rposition(|&b| b != 0)
        .map(|i| &bytes[..=i])
        .unwrap_or(&[])
}

/// Blob with encoding information (IDxcBlobEncoding)
#[derive(Clone)]
pub struct BlobEncoding {
    inner: ComPtr<IDxcBlobEncoding>,
}

impl BlobEncoding {
    pub(crate) fn new(inner: ComPtr<IDxcBlobEncoding>) -> Self {
        BlobEncoding { inner }
    }

    /// Returns the encoding, or `None` if unknown.
    pub fn encoding(&self) -> Result<Option<Encoding>> {
        let mut known: BOOL = FALSE;
        let mut code_page: UINT32 = 0;
        crate::HResult(unsafe { self.inner.GetEncoding(&mut known, &mut code_page) })
            .check("GetEncoding")?;
        Ok((known != FALSE).then(|| Encoding::from_code_page(code_page)))
    }

    /// Returns the blob data as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            let ptr = self.inner.GetBufferPointer();
            let size = self.inner.GetBufferSize();
            if ptr.is_null() || size == 0 {
                return &[];
            }
            slice::from_raw_parts(ptr as *const u8, size)
        }
    }

    /// Converts the blob to a String, trimming trailing nulls.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(trim_nulls(self.as_bytes())).into_owned()
    }

    pub(crate) fn as_ptr(&self) -> *mut IDxcBlobEncoding {
        self.inner.as_ptr()
    }

    pub fn into_blob(self) -> Blob {
        self.into()
    }
}

impl std::fmt::Debug for BlobEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobEncoding")
            .field("len", &self.as_bytes().len())
            .field("encoding", &self.encoding().ok().flatten())
            .finish()
    }
}

unsafe impl Send for BlobEncoding {}
unsafe impl Sync for BlobEncoding {}

/// Null-terminated UTF-8 string blob (IDxcBlobUtf8)
#[derive(Clone)]
pub struct BlobUtf8 {
    inner: ComPtr<IDxcBlobUtf8>,
}

impl BlobUtf8 {
    pub(crate) fn new(inner: ComPtr<IDxcBlobUtf8>) -> Self {
        BlobUtf8 { inner }
    }

    /// The string, excluding the terminator.
    pub fn as_str(&self) -> Result<&str> {
        unsafe {
            let ptr = self.inner.GetStringPointer();
            let len = self.inner.GetStringLength();
            if ptr.is_null() || len == 0 {
                return Ok("");
            }
            std::str::from_utf8(slice::from_raw_parts(ptr as *const u8, len)).map_err(Into::into)
        }
    }

    pub fn len(&self) -> usize {
        unsafe { self.inner.GetStringLength() }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BlobUtf8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BlobUtf8").field(&self.as_str().unwrap_or("<invalid>")).finish()
    }
}

unsafe impl Send for BlobUtf8 {}
unsafe impl Sync for BlobUtf8 {}

/// Null-terminated wide string blob (IDxcBlobWide)
#[derive(Clone)]
pub struct BlobWide {
    inner: ComPtr<IDxcBlobWide>,
}

impl BlobWide {
    pub(crate) fn new(inner: ComPtr<IDxcBlobWide>) -> Self {
        BlobWide { inner }
    }

    /// Takes ownership of a possibly-null name blob and decodes it.
    ///
    /// # Safety
    /// `ptr` must be null or an owned IDxcBlobWide reference.
    pub(crate) unsafe fn string_from_raw(ptr: *mut IDxcBlobWide) -> Result<Option<String>> {
        match unsafe { ComPtr::from_raw(ptr) } {
            Some(inner) => BlobWide::new(inner).to_string().map(Some),
            None => Ok(None),
        }
    }

    /// Decodes the string, excluding the terminator.
    pub fn to_string(&self) -> Result<String> {
        unsafe {
            let ptr = self.inner.GetStringPointer();
            let len = self.inner.GetStringLength();
            if ptr.is_null() || len == 0 {
                return Ok(String::new());
            }
            decode(slice::from_raw_parts(ptr, len))
        }
    }

    pub fn len(&self) -> usize {
        unsafe { self.inner.GetStringLength() }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BlobWide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = unsafe {
            let ptr = self.inner.GetStringPointer();
            let len = self.inner.GetStringLength();
            if ptr.is_null() {
                String::new()
            } else {
                wide::decode_lossy(slice::from_raw_parts(ptr, len))
            }
        };
        f.debug_tuple("BlobWide").field(&text).finish()
    }
}

unsafe impl Send for BlobWide {}
unsafe impl Sync for BlobWide {}

// ---------------------------------------------------------------------------
// Rust-implemented IDxcBlobEncoding
// ---------------------------------------------------------------------------

#[repr(C)]
struct RustBlobVtbl {
    query_interface:
        unsafe extern "system" fn(*mut RustBlob, *const GUID, *mut *mut c_void) -> HRESULT,
    add_ref: unsafe extern "system" fn(*mut RustBlob) -> u32,
    release: unsafe extern "system" fn(*mut RustBlob) -> u32,
    get_buffer_pointer: unsafe extern "system" fn(*mut RustBlob) -> LPVOID,
    get_buffer_size: unsafe extern "system" fn(*mut RustBlob) -> SIZE_T,
    get_encoding: unsafe extern "system" fn(*mut RustBlob, *mut BOOL, *mut UINT32) -> HRESULT,
}

#[repr(C)]
struct RustBlob {
    vtbl: *const RustBlobVtbl,
    refs: AtomicU32,
    // Owned `Box<[u8]>`, kept as a raw pointer so the compiler may write
    // through `GetBufferPointer`.
    data: *mut u8,
    len: usize,
    code_page: Option<u32>,
}

impl Drop for RustBlob {
    fn drop(&mut self) {
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.data, self.len)) });
    }
}

static RUST_BLOB_VTBL: RustBlobVtbl = RustBlobVtbl {
    query_interface: rust_blob_query_interface,
    add_ref: rust_blob_add_ref,
    release: rust_blob_release,
    get_buffer_pointer: rust_blob_get_buffer_pointer,
    get_buffer_size: rust_blob_get_buffer_size,
    get_encoding: rust_blob_get_encoding,
};

impl RustBlob {
    fn create(data: Vec<u8>, code_page: Option<u32>) -> Blob {
        let len = data.len();
        let data = Box::into_raw(data.into_boxed_slice()) as *mut u8;
        let object = Box::new(RustBlob {
            vtbl: &RUST_BLOB_VTBL,
            refs: AtomicU32::new(1),
            data,
            len,
            code_page,
        });
        let ptr = Box::into_raw(object) as *mut IDxcBlob;
        // Box::into_raw never returns null.
        Blob {
            inner: unsafe { ComPtr::from_raw(ptr) }.unwrap_or_else(|| unreachable!()),
        }
    }
}

unsafe extern "system" fn rust_blob_query_interface(
    this: *mut RustBlob,
    riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    unsafe {
        if ppv.is_null() {
            return dxcompiler::E_POINTER;
        }
        let riid = *riid;
        if riid == IID_IUnknown || riid == IID_IDxcBlob || riid == IID_IDxcBlobEncoding {
            rust_blob_add_ref(this);
            *ppv = this.cast();
            S_OK
        } else {
            *ppv = std::ptr::null_mut();
            E_NOINTERFACE
        }
    }
}

unsafe extern "system" fn rust_blob_add_ref(this: *mut RustBlob) -> u32 {
    unsafe { (*this).refs.fetch_add(1, Ordering::Relaxed) + 1 }
}

unsafe extern "system" fn rust_blob_release(this: *mut RustBlob) -> u32 {
    let remaining = unsafe { (*this).refs.fetch_sub(1, Ordering::AcqRel) - 1 };
    if remaining == 0 {
        drop(unsafe { Box::from_raw(this) });
    }
    remaining
}

unsafe extern "system" fn rust_blob_get_buffer_pointer(this: *mut RustBlob) -> LPVOID {
    unsafe { (*this).data as LPVOID }
}

unsafe extern "system" fn rust_blob_get_buffer_size(this: *mut RustBlob) -> SIZE_T {
    unsafe { (*this).len }
}

unsafe extern "system" fn rust_blob_get_encoding(
    this: *mut RustBlob,
    known: *mut BOOL,
    code_page: *mut UINT32,
) -> HRESULT {
    unsafe {
        let (is_known, cp) = match (*this).code_page {
            Some(cp) => (TRUE, cp),
            None => (FALSE, 0),
        };
        if !known.is_null() {
            *known = is_known;
        }
        if !code_page.is_null() {
            *code_page = cp;
        }
    }
    S_OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blob_from_vec() {
        let blob = Blob::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(blob.len(), 4);
        assert!(!blob.is_empty());
        assert_eq!(blob.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(&blob[1..3], &[2, 3]);
    }

    #[test]
    fn test_empty_blob() {
        let blob = Blob::from_vec(Vec::new());
        assert!(blob.is_empty());
        assert_eq!(blob.as_bytes(), &[] as &[u8]);
        assert_eq!(blob.as_str().unwrap(), "");
    }

    #[test]
    fn test_as_str_trims_nulls() {
        let blob = Blob::from_bytes(b"error: x\n\0\0");
        assert_eq!(blob.as_str().unwrap(), "error: x\n");
        assert_eq!(blob.to_string_lossy(), "error: x\n");
    }

    #[test]
    fn test_invalid_utf8() {
        let blob = Blob::from_bytes(&[0xff, 0xfe, b'a']);
        assert!(blob.as_str().is_err());
        assert_eq!(blob.to_string_lossy(), "\u{fffd}\u{fffd}a");
    }

    #[test]
    fn test_encoding_unknown_and_known() {
        assert_eq!(Blob::from_bytes(b"x").encoding().unwrap(), None);
        let utf8 = Blob::from_vec_with_encoding(b"x".to_vec(), Encoding::Utf8);
        assert_eq!(utf8.encoding().unwrap(), Some(Encoding::Utf8));
    }

    #[test]
    fn test_clone_shares_object() {
        let blob = Blob::from_bytes(b"shared");
        let clone = blob.clone();
        assert_eq!(blob.as_ptr(), clone.as_ptr());
        drop(blob);
        assert_eq!(clone.as_bytes(), b"shared");
    }

    #[test]
    fn test_buffer_pointer_is_writable() {
        let blob = Blob::from_vec(vec![1, 2, 3]);
        unsafe {
            let ptr = blob.as_com().GetBufferPointer() as *mut u8;
            *ptr.add(1) = 7;
        }
        assert_eq!(blob.as_bytes(), &[1, 7, 3]);
    }

    #[test]
    fn test_release_frees_storage() {
        let blob = Blob::from_vec(vec![9; 32]);
        let clone = blob.clone();
        drop(blob);
        assert_eq!(clone.len(), 32);
        assert_eq!(clone.as_bytes()[31], 9);
        drop(clone);
    }

    #[test]
    fn test_unsupported_interface() {
        let blob = Blob::from_bytes(b"x");
        let err = blob.as_com().cast::<IDxcBlobUtf8>().unwrap_err();
        assert_eq!(err.hresult(), Some(crate::HResult::E_NOINTERFACE));
    }

    #[test]
    fn test_encoding_code_pages() {
        assert_eq!(Encoding::Utf8.code_page(), 65001);
        assert_eq!(Encoding::from_code_page(1200), Encoding::Utf16);
        assert_eq!(Encoding::from_code_page(12000), Encoding::Utf32);
        assert_eq!(Encoding::from_code_page(437), Encoding::Other(437));
        assert_eq!(Encoding::WIDE.code_page(), dxcompiler::DXC_CP_WIDE);
    }
}
