//! Include handler trait for custom #include resolution

use crate::com::ComPtr;
use crate::wide::from_wide_ptr;
use crate::{Blob, Encoding, Error, Result};
use dxcompiler::{
    E_FAIL, E_FILE_NOT_FOUND, E_INVALIDARG, E_NOINTERFACE, E_POINTER, GUID, HRESULT, IDxcBlob,
    IDxcIncludeHandler, IID_IDxcIncludeHandler, IID_IUnknown, LPCWSTR, S_OK,
};
use log::trace;
use std::collections::HashMap;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Trait for custom include file resolution
///
/// Implement this trait to provide custom handling for #include directives
/// in your HLSL shaders. The compiler passes the path it derived from the
/// directive, usually prefixed with `./`.
///
/// Closures taking the filename implement this trait too.
///
/// # Example
/// ```no_run
/// use dxcrs::{IncludeHandler, Result};
///
/// struct MyIncludeHandler {
///     base_path: std::path::PathBuf,
/// }
///
/// impl IncludeHandler for MyIncludeHandler {
///     fn open(&mut self, filename: &str) -> Result<Vec<u8>> {
///         let path = self.base_path.join(filename);
///         std::fs::read(&path).map_err(|_| dxcrs::Error::IncludeNotFound(filename.to_string()))
///     }
/// }
/// ```
pub trait IncludeHandler {
    /// Opens an include file and returns its contents.
    fn open(&mut self, filename: &str) -> Result<Vec<u8>>;
}

impl<F> IncludeHandler for F
where
    F: FnMut(&str) -> Result<Vec<u8>>,
{
    fn open(&mut self, filename: &str) -> Result<Vec<u8>> {
        self(filename)
    }
}

/// File system include handler that resolves includes from specified directories.
///
/// # Example
/// ```no_run
/// use dxcrs::FileSystemInclude;
///
/// let include = FileSystemInclude::new()
///     .with_path("shaders/include")
///     .with_path("/usr/local/share/hlsl");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileSystemInclude {
    search_paths: Vec<PathBuf>,
}

impl FileSystemInclude {
    /// Creates a new file system include handler with no search paths.
    pub fn new() -> Self {
        FileSystemInclude {
            search_paths: Vec::new(),
        }
    }

    /// Creates a new handler with the current directory as the first search path.
    pub fn with_current_dir() -> Self {
        let mut handler = Self::new();
        if let Ok(cwd) = std::env::current_dir() {
            handler.search_paths.push(cwd);
        }
        handler
    }

    /// Adds a search path (builder pattern).
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Adds a search path.
    pub fn add_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.search_paths.push(path.into());
    }

    /// Returns the search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl IncludeHandler for FileSystemInclude {
    fn open(&mut self, filename: &str) -> Result<Vec<u8>> {
        let relative = normalize(filename);
        for search_path in &self.search_paths {
            let path = search_path.join(relative);
            if path.is_file() {
                return std::fs::read(&path).map_err(Into::into);
            }
        }

        // With no search paths, resolve against the working directory.
        if self.search_paths.is_empty() {
            let path = PathBuf::from(filename);
            if path.is_file() {
                return std::fs::read(&path).map_err(Into::into);
            }
        }

        Err(Error::IncludeNotFound(filename.to_string()))
    }
}

/// In-memory include handler for testing or embedded includes.
///
/// Names are matched after dropping a leading `./` or `.\`.
///
/// # Example
/// ```
/// use dxcrs::MemoryInclude;
///
/// let mut handler = MemoryInclude::new();
/// handler.add("common.hlsl", b"float4 white = float4(1,1,1,1);");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryInclude {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryInclude {
    /// Creates a new empty memory include handler.
    pub fn new() -> Self {
        MemoryInclude {
            files: HashMap::new(),
        }
    }

    /// Adds a file to the handler.
    pub fn add(&mut self, filename: &str, contents: &[u8]) {
        self.files
            .insert(normalize(filename).to_string(), contents.to_vec());
    }

    /// Adds a file (builder pattern).
    pub fn with_file(mut self, filename: &str, contents: &[u8]) -> Self {
        self.add(filename, contents);
        self
    }
}

impl IncludeHandler for MemoryInclude {
    fn open(&mut self, filename: &str) -> Result<Vec<u8>> {
        self.files
            .get(normalize(filename))
            .cloned()
            .ok_or_else(|| Error::IncludeNotFound(filename.to_string()))
    }
}

fn normalize(filename: &str) -> &str {
    filename
        .strip_prefix("./")
        .or_else(|| filename.strip_prefix(".\\"))
        .unwrap_or(filename)
}

// ---------------------------------------------------------------------------
// IDxcIncludeHandler object forwarding to a Rust handler
// ---------------------------------------------------------------------------

#[repr(C)]
struct IncludeVtbl {
    query_interface:
        unsafe extern "system" fn(*mut IncludeObject, *const GUID, *mut *mut c_void) -> HRESULT,
    add_ref: unsafe extern "system" fn(*mut IncludeObject) -> u32,
    release: unsafe extern "system" fn(*mut IncludeObject) -> u32,
    load_source:
        unsafe extern "system" fn(*mut IncludeObject, LPCWSTR, *mut *mut IDxcBlob) -> HRESULT,
}

struct HandlerPtr(*mut (dyn IncludeHandler + 'static));

// Only dereferenced while the owning IncludeScope holds the exclusive borrow.
unsafe impl Send for HandlerPtr {}

#[repr(C)]
struct IncludeObject {
    vtbl: *const IncludeVtbl,
    refs: AtomicU32,
    handler: Mutex<Option<HandlerPtr>>,
}

static INCLUDE_VTBL: IncludeVtbl = IncludeVtbl {
    query_interface: include_query_interface,
    add_ref: include_add_ref,
    release: include_release,
    load_source: include_load_source,
};

/// Exposes a Rust [`IncludeHandler`] to the compiler for one call.
///
/// Dropping the scope detaches the handler, so a compiler that keeps the
/// object alive afterwards gets `E_FAIL` instead of a dangling borrow.
pub(crate) struct IncludeScope<'a> {
    object: ComPtr<IDxcIncludeHandler>,
    _handler: PhantomData<&'a mut dyn IncludeHandler>,
}

impl<'a> IncludeScope<'a> {
    pub(crate) fn new(handler: &'a mut dyn IncludeHandler) -> Self {
        let ptr: *mut (dyn IncludeHandler + 'a) = handler;
        // Lifetime erased; the scope's Drop detaches before 'a ends.
        let ptr: *mut (dyn IncludeHandler + 'static) = unsafe { std::mem::transmute(ptr) };
        let object = Box::new(IncludeObject {
            vtbl: &INCLUDE_VTBL,
            refs: AtomicU32::new(1),
            handler: Mutex::new(Some(HandlerPtr(ptr))),
        });
        let raw = Box::into_raw(object) as *mut IDxcIncludeHandler;
        IncludeScope {
            object: unsafe { ComPtr::from_raw(raw) }.unwrap_or_else(|| unreachable!()),
            _handler: PhantomData,
        }
    }

    pub(crate) fn as_ptr(&self) -> *mut IDxcIncludeHandler {
        self.object.as_ptr()
    }
}

impl Drop for IncludeScope<'_> {
    fn drop(&mut self) {
        let object = self.object.as_ptr() as *mut IncludeObject;
        let mut handler = unsafe { &(*object).handler }
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *handler = None;
    }
}

unsafe extern "system" fn include_query_interface(
    this: *mut IncludeObject,
    riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    if ppv.is_null() || riid.is_null() {
        return E_POINTER;
    }
    unsafe {
        let riid = *riid;
        if riid == IID_IUnknown || riid == IID_IDxcIncludeHandler {
            include_add_ref(this);
            *ppv = this.cast();
            S_OK
        } else {
            *ppv = std::ptr::null_mut();
            E_NOINTERFACE
        }
    }
}

unsafe extern "system" fn include_add_ref(this: *mut IncludeObject) -> u32 {
    unsafe { (*this).refs.fetch_add(1, Ordering::Relaxed) + 1 }
}

unsafe extern "system" fn include_release(this: *mut IncludeObject) -> u32 {
    let remaining = unsafe { (*this).refs.fetch_sub(1, Ordering::AcqRel) - 1 };
    if remaining == 0 {
        drop(unsafe { Box::from_raw(this) });
    }
    remaining
}

unsafe extern "system" fn include_load_source(
    this: *mut IncludeObject,
    filename: LPCWSTR,
    out: *mut *mut IDxcBlob,
) -> HRESULT {
    if out.is_null() {
        return E_POINTER;
    }
    unsafe { *out = std::ptr::null_mut() };

    let filename = match unsafe { from_wide_ptr(filename) } {
        Ok(name) => name,
        Err(_) => return E_INVALIDARG,
    };

    let guard = match unsafe { &(*this).handler }.lock() {
        Ok(guard) => guard,
        Err(_) => return E_FAIL,
    };
    let Some(HandlerPtr(handler)) = guard.as_ref() else {
        trace!("include {filename:?} requested after the handler was detached");
        return E_FAIL;
    };

    match unsafe { (**handler).open(&filename) } {
        Ok(contents) => {
            trace!("include {filename:?} resolved ({} bytes)", contents.len());
            let blob = Blob::from_vec_with_encoding(contents, Encoding::Utf8);
            unsafe { *out = blob.into_raw() };
            S_OK
        }
        Err(err) => {
            trace!("include {filename:?} failed: {err}");
            match err {
                Error::IncludeNotFound(_) => E_FILE_NOT_FOUND,
                Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => E_FILE_NOT_FOUND,
                _ => E_FAIL,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WideString;
    use pretty_assertions::assert_eq;
    use std::ptr;

    fn load(scope: &IncludeScope<'_>, name: &str) -> (HRESULT, Option<Blob>) {
        let name = WideString::new(name).unwrap();
        let mut out: *mut IDxcBlob = ptr::null_mut();
        let hr = unsafe { (*scope.as_ptr()).LoadSource(name.as_ptr(), &mut out) };
        (hr, unsafe { Blob::from_raw(out) })
    }

    #[test]
    fn test_memory_include() {
        let mut handler = MemoryInclude::new().with_file("test.hlsl", b"float x = 1.0;");

        let result = handler.open("test.hlsl");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), b"float x = 1.0;");

        let missing = handler.open("missing.hlsl");
        assert!(missing.is_err());
    }

    #[test]
    fn test_memory_include_strips_dot_prefix() {
        let mut handler = MemoryInclude::new().with_file("./a.hlsli", b"A");
        assert_eq!(handler.open("a.hlsli").unwrap(), b"A");
        assert_eq!(handler.open("./a.hlsli").unwrap(), b"A");
        assert_eq!(handler.open(".\\a.hlsli").unwrap(), b"A");
    }

    #[test]
    fn test_file_system_include() {
        let dir = std::env::temp_dir().join(format!("dxcrs-include-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("common.hlsli"), b"#define ONE 1").unwrap();

        let mut handler = FileSystemInclude::new().with_path(&dir);
        assert_eq!(handler.open("./common.hlsli").unwrap(), b"#define ONE 1");
        assert!(matches!(
            handler.open("absent.hlsli"),
            Err(Error::IncludeNotFound(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bridge_load_source() {
        let mut handler = MemoryInclude::new().with_file("common.hlsli", b"float4 c;");
        let scope = IncludeScope::new(&mut handler);

        let (hr, blob) = load(&scope, "./common.hlsli");
        assert_eq!(hr, S_OK);
        let blob = blob.unwrap();
        assert_eq!(blob.as_bytes(), b"float4 c;");
        assert_eq!(blob.encoding().unwrap(), Some(Encoding::Utf8));

        let (hr, blob) = load(&scope, "missing.hlsli");
        assert_eq!(hr, E_FILE_NOT_FOUND);
        assert!(blob.is_none());
    }

    #[test]
    fn test_bridge_closure_and_detach() {
        let mut calls = Vec::new();
        let mut handler = |name: &str| -> Result<Vec<u8>> {
            calls.push(name.to_string());
            Ok(b"//".to_vec())
        };
        let leaked;
        {
            let scope = IncludeScope::new(&mut handler);
            assert_eq!(load(&scope, "x.h").0, S_OK);
            leaked = scope.object.clone();
        }
        let name = WideString::new("y.h").unwrap();
        let mut out: *mut IDxcBlob = ptr::null_mut();
        let hr = unsafe { leaked.LoadSource(name.as_ptr(), &mut out) };
        assert_eq!(hr, E_FAIL);
        assert!(out.is_null());
        drop(leaked);
        assert_eq!(calls, vec!["x.h".to_string()]);
    }

    #[test]
    fn test_bridge_query_interface() {
        let mut handler = MemoryInclude::new();
        let scope = IncludeScope::new(&mut handler);
        let unknown = scope.object.cast::<dxcompiler::IUnknown>().unwrap();
        assert_eq!(unknown.as_ptr() as usize, scope.as_ptr() as usize);
        let err = scope.object.cast::<dxcompiler::IDxcBlob>().unwrap_err();
        assert_eq!(err.hresult(), Some(crate::HResult::E_NOINTERFACE));
    }
}
