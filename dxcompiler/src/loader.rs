use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use libloading::Library;
use log::{debug, warn};

use crate::types::*;
use crate::{LoadError, Result};

#[cfg(windows)]
pub const LIBRARY_NAME: &str = "dxcompiler.dll";
#[cfg(target_os = "macos")]
pub const LIBRARY_NAME: &str = "libdxcompiler.dylib";
#[cfg(not(any(windows, target_os = "macos")))]
pub const LIBRARY_NAME: &str = "libdxcompiler.so";

/// Environment variable overriding where the compiler library is loaded from.
pub const LIBRARY_PATH_ENV: &str = "DXC_LIBRARY_PATH";

/// Resolves the compiler library location.
///
/// Order: `DXC_LIBRARY_PATH`, then the library next to the running executable,
/// then the bare library name for the system loader to search.
pub fn library_path() -> PathBuf {
    if let Some(path) = std::env::var_os(LIBRARY_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    if let Ok(exe) = std::env::current_exe() {
        let path = exe.with_file_name(LIBRARY_NAME);
        if path.exists() {
            return path;
        }
    }
    PathBuf::from(LIBRARY_NAME)
}

/// A loaded compiler library and its resolved entry points.
pub struct DxcLibrary {
    path: PathBuf,
    create_instance: DxcCreateInstanceProc,
    create_instance2: Option<DxcCreateInstance2Proc>,
    // Entry points above point into this mapping.
    _library: Library,
}

unsafe impl Send for DxcLibrary {}
unsafe impl Sync for DxcLibrary {}

impl DxcLibrary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("loading compiler library from {}", path.display());

        let library = unsafe { Library::new(&path) }.map_err(|e| LoadError::Open {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let create_instance = unsafe {
            library.get::<DxcCreateInstanceProc>(b"DxcCreateInstance\0")
        }
        .map(|symbol| *symbol)
        .map_err(|e| LoadError::MissingEntryPoint {
            path: path.clone(),
            symbol: "DxcCreateInstance",
            message: e.to_string(),
        })?;

        let create_instance2 =
            match unsafe { library.get::<DxcCreateInstance2Proc>(b"DxcCreateInstance2\0") } {
                Ok(symbol) => Some(*symbol),
                Err(e) => {
                    debug!("DxcCreateInstance2 not exported by {}: {}", path.display(), e);
                    None
                }
            };

        debug!(
            "resolved DxcCreateInstance{} from {}",
            if create_instance2.is_some() { " and DxcCreateInstance2" } else { "" },
            path.display()
        );

        Ok(Self {
            path,
            create_instance,
            create_instance2,
            _library: library,
        })
    }

    /// Loads from [`library_path`].
    pub fn load_default() -> Result<Self> {
        Self::load(library_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_create_instance2(&self) -> bool {
        self.create_instance2.is_some()
    }

    /// Forwards to the library's `DxcCreateInstance`.
    ///
    /// # Safety
    ///
    /// `rclsid` and `riid` must point to valid identifiers and `ppv` to writable storage.
    pub unsafe fn create_instance(&self, rclsid: REFCLSID, riid: REFIID, ppv: *mut LPVOID) -> HRESULT {
        let hr = unsafe { (self.create_instance)(rclsid, riid, ppv) };
        if FAILED(hr) {
            warn!(
                "DxcCreateInstance({:?}, {:?}) failed: 0x{:08x}",
                unsafe { rclsid.as_ref() },
                unsafe { riid.as_ref() },
                hr
            );
        }
        hr
    }

    /// Forwards to the library's `DxcCreateInstance2`, or returns `E_NOTIMPL` if
    /// the library does not export it.
    ///
    /// # Safety
    ///
    /// As [`create_instance`](Self::create_instance); `pMalloc` must be null or a
    /// valid allocator.
    pub unsafe fn create_instance2(
        &self,
        pMalloc: *mut IMalloc,
        rclsid: REFCLSID,
        riid: REFIID,
        ppv: *mut LPVOID,
    ) -> HRESULT {
        match self.create_instance2 {
            Some(func) => unsafe { func(pMalloc, rclsid, riid, ppv) },
            None => E_NOTIMPL,
        }
    }
}

impl std::fmt::Debug for DxcLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DxcLibrary")
            .field("path", &self.path)
            .field("create_instance2", &self.create_instance2.is_some())
            .finish()
    }
}

static LIBRARY: OnceLock<Result<DxcLibrary>> = OnceLock::new();

/// Process-wide library, loaded from [`library_path`] on first use and never unloaded.
pub fn global() -> Result<&'static DxcLibrary> {
    LIBRARY
        .get_or_init(DxcLibrary::load_default)
        .as_ref()
        .map_err(Clone::clone)
}

/// `DxcCreateInstance` through the process-wide library. Returns `E_FAIL` if it
/// could not be loaded.
///
/// # Safety
///
/// See [`DxcLibrary::create_instance`].
pub unsafe fn DxcCreateInstance(rclsid: REFCLSID, riid: REFIID, ppv: *mut LPVOID) -> HRESULT {
    match global() {
        Ok(library) => unsafe { library.create_instance(rclsid, riid, ppv) },
        Err(_) => E_FAIL,
    }
}

/// `DxcCreateInstance2` through the process-wide library. Returns `E_FAIL` if it
/// could not be loaded.
///
/// # Safety
///
/// See [`DxcLibrary::create_instance2`].
pub unsafe fn DxcCreateInstance2(
    pMalloc: *mut IMalloc,
    rclsid: REFCLSID,
    riid: REFIID,
    ppv: *mut LPVOID,
) -> HRESULT {
    match global() {
        Ok(library) => unsafe { library.create_instance2(pMalloc, rclsid, riid, ppv) },
        Err(_) => E_FAIL,
    }
}
