//! Entry point: loads the compiler library and creates its objects

use crate::com::ComPtr;
use crate::{
    Assembler, Compiler, ContainerBuilder, ContainerReflection, Error, HResult, LegacyCompiler,
    LegacyPdbUtils, Linker, Optimizer, PdbUtils, Result, Utils, Validator, VersionInfo,
};
use dxcompiler::{
    CLSID_DxcAssembler, CLSID_DxcCompiler, CLSID_DxcCompilerArgs, CLSID_DxcContainerBuilder,
    CLSID_DxcContainerReflection, CLSID_DxcLibrary, CLSID_DxcLinker, CLSID_DxcOptimizer, CLSID_DxcPdbUtils,
    CLSID_DxcUtils, CLSID_DxcValidator, DxcLibrary, GUID, IMalloc, Interface,
};
use log::debug;
use std::ffi::c_void;
use std::path::Path;
use std::ptr;

/// Handle to a loaded compiler library.
///
/// Every object created through a `Dxc` stays valid for the life of the
/// process; libraries are never unloaded.
///
/// # Example
/// ```no_run
/// use dxcrs::{Dxc, ShaderTarget};
///
/// let dxc = Dxc::new().unwrap();
/// let output = dxc
///     .compiler()
///     .unwrap()
///     .compile("float4 main() : SV_Target { return 1; }", "main", ShaderTarget::PS_6_0)
///     .run()
///     .unwrap();
/// println!("{} bytes", output.object().unwrap().len());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dxc {
    library: &'static DxcLibrary,
}

impl Dxc {
    /// Uses the process-wide library, located via `DXC_LIBRARY_PATH`, the
    /// executable's directory, then the system search path.
    pub fn new() -> Result<Self> {
        Ok(Dxc {
            library: dxcompiler::global()?,
        })
    }

    /// Loads the library at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let library = DxcLibrary::load(path)?;
        debug!("using compiler library {}", library.path().display());
        Ok(Dxc {
            library: Box::leak(Box::new(library)),
        })
    }

    /// Loads from `path` if given, otherwise behaves like [`new`](Self::new).
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::new(),
        }
    }

    pub fn library(&self) -> &'static DxcLibrary {
        self.library
    }

    /// Creates an instance of `clsid` and requests interface `T`.
    pub fn create_instance<T: Interface>(&self, clsid: &GUID) -> Result<ComPtr<T>> {
        let mut out: *mut c_void = ptr::null_mut();
        let hr = HResult(unsafe { self.library.create_instance(clsid, &T::IID, &mut out) });
        if hr.is_error() {
            return Err(create_error(clsid, hr));
        }
        unsafe { ComPtr::from_raw_or_err(out.cast::<T>(), "DxcCreateInstance") }
    }

    /// Like [`create_instance`](Self::create_instance), with a custom allocator.
    ///
    /// Fails with `E_NOTIMPL` if the library lacks `DxcCreateInstance2`.
    ///
    /// # Safety
    /// `malloc` must be null or a valid `IMalloc` that outlives the object.
    pub unsafe fn create_instance_with_malloc<T: Interface>(
        &self,
        malloc: *mut IMalloc,
        clsid: &GUID,
    ) -> Result<ComPtr<T>> {
        let mut out: *mut c_void = ptr::null_mut();
        let hr =
            HResult(unsafe { self.library.create_instance2(malloc, clsid, &T::IID, &mut out) });
        if hr.is_error() {
            return Err(create_error(clsid, hr));
        }
        unsafe { ComPtr::from_raw_or_err(out.cast::<T>(), "DxcCreateInstance2") }
    }

    pub fn compiler(&self) -> Result<Compiler> {
        Ok(Compiler::new(self.create_instance(&CLSID_DxcCompiler)?))
    }

    /// `IDxcCompiler2` interface, for `CompileWithDebug`.
    pub fn legacy_compiler(&self) -> Result<LegacyCompiler> {
        Ok(LegacyCompiler::new(self.create_instance(&CLSID_DxcCompiler)?))
    }

    pub fn utils(&self) -> Result<Utils> {
        Ok(Utils::new(self.create_instance(&CLSID_DxcUtils)?))
    }

    /// `IDxcLibrary` interface, the older blob and include helpers.
    pub fn legacy_library(&self) -> Result<crate::LegacyLibrary> {
        Ok(crate::LegacyLibrary::new(
            self.create_instance(&CLSID_DxcLibrary)?,
        ))
    }

    pub fn compiler_args(&self) -> Result<crate::CompilerArgs> {
        Ok(crate::CompilerArgs::new(
            self.create_instance(&CLSID_DxcCompilerArgs)?,
        ))
    }

    pub fn validator(&self) -> Result<Validator> {
        Validator::new(self.create_instance(&CLSID_DxcValidator)?)
    }

    pub fn linker(&self) -> Result<Linker> {
        Ok(Linker::new(self.create_instance(&CLSID_DxcLinker)?))
    }

    pub fn assembler(&self) -> Result<Assembler> {
        Ok(Assembler::new(self.create_instance(&CLSID_DxcAssembler)?))
    }

    pub fn container_reflection(&self) -> Result<ContainerReflection> {
        Ok(ContainerReflection::new(
            self.create_instance(&CLSID_DxcContainerReflection)?,
        ))
    }

    pub fn container_builder(&self) -> Result<ContainerBuilder> {
        Ok(ContainerBuilder::new(
            self.create_instance(&CLSID_DxcContainerBuilder)?,
        ))
    }

    pub fn optimizer(&self) -> Result<Optimizer> {
        Ok(Optimizer::new(self.create_instance(&CLSID_DxcOptimizer)?))
    }

    pub fn pdb_utils(&self) -> Result<PdbUtils> {
        Ok(PdbUtils::new(self.create_instance(&CLSID_DxcPdbUtils)?))
    }

    pub fn legacy_pdb_utils(&self) -> Result<LegacyPdbUtils> {
        Ok(LegacyPdbUtils::new(
            self.create_instance(&CLSID_DxcPdbUtils)?,
        ))
    }

    /// Version of the compiler itself.
    pub fn compiler_version(&self) -> Result<VersionInfo> {
        VersionInfo::query(&self.compiler()?.as_com().cast()?)
    }

    /// Version of the validator, which may live in a separate library.
    pub fn validator_version(&self) -> Result<VersionInfo> {
        VersionInfo::query(&self.validator()?.as_com().cast()?)
    }
}

fn create_error(clsid: &GUID, hresult: HResult) -> Error {
    Error::CreateInstance {
        class: clsid
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| clsid.to_string()),
        hresult,
    }
}
