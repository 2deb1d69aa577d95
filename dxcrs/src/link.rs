//! Linking libraries and assembling bitcode

use crate::com::ComPtr;
use crate::operation::{OperationOutput, Outcome};
use crate::wide::WideArgs;
use crate::{Blob, Error, HResult, Result, ShaderTarget, WideString};
use dxcompiler::{IDxcAssembler, IDxcLinker};
use log::debug;

/// Linker (`IDxcLinker`)
///
/// # Example
/// ```no_run
/// use dxcrs::{Dxc, ShaderTarget};
///
/// let dxc = Dxc::new().unwrap();
/// let compiler = dxc.compiler().unwrap();
/// let lib = compiler
///     .compile("export float4 f() { return 1; }", "", ShaderTarget::LIB_6_3)
///     .run()
///     .unwrap()
///     .object()
///     .unwrap();
///
/// let linker = dxc.linker().unwrap();
/// linker.register_library("lib", &lib).unwrap();
/// let linked = linker.link("main", ShaderTarget::PS_6_0, &["lib"], &[]).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Linker {
    inner: ComPtr<IDxcLinker>,
}

impl Linker {
    pub(crate) fn new(inner: ComPtr<IDxcLinker>) -> Self {
        Linker { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcLinker> {
        &self.inner
    }

    /// Makes `library` available to [`link`](Self::link) under `name`.
    pub fn register_library(&self, name: &str, library: &Blob) -> Result<()> {
        let wide = WideString::new(name)?;
        debug!("registering library {name} ({} bytes)", library.len());
        HResult(unsafe { self.inner.RegisterLibrary(wide.as_ptr(), library.as_ptr()) })
            .check("RegisterLibrary")
    }

    /// Links `entry_point` for `target` from registered libraries.
    pub fn link(
        &self,
        entry_point: &str,
        target: ShaderTarget,
        libraries: &[&str],
        args: &[&str],
    ) -> Result<OperationOutput> {
        let entry = WideString::new(entry_point)?;
        let profile = WideString::new(&target.to_string())?;
        let libs = WideArgs::new(libraries)?;
        let args = WideArgs::new(args)?;
        let result = unsafe {
            ComPtr::from_out_param("Link", |out| {
                self.inner.Link(
                    entry.as_ptr(),
                    profile.as_ptr(),
                    libs.as_ptr(),
                    libs.len(),
                    args.as_ptr(),
                    args.len(),
                    out,
                )
            })
        }?;
        Outcome::read(&result)?.into_output(|hresult, message| Error::Linking { hresult, message })
    }
}

/// Assembler (`IDxcAssembler`)
#[derive(Debug, Clone)]
pub struct Assembler {
    inner: ComPtr<IDxcAssembler>,
}

impl Assembler {
    pub(crate) fn new(inner: ComPtr<IDxcAssembler>) -> Self {
        Assembler { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcAssembler> {
        &self.inner
    }

    /// Wraps LLVM bitcode or IR in a DXIL container.
    pub fn assemble_to_container(&self, module: &Blob) -> Result<OperationOutput> {
        let result = unsafe {
            ComPtr::from_out_param("AssembleToContainer", |out| {
                self.inner.AssembleToContainer(module.as_ptr(), out)
            })
        }?;
        Outcome::read(&result)?
            .into_output(|hresult, message| Error::Assembly { hresult, message })
    }
}
