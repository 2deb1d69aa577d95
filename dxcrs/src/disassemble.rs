//! Shader disassembly API

use crate::compile::OutputKind;
use crate::com::ComPtr;
use crate::{Compiler, CompileOutput, Dxc, Error, HResult, Result};
use dxcompiler::{DxcBuffer, IDxcResult, IID_IDxcResult};
use std::ffi::c_void;
use std::ptr;

impl Compiler {
    /// Disassembles a DXIL container, library, or bare bitcode.
    pub fn disassemble(&self, object: &[u8]) -> Result<String> {
        let buffer = DxcBuffer {
            Ptr: object.as_ptr() as *const c_void,
            Size: object.len(),
            Encoding: 0,
        };
        let mut out: *mut c_void = ptr::null_mut();
        let hr = HResult(unsafe { self.as_com().Disassemble(&buffer, &IID_IDxcResult, &mut out) });
        if hr.is_error() {
            return Err(Error::Disassembly { hresult: hr });
        }
        let output = CompileOutput::new(unsafe {
            ComPtr::from_raw_or_err(out.cast::<IDxcResult>(), "Disassemble")
        }?);
        let status = output.status()?;
        if status.is_error() {
            return Err(Error::Disassembly { hresult: status });
        }
        output
            .disassembly()?
            .ok_or(Error::MissingOutput(OutputKind::Disassembly.label()))
    }
}

/// Disassembles compiled shader bytecode with the process-wide library.
///
/// # Example
/// ```no_run
/// use dxcrs::{compile, disassemble, ShaderTarget};
///
/// let object = compile("float4 main() : SV_Target { return 1; }", "main", ShaderTarget::PS_6_0).unwrap();
/// println!("{}", disassemble(&object).unwrap());
/// ```
pub fn disassemble(object: &[u8]) -> Result<String> {
    Dxc::new()?.compiler()?.disassemble(object)
}
