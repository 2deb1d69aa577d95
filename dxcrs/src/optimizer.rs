//! Running LLVM passes over DXIL modules

use crate::com::ComPtr;
use crate::wide::{from_wide_ptr, WideArgs};
use crate::{Blob, BlobEncoding, Error, HResult, Result};
use dxcompiler::{
    CoTaskMemFree, IDxcBlob, IDxcBlobEncoding, IDxcOptimizer, IDxcOptimizerPass, LPWSTR,
};
use log::debug;
use std::ptr;

/// One argument accepted by an optimizer pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassArgument {
    pub name: String,
    pub description: String,
}

/// Description of an available optimizer pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerPassInfo {
    /// Option name, passed as `-<name>` to [`Optimizer::run_optimizer`]
    pub name: String,
    pub description: String,
    pub arguments: Vec<PassArgument>,
}

/// Module and textual output of an optimizer run
#[derive(Debug, Clone)]
pub struct OptimizerOutput {
    pub module: Option<Blob>,
    /// Pass output, such as the result of `-print-module`
    pub text: Option<String>,
}

/// Optimizer (`IDxcOptimizer`)
#[derive(Debug, Clone)]
pub struct Optimizer {
    inner: ComPtr<IDxcOptimizer>,
}

impl Optimizer {
    pub(crate) fn new(inner: ComPtr<IDxcOptimizer>) -> Self {
        Optimizer { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcOptimizer> {
        &self.inner
    }

    pub fn pass_count(&self) -> Result<u32> {
        let mut count = 0;
        HResult(unsafe { self.inner.GetAvailablePassCount(&mut count) })
            .check("GetAvailablePassCount")?;
        Ok(count)
    }

    pub fn pass(&self, index: u32) -> Result<OptimizerPassInfo> {
        let pass = unsafe {
            ComPtr::from_out_param("GetAvailablePass", |out| {
                self.inner.GetAvailablePass(index, out)
            })
        }?;
        describe(&pass)
    }

    /// All passes the library offers.
    pub fn passes(&self) -> Result<Vec<OptimizerPassInfo>> {
        (0..self.pass_count()?).map(|i| self.pass(i)).collect()
    }

    /// Runs the passes named by `options` over a DXIL module or container.
    pub fn run_optimizer(&self, module: &Blob, options: &[&str]) -> Result<OptimizerOutput> {
        let mut options = WideArgs::new(options)?;
        let mut output: *mut IDxcBlob = ptr::null_mut();
        let mut text: *mut IDxcBlobEncoding = ptr::null_mut();
        let hr = HResult(unsafe {
            self.inner.RunOptimizer(
                module.as_ptr(),
                options.as_mut_ptr(),
                options.len(),
                &mut output,
                &mut text,
            )
        });
        let module = unsafe { Blob::from_raw(output) };
        let text = unsafe { ComPtr::from_raw(text) }
            .map(|b| BlobEncoding::new(b).to_string_lossy())
            .filter(|s| !s.is_empty());
        if hr.is_error() {
            return Err(Error::Optimizer { hresult: hr });
        }
        debug!(
            "optimizer produced {} byte module",
            module.as_ref().map_or(0, Blob::len)
        );
        Ok(OptimizerOutput { module, text })
    }
}

fn describe(pass: &ComPtr<IDxcOptimizerPass>) -> Result<OptimizerPassInfo> {
    let name = take_string("GetOptionName", |out| unsafe { pass.GetOptionName(out) })?;
    let description = take_string("GetDescription", |out| unsafe { pass.GetDescription(out) })?;

    let mut count = 0;
    HResult(unsafe { pass.GetOptionArgCount(&mut count) }).check("GetOptionArgCount")?;
    let arguments = (0..count)
        .map(|i| {
            Ok(PassArgument {
                name: take_string("GetOptionArgName", |out| unsafe {
                    pass.GetOptionArgName(i, out)
                })?,
                description: take_string("GetOptionArgDescription", |out| unsafe {
                    pass.GetOptionArgDescription(i, out)
                })?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OptimizerPassInfo {
        name,
        description,
        arguments,
    })
}

/// Reads and frees a task-allocated wide string.
fn take_string(operation: &'static str, f: impl FnOnce(*mut LPWSTR) -> i32) -> Result<String> {
    let mut raw: LPWSTR = ptr::null_mut();
    let hr = HResult(f(&mut raw));
    let text = unsafe { from_wide_ptr(raw) };
    unsafe { CoTaskMemFree(raw.cast()) };
    hr.check(operation)?;
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WideString;

    #[test]
    fn test_take_string_frees_copy() {
        let source = WideString::new("-dce").unwrap();
        let text = take_string("GetOptionName", |out| unsafe {
            let bytes = (source.len() + 1) * std::mem::size_of::<dxcompiler::WCHAR>();
            let copy = task_alloc(bytes) as LPWSTR;
            ptr::copy_nonoverlapping(source.as_ptr(), copy, source.len() + 1);
            *out = copy;
            0
        })
        .unwrap();
        assert_eq!(text, "-dce");
    }

    #[test]
    fn test_take_string_failure() {
        let err = take_string("GetDescription", |_| HResult::E_FAIL.0).unwrap_err();
        assert_eq!(err.hresult(), Some(HResult::E_FAIL));
    }

    #[cfg(not(windows))]
    unsafe fn task_alloc(size: usize) -> *mut std::ffi::c_void {
        unsafe extern "C" {
            fn malloc(size: usize) -> *mut std::ffi::c_void;
        }
        unsafe { malloc(size) }
    }

    #[cfg(windows)]
    unsafe fn task_alloc(size: usize) -> *mut std::ffi::c_void {
        #[link(name = "ole32")]
        unsafe extern "system" {
            fn CoTaskMemAlloc(size: usize) -> *mut std::ffi::c_void;
        }
        unsafe { CoTaskMemAlloc(size) }
    }
}
