//! Reading `IDxcOperationResult` objects

use crate::com::ComPtr;
use crate::{Blob, BlobEncoding, HResult, Result};
use dxcompiler::{IDxcBlob, IDxcBlobEncoding, IDxcOperationResult, S_OK};
use std::ptr;

/// Product of a link or assembly
#[derive(Debug, Clone)]
pub struct OperationOutput {
    /// The resulting container
    pub object: Blob,
    /// Warnings, if any
    pub warnings: Option<String>,
}

/// Status, output and diagnostics of a finished operation.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) status: HResult,
    pub(crate) result: Option<Blob>,
    pub(crate) messages: Option<String>,
}

impl Outcome {
    pub(crate) fn read(result: &ComPtr<IDxcOperationResult>) -> Result<Self> {
        let mut status = S_OK;
        HResult(unsafe { result.GetStatus(&mut status) }).check("GetStatus")?;

        let mut output: *mut IDxcBlob = ptr::null_mut();
        HResult(unsafe { result.GetResult(&mut output) }).check("GetResult")?;
        let output = unsafe { Blob::from_raw(output) };

        let mut errors: *mut IDxcBlobEncoding = ptr::null_mut();
        HResult(unsafe { result.GetErrorBuffer(&mut errors) }).check("GetErrorBuffer")?;
        let messages = unsafe { ComPtr::from_raw(errors) }
            .map(|b| BlobEncoding::new(b).to_string_lossy())
            .filter(|s| !s.is_empty());

        Ok(Outcome {
            status: HResult(status),
            result: output,
            messages,
        })
    }

    /// Converts to an [`OperationOutput`], failing with `error` on an error status.
    pub(crate) fn into_output(
        self,
        error: fn(HResult, String) -> crate::Error,
    ) -> Result<OperationOutput> {
        if self.status.is_error() {
            let message = self.message();
            return Err(error(self.status, message));
        }
        let object = self
            .result
            .ok_or(crate::Error::MissingOutput("object"))?;
        Ok(OperationOutput {
            object,
            warnings: self.messages,
        })
    }

    /// Diagnostics, or a placeholder naming the status when there are none.
    pub(crate) fn message(&self) -> String {
        self.messages
            .clone()
            .unwrap_or_else(|| format!("Unknown error (HRESULT: {})", self.status))
    }
}
