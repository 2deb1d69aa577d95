//! Container validation and signing

use crate::com::ComPtr;
use crate::operation::Outcome;
use crate::{Blob, Error, HResult, Result, ValidatorFlags};
use dxcompiler::{DxcBuffer, IDxcOperationResult, IDxcValidator, IDxcValidator2};
use std::ffi::c_void;

/// Result of a successful validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Warnings, if any
    pub warnings: Option<String>,
}

/// Validator (`IDxcValidator`, `IDxcValidator2` when available)
///
/// Containers are only signed by [`sign`](Self::sign), which validates with
/// `ValidatorFlags::IN_PLACE_EDIT` on a buffer it owns.
#[derive(Debug, Clone)]
pub struct Validator {
    inner: ComPtr<IDxcValidator>,
    with_debug: Option<ComPtr<IDxcValidator2>>,
}

impl Validator {
    pub(crate) fn new(inner: ComPtr<IDxcValidator>) -> Result<Self> {
        let with_debug = inner.cast::<IDxcValidator2>().ok();
        Ok(Validator { inner, with_debug })
    }

    pub fn as_com(&self) -> &ComPtr<IDxcValidator> {
        &self.inner
    }

    /// Whether [`validate_with_debug`](Self::validate_with_debug) is supported.
    pub fn supports_debug(&self) -> bool {
        self.with_debug.is_some()
    }

    /// Validates without modifying `container`.
    ///
    /// `ValidatorFlags::IN_PLACE_EDIT` is ignored here; use [`sign`](Self::sign).
    pub fn validate(&self, container: &Blob, flags: ValidatorFlags) -> Result<ValidationResult> {
        self.validate_raw(container, read_only(flags))
    }

    /// Validates `container` and, when it passes, returns it signed.
    pub fn sign(
        &self,
        container: Vec<u8>,
        flags: ValidatorFlags,
    ) -> Result<(Blob, ValidationResult)> {
        // Sole owner of the buffer for the duration of the call.
        let container = Blob::from_vec(container);
        let result = self.validate_raw(&container, flags | ValidatorFlags::IN_PLACE_EDIT)?;
        Ok((container, result))
    }

    fn validate_raw(&self, container: &Blob, flags: ValidatorFlags) -> Result<ValidationResult> {
        let result = unsafe {
            ComPtr::from_out_param("Validate", |out| {
                self.inner.Validate(container.as_ptr(), flags.bits(), out)
            })
        }?;
        finish(result)
    }

    /// Validates using separate debug bitcode to improve diagnostics.
    pub fn validate_with_debug(
        &self,
        container: &Blob,
        flags: ValidatorFlags,
        debug_bitcode: &[u8],
    ) -> Result<ValidationResult> {
        let validator = self.with_debug.as_ref().ok_or(Error::NoInterface {
            interface: "IDxcValidator2",
            hresult: HResult::E_NOINTERFACE,
        })?;
        let mut buffer = DxcBuffer {
            Ptr: debug_bitcode.as_ptr() as *const c_void,
            Size: debug_bitcode.len(),
            Encoding: 0,
        };
        let result = unsafe {
            ComPtr::from_out_param("ValidateWithDebug", |out| {
                validator.ValidateWithDebug(
                    container.as_ptr(),
                    read_only(flags).bits(),
                    &mut buffer,
                    out,
                )
            })
        }?;
        finish(result)
    }
}

fn read_only(flags: ValidatorFlags) -> ValidatorFlags {
    flags - ValidatorFlags::IN_PLACE_EDIT
}

fn finish(result: ComPtr<IDxcOperationResult>) -> Result<ValidationResult> {
    let outcome = Outcome::read(&result)?;
    if outcome.status.is_error() {
        return Err(Error::Validation {
            hresult: outcome.status,
            message: outcome.message(),
        });
    }
    Ok(ValidationResult {
        warnings: outcome.messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_only_drops_in_place_edit() {
        assert_eq!(
            read_only(ValidatorFlags::all()),
            ValidatorFlags::ROOT_SIGNATURE_ONLY | ValidatorFlags::MODULE_ONLY
        );
        assert_eq!(read_only(ValidatorFlags::IN_PLACE_EDIT), ValidatorFlags::empty());
        assert_eq!(
            read_only(ValidatorFlags::MODULE_ONLY),
            ValidatorFlags::MODULE_ONLY
        );
    }
}
