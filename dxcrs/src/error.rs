//! Error types for dxcrs operations

use std::fmt;
use thiserror::Error;

/// HRESULT status codes returned by the compiler library
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    /// Success
    pub const S_OK: HResult = HResult(dxcompiler::S_OK);
    /// Success, with a negative answer
    pub const S_FALSE: HResult = HResult(dxcompiler::S_FALSE);
    /// Generic failure
    pub const E_FAIL: HResult = HResult(dxcompiler::E_FAIL);
    /// Invalid argument
    pub const E_INVALIDARG: HResult = HResult(dxcompiler::E_INVALIDARG);
    /// The object does not implement the requested interface
    pub const E_NOINTERFACE: HResult = HResult(dxcompiler::E_NOINTERFACE);
    /// Not implemented
    pub const E_NOTIMPL: HResult = HResult(dxcompiler::E_NOTIMPL);
    /// Null pointer argument
    pub const E_POINTER: HResult = HResult(dxcompiler::E_POINTER);
    /// Allocation failure
    pub const E_OUTOFMEMORY: HResult = HResult(dxcompiler::E_OUTOFMEMORY);
    /// File not found
    pub const E_FILE_NOT_FOUND: HResult = HResult(dxcompiler::E_FILE_NOT_FOUND);

    /// Returns true if the result indicates success
    #[inline]
    pub fn is_success(&self) -> bool {
        self.0 >= 0
    }

    /// Returns true if the result indicates an error
    #[inline]
    pub fn is_error(&self) -> bool {
        self.0 < 0
    }

    /// Returns the raw HRESULT value
    #[inline]
    pub fn code(&self) -> i32 {
        self.0
    }

    /// Maps failure codes to `Error::Com` tagged with the operation name.
    #[inline]
    pub(crate) fn check(self, operation: &'static str) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::Com {
                operation,
                hresult: self,
            })
        }
    }

    fn name(&self) -> Option<&'static str> {
        Some(match *self {
            HResult::S_OK => "S_OK",
            HResult::S_FALSE => "S_FALSE",
            HResult::E_FAIL => "E_FAIL",
            HResult::E_INVALIDARG => "E_INVALIDARG",
            HResult::E_NOINTERFACE => "E_NOINTERFACE",
            HResult::E_NOTIMPL => "E_NOTIMPL",
            HResult::E_POINTER => "E_POINTER",
            HResult::E_OUTOFMEMORY => "E_OUTOFMEMORY",
            HResult::E_FILE_NOT_FOUND => "E_FILE_NOT_FOUND",
            _ => return None,
        })
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "HResult(0x{:08x} {})", self.0 as u32, name),
            None => write!(f, "HResult(0x{:08x})", self.0 as u32),
        }
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0 as u32)
    }
}

impl From<i32> for HResult {
    fn from(hr: i32) -> Self {
        HResult(hr)
    }
}

/// Error type for dxcrs operations
#[derive(Error, Debug)]
pub enum Error {
    /// The compiler library could not be loaded
    #[error(transparent)]
    Load(#[from] dxcompiler::LoadError),

    /// `DxcCreateInstance` failed for a class
    #[error("Failed to create {class} (HRESULT: {hresult})")]
    CreateInstance {
        /// Name of the requested class
        class: String,
        /// The HRESULT error code
        hresult: HResult,
    },

    /// An object does not implement a requested interface
    #[error("Interface {interface} not supported (HRESULT: {hresult})")]
    NoInterface {
        /// Name of the requested interface
        interface: &'static str,
        /// The HRESULT error code
        hresult: HResult,
    },

    /// Shader compilation failed
    #[error("Compilation failed: {message}")]
    Compilation {
        /// The HRESULT error code
        hresult: HResult,
        /// Error message from the compiler
        message: String,
    },

    /// Preprocessing failed
    #[error("Preprocessing failed: {message}")]
    Preprocessing {
        /// The HRESULT error code
        hresult: HResult,
        /// Error message from the preprocessor
        message: String,
    },

    /// Disassembly failed
    #[error("Disassembly failed (HRESULT: {hresult})")]
    Disassembly {
        /// The HRESULT error code
        hresult: HResult,
    },

    /// Validation rejected the container
    #[error("Validation failed: {message}")]
    Validation {
        /// The HRESULT error code
        hresult: HResult,
        /// Error message from the validator
        message: String,
    },

    /// Linking failed
    #[error("Linking failed: {message}")]
    Linking {
        /// The HRESULT error code
        hresult: HResult,
        /// Error message from the linker
        message: String,
    },

    /// Assembling a module into a container failed
    #[error("Assembly failed: {message}")]
    Assembly {
        /// The HRESULT error code
        hresult: HResult,
        /// Error message from the assembler
        message: String,
    },

    /// A container operation failed
    #[error("Container {operation} failed (HRESULT: {hresult})")]
    Container {
        /// The container operation
        operation: &'static str,
        /// The HRESULT error code
        hresult: HResult,
    },

    /// A successful call did not produce an expected output
    #[error("Missing {0} output")]
    MissingOutput(&'static str),

    /// Requested container part is absent
    #[error("Container part {0} not found")]
    PartNotFound(String),

    /// Running optimizer passes failed
    #[error("Optimizer failed (HRESULT: {hresult})")]
    Optimizer {
        /// The HRESULT error code
        hresult: HResult,
    },

    /// Recompiling from a PDB failed
    #[error("PDB recompilation failed: {message}")]
    Pdb {
        /// The HRESULT error code
        hresult: HResult,
        /// Error message from the compiler
        message: String,
    },

    /// Any other call into the compiler library failed
    #[error("{operation} failed (HRESULT: {hresult})")]
    Com {
        /// Name of the failed call
        operation: &'static str,
        /// The HRESULT error code
        hresult: HResult,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Wide string returned by the compiler was not valid Unicode
    #[error("Invalid wide string from compiler")]
    InvalidWideString,

    /// Include file not found
    #[error("Include file not found: {0}")]
    IncludeNotFound(String),

    /// IO error during include resolution
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The HRESULT carried by this error, if any.
    pub fn hresult(&self) -> Option<HResult> {
        match self {
            Error::CreateInstance { hresult, .. }
            | Error::NoInterface { hresult, .. }
            | Error::Compilation { hresult, .. }
            | Error::Preprocessing { hresult, .. }
            | Error::Disassembly { hresult }
            | Error::Validation { hresult, .. }
            | Error::Linking { hresult, .. }
            | Error::Assembly { hresult, .. }
            | Error::Container { hresult, .. }
            | Error::Optimizer { hresult }
            | Error::Pdb { hresult, .. }
            | Error::Com { hresult, .. } => Some(*hresult),
            _ => None,
        }
    }
}

/// Result type for dxcrs operations
pub type Result<T> = std::result::Result<T, Error>;
