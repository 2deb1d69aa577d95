use std::ffi::{c_char, c_void};

use crate::guid::GUID;

pub type HRESULT = i32;
pub type BOOL = i32;
pub type UINT = u32;
pub type UINT32 = u32;
pub type SIZE_T = usize;
pub type LPVOID = *mut c_void;
pub type LPCVOID = *const c_void;
pub type LPSTR = *mut c_char;
pub type LPCSTR = *const c_char;

/// `wchar_t` as the compiler library sees it: UTF-16 on Windows, UTF-32 elsewhere.
#[cfg(windows)]
pub type WCHAR = u16;
#[cfg(not(windows))]
pub type WCHAR = u32;

pub type LPWSTR = *mut WCHAR;
pub type LPCWSTR = *const WCHAR;
pub type BSTR = *mut WCHAR;

pub type REFIID = *const GUID;
pub type REFCLSID = *const GUID;

pub const TRUE: BOOL = 1;
pub const FALSE: BOOL = 0;

pub const S_OK: HRESULT = 0;
pub const S_FALSE: HRESULT = 1;
pub const E_NOTIMPL: HRESULT = 0x80004001u32 as i32;
pub const E_NOINTERFACE: HRESULT = 0x80004002u32 as i32;
pub const E_POINTER: HRESULT = 0x80004003u32 as i32;
pub const E_FAIL: HRESULT = 0x80004005u32 as i32;
pub const E_OUTOFMEMORY: HRESULT = 0x8007000Eu32 as i32;
pub const E_INVALIDARG: HRESULT = 0x80070057u32 as i32;
/// `HRESULT_FROM_WIN32(ERROR_FILE_NOT_FOUND)`
pub const E_FILE_NOT_FOUND: HRESULT = 0x80070002u32 as i32;

#[inline]
pub const fn SUCCEEDED(hr: HRESULT) -> bool {
    hr >= 0
}

#[inline]
pub const fn FAILED(hr: HRESULT) -> bool {
    hr < 0
}

/// Allocator interface accepted by `DxcCreateInstance2` and the `*OnMalloc` blob constructors.
#[repr(C)]
pub struct IMalloc {
    _private: [u8; 0],
}

/// Stream interface returned by the read-only stream constructors.
#[repr(C)]
pub struct IStream {
    _private: [u8; 0],
}

/// Classifies an output produced by `IDxcResult`.
///
/// Kept as a transparent 32-bit value so kinds introduced by newer compiler
/// builds pass through unchanged.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DXC_OUT_KIND(pub u32);

impl DXC_OUT_KIND {
    pub const NONE: Self = Self(0);
    pub const OBJECT: Self = Self(1);
    pub const ERRORS: Self = Self(2);
    pub const PDB: Self = Self(3);
    pub const SHADER_HASH: Self = Self(4);
    pub const DISASSEMBLY: Self = Self(5);
    pub const HLSL: Self = Self(6);
    pub const TEXT: Self = Self(7);
    pub const REFLECTION: Self = Self(8);
    pub const ROOT_SIGNATURE: Self = Self(9);
    pub const EXTRA_OUTPUTS: Self = Self(10);
    pub const REMARKS: Self = Self(11);
    pub const TIME_REPORT: Self = Self(12);
    pub const TIME_TRACE: Self = Self(13);

    pub const LAST: Self = Self::TIME_TRACE;
    pub const NUM_ENUMS: u32 = 14;
    pub const FORCE_DWORD: Self = Self(0xFFFF_FFFF);

    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "DXC_OUT_NONE",
            1 => "DXC_OUT_OBJECT",
            2 => "DXC_OUT_ERRORS",
            3 => "DXC_OUT_PDB",
            4 => "DXC_OUT_SHADER_HASH",
            5 => "DXC_OUT_DISASSEMBLY",
            6 => "DXC_OUT_HLSL",
            7 => "DXC_OUT_TEXT",
            8 => "DXC_OUT_REFLECTION",
            9 => "DXC_OUT_ROOT_SIGNATURE",
            10 => "DXC_OUT_EXTRA_OUTPUTS",
            11 => "DXC_OUT_REMARKS",
            12 => "DXC_OUT_TIME_REPORT",
            13 => "DXC_OUT_TIME_TRACE",
            _ => return None,
        })
    }
}

impl std::fmt::Debug for DXC_OUT_KIND {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "DXC_OUT_KIND({})", self.0),
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DxcShaderHash {
    /// `DXC_HASHFLAG_*`
    pub Flags: UINT32,
    pub HashDigest: [u8; 16],
}

/// Caller-owned view of source or bytecode. Never copied or freed by the compiler.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DxcBuffer {
    pub Ptr: LPCVOID,
    pub Size: SIZE_T,
    pub Encoding: UINT,
}

pub type DxcText = DxcBuffer;

impl Default for DxcBuffer {
    fn default() -> Self {
        Self {
            Ptr: std::ptr::null(),
            Size: 0,
            Encoding: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DxcDefine {
    pub Name: LPCWSTR,
    /// May be null.
    pub Value: LPCWSTR,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DxcArgPair {
    pub pName: *const WCHAR,
    pub pValue: *const WCHAR,
}

pub type DxcCreateInstanceProc = unsafe extern "system" fn(
    rclsid: REFCLSID,
    riid: REFIID,
    ppv: *mut LPVOID,
) -> HRESULT;

pub type DxcCreateInstance2Proc = unsafe extern "system" fn(
    pMalloc: *mut IMalloc,
    rclsid: REFCLSID,
    riid: REFIID,
    ppv: *mut LPVOID,
) -> HRESULT;
