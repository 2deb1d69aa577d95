//! Conversion to and from the compiler's `wchar_t` strings

use crate::{Error, Result};
use dxcompiler::{LPCWSTR, WCHAR};

/// Owned, null-terminated wide string in the compiler's native width.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WideString {
    buf: Vec<WCHAR>,
}

impl WideString {
    /// Encodes `s`, rejecting interior nulls.
    pub fn new(s: &str) -> Result<Self> {
        if s.contains('\0') {
            return Err(Error::InvalidParameter(format!(
                "string contains a null character: {s:?}"
            )));
        }
        let mut buf = encode(s);
        buf.push(0);
        Ok(WideString { buf })
    }

    pub fn as_ptr(&self) -> LPCWSTR {
        self.buf.as_ptr()
    }

    /// Characters without the terminator.
    pub fn as_slice(&self) -> &[WCHAR] {
        &self.buf[..self.buf.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_string_lossy(&self) -> String {
        decode_lossy(self.as_slice())
    }
}

impl std::fmt::Debug for WideString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WideString({:?})", self.to_string_lossy())
    }
}

/// Keeps a list of wide strings alive alongside the pointer array the compiler reads.
#[derive(Debug, Default)]
pub(crate) struct WideArgs {
    strings: Vec<WideString>,
    ptrs: Vec<LPCWSTR>,
}

impl WideArgs {
    pub(crate) fn new<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strings = args
            .into_iter()
            .map(|a| WideString::new(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let ptrs = strings.iter().map(WideString::as_ptr).collect();
        Ok(WideArgs { strings, ptrs })
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut LPCWSTR {
        self.ptrs.as_mut_ptr()
    }

    pub(crate) fn as_ptr(&self) -> *const LPCWSTR {
        self.ptrs.as_ptr()
    }

    pub(crate) fn len(&self) -> u32 {
        self.strings.len() as u32
    }
}

#[cfg(windows)]
fn encode(s: &str) -> Vec<WCHAR> {
    s.encode_utf16().collect()
}

#[cfg(not(windows))]
fn encode(s: &str) -> Vec<WCHAR> {
    s.chars().map(|c| c as WCHAR).collect()
}

#[cfg(windows)]
pub(crate) fn decode(chars: &[WCHAR]) -> Result<String> {
    String::from_utf16(chars).map_err(|_| Error::InvalidWideString)
}

#[cfg(not(windows))]
pub(crate) fn decode(chars: &[WCHAR]) -> Result<String> {
    chars
        .iter()
        .map(|&c| char::from_u32(c).ok_or(Error::InvalidWideString))
        .collect()
}

#[cfg(windows)]
pub(crate) fn decode_lossy(chars: &[WCHAR]) -> String {
    String::from_utf16_lossy(chars)
}

#[cfg(not(windows))]
pub(crate) fn decode_lossy(chars: &[WCHAR]) -> String {
    chars
        .iter()
        .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Reads a null-terminated wide string.
///
/// # Safety
/// `ptr` must be null or point to a null-terminated `WCHAR` sequence.
pub(crate) unsafe fn from_wide_ptr(ptr: LPCWSTR) -> Result<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    let mut len = 0;
    unsafe {
        while *ptr.add(len) != 0 {
            len += 1;
        }
        decode(std::slice::from_raw_parts(ptr, len))
    }
}
