//! Compiler and validator version queries

use crate::com::ComPtr;
use crate::{HResult, Result, VersionInfoFlags};
use dxcompiler::{CoTaskMemFree, IDxcVersionInfo, IDxcVersionInfo2, IDxcVersionInfo3, LPSTR};
use std::ffi::CStr;
use std::fmt;
use std::ptr;

/// Version details reported by a compiler component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub flags: VersionInfoFlags,
    /// Commit count and hash, when the component reports them
    pub commit: Option<(u32, String)>,
    /// Vendor version string, when the component reports one
    pub custom: Option<String>,
}

impl VersionInfo {
    /// Reads every version interface the object implements.
    pub fn query(info: &ComPtr<IDxcVersionInfo>) -> Result<Self> {
        let (mut major, mut minor, mut flags) = (0, 0, 0);
        HResult(unsafe { info.GetVersion(&mut major, &mut minor) }).check("GetVersion")?;
        HResult(unsafe { info.GetFlags(&mut flags) }).check("GetFlags")?;

        let commit = match info.cast::<IDxcVersionInfo2>() {
            Ok(info2) => {
                let mut count = 0;
                let mut hash: LPSTR = ptr::null_mut();
                let hr = HResult(unsafe { info2.GetCommitInfo(&mut count, &mut hash) });
                let hash = unsafe { take_string(hash) };
                hr.check("GetCommitInfo")?;
                Some((count, hash))
            }
            Err(_) => None,
        };

        let custom = match info.cast::<IDxcVersionInfo3>() {
            Ok(info3) => {
                let mut text: LPSTR = ptr::null_mut();
                let hr = HResult(unsafe { info3.GetCustomVersionString(&mut text) });
                let text = unsafe { take_string(text) };
                hr.check("GetCustomVersionString")?;
                Some(text).filter(|s| !s.is_empty())
            }
            Err(_) => None,
        };

        Ok(VersionInfo {
            major,
            minor,
            flags: VersionInfoFlags::from_bits_retain(flags),
            commit,
            custom,
        })
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some((count, hash)) = &self.commit {
            write!(f, ".{count} ({hash})")?;
        }
        if self.flags.contains(VersionInfoFlags::DEBUG) {
            f.write_str(" debug")?;
        }
        if let Some(custom) = &self.custom {
            write!(f, " {custom}")?;
        }
        Ok(())
    }
}

/// Copies and frees a task-allocated C string.
unsafe fn take_string(ptr: LPSTR) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe { CoTaskMemFree(ptr.cast()) };
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn version() -> VersionInfo {
        VersionInfo {
            major: 1,
            minor: 8,
            flags: VersionInfoFlags::empty(),
            commit: None,
            custom: None,
        }
    }

    #[test]
    fn test_display_plain() {
        assert_eq!(version().to_string(), "1.8");
    }

    #[test]
    fn test_display_full() {
        let info = VersionInfo {
            flags: VersionInfoFlags::DEBUG,
            commit: Some((4640, "ff2e1e9".into())),
            custom: Some("vendor-build".into()),
            ..version()
        };
        assert_eq!(info.to_string(), "1.8.4640 (ff2e1e9) debug vendor-build");
    }

    #[test]
    fn test_take_null_string() {
        assert_eq!(unsafe { take_string(ptr::null_mut()) }, "");
    }
}
