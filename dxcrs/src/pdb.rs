//! Reading shader PDBs and recompiling from them

use crate::com::ComPtr;
use crate::wide::decode;
use crate::{
    Blob, BlobEncoding, BlobWide, CompileOutput, Compiler, Error, HResult, Result, VersionInfo,
    WideString,
};
use dxcompiler::{
    BSTR, DxcArgPair, IDxcBlob, IDxcBlobWide, IDxcPdbUtils, IDxcPdbUtils2, IDxcVersionInfo,
    SysFreeString, SysStringLen, TRUE,
};
use log::debug;
use std::ptr;

/// One source file embedded in a PDB
#[derive(Debug, Clone)]
pub struct PdbSource {
    pub name: String,
    pub contents: BlobEncoding,
}

/// Everything a PDB records about how its shader was compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdbSummary {
    pub name: Option<String>,
    pub main_file_name: Option<String>,
    pub entry_point: Option<String>,
    pub target_profile: Option<String>,
    pub source_names: Vec<String>,
    pub flags: Vec<String>,
    pub args: Vec<String>,
    pub arg_pairs: Vec<(Option<String>, Option<String>)>,
    pub defines: Vec<String>,
    pub full_pdb: bool,
}

/// PDB reader (`IDxcPdbUtils2`)
///
/// Accepts a PDB or a DXIL container with embedded debug info.
#[derive(Debug, Clone)]
pub struct PdbUtils {
    inner: ComPtr<IDxcPdbUtils2>,
}

impl PdbUtils {
    pub(crate) fn new(inner: ComPtr<IDxcPdbUtils2>) -> Self {
        PdbUtils { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcPdbUtils2> {
        &self.inner
    }

    pub fn load(&self, pdb: &Blob) -> Result<()> {
        debug!("loading PDB ({} bytes)", pdb.len());
        HResult(unsafe { self.inner.Load(pdb.as_ptr()) }).check("Load")
    }

    pub fn source_count(&self) -> Result<u32> {
        count("GetSourceCount", |n| unsafe { self.inner.GetSourceCount(n) })
    }

    pub fn source(&self, index: u32) -> Result<PdbSource> {
        let contents = unsafe {
            ComPtr::from_out_param("GetSource", |out| self.inner.GetSource(index, out))
        }?;
        Ok(PdbSource {
            name: self.source_name(index)?.unwrap_or_default(),
            contents: BlobEncoding::new(contents),
        })
    }

    pub fn source_name(&self, index: u32) -> Result<Option<String>> {
        wide("GetSourceName", |out| unsafe {
            self.inner.GetSourceName(index, out)
        })
    }

    pub fn sources(&self) -> Result<Vec<PdbSource>> {
        (0..self.source_count()?).map(|i| self.source(i)).collect()
    }

    pub fn flags(&self) -> Result<Vec<String>> {
        wide_list(
            "GetFlagCount",
            |n| unsafe { self.inner.GetFlagCount(n) },
            "GetFlag",
            |i, out| unsafe { self.inner.GetFlag(i, out) },
        )
    }

    pub fn args(&self) -> Result<Vec<String>> {
        wide_list(
            "GetArgCount",
            |n| unsafe { self.inner.GetArgCount(n) },
            "GetArg",
            |i, out| unsafe { self.inner.GetArg(i, out) },
        )
    }

    pub fn arg_pairs(&self) -> Result<Vec<(Option<String>, Option<String>)>> {
        let n = count("GetArgPairCount", |n| unsafe { self.inner.GetArgPairCount(n) })?;
        (0..n)
            .map(|i| {
                let mut name: *mut IDxcBlobWide = ptr::null_mut();
                let mut value: *mut IDxcBlobWide = ptr::null_mut();
                let hr = HResult(unsafe { self.inner.GetArgPair(i, &mut name, &mut value) });
                let name = unsafe { BlobWide::string_from_raw(name) };
                let value = unsafe { BlobWide::string_from_raw(value) };
                hr.check("GetArgPair")?;
                Ok((name?, value?))
            })
            .collect()
    }

    pub fn defines(&self) -> Result<Vec<String>> {
        wide_list(
            "GetDefineCount",
            |n| unsafe { self.inner.GetDefineCount(n) },
            "GetDefine",
            |i, out| unsafe { self.inner.GetDefine(i, out) },
        )
    }

    pub fn target_profile(&self) -> Result<Option<String>> {
        wide("GetTargetProfile", |out| unsafe {
            self.inner.GetTargetProfile(out)
        })
    }

    pub fn entry_point(&self) -> Result<Option<String>> {
        wide("GetEntryPoint", |out| unsafe { self.inner.GetEntryPoint(out) })
    }

    pub fn main_file_name(&self) -> Result<Option<String>> {
        wide("GetMainFileName", |out| unsafe {
            self.inner.GetMainFileName(out)
        })
    }

    /// PDB file name derived from the shader hash.
    pub fn name(&self) -> Result<Option<String>> {
        wide("GetName", |out| unsafe { self.inner.GetName(out) })
    }

    pub fn hash(&self) -> Result<Option<Blob>> {
        optional_blob("GetHash", |out| unsafe { self.inner.GetHash(out) })
    }

    pub fn whole_dxil(&self) -> Result<Option<Blob>> {
        optional_blob("GetWholeDxil", |out| unsafe {
            self.inner.GetWholeDxil(out)
        })
    }

    pub fn custom_toolchain_id(&self) -> Result<u32> {
        count("GetCustomToolchainID", |n| unsafe {
            self.inner.GetCustomToolchainID(n)
        })
    }

    pub fn custom_toolchain_data(&self) -> Result<Option<Blob>> {
        optional_blob("GetCustomToolchainData", |out| unsafe {
            self.inner.GetCustomToolchainData(out)
        })
    }

    pub fn version_info(&self) -> Result<Option<VersionInfo>> {
        version_info(|out| unsafe { self.inner.GetVersionInfo(out) })
    }

    /// PDBs of the libraries linked into this shader, with their names.
    pub fn library_pdbs(&self) -> Result<Vec<(PdbUtils, Option<String>)>> {
        let n = count("GetLibraryPDBCount", |n| unsafe {
            self.inner.GetLibraryPDBCount(n)
        })?;
        (0..n)
            .map(|i| {
                let mut utils: *mut IDxcPdbUtils2 = ptr::null_mut();
                let mut name: *mut IDxcBlobWide = ptr::null_mut();
                let hr = HResult(unsafe { self.inner.GetLibraryPDB(i, &mut utils, &mut name) });
                let utils = unsafe { ComPtr::from_raw(utils) };
                let name = unsafe { BlobWide::string_from_raw(name) };
                hr.check("GetLibraryPDB")?;
                let utils = utils.ok_or(Error::MissingOutput("library PDB"))?;
                Ok((PdbUtils::new(utils), name?))
            })
            .collect()
    }

    pub fn is_full_pdb(&self) -> bool {
        unsafe { self.inner.IsFullPDB() == TRUE }
    }

    /// Whether the PDB only references its shader by hash.
    pub fn is_pdb_ref(&self) -> bool {
        unsafe { self.inner.IsPDBRef() == TRUE }
    }

    pub fn summary(&self) -> Result<PdbSummary> {
        let source_names = (0..self.source_count()?)
            .map(|i| self.source_name(i).map(Option::unwrap_or_default))
            .collect::<Result<Vec<_>>>()?;
        Ok(PdbSummary {
            name: self.name()?,
            main_file_name: self.main_file_name()?,
            entry_point: self.entry_point()?,
            target_profile: self.target_profile()?,
            source_names,
            flags: self.flags()?,
            args: self.args()?,
            arg_pairs: self.arg_pairs()?,
            defines: self.defines()?,
            full_pdb: self.is_full_pdb(),
        })
    }
}

/// Older PDB reader (`IDxcPdbUtils`) that can also recompile.
#[derive(Debug, Clone)]
pub struct LegacyPdbUtils {
    inner: ComPtr<IDxcPdbUtils>,
}

impl LegacyPdbUtils {
    pub(crate) fn new(inner: ComPtr<IDxcPdbUtils>) -> Self {
        LegacyPdbUtils { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcPdbUtils> {
        &self.inner
    }

    pub fn load(&self, pdb: &Blob) -> Result<()> {
        HResult(unsafe { self.inner.Load(pdb.as_ptr()) }).check("Load")
    }

    pub fn source_count(&self) -> Result<u32> {
        count("GetSourceCount", |n| unsafe { self.inner.GetSourceCount(n) })
    }

    pub fn source(&self, index: u32) -> Result<PdbSource> {
        let contents = unsafe {
            ComPtr::from_out_param("GetSource", |out| self.inner.GetSource(index, out))
        }?;
        Ok(PdbSource {
            name: self.source_name(index)?,
            contents: BlobEncoding::new(contents),
        })
    }

    pub fn source_name(&self, index: u32) -> Result<String> {
        bstr("GetSourceName", |out| unsafe {
            self.inner.GetSourceName(index, out)
        })
    }

    pub fn flags(&self) -> Result<Vec<String>> {
        let n = count("GetFlagCount", |n| unsafe { self.inner.GetFlagCount(n) })?;
        (0..n)
            .map(|i| bstr("GetFlag", |out| unsafe { self.inner.GetFlag(i, out) }))
            .collect()
    }

    pub fn args(&self) -> Result<Vec<String>> {
        let n = count("GetArgCount", |n| unsafe { self.inner.GetArgCount(n) })?;
        (0..n)
            .map(|i| bstr("GetArg", |out| unsafe { self.inner.GetArg(i, out) }))
            .collect()
    }

    pub fn arg_pairs(&self) -> Result<Vec<(String, String)>> {
        let n = count("GetArgPairCount", |n| unsafe { self.inner.GetArgPairCount(n) })?;
        (0..n)
            .map(|i| {
                let mut name: BSTR = ptr::null_mut();
                let mut value: BSTR = ptr::null_mut();
                let hr = HResult(unsafe { self.inner.GetArgPair(i, &mut name, &mut value) });
                let name = unsafe { take_bstr(name) };
                let value = unsafe { take_bstr(value) };
                hr.check("GetArgPair")?;
                Ok((name?, value?))
            })
            .collect()
    }

    pub fn defines(&self) -> Result<Vec<String>> {
        let n = count("GetDefineCount", |n| unsafe { self.inner.GetDefineCount(n) })?;
        (0..n)
            .map(|i| bstr("GetDefine", |out| unsafe { self.inner.GetDefine(i, out) }))
            .collect()
    }

    pub fn target_profile(&self) -> Result<String> {
        bstr("GetTargetProfile", |out| unsafe {
            self.inner.GetTargetProfile(out)
        })
    }

    pub fn entry_point(&self) -> Result<String> {
        bstr("GetEntryPoint", |out| unsafe { self.inner.GetEntryPoint(out) })
    }

    pub fn main_file_name(&self) -> Result<String> {
        bstr("GetMainFileName", |out| unsafe {
            self.inner.GetMainFileName(out)
        })
    }

    pub fn name(&self) -> Result<String> {
        bstr("GetName", |out| unsafe { self.inner.GetName(out) })
    }

    pub fn hash(&self) -> Result<Option<Blob>> {
        optional_blob("GetHash", |out| unsafe { self.inner.GetHash(out) })
    }

    pub fn is_full_pdb(&self) -> bool {
        unsafe { self.inner.IsFullPDB() == TRUE }
    }

    /// Full PDB, recompiling a slim one when needed.
    pub fn full_pdb(&self) -> Result<Blob> {
        let blob = unsafe {
            ComPtr::from_out_param("GetFullPDB", |out| self.inner.GetFullPDB(out))
        }?;
        Ok(Blob::from(blob))
    }

    pub fn version_info(&self) -> Result<Option<VersionInfo>> {
        version_info(|out| unsafe { self.inner.GetVersionInfo(out) })
    }

    /// Compiler used by [`compile_for_full_pdb`](Self::compile_for_full_pdb).
    pub fn set_compiler(&self, compiler: &Compiler) -> Result<()> {
        HResult(unsafe { self.inner.SetCompiler(compiler.as_com().as_ptr()) }).check("SetCompiler")
    }

    /// Replaces recorded arguments before recompiling.
    pub fn override_args(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let strings = pairs
            .iter()
            .map(|(name, value)| Ok((WideString::new(name)?, WideString::new(value)?)))
            .collect::<Result<Vec<_>>>()?;
        let mut raw: Vec<DxcArgPair> = strings
            .iter()
            .map(|(name, value)| DxcArgPair {
                pName: name.as_ptr(),
                pValue: value.as_ptr(),
            })
            .collect();
        HResult(unsafe { self.inner.OverrideArgs(raw.as_mut_ptr(), raw.len() as u32) })
            .check("OverrideArgs")
    }

    pub fn override_root_signature(&self, root_signature: &str) -> Result<()> {
        let wide = WideString::new(root_signature)?;
        HResult(unsafe { self.inner.OverrideRootSignature(wide.as_ptr()) })
            .check("OverrideRootSignature")
    }

    /// Recompiles the shader from the recorded sources and arguments.
    pub fn compile_for_full_pdb(&self) -> Result<CompileOutput> {
        let result = unsafe {
            ComPtr::from_out_param("CompileForFullPDB", |out| {
                self.inner.CompileForFullPDB(out)
            })
        }?;
        CompileOutput::new(result).check(|hresult, message| Error::Pdb { hresult, message })
    }

    pub fn summary(&self) -> Result<PdbSummary> {
        let source_names = (0..self.source_count()?)
            .map(|i| self.source_name(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(PdbSummary {
            name: Some(self.name()?).filter(|s| !s.is_empty()),
            main_file_name: Some(self.main_file_name()?).filter(|s| !s.is_empty()),
            entry_point: Some(self.entry_point()?).filter(|s| !s.is_empty()),
            target_profile: Some(self.target_profile()?).filter(|s| !s.is_empty()),
            source_names,
            flags: self.flags()?,
            args: self.args()?,
            arg_pairs: self
                .arg_pairs()?
                .into_iter()
                .map(|(n, v)| (Some(n), Some(v)))
                .collect(),
            defines: self.defines()?,
            full_pdb: self.is_full_pdb(),
        })
    }
}

fn count(operation: &'static str, f: impl FnOnce(*mut u32) -> i32) -> Result<u32> {
    let mut n = 0;
    HResult(f(&mut n)).check(operation)?;
    Ok(n)
}

fn wide(
    operation: &'static str,
    f: impl FnOnce(*mut *mut IDxcBlobWide) -> i32,
) -> Result<Option<String>> {
    let mut out: *mut IDxcBlobWide = ptr::null_mut();
    let hr = HResult(f(&mut out));
    let text = unsafe { BlobWide::string_from_raw(out) };
    hr.check(operation)?;
    text
}

fn wide_list(
    count_operation: &'static str,
    count_fn: impl FnOnce(*mut u32) -> i32,
    operation: &'static str,
    mut get: impl FnMut(u32, *mut *mut IDxcBlobWide) -> i32,
) -> Result<Vec<String>> {
    let n = count(count_operation, count_fn)?;
    (0..n)
        .map(|i| wide(operation, |out| get(i, out)).map(Option::unwrap_or_default))
        .collect()
}

fn optional_blob(
    operation: &'static str,
    f: impl FnOnce(*mut *mut IDxcBlob) -> i32,
) -> Result<Option<Blob>> {
    let mut out: *mut IDxcBlob = ptr::null_mut();
    let hr = HResult(f(&mut out));
    let blob = unsafe { Blob::from_raw(out) };
    hr.check(operation)?;
    Ok(blob.filter(|b| !b.is_empty()))
}

fn version_info(f: impl FnOnce(*mut *mut IDxcVersionInfo) -> i32) -> Result<Option<VersionInfo>> {
    let mut out: *mut IDxcVersionInfo = ptr::null_mut();
    let hr = HResult(f(&mut out));
    let info = unsafe { ComPtr::from_raw(out) };
    hr.check("GetVersionInfo")?;
    info.map(|info| VersionInfo::query(&info)).transpose()
}

fn bstr(operation: &'static str, f: impl FnOnce(*mut BSTR) -> i32) -> Result<String> {
    let mut out: BSTR = ptr::null_mut();
    let hr = HResult(f(&mut out));
    let text = unsafe { take_bstr(out) };
    hr.check(operation)?;
    text
}

/// Decodes and frees a `BSTR`.
///
/// # Safety
/// `value` must be null or an owned `BSTR` from the compiler library.
unsafe fn take_bstr(value: BSTR) -> Result<String> {
    if value.is_null() {
        return Ok(String::new());
    }
    let text = unsafe {
        let len = SysStringLen(value) as usize;
        decode(std::slice::from_raw_parts(value, len))
    };
    unsafe { SysFreeString(value) };
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_outputs() {
        assert_eq!(wide("GetName", |_| 0).unwrap(), None);
        assert_eq!(bstr("GetName", |_| 0).unwrap(), "");
        assert!(optional_blob("GetHash", |_| 0).unwrap().is_none());
        assert!(version_info(|_| 0).unwrap().is_none());
    }

    #[test]
    fn test_failure_reports_operation() {
        let err = wide("GetEntryPoint", |_| HResult::E_FAIL.0).unwrap_err();
        assert_eq!(err.to_string(), "GetEntryPoint failed (HRESULT: 0x80004005)");
    }

    #[test]
    fn test_wide_list_uses_count() {
        let mut calls = Vec::new();
        let list = wide_list(
            "GetFlagCount",
            |n| {
                unsafe { *n = 3 };
                0
            },
            "GetFlag",
            |i, _| {
                calls.push(i);
                0
            },
        );
        assert_eq!(list.unwrap(), vec![String::new(); 3]);
        assert_eq!(calls, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_blob_is_none() {
        let blob = Blob::from_vec(Vec::new());
        let raw = blob.into_raw();
        let got = optional_blob("GetHash", |out| {
            unsafe { *out = raw };
            0
        })
        .unwrap();
        assert!(got.is_none());
    }
}
