//! Blob construction and container helpers (`IDxcUtils`, `IDxcLibrary`)

use crate::com::ComPtr;
use crate::compile::WideDefines;
use crate::wide::{WideArgs, from_wide_ptr};
use crate::{
    Blob, BlobEncoding, BlobUtf8, BlobWide, Define, Encoding, Error, HResult, PartKind, Result,
    WideString,
};
use dxcompiler::{
    DXC_CP_ACP, DxcBuffer, IDxcBlob, IDxcBlobEncoding, IDxcCompilerArgs, IDxcIncludeHandler,
    IDxcLibrary, IDxcUtils, Interface, LPCSTR, LPCVOID, UINT32,
};
use std::ffi::c_void;
use std::marker::PhantomData;
use std::path::Path;
use std::ptr;

fn size_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::InvalidParameter(format!("blob of {len} bytes exceeds 4 GiB")))
}

fn path_string(path: &Path) -> Result<WideString> {
    let path = path
        .to_str()
        .ok_or_else(|| Error::InvalidParameter(format!("non-UTF-8 path: {}", path.display())))?;
    WideString::new(path)
}

/// Blob that references caller memory instead of copying it.
///
/// Borrowing `data` keeps the memory alive and unchanged for as long as the
/// blob exists. The underlying COM object is never handed out by safe code,
/// so no reference to it can outlive the borrow.
///
/// ```compile_fail
/// # fn pin(utils: &dxcrs::Utils) -> dxcrs::Result<()> {
/// let data = vec![1u8, 2, 3];
/// let pinned = utils.create_blob_pinned(&data, None)?;
/// drop(data);
/// assert_eq!(pinned.len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PinnedBlob<'a> {
    blob: BlobEncoding,
    _data: PhantomData<&'a [u8]>,
}

impl PinnedBlob<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        self.blob.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn encoding(&self) -> Result<Option<Encoding>> {
        self.blob.encoding()
    }

    /// Releases the borrow and returns the blob.
    ///
    /// # Safety
    /// The pinned memory must stay alive and unmodified until the returned
    /// blob, every clone of it and every reference the compiler takes on it
    /// have been released.
    pub unsafe fn into_blob(self) -> BlobEncoding {
        self.blob
    }
}

/// Utility object (`IDxcUtils`)
#[derive(Debug, Clone)]
pub struct Utils {
    inner: ComPtr<IDxcUtils>,
}

impl Utils {
    pub(crate) fn new(inner: ComPtr<IDxcUtils>) -> Self {
        Utils { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcUtils> {
        &self.inner
    }

    /// Copies `data` into a new blob.
    pub fn create_blob(&self, data: &[u8], encoding: Option<Encoding>) -> Result<BlobEncoding> {
        let size = size_u32(data.len())?;
        let code_page = encoding.map_or(DXC_CP_ACP, Encoding::code_page);
        let blob = unsafe {
            ComPtr::from_out_param("CreateBlob", |out| {
                self.inner
                    .CreateBlob(data.as_ptr() as LPCVOID, size, code_page, out)
            })
        }?;
        Ok(BlobEncoding::new(blob))
    }

    /// Wraps `data` without copying.
    pub fn create_blob_pinned<'a>(
        &self,
        data: &'a [u8],
        encoding: Option<Encoding>,
    ) -> Result<PinnedBlob<'a>> {
        let size = size_u32(data.len())?;
        let code_page = encoding.map_or(DXC_CP_ACP, Encoding::code_page);
        let blob = unsafe {
            ComPtr::from_out_param("CreateBlobFromPinned", |out| {
                self.inner
                    .CreateBlobFromPinned(data.as_ptr() as LPCVOID, size, code_page, out)
            })
        }?;
        Ok(PinnedBlob {
            blob: BlobEncoding::new(blob),
            _data: PhantomData,
        })
    }

    /// A view of `length` bytes of `blob` starting at `offset`.
    pub fn create_blob_from_blob(&self, blob: &Blob, offset: u32, length: u32) -> Result<Blob> {
        let end = offset as usize + length as usize;
        if end > blob.len() {
            return Err(Error::InvalidParameter(format!(
                "range {offset}..{end} outside blob of {} bytes",
                blob.len()
            )));
        }
        let sub = unsafe {
            ComPtr::from_out_param("CreateBlobFromBlob", |out| {
                self.inner.CreateBlobFromBlob(blob.as_ptr(), offset, length, out)
            })
        }?;
        Ok(Blob::from(sub))
    }

    /// Reads a file. With no `encoding`, the compiler detects it from a BOM.
    pub fn load_file(&self, path: &Path, encoding: Option<Encoding>) -> Result<BlobEncoding> {
        let name = path_string(path)?;
        let mut code_page = encoding.map_or(DXC_CP_ACP, Encoding::code_page);
        let code_page_ptr = if encoding.is_some() {
            &mut code_page as *mut UINT32
        } else {
            ptr::null_mut()
        };
        let blob = unsafe {
            ComPtr::from_out_param("LoadFile", |out| {
                self.inner.LoadFile(name.as_ptr(), code_page_ptr, out)
            })
        }
        .map_err(|e| match e.hresult() {
            Some(HResult::E_FILE_NOT_FOUND) => Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            )),
            _ => e,
        })?;
        Ok(BlobEncoding::new(blob))
    }

    /// Converts to UTF-8, or returns the same object if it already is.
    pub fn blob_as_utf8(&self, blob: &Blob) -> Result<BlobUtf8> {
        let utf8 = unsafe {
            ComPtr::from_out_param("GetBlobAsUtf8", |out| {
                self.inner.GetBlobAsUtf8(blob.as_ptr(), out)
            })
        }?;
        Ok(BlobUtf8::new(utf8))
    }

    /// Converts to the platform's wide encoding.
    pub fn blob_as_wide(&self, blob: &Blob) -> Result<BlobWide> {
        let wide = unsafe {
            ComPtr::from_out_param("GetBlobAsWide", |out| {
                self.inner.GetBlobAsWide(blob.as_ptr(), out)
            })
        }?;
        Ok(BlobWide::new(wide))
    }

    /// The compiler's own file-system include handler.
    pub fn default_include_handler(&self) -> Result<ComPtr<IDxcIncludeHandler>> {
        unsafe {
            ComPtr::from_out_param("CreateDefaultIncludeHandler", |out| {
                self.inner.CreateDefaultIncludeHandler(out)
            })
        }
    }

    /// Locates a part inside `container` without copying.
    pub fn container_part<'a>(&self, container: &'a [u8], kind: PartKind) -> Result<&'a [u8]> {
        let buffer = DxcBuffer {
            Ptr: container.as_ptr() as *const c_void,
            Size: container.len(),
            Encoding: 0,
        };
        let mut data: *mut c_void = ptr::null_mut();
        let mut size: UINT32 = 0;
        let hr = HResult(unsafe {
            self.inner
                .GetDxilContainerPart(&buffer, kind.0, &mut data, &mut size)
        });
        if hr.is_error() {
            return Err(Error::PartNotFound(kind.to_string()));
        }
        if data.is_null() || size == 0 {
            return Ok(&[]);
        }
        (data as usize)
            .checked_sub(container.as_ptr() as usize)
            .and_then(|start| container.get(start..start + size as usize))
            .ok_or(Error::Container {
                operation: "GetDxilContainerPart",
                hresult: HResult::E_FAIL,
            })
    }

    /// Creates a reflection interface, e.g. `ID3D12ShaderReflection`, over
    /// a container or its reflection part.
    pub fn create_reflection<T: Interface>(&self, data: &[u8]) -> Result<ComPtr<T>> {
        let buffer = DxcBuffer {
            Ptr: data.as_ptr() as *const c_void,
            Size: data.len(),
            Encoding: 0,
        };
        unsafe {
            ComPtr::from_iid_out_param("CreateReflection", |iid, out| {
                self.inner.CreateReflection(&buffer, iid, out)
            })
        }
    }

    /// Builds the argument list a compile with these settings would use.
    pub fn build_arguments(
        &self,
        source_name: Option<&str>,
        entry_point: Option<&str>,
        target: &str,
        args: &[&str],
        defines: &[Define],
    ) -> Result<CompilerArgs> {
        let source_name = source_name.map(WideString::new).transpose()?;
        let entry_point = entry_point.map(WideString::new).transpose()?;
        let target = WideString::new(target)?;
        let mut wide_args = WideArgs::new(args)?;
        let defines = WideDefines::new(defines)?;
        let built: ComPtr<IDxcCompilerArgs> = unsafe {
            ComPtr::from_out_param("BuildArguments", |out| {
                self.inner.BuildArguments(
                    source_name.as_ref().map_or(ptr::null(), WideString::as_ptr),
                    entry_point.as_ref().map_or(ptr::null(), WideString::as_ptr),
                    target.as_ptr(),
                    wide_args.as_mut_ptr(),
                    wide_args.len(),
                    defines.as_ptr(),
                    defines.len(),
                    out,
                )
            })
        }?;
        Ok(CompilerArgs::new(built))
    }

    /// Splits a PDB into its shader hash and embedded container.
    pub fn pdb_contents(&self, pdb: &Blob) -> Result<(Option<Blob>, Option<Blob>)> {
        let mut hash: *mut IDxcBlob = ptr::null_mut();
        let mut container: *mut IDxcBlob = ptr::null_mut();
        let hr = HResult(unsafe {
            self.inner
                .GetPDBContents(pdb.as_ptr(), &mut hash, &mut container)
        });
        let hash = unsafe { Blob::from_raw(hash) };
        let container = unsafe { Blob::from_raw(container) };
        hr.check("GetPDBContents")?;
        Ok((hash, container))
    }
}

/// Older utility interface (`IDxcLibrary`)
///
/// Same class as [`Utils`]; kept for callers written against the older API.
#[derive(Debug, Clone)]
pub struct LegacyLibrary {
    inner: ComPtr<IDxcLibrary>,
}

impl LegacyLibrary {
    pub(crate) fn new(inner: ComPtr<IDxcLibrary>) -> Self {
        LegacyLibrary { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcLibrary> {
        &self.inner
    }

    pub fn create_blob(&self, data: &[u8], encoding: Option<Encoding>) -> Result<BlobEncoding> {
        let size = size_u32(data.len())?;
        let code_page = encoding.map_or(DXC_CP_ACP, Encoding::code_page);
        let blob = unsafe {
            ComPtr::from_out_param("CreateBlobWithEncodingOnHeapCopy", |out| {
                self.inner.CreateBlobWithEncodingOnHeapCopy(
                    data.as_ptr() as LPCVOID,
                    size,
                    code_page,
                    out,
                )
            })
        }?;
        Ok(BlobEncoding::new(blob))
    }

    pub fn load_file(&self, path: &Path) -> Result<BlobEncoding> {
        let name = path_string(path)?;
        let blob = unsafe {
            ComPtr::from_out_param("CreateBlobFromFile", |out| {
                self.inner.CreateBlobFromFile(name.as_ptr(), ptr::null_mut(), out)
            })
        }?;
        Ok(BlobEncoding::new(blob))
    }

    /// Converts to UTF-8; the result is typed as a plain encoded blob.
    pub fn blob_as_utf8(&self, blob: &Blob) -> Result<BlobEncoding> {
        let utf8: ComPtr<IDxcBlobEncoding> = unsafe {
            ComPtr::from_out_param("GetBlobAsUtf8", |out| {
                self.inner.GetBlobAsUtf8(blob.as_ptr(), out)
            })
        }?;
        Ok(BlobEncoding::new(utf8))
    }

    pub fn include_handler(&self) -> Result<ComPtr<IDxcIncludeHandler>> {
        unsafe {
            ComPtr::from_out_param("CreateIncludeHandler", |out| {
                self.inner.CreateIncludeHandler(out)
            })
        }
    }
}

/// Argument list (`IDxcCompilerArgs`)
#[derive(Debug, Clone)]
pub struct CompilerArgs {
    inner: ComPtr<IDxcCompilerArgs>,
}

impl CompilerArgs {
    pub(crate) fn new(inner: ComPtr<IDxcCompilerArgs>) -> Self {
        CompilerArgs { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcCompilerArgs> {
        &self.inner
    }

    pub fn len(&self) -> usize {
        unsafe { self.inner.GetCount() as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the current arguments.
    pub fn to_vec(&self) -> Result<Vec<String>> {
        let count = self.len();
        let args = unsafe { self.inner.GetArguments() };
        if args.is_null() {
            return Ok(Vec::new());
        }
        (0..count)
            .map(|i| unsafe { from_wide_ptr(*args.add(i)) })
            .collect()
    }

    pub fn add_arguments<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wide = WideArgs::new(args)?;
        HResult(unsafe { self.inner.AddArguments(wide.as_mut_ptr(), wide.len()) })
            .check("AddArguments")
    }

    /// Adds arguments through the UTF-8 entry point.
    pub fn add_arguments_utf8<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strings = args
            .into_iter()
            .map(|a| {
                std::ffi::CString::new(a.as_ref()).map_err(|_| {
                    Error::InvalidParameter(format!(
                        "argument contains a null character: {:?}",
                        a.as_ref()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut ptrs: Vec<LPCSTR> = strings.iter().map(|s| s.as_ptr()).collect();
        HResult(unsafe {
            self.inner
                .AddArgumentsUTF8(ptrs.as_mut_ptr(), ptrs.len() as u32)
        })
        .check("AddArgumentsUTF8")
    }

    pub fn add_defines(&self, defines: &[Define]) -> Result<()> {
        let wide = WideDefines::new(defines)?;
        HResult(unsafe { self.inner.AddDefines(wide.as_ptr(), wide.len()) }).check("AddDefines")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit() {
        assert_eq!(size_u32(16).unwrap(), 16);
        assert!(size_u32(u32::MAX as usize + 1).is_err());
    }

    #[test]
    fn test_path_string() {
        let wide = path_string(Path::new("shaders/main.hlsl")).unwrap();
        assert_eq!(wide.to_string_lossy(), "shaders/main.hlsl");
    }
}
