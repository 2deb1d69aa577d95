//! Integration tests against the real compiler library.
//!
//! These need libdxcompiler (or dxcompiler.dll) next to the test binary, on
//! the system library path, or named by `DXC_LIBRARY_PATH`. Each test returns
//! early when the library cannot be loaded.

use dxcompiler::*;
use std::ffi::c_void;
use std::ptr;

fn wide(s: &str) -> Vec<WCHAR> {
    #[cfg(windows)]
    let mut out: Vec<WCHAR> = s.encode_utf16().collect();
    #[cfg(not(windows))]
    let mut out: Vec<WCHAR> = s.chars().map(|c| c as WCHAR).collect();
    out.push(0);
    out
}

fn library_available() -> bool {
    match global() {
        Ok(_) => true,
        Err(e) => {
            eprintln!("skipping: {e}");
            false
        }
    }
}

unsafe fn create<T: Interface>(clsid: &CLSID) -> *mut T {
    let mut out: *mut T = ptr::null_mut();
    let hr = unsafe { DxcCreateInstance(clsid, &T::IID, &mut out as *mut *mut T as *mut LPVOID) };
    assert_eq!(hr, S_OK, "DxcCreateInstance for {} failed", T::NAME);
    assert!(!out.is_null());
    out
}

/// Helper to copy out blob data
unsafe fn get_blob_data(blob: *mut IDxcBlob) -> Vec<u8> {
    if blob.is_null() {
        return Vec::new();
    }
    unsafe {
        let ptr = (*blob).GetBufferPointer();
        let size = (*blob).GetBufferSize();
        std::slice::from_raw_parts(ptr as *const u8, size).to_vec()
    }
}

/// Helper to release any interface
unsafe fn release<T>(obj: *mut T) {
    if !obj.is_null() {
        unsafe { (*(obj as *mut IUnknown)).Release() };
    }
}

unsafe fn compile(source: &str, args: &[&str]) -> *mut IDxcResult {
    unsafe {
        let compiler: *mut IDxcCompiler3 = create(&CLSID_DxcCompiler);
        let wide_args: Vec<Vec<WCHAR>> = args.iter().map(|a| wide(a)).collect();
        let mut arg_ptrs: Vec<LPCWSTR> = wide_args.iter().map(|a| a.as_ptr()).collect();
        let buffer = DxcBuffer {
            Ptr: source.as_ptr() as *const c_void,
            Size: source.len(),
            Encoding: DXC_CP_UTF8,
        };

        let mut result: *mut IDxcResult = ptr::null_mut();
        let hr = (*compiler).Compile(
            &buffer,
            arg_ptrs.as_mut_ptr(),
            arg_ptrs.len() as u32,
            ptr::null_mut(),
            &IID_IDxcResult,
            &mut result as *mut *mut IDxcResult as *mut *mut c_void,
        );
        release(compiler);
        assert_eq!(hr, S_OK);
        result
    }
}

const PIXEL_SHADER: &str = "
float4 main(float4 pos : SV_Position) : SV_Target {
    return float4(pos.xy / 1024.0, 0.0, 1.0);
}
";

const BAD_SHADER: &str = "
float4 main() : SV_Target {
    return undefined_variable;
}
";

#[test]
fn test_compile_pixel_shader() {
    if !library_available() {
        return;
    }
    unsafe {
        let result = compile(PIXEL_SHADER, &["-E", "main", "-T", "ps_6_0"]);

        let mut status: HRESULT = E_FAIL;
        assert_eq!((*result).GetStatus(&mut status), S_OK);
        assert_eq!(status, S_OK);
        assert_eq!((*result).HasOutput(DXC_OUT_KIND::OBJECT), TRUE);

        let mut object: *mut IDxcBlob = ptr::null_mut();
        let hr = (*result).GetOutput(
            DXC_OUT_KIND::OBJECT,
            &IID_IDxcBlob,
            &mut object as *mut *mut IDxcBlob as *mut *mut c_void,
            ptr::null_mut(),
        );
        assert_eq!(hr, S_OK);

        let bytecode = get_blob_data(object);
        assert_eq!(&bytecode[0..4], b"DXBC", "container should start with DXBC magic");

        release(object);
        release(result);
    }
}

#[test]
fn test_compile_error_reports_message() {
    if !library_available() {
        return;
    }
    unsafe {
        let result = compile(BAD_SHADER, &["-E", "main", "-T", "ps_6_0"]);

        let mut status: HRESULT = S_OK;
        (*result).GetStatus(&mut status);
        assert!(FAILED(status));

        let mut errors: *mut IDxcBlobEncoding = ptr::null_mut();
        assert_eq!((*result).GetErrorBuffer(&mut errors), S_OK);
        let message = String::from_utf8_lossy(&get_blob_data(errors as *mut IDxcBlob)).to_string();
        assert!(message.contains("undefined_variable"), "got: {message}");

        release(errors);
        release(result);
    }
}

#[test]
fn test_query_interface_for_unimplemented_interface() {
    if !library_available() {
        return;
    }
    unsafe {
        let utils: *mut IDxcUtils = create(&CLSID_DxcUtils);
        let mut out: *mut c_void = ptr::null_mut();
        let hr = (*utils).QueryInterface(&IID_IDxcLinker, &mut out);
        assert_eq!(hr, E_NOINTERFACE);
        assert!(out.is_null());
        release(utils);
    }
}

#[test]
fn test_dxil_container_part() {
    if !library_available() {
        return;
    }
    unsafe {
        let result = compile(PIXEL_SHADER, &["-E", "main", "-T", "ps_6_0"]);
        let mut object: *mut IDxcBlob = ptr::null_mut();
        (*result).GetResult(&mut object);
        let bytecode = get_blob_data(object);

        let utils: *mut IDxcUtils = create(&CLSID_DxcUtils);
        let buffer = DxcBuffer {
            Ptr: bytecode.as_ptr() as *const c_void,
            Size: bytecode.len(),
            Encoding: 0,
        };
        let mut part: *mut c_void = ptr::null_mut();
        let mut part_size: u32 = 0;
        let hr = (*utils).GetDxilContainerPart(&buffer, DXC_PART_DXIL, &mut part, &mut part_size);
        assert_eq!(hr, S_OK);
        assert!(part_size > 0);
        let start = bytecode.as_ptr() as usize;
        let part_addr = part as usize;
        assert!(part_addr >= start && part_addr + part_size as usize <= start + bytecode.len());

        release(utils);
        release(object);
        release(result);
    }
}

#[test]
fn test_version_info() {
    if !library_available() {
        return;
    }
    unsafe {
        let compiler: *mut IDxcCompiler3 = create(&CLSID_DxcCompiler);
        let mut info: *mut IDxcVersionInfo = ptr::null_mut();
        let hr = (*compiler).QueryInterface(
            &IID_IDxcVersionInfo,
            &mut info as *mut *mut IDxcVersionInfo as *mut *mut c_void,
        );
        assert_eq!(hr, S_OK);

        let (mut major, mut minor) = (0u32, 0u32);
        assert_eq!((*info).GetVersion(&mut major, &mut minor), S_OK);
        assert!(major >= 1);

        release(info);
        release(compiler);
    }
}
