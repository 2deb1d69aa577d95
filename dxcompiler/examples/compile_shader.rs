//! Example: Compile an HLSL shader to a DXIL container through the raw shims
//!
//! Run with: cargo run --example compile_shader
//!
//! Make sure libdxcompiler is next to the binary, on the library path, or
//! named by DXC_LIBRARY_PATH.

use dxcompiler::*;
use std::ffi::c_void;
use std::ptr;

const SHADER_SOURCE: &str = r#"
struct PS_INPUT {
    float4 pos : SV_POSITION;
    float2 uv : TEXCOORD0;
};

cbuffer Constants : register(b0) {
    float4 tint;
    float time;
};

float4 main(PS_INPUT input) : SV_TARGET {
    float2 uv = input.uv;
    float r = sin(uv.x * 3.14159 + time) * 0.5 + 0.5;
    float g = cos(uv.y * 3.14159 + time * 0.7) * 0.5 + 0.5;
    float b = sin((uv.x + uv.y) * 3.14159 + time * 1.3) * 0.5 + 0.5;
    return float4(r, g, b, 1.0) * tint;
}
"#;

fn wide(s: &str) -> Vec<WCHAR> {
    #[cfg(windows)]
    let mut out: Vec<WCHAR> = s.encode_utf16().collect();
    #[cfg(not(windows))]
    let mut out: Vec<WCHAR> = s.chars().map(|c| c as WCHAR).collect();
    out.push(0);
    out
}

fn main() {
    if let Err(e) = global() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    unsafe {
        let mut compiler: *mut IDxcCompiler3 = ptr::null_mut();
        let hr = DxcCreateInstance(
            &CLSID_DxcCompiler,
            &IID_IDxcCompiler3,
            &mut compiler as *mut *mut IDxcCompiler3 as *mut LPVOID,
        );
        if FAILED(hr) {
            eprintln!("DxcCreateInstance failed: 0x{:08x}", hr);
            std::process::exit(1);
        }

        let args: Vec<Vec<WCHAR>> = ["-E", "main", "-T", "ps_6_0", DXC_ARG_OPTIMIZATION_LEVEL3]
            .iter()
            .map(|a| wide(a))
            .collect();
        let mut arg_ptrs: Vec<LPCWSTR> = args.iter().map(|a| a.as_ptr()).collect();

        let source = DxcBuffer {
            Ptr: SHADER_SOURCE.as_ptr() as *const c_void,
            Size: SHADER_SOURCE.len(),
            Encoding: DXC_CP_UTF8,
        };

        let mut result: *mut IDxcResult = ptr::null_mut();
        let hr = (*compiler).Compile(
            &source,
            arg_ptrs.as_mut_ptr(),
            arg_ptrs.len() as u32,
            ptr::null_mut(),
            &IID_IDxcResult,
            &mut result as *mut *mut IDxcResult as *mut *mut c_void,
        );
        (*compiler).Release();
        if FAILED(hr) {
            eprintln!("Compile failed: 0x{:08x}", hr);
            std::process::exit(1);
        }

        let mut status: HRESULT = S_OK;
        (*result).GetStatus(&mut status);

        if FAILED(status) {
            let mut errors: *mut IDxcBlobEncoding = ptr::null_mut();
            (*result).GetErrorBuffer(&mut errors);
            if !errors.is_null() {
                let bytes = std::slice::from_raw_parts(
                    (*errors).GetBufferPointer() as *const u8,
                    (*errors).GetBufferSize(),
                );
                eprintln!("{}", String::from_utf8_lossy(bytes));
                (*errors).Release();
            }
            (*result).Release();
            std::process::exit(1);
        }

        let mut object: *mut IDxcBlob = ptr::null_mut();
        (*result).GetResult(&mut object);
        let size = (*object).GetBufferSize();
        println!("Compiled {} bytes, {} outputs", size, (*result).GetNumOutputs());
        for i in 0..(*result).GetNumOutputs() {
            println!("  output {}: {:?}", i, (*result).GetOutputByIndex(i));
        }

        (*object).Release();
        (*result).Release();
    }
}
