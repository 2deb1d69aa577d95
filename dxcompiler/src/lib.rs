//! Raw bindings for the DirectX Shader Compiler.
//!
//! This crate mirrors the compiler library's binary contract: structure
//! layouts, interface and class identifiers, named constants, and one call
//! shim per interface operation. Each shim reads the function pointer at the
//! operation's fixed index in the object's function table and invokes it with
//! the system calling convention. Statuses come back unchanged.
//!
//! The library itself is loaded at runtime (see [`library_path`]); nothing
//! links against it at build time.
//!
//! ```no_run
//! use dxcompiler::*;
//! use std::ptr;
//!
//! unsafe {
//!     let mut utils: *mut IDxcUtils = ptr::null_mut();
//!     let hr = DxcCreateInstance(
//!         &CLSID_DxcUtils,
//!         &IID_IDxcUtils,
//!         &mut utils as *mut _ as *mut LPVOID,
//!     );
//!     assert!(SUCCEEDED(hr));
//!     (*utils).Release();
//! }
//! ```

#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::too_many_arguments)]

mod consts;
mod guid;
mod interfaces;
mod loader;
mod memory;
mod types;

use std::path::PathBuf;

use thiserror::Error;

pub use consts::*;
pub use guid::*;
pub use interfaces::*;
pub use loader::{
    DxcCreateInstance, DxcCreateInstance2, DxcLibrary, LIBRARY_NAME, LIBRARY_PATH_ENV, global,
    library_path,
};
pub use memory::{CoTaskMemFree, SysFreeString, SysStringLen};
pub use types::*;

#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("failed to load {}: {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("{symbol} not found in {}: {message}", path.display())]
    MissingEntryPoint {
        path: PathBuf,
        symbol: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
