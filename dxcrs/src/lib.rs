//! Safe, ergonomic Rust API for the DirectX Shader Compiler
//!
//! This crate wraps the raw `dxcompiler` bindings with reference-counted
//! handles, Result types, builders and iterators. The compiler library is
//! loaded at runtime, either from the process-wide default location or from
//! an explicit path through [`Dxc::load`].
//!
//! # Example
//!
//! ```no_run
//! use dxcrs::{Dxc, PartKind, ShaderTarget};
//!
//! let source = r#"
//!     float4 main(float4 pos : SV_POSITION) : SV_TARGET {
//!         return pos;
//!     }
//! "#;
//!
//! let dxc = Dxc::new().unwrap();
//!
//! // Compile a pixel shader
//! let output = dxc
//!     .compiler()
//!     .unwrap()
//!     .compile(source, "main", ShaderTarget::PS_6_0)
//!     .debug()
//!     .run()
//!     .unwrap();
//! let object = output.object().unwrap();
//!
//! // List the container parts
//! let reflection = dxc.container_reflection().unwrap();
//! reflection.load(&object).unwrap();
//! for part in reflection.parts().unwrap() {
//!     let part = part.unwrap();
//!     println!("{}: {} bytes", part.kind, part.data.len());
//! }
//! # let _ = PartKind::DXIL;
//! ```

mod blob;
mod com;
mod compile;
mod container;
mod disassemble;
mod dxc;
mod error;
mod flags;
mod include;
mod link;
mod operation;
mod optimizer;
mod pdb;
mod preprocess;
mod target;
mod utils;
mod validate;
mod version;
mod wide;

pub use dxcompiler as sys;

pub use blob::{Blob, BlobEncoding, BlobUtf8, BlobWide, Encoding};
pub use com::ComPtr;
pub use compile::{
    CompileBuilder, CompileOutput, Compiler, DebugCompileOutput, Define, ExtraOutput,
    LegacyCompiler, OutputKind, ShaderHash, compile,
};
pub use container::{ContainerBuilder, ContainerPart, ContainerReflection, PartKind, Parts};
pub use disassemble::disassemble;
pub use dxc::Dxc;
pub use error::{Error, HResult, Result};
pub use flags::{CompileFlags, HashFlags, ValidatorFlags, VersionInfoFlags};
pub use include::{FileSystemInclude, IncludeHandler, MemoryInclude};
pub use link::{Assembler, Linker};
pub use operation::OperationOutput;
pub use optimizer::{Optimizer, OptimizerOutput, OptimizerPassInfo, PassArgument};
pub use pdb::{LegacyPdbUtils, PdbSource, PdbSummary, PdbUtils};
pub use preprocess::{PreprocessBuilder, PreprocessResult, preprocess};
pub use target::{ShaderModel, ShaderTarget, ShaderType};
pub use utils::{CompilerArgs, LegacyLibrary, PinnedBlob, Utils};
pub use validate::{ValidationResult, Validator};
pub use version::VersionInfo;
pub use wide::WideString;
