//! Shader compilation API

use crate::com::ComPtr;
use crate::include::IncludeScope;
use crate::operation::Outcome;
use crate::wide::{WideArgs, from_wide_ptr};
use crate::{
    Blob, CompileFlags, Dxc, Encoding, Error, HResult, HashFlags, IncludeHandler, Result,
    ShaderTarget, WideString,
};
use dxcompiler::{
    CoTaskMemFree, DXC_OUT_KIND, DxcBuffer, DxcDefine, IDxcBlob, IDxcBlobWide, IDxcCompiler2,
    IDxcCompiler3, IDxcExtraOutputs, IDxcIncludeHandler, IDxcOperationResult, IDxcResult,
    IID_IDxcBlob, LPWSTR, S_OK,
};
use std::ffi::c_void;
use std::fmt;
use std::ptr;

/// A preprocessor define (`-D NAME=VALUE`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl Define {
    /// Creates a new define with a name and value.
    ///
    /// # Example
    /// ```
    /// use dxcrs::Define;
    /// let define = Define::new("MAX_LIGHTS", "16");
    /// ```
    pub fn new(name: &str, value: &str) -> Self {
        Define {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Creates a define with no value (just defines the symbol).
    pub fn flag(name: &str) -> Self {
        Define {
            name: name.to_string(),
            value: None,
        }
    }

    /// The `-D` argument value.
    pub fn to_arg(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.name, value),
            None => self.name.clone(),
        }
    }
}

/// Wide copies of a define list, with the `DxcDefine` array pointing into them.
pub(crate) struct WideDefines {
    _strings: Vec<(WideString, Option<WideString>)>,
    raw: Vec<DxcDefine>,
}

impl WideDefines {
    pub(crate) fn new(defines: &[Define]) -> Result<Self> {
        let strings = defines
            .iter()
            .map(|d| {
                Ok((
                    WideString::new(&d.name)?,
                    d.value.as_deref().map(WideString::new).transpose()?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        let raw = strings
            .iter()
            .map(|(name, value)| DxcDefine {
                Name: name.as_ptr(),
                Value: value.as_ref().map_or(ptr::null(), WideString::as_ptr),
            })
            .collect();
        Ok(WideDefines {
            _strings: strings,
            raw,
        })
    }

    pub(crate) fn as_ptr(&self) -> *const DxcDefine {
        self.raw.as_ptr()
    }

    pub(crate) fn len(&self) -> u32 {
        self.raw.len() as u32
    }
}

/// Where `#include` directives are resolved.
pub(crate) enum Include<'a> {
    Rust(&'a mut dyn IncludeHandler),
    Com(ComPtr<IDxcIncludeHandler>),
}

impl Include<'_> {
    fn scope(&mut self) -> IncludeArg<'_> {
        match self {
            Include::Rust(handler) => IncludeArg::Scope(IncludeScope::new(&mut **handler)),
            Include::Com(handler) => IncludeArg::Com(handler.as_ptr()),
        }
    }
}

enum IncludeArg<'a> {
    Scope(IncludeScope<'a>),
    Com(*mut IDxcIncludeHandler),
}

impl IncludeArg<'_> {
    fn as_ptr(&self) -> *mut IDxcIncludeHandler {
        match self {
            IncludeArg::Scope(scope) => scope.as_ptr(),
            IncludeArg::Com(ptr) => *ptr,
        }
    }
}

/// Kind of output produced by a compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Object,
    Errors,
    Pdb,
    ShaderHash,
    Disassembly,
    Hlsl,
    Text,
    Reflection,
    RootSignature,
    ExtraOutputs,
    Remarks,
    TimeReport,
    TimeTrace,
    /// A kind this crate does not know about
    Other(u32),
}

impl OutputKind {
    pub fn to_raw(self) -> DXC_OUT_KIND {
        match self {
            OutputKind::Object => DXC_OUT_KIND::OBJECT,
            OutputKind::Errors => DXC_OUT_KIND::ERRORS,
            OutputKind::Pdb => DXC_OUT_KIND::PDB,
            OutputKind::ShaderHash => DXC_OUT_KIND::SHADER_HASH,
            OutputKind::Disassembly => DXC_OUT_KIND::DISASSEMBLY,
            OutputKind::Hlsl => DXC_OUT_KIND::HLSL,
            OutputKind::Text => DXC_OUT_KIND::TEXT,
            OutputKind::Reflection => DXC_OUT_KIND::REFLECTION,
            OutputKind::RootSignature => DXC_OUT_KIND::ROOT_SIGNATURE,
            OutputKind::ExtraOutputs => DXC_OUT_KIND::EXTRA_OUTPUTS,
            OutputKind::Remarks => DXC_OUT_KIND::REMARKS,
            OutputKind::TimeReport => DXC_OUT_KIND::TIME_REPORT,
            OutputKind::TimeTrace => DXC_OUT_KIND::TIME_TRACE,
            OutputKind::Other(raw) => DXC_OUT_KIND(raw),
        }
    }

    /// Maps a raw kind; `DXC_OUT_NONE` has no counterpart.
    pub fn from_raw(kind: DXC_OUT_KIND) -> Option<Self> {
        Some(match kind {
            DXC_OUT_KIND::NONE => return None,
            DXC_OUT_KIND::OBJECT => OutputKind::Object,
            DXC_OUT_KIND::ERRORS => OutputKind::Errors,
            DXC_OUT_KIND::PDB => OutputKind::Pdb,
            DXC_OUT_KIND::SHADER_HASH => OutputKind::ShaderHash,
            DXC_OUT_KIND::DISASSEMBLY => OutputKind::Disassembly,
            DXC_OUT_KIND::HLSL => OutputKind::Hlsl,
            DXC_OUT_KIND::TEXT => OutputKind::Text,
            DXC_OUT_KIND::REFLECTION => OutputKind::Reflection,
            DXC_OUT_KIND::ROOT_SIGNATURE => OutputKind::RootSignature,
            DXC_OUT_KIND::EXTRA_OUTPUTS => OutputKind::ExtraOutputs,
            DXC_OUT_KIND::REMARKS => OutputKind::Remarks,
            DXC_OUT_KIND::TIME_REPORT => OutputKind::TimeReport,
            DXC_OUT_KIND::TIME_TRACE => OutputKind::TimeTrace,
            DXC_OUT_KIND(raw) => OutputKind::Other(raw),
        })
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            OutputKind::Object => "object",
            OutputKind::Errors => "errors",
            OutputKind::Pdb => "PDB",
            OutputKind::ShaderHash => "shader hash",
            OutputKind::Disassembly => "disassembly",
            OutputKind::Hlsl => "HLSL",
            OutputKind::Text => "text",
            OutputKind::Reflection => "reflection",
            OutputKind::RootSignature => "root signature",
            OutputKind::ExtraOutputs => "extra outputs",
            OutputKind::Remarks => "remarks",
            OutputKind::TimeReport => "time report",
            OutputKind::TimeTrace => "time trace",
            OutputKind::Other(_) => "unknown",
        }
    }
}

/// Shader hash (`DxcShaderHash`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHash {
    pub flags: HashFlags,
    pub digest: [u8; 16],
}

impl ShaderHash {
    /// Parses the 20-byte `DxcShaderHash` layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != std::mem::size_of::<dxcompiler::DxcShaderHash>() {
            return Err(Error::InvalidParameter(format!(
                "shader hash is {} bytes, expected 20",
                bytes.len()
            )));
        }
        let mut flags = [0u8; 4];
        flags.copy_from_slice(&bytes[..4]);
        let mut digest = [0u8; 16];
        digest.copy_from_slice(&bytes[4..]);
        Ok(ShaderHash {
            flags: HashFlags::from_bits_retain(u32::from_le_bytes(flags)),
            digest,
        })
    }

    /// Lowercase hex digest, the form used to name PDB files.
    pub fn to_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ShaderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Named output from `IDxcExtraOutputs`
#[derive(Debug, Clone)]
pub struct ExtraOutput {
    pub output_type: Option<String>,
    pub name: Option<String>,
    pub data: Option<Blob>,
}

/// Result of a compile or preprocess (`IDxcResult`)
///
/// Outputs are fetched lazily by kind.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    result: ComPtr<IDxcResult>,
}

impl CompileOutput {
    pub(crate) fn new(result: ComPtr<IDxcResult>) -> Self {
        CompileOutput { result }
    }

    pub fn status(&self) -> Result<HResult> {
        let mut status = S_OK;
        HResult(unsafe { self.result.GetStatus(&mut status) }).check("GetStatus")?;
        Ok(HResult(status))
    }

    pub fn has_output(&self, kind: OutputKind) -> bool {
        unsafe { self.result.HasOutput(kind.to_raw()) != 0 }
    }

    /// Kinds available, in the compiler's order.
    pub fn outputs(&self) -> Vec<OutputKind> {
        let count = unsafe { self.result.GetNumOutputs() };
        (0..count)
            .filter_map(|i| OutputKind::from_raw(unsafe { self.result.GetOutputByIndex(i) }))
            .collect()
    }

    pub fn primary_output(&self) -> Option<OutputKind> {
        OutputKind::from_raw(unsafe { self.result.PrimaryOutput() })
    }

    /// Output of `kind` together with its name, if it has one.
    pub fn output_with_name(&self, kind: OutputKind) -> Result<Option<(Blob, Option<String>)>> {
        if !self.has_output(kind) {
            return Ok(None);
        }
        let mut object: *mut c_void = ptr::null_mut();
        let mut name: *mut IDxcBlobWide = ptr::null_mut();
        HResult(unsafe {
            self.result
                .GetOutput(kind.to_raw(), &IID_IDxcBlob, &mut object, &mut name)
        })
        .check("GetOutput")?;
        let blob = unsafe { Blob::from_raw(object.cast::<IDxcBlob>()) };
        let name = unsafe { crate::BlobWide::string_from_raw(name) }?.filter(|n| !n.is_empty());
        Ok(blob.map(|b| (b, name)))
    }

    pub fn output(&self, kind: OutputKind) -> Result<Option<Blob>> {
        Ok(self.output_with_name(kind)?.map(|(blob, _)| blob))
    }

    fn text_output(&self, kind: OutputKind) -> Result<Option<String>> {
        Ok(self
            .output(kind)?
            .map(|b| b.to_string_lossy())
            .filter(|s| !s.is_empty()))
    }

    /// The compiled object (DXIL container, or library).
    pub fn object(&self) -> Result<Blob> {
        self.output(OutputKind::Object)?
            .ok_or(Error::MissingOutput(OutputKind::Object.label()))
    }

    /// Diagnostics text. Holds warnings after a successful compile.
    pub fn errors(&self) -> Result<Option<String>> {
        self.text_output(OutputKind::Errors)
    }

    /// PDB and its suggested file name.
    pub fn pdb(&self) -> Result<Option<(Blob, Option<String>)>> {
        self.output_with_name(OutputKind::Pdb)
    }

    pub fn hash(&self) -> Result<Option<ShaderHash>> {
        self.output(OutputKind::ShaderHash)?
            .map(|b| ShaderHash::from_bytes(&b))
            .transpose()
    }

    pub fn disassembly(&self) -> Result<Option<String>> {
        self.text_output(OutputKind::Disassembly)
    }

    /// Preprocessed source.
    pub fn hlsl(&self) -> Result<Option<String>> {
        self.text_output(OutputKind::Hlsl)
    }

    pub fn text(&self) -> Result<Option<String>> {
        self.text_output(OutputKind::Text)
    }

    pub fn reflection(&self) -> Result<Option<Blob>> {
        self.output(OutputKind::Reflection)
    }

    pub fn root_signature(&self) -> Result<Option<Blob>> {
        self.output(OutputKind::RootSignature)
    }

    pub fn remarks(&self) -> Result<Option<String>> {
        self.text_output(OutputKind::Remarks)
    }

    pub fn time_report(&self) -> Result<Option<String>> {
        self.text_output(OutputKind::TimeReport)
    }

    /// Outputs written to named files by `-Fo`-style switches.
    pub fn extra_outputs(&self) -> Result<Vec<ExtraOutput>> {
        if !self.has_output(OutputKind::ExtraOutputs) {
            return Ok(Vec::new());
        }
        let extras: ComPtr<IDxcExtraOutputs> = unsafe {
            ComPtr::from_iid_out_param("GetOutput", |iid, out| {
                self.result
                    .GetOutput(DXC_OUT_KIND::EXTRA_OUTPUTS, iid, out, ptr::null_mut())
            })
        }?;
        let count = unsafe { extras.GetOutputCount() };
        (0..count)
            .map(|i| {
                let mut object: *mut c_void = ptr::null_mut();
                let mut output_type: *mut IDxcBlobWide = ptr::null_mut();
                let mut name: *mut IDxcBlobWide = ptr::null_mut();
                HResult(unsafe {
                    extras.GetOutput(i, &IID_IDxcBlob, &mut object, &mut output_type, &mut name)
                })
                .check("IDxcExtraOutputs::GetOutput")?;
                Ok(ExtraOutput {
                    data: unsafe { Blob::from_raw(object.cast::<IDxcBlob>()) },
                    output_type: unsafe { crate::BlobWide::string_from_raw(output_type) }?,
                    name: unsafe { crate::BlobWide::string_from_raw(name) }?,
                })
            })
            .collect()
    }

    pub fn as_com(&self) -> &ComPtr<IDxcResult> {
        &self.result
    }

    /// Fails with `error` built from the status and diagnostics if the operation failed.
    pub(crate) fn check(self, error: fn(HResult, String) -> Error) -> Result<Self> {
        let status = self.status()?;
        if status.is_error() {
            let message = self
                .errors()?
                .unwrap_or_else(|| format!("Unknown error (HRESULT: {status})"));
            return Err(error(status, message));
        }
        Ok(self)
    }
}

/// Compiler (`IDxcCompiler3`)
#[derive(Debug, Clone)]
pub struct Compiler {
    inner: ComPtr<IDxcCompiler3>,
}

impl Compiler {
    pub(crate) fn new(inner: ComPtr<IDxcCompiler3>) -> Self {
        Compiler { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcCompiler3> {
        &self.inner
    }

    /// Starts a compile of `source`.
    pub fn compile<'a>(
        &'a self,
        source: &'a str,
        entry_point: &str,
        target: ShaderTarget,
    ) -> CompileBuilder<'a> {
        CompileBuilder::new(self, source.as_bytes(), entry_point, target)
    }

    /// Starts a compile of source bytes in any encoding.
    pub fn compile_bytes<'a>(
        &'a self,
        source: &'a [u8],
        entry_point: &str,
        target: ShaderTarget,
    ) -> CompileBuilder<'a> {
        CompileBuilder::new(self, source, entry_point, target)
    }

    /// Runs the compiler with a raw argument list.
    pub(crate) fn invoke(
        &self,
        source: &[u8],
        encoding: Encoding,
        args: &[String],
        include: Option<&mut Include<'_>>,
    ) -> Result<CompileOutput> {
        let mut wide = WideArgs::new(args)?;
        let buffer = DxcBuffer {
            Ptr: source.as_ptr() as *const c_void,
            Size: source.len(),
            Encoding: encoding.code_page(),
        };
        let include = include.map(Include::scope);
        let handler = include
            .as_ref()
            .map_or(ptr::null_mut(), IncludeArg::as_ptr);

        let result: ComPtr<IDxcResult> = unsafe {
            ComPtr::from_iid_out_param("Compile", |iid, out| {
                self.inner
                    .Compile(&buffer, wide.as_mut_ptr(), wide.len(), handler, iid, out)
            })
        }?;
        drop(include);
        Ok(CompileOutput::new(result))
    }
}

/// Builder for shader compilation with a fluent API.
///
/// # Example
/// ```no_run
/// use dxcrs::{Dxc, ShaderTarget};
///
/// let dxc = Dxc::new().unwrap();
/// let compiler = dxc.compiler().unwrap();
/// let output = compiler
///     .compile("float4 main() : SV_Target { return 1; }", "main", ShaderTarget::PS_6_0)
///     .define("MAX_LIGHTS", "16")
///     .debug()
///     .optimization_level(3)
///     .run()
///     .unwrap();
/// ```
pub struct CompileBuilder<'a> {
    compiler: &'a Compiler,
    source: &'a [u8],
    encoding: Encoding,
    source_name: Option<String>,
    entry_point: String,
    target: ShaderTarget,
    defines: Vec<Define>,
    include: Option<Include<'a>>,
    flags: CompileFlags,
    extra_args: Vec<String>,
}

impl<'a> CompileBuilder<'a> {
    fn new(compiler: &'a Compiler, source: &'a [u8], entry_point: &str, target: ShaderTarget) -> Self {
        CompileBuilder {
            compiler,
            source,
            encoding: Encoding::Utf8,
            source_name: None,
            entry_point: entry_point.to_string(),
            target,
            defines: Vec::new(),
            include: None,
            flags: CompileFlags::empty(),
            extra_args: Vec::new(),
        }
    }

    /// Sets the source file name (used in error messages).
    pub fn source_name(mut self, name: &str) -> Self {
        self.source_name = Some(name.to_string());
        self
    }

    /// Encoding of the source bytes (UTF-8 by default).
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Adds a preprocessor define.
    pub fn define(mut self, name: &str, value: &str) -> Self {
        self.defines.push(Define::new(name, value));
        self
    }

    /// Adds a preprocessor define with no value.
    pub fn define_flag(mut self, name: &str) -> Self {
        self.defines.push(Define::flag(name));
        self
    }

    /// Adds multiple preprocessor defines.
    pub fn defines<I, S>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        for (name, value) in defines {
            self.defines.push(Define::new(name.as_ref(), value.as_ref()));
        }
        self
    }

    /// Adds a pre-constructed define.
    pub fn with_define(mut self, define: Define) -> Self {
        self.defines.push(define);
        self
    }

    /// Sets compilation flags.
    pub fn flags(mut self, flags: CompileFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds compilation flags (OR with existing).
    pub fn with_flags(mut self, flags: CompileFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Enables debug information.
    pub fn debug(self) -> Self {
        self.with_flags(CompileFlags::DEBUG)
    }

    /// Disables optimization.
    pub fn skip_optimization(self) -> Self {
        self.with_flags(CompileFlags::SKIP_OPTIMIZATION)
    }

    /// Skips validation; the container is left unsigned.
    pub fn skip_validation(self) -> Self {
        self.with_flags(CompileFlags::SKIP_VALIDATION)
    }

    /// Treats warnings as errors.
    pub fn warnings_are_errors(self) -> Self {
        self.with_flags(CompileFlags::WARNINGS_ARE_ERRORS)
    }

    /// Sets optimization level (0-3).
    pub fn optimization_level(mut self, level: u32) -> Self {
        self.flags = self.flags.with_optimization_level(level);
        self
    }

    /// Uses row-major matrix packing.
    pub fn row_major_matrices(self) -> Self {
        self.with_flags(CompileFlags::PACK_MATRIX_ROW_MAJOR)
    }

    /// Uses column-major matrix packing.
    pub fn column_major_matrices(self) -> Self {
        self.with_flags(CompileFlags::PACK_MATRIX_COLUMN_MAJOR)
    }

    /// HLSL language version (`-HV`), e.g. 2021.
    pub fn hlsl_version(self, version: u32) -> Self {
        self.arg("-HV").arg(version.to_string())
    }

    /// Drops debug information from the object (`-Qstrip_debug`).
    pub fn strip_debug(self) -> Self {
        self.arg("-Qstrip_debug")
    }

    /// Drops reflection data from the object (`-Qstrip_reflect`).
    pub fn strip_reflection(self) -> Self {
        self.arg("-Qstrip_reflect")
    }

    /// Embeds the PDB in the object instead of a separate output (`-Qembed_debug`).
    pub fn embed_debug(self) -> Self {
        self.arg("-Qembed_debug")
    }

    /// Adds an include search directory for the compiler's own handler.
    pub fn include_dir(self, dir: &str) -> Self {
        self.arg("-I").arg(dir)
    }

    /// Resolves `#include` through `handler`.
    pub fn include_handler(mut self, handler: &'a mut dyn IncludeHandler) -> Self {
        self.include = Some(Include::Rust(handler));
        self
    }

    /// Resolves `#include` through a compiler-provided handler, such as
    /// [`Utils::default_include_handler`](crate::Utils::default_include_handler).
    pub fn com_include_handler(mut self, handler: ComPtr<IDxcIncludeHandler>) -> Self {
        self.include = Some(Include::Com(handler));
        self
    }

    /// Appends a raw command-line argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Appends raw command-line arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The full argument list passed to the compiler.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(name) = &self.source_name {
            args.push(name.clone());
        }
        if !self.entry_point.is_empty() {
            args.push("-E".to_string());
            args.push(self.entry_point.clone());
        }
        args.push("-T".to_string());
        args.push(self.target.to_string());
        args.extend(self.flags.to_args().into_iter().map(str::to_string));
        for define in &self.defines {
            args.push("-D".to_string());
            args.push(define.to_arg());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Compiles the shader.
    ///
    /// Fails with `Error::Compilation` carrying the diagnostics when the
    /// compiler reports an error status.
    pub fn run(mut self) -> Result<CompileOutput> {
        let args = self.arguments();
        let output = self
            .compiler
            .invoke(self.source, self.encoding, &args, self.include.as_mut())?;
        output.check(|hresult, message| Error::Compilation { hresult, message })
    }
}

/// Result of [`LegacyCompiler::compile_with_debug`]
#[derive(Debug)]
pub struct DebugCompileOutput {
    pub object: Blob,
    pub warnings: Option<String>,
    /// Suggested file name for the debug blob
    pub debug_name: Option<String>,
    pub debug_blob: Option<Blob>,
}

/// Older compiler interface (`IDxcCompiler2`), for `CompileWithDebug`.
#[derive(Debug, Clone)]
pub struct LegacyCompiler {
    inner: ComPtr<IDxcCompiler2>,
}

impl LegacyCompiler {
    pub(crate) fn new(inner: ComPtr<IDxcCompiler2>) -> Self {
        LegacyCompiler { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcCompiler2> {
        &self.inner
    }

    /// Compiles and returns the debug blob separately from the object.
    #[allow(clippy::too_many_arguments)]
    pub fn compile_with_debug(
        &self,
        source: &str,
        source_name: &str,
        entry_point: &str,
        target: ShaderTarget,
        args: &[&str],
        defines: &[Define],
        include: Option<&mut dyn IncludeHandler>,
    ) -> Result<DebugCompileOutput> {
        let source = Blob::from_vec_with_encoding(source.as_bytes().to_vec(), Encoding::Utf8);
        let source_name = WideString::new(source_name)?;
        let entry_point = WideString::new(entry_point)?;
        let target = WideString::new(&target.to_string())?;
        let mut wide_args = WideArgs::new(args)?;
        let defines = WideDefines::new(defines)?;
        let scope = include.map(IncludeScope::new);
        let handler = scope.as_ref().map_or(ptr::null_mut(), IncludeScope::as_ptr);

        let mut result: *mut IDxcOperationResult = ptr::null_mut();
        let mut debug_name: LPWSTR = ptr::null_mut();
        let mut debug_blob: *mut IDxcBlob = ptr::null_mut();
        let hr = HResult(unsafe {
            self.inner.CompileWithDebug(
                source.as_ptr(),
                source_name.as_ptr(),
                entry_point.as_ptr(),
                target.as_ptr(),
                wide_args.as_mut_ptr(),
                wide_args.len(),
                defines.as_ptr(),
                defines.len(),
                handler,
                &mut result,
                &mut debug_name,
                &mut debug_blob,
            )
        });
        drop(scope);

        let (result, debug_name, debug_blob) =
            unsafe { take_debug_outputs(hr, result, debug_name, debug_blob) }?;
        let outcome = Outcome::read(&result)?;
        if outcome.status.is_error() {
            return Err(Error::Compilation {
                hresult: outcome.status,
                message: outcome.message(),
            });
        }
        Ok(DebugCompileOutput {
            object: outcome
                .result
                .ok_or(Error::MissingOutput(OutputKind::Object.label()))?,
            warnings: outcome.messages,
            debug_name: Some(debug_name).filter(|n| !n.is_empty()),
            debug_blob,
        })
    }

    /// Disassembles a container through the older interface.
    pub fn disassemble(&self, object: &Blob) -> Result<String> {
        let text = unsafe {
            ComPtr::from_out_param("Disassemble", |out| {
                self.inner.Disassemble(object.as_ptr(), out)
            })
        }
        .map_err(|e| match e.hresult() {
            Some(hresult) => Error::Disassembly { hresult },
            None => e,
        })?;
        Ok(crate::BlobEncoding::new(text).to_string_lossy())
    }
}

/// Compiles HLSL source with the process-wide library.
///
/// Convenience function for simple compilation without builder options.
///
/// # Example
/// ```no_run
/// use dxcrs::{compile, ShaderTarget};
///
/// let object = compile("float4 main() : SV_Target { return 1; }", "main", ShaderTarget::PS_6_0).unwrap();
/// assert_eq!(&object[0..4], b"DXBC");
/// ```
pub fn compile(source: &str, entry_point: &str, target: ShaderTarget) -> Result<Blob> {
    Dxc::new()?
        .compiler()?
        .compile(source, entry_point, target)
        .run()?
        .object()
}

/// Takes ownership of every `CompileWithDebug` output, then checks `hr`.
///
/// # Safety
/// Each pointer must be null or an output the compiler handed to the caller.
unsafe fn take_debug_outputs(
    hr: HResult,
    result: *mut IDxcOperationResult,
    debug_name: LPWSTR,
    debug_blob: *mut IDxcBlob,
) -> Result<(ComPtr<IDxcOperationResult>, String, Option<Blob>)> {
    let result = unsafe { ComPtr::from_raw(result) };
    let debug_blob = unsafe { Blob::from_raw(debug_blob) };
    let debug_name = unsafe {
        let name = from_wide_ptr(debug_name);
        CoTaskMemFree(debug_name as *mut c_void);
        name
    }?;
    hr.check("CompileWithDebug")?;
    let result = result.ok_or(Error::Com {
        operation: "CompileWithDebug",
        hresult: HResult::E_POINTER,
    })?;
    Ok((result, debug_name, debug_blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_define_args() {
        assert_eq!(Define::new("MAX_LIGHTS", "16").to_arg(), "MAX_LIGHTS=16");
        assert_eq!(Define::flag("USE_RED").to_arg(), "USE_RED");
    }

    #[test]
    fn test_wide_defines() {
        let defines = WideDefines::new(&[Define::new("A", "1"), Define::flag("B")]).unwrap();
        assert_eq!(defines.len(), 2);
        let raw = unsafe { std::slice::from_raw_parts(defines.as_ptr(), 2) };
        assert_eq!(unsafe { from_wide_ptr(raw[0].Name) }.unwrap(), "A");
        assert_eq!(unsafe { from_wide_ptr(raw[0].Value) }.unwrap(), "1");
        assert!(raw[1].Value.is_null());
    }

    #[test]
    fn test_output_kind_mapping() {
        assert_eq!(OutputKind::from_raw(DXC_OUT_KIND::NONE), None);
        for raw in 1..DXC_OUT_KIND::NUM_ENUMS {
            let kind = OutputKind::from_raw(DXC_OUT_KIND(raw)).unwrap();
            assert_eq!(kind.to_raw(), DXC_OUT_KIND(raw));
            assert!(!matches!(kind, OutputKind::Other(_)));
        }
        assert_eq!(
            OutputKind::from_raw(DXC_OUT_KIND(99)),
            Some(OutputKind::Other(99))
        );
    }

    fn ref_count(blob: &Blob) -> u32 {
        unsafe {
            let unknown = &*(blob.as_ptr() as *const dxcompiler::IUnknown);
            unknown.AddRef();
            unknown.Release()
        }
    }

    #[test]
    fn test_failed_debug_compile_releases_outputs() {
        let result = Blob::from_bytes(b"result");
        let debug = Blob::from_bytes(b"debug");
        let err = unsafe {
            take_debug_outputs(
                HResult::E_FAIL,
                result.clone().into_raw() as *mut IDxcOperationResult,
                ptr::null_mut(),
                debug.clone().into_raw(),
            )
        }
        .unwrap_err();
        assert_eq!(err.hresult(), Some(HResult::E_FAIL));
        assert_eq!(ref_count(&result), 1);
        assert_eq!(ref_count(&debug), 1);
    }

    #[test]
    fn test_debug_outputs_missing_result() {
        let err = unsafe {
            take_debug_outputs(HResult::S_OK, ptr::null_mut(), ptr::null_mut(), ptr::null_mut())
        }
        .unwrap_err();
        assert_eq!(err.hresult(), Some(HResult::E_POINTER));
    }

    #[test]
    fn test_shader_hash_parse() {
        let mut bytes = vec![1, 0, 0, 0];
        bytes.extend(0u8..16);
        let hash = ShaderHash::from_bytes(&bytes).unwrap();
        assert_eq!(hash.flags, HashFlags::INCLUDES_SOURCE);
        assert_eq!(hash.to_hex(), "000102030405060708090a0b0c0d0e0f");
        assert!(ShaderHash::from_bytes(&bytes[..19]).is_err());
    }
}
