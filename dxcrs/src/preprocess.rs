//! HLSL preprocessing API

use crate::compile::{Define, Include};
use crate::{Compiler, Dxc, Encoding, Error, IncludeHandler, Result};

/// Result of preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Preprocessed source
    pub source: String,
    /// Warnings, if any
    pub warnings: Option<String>,
}

/// Builder for preprocessing with a fluent API.
///
/// Runs the compiler with `-P`, which stops after preprocessing.
///
/// # Example
/// ```no_run
/// use dxcrs::Dxc;
///
/// let compiler = Dxc::new().unwrap().compiler().unwrap();
/// let result = compiler
///     .preprocess("#define X 1\nfloat f = X;")
///     .define("DEBUG", "1")
///     .run()
///     .unwrap();
/// println!("{}", result.source);
/// ```
pub struct PreprocessBuilder<'a> {
    compiler: &'a Compiler,
    source: &'a [u8],
    encoding: Encoding,
    source_name: Option<String>,
    defines: Vec<Define>,
    include: Option<Include<'a>>,
    extra_args: Vec<String>,
}

impl Compiler {
    /// Starts preprocessing `source`.
    pub fn preprocess<'a>(&'a self, source: &'a str) -> PreprocessBuilder<'a> {
        self.preprocess_bytes(source.as_bytes())
    }

    /// Starts preprocessing source bytes in any encoding.
    pub fn preprocess_bytes<'a>(&'a self, source: &'a [u8]) -> PreprocessBuilder<'a> {
        PreprocessBuilder {
            compiler: self,
            source,
            encoding: Encoding::Utf8,
            source_name: None,
            defines: Vec::new(),
            include: None,
            extra_args: Vec::new(),
        }
    }
}

impl<'a> PreprocessBuilder<'a> {
    /// Sets the source file name (used in error messages and `#line`).
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

    /// Adds a pre-constructed define.
    pub fn with_define(mut self, define: Define) -> Self {
        self.defines.push(define);
        self
    }

    /// Resolves `#include` through `handler`.
    pub fn include_handler(mut self, handler: &'a mut dyn IncludeHandler) -> Self {
        self.include = Some(Include::Rust(handler));
        self
    }

    /// Appends a raw command-line argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// The full argument list passed to the compiler.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(name) = &self.source_name {
            args.push(name.clone());
        }
        args.push("-P".to_string());
        for define in &self.defines {
            args.push("-D".to_string());
            args.push(define.to_arg());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Preprocesses the shader source.
    pub fn run(mut self) -> Result<PreprocessResult> {
        let args = self.arguments();
        let output = self
            .compiler
            .invoke(self.source, self.encoding, &args, self.include.as_mut())?
            .check(|hresult, message| Error::Preprocessing { hresult, message })?;
        Ok(PreprocessResult {
            source: output.hlsl()?.unwrap_or_default(),
            warnings: output.errors()?,
        })
    }
}

/// Preprocesses HLSL source with the process-wide library.
///
/// # Example
/// ```no_run
/// let result = dxcrs::preprocess("#define X 1\nfloat f = X;").unwrap();
/// assert!(result.source.contains("float f = 1;"));
/// ```
pub fn preprocess(source: &str) -> Result<PreprocessResult> {
    Dxc::new()?.compiler()?.preprocess(source).run()
}
