//! Compile, validator, version and hash flags

use bitflags::bitflags;
use dxcompiler::{
    DXC_ARG_ALL_RESOURCES_BOUND, DXC_ARG_AVOID_FLOW_CONTROL, DXC_ARG_DEBUG,
    DXC_ARG_DEBUG_NAME_FOR_BINARY, DXC_ARG_DEBUG_NAME_FOR_SOURCE,
    DXC_ARG_ENABLE_BACKWARDS_COMPATIBILITY, DXC_ARG_ENABLE_STRICTNESS, DXC_ARG_IEEE_STRICTNESS,
    DXC_ARG_OPTIMIZATION_LEVEL0, DXC_ARG_OPTIMIZATION_LEVEL1, DXC_ARG_OPTIMIZATION_LEVEL2,
    DXC_ARG_OPTIMIZATION_LEVEL3, DXC_ARG_PACK_MATRIX_COLUMN_MAJOR, DXC_ARG_PACK_MATRIX_ROW_MAJOR,
    DXC_ARG_PREFER_FLOW_CONTROL, DXC_ARG_RESOURCES_MAY_ALIAS, DXC_ARG_SKIP_OPTIMIZATIONS,
    DXC_ARG_SKIP_VALIDATION, DXC_ARG_WARNINGS_ARE_ERRORS, DXC_HASHFLAG_INCLUDES_SOURCE,
    DxcValidatorFlags_InPlaceEdit, DxcValidatorFlags_ModuleOnly,
    DxcValidatorFlags_RootSignatureOnly, DxcVersionInfoFlags_Debug, DxcVersionInfoFlags_Internal,
};

bitflags! {
    /// Common compiler switches
    ///
    /// Each flag expands to one command-line argument, see [`CompileFlags::to_args`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompileFlags: u32 {
        /// Emit debug information (`-Zi`)
        const DEBUG = 1 << 0;

        /// Skip validation (`-Vd`)
        const SKIP_VALIDATION = 1 << 1;

        /// Skip optimization passes (`-Od`)
        const SKIP_OPTIMIZATION = 1 << 2;

        /// Pack matrices in row-major order
        const PACK_MATRIX_ROW_MAJOR = 1 << 3;

        /// Pack matrices in column-major order (default)
        const PACK_MATRIX_COLUMN_MAJOR = 1 << 4;

        /// Avoid flow control constructs where possible
        const AVOID_FLOW_CONTROL = 1 << 5;

        /// Prefer flow control constructs
        const PREFER_FLOW_CONTROL = 1 << 6;

        /// Enable strict mode
        const ENABLE_STRICTNESS = 1 << 7;

        /// Enable backwards compatibility mode
        const ENABLE_BACKWARDS_COMPATIBILITY = 1 << 8;

        /// Require IEEE strict floating-point behavior
        const IEEE_STRICTNESS = 1 << 9;

        /// Optimization level 0
        const OPTIMIZATION_LEVEL0 = 1 << 10;

        /// Optimization level 1
        const OPTIMIZATION_LEVEL1 = 1 << 11;

        /// Optimization level 2
        const OPTIMIZATION_LEVEL2 = 1 << 12;

        /// Optimization level 3 (compiler default)
        const OPTIMIZATION_LEVEL3 = 1 << 13;

        /// Treat warnings as errors
        const WARNINGS_ARE_ERRORS = 1 << 14;

        /// Resources may alias
        const RESOURCES_MAY_ALIAS = 1 << 15;

        /// All resources are bound
        const ALL_RESOURCES_BOUND = 1 << 16;

        /// Name the debug data after the source hash
        const DEBUG_NAME_FOR_SOURCE = 1 << 17;

        /// Name the debug data after the binary hash
        const DEBUG_NAME_FOR_BINARY = 1 << 18;
    }
}

const COMPILE_FLAG_ARGS: [(CompileFlags, &str); 19] = [
    (CompileFlags::DEBUG, DXC_ARG_DEBUG),
    (CompileFlags::SKIP_VALIDATION, DXC_ARG_SKIP_VALIDATION),
    (CompileFlags::SKIP_OPTIMIZATION, DXC_ARG_SKIP_OPTIMIZATIONS),
    (CompileFlags::PACK_MATRIX_ROW_MAJOR, DXC_ARG_PACK_MATRIX_ROW_MAJOR),
    (CompileFlags::PACK_MATRIX_COLUMN_MAJOR, DXC_ARG_PACK_MATRIX_COLUMN_MAJOR),
    (CompileFlags::AVOID_FLOW_CONTROL, DXC_ARG_AVOID_FLOW_CONTROL),
    (CompileFlags::PREFER_FLOW_CONTROL, DXC_ARG_PREFER_FLOW_CONTROL),
    (CompileFlags::ENABLE_STRICTNESS, DXC_ARG_ENABLE_STRICTNESS),
    (CompileFlags::ENABLE_BACKWARDS_COMPATIBILITY, DXC_ARG_ENABLE_BACKWARDS_COMPATIBILITY),
    (CompileFlags::IEEE_STRICTNESS, DXC_ARG_IEEE_STRICTNESS),
    (CompileFlags::OPTIMIZATION_LEVEL0, DXC_ARG_OPTIMIZATION_LEVEL0),
    (CompileFlags::OPTIMIZATION_LEVEL1, DXC_ARG_OPTIMIZATION_LEVEL1),
    (CompileFlags::OPTIMIZATION_LEVEL2, DXC_ARG_OPTIMIZATION_LEVEL2),
    (CompileFlags::OPTIMIZATION_LEVEL3, DXC_ARG_OPTIMIZATION_LEVEL3),
    (CompileFlags::WARNINGS_ARE_ERRORS, DXC_ARG_WARNINGS_ARE_ERRORS),
    (CompileFlags::RESOURCES_MAY_ALIAS, DXC_ARG_RESOURCES_MAY_ALIAS),
    (CompileFlags::ALL_RESOURCES_BOUND, DXC_ARG_ALL_RESOURCES_BOUND),
    (CompileFlags::DEBUG_NAME_FOR_SOURCE, DXC_ARG_DEBUG_NAME_FOR_SOURCE),
    (CompileFlags::DEBUG_NAME_FOR_BINARY, DXC_ARG_DEBUG_NAME_FOR_BINARY),
];

impl CompileFlags {
    const OPTIMIZATION_LEVELS: CompileFlags = CompileFlags::OPTIMIZATION_LEVEL0
        .union(CompileFlags::OPTIMIZATION_LEVEL1)
        .union(CompileFlags::OPTIMIZATION_LEVEL2)
        .union(CompileFlags::OPTIMIZATION_LEVEL3);

    /// Returns flags for a given optimization level (0-3)
    pub fn optimization_level(level: u32) -> Self {
        match level {
            0 => CompileFlags::OPTIMIZATION_LEVEL0,
            1 => CompileFlags::OPTIMIZATION_LEVEL1,
            2 => CompileFlags::OPTIMIZATION_LEVEL2,
            _ => CompileFlags::OPTIMIZATION_LEVEL3,
        }
    }

    /// Clears optimization level bits and sets the specified level
    pub fn with_optimization_level(self, level: u32) -> Self {
        (self - Self::OPTIMIZATION_LEVELS) | Self::optimization_level(level)
    }

    /// Command-line arguments for the set flags, in declaration order.
    pub fn to_args(self) -> Vec<&'static str> {
        COMPILE_FLAG_ARGS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, arg)| *arg)
            .collect()
    }
}

bitflags! {
    /// Flags accepted by `IDxcValidator::Validate`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValidatorFlags: u32 {
        /// Validation may modify the container in place
        const IN_PLACE_EDIT = DxcValidatorFlags_InPlaceEdit;

        /// Only validate the root signature
        const ROOT_SIGNATURE_ONLY = DxcValidatorFlags_RootSignatureOnly;

        /// Only validate the module
        const MODULE_ONLY = DxcValidatorFlags_ModuleOnly;
    }
}

bitflags! {
    /// Build flags reported by `IDxcVersionInfo::GetFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VersionInfoFlags: u32 {
        /// Debug build
        const DEBUG = DxcVersionInfoFlags_Debug;

        /// Internal validator (non-signing)
        const INTERNAL = DxcVersionInfoFlags_Internal;
    }
}

bitflags! {
    /// Flags stored in a shader hash
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HashFlags: u32 {
        /// The hash covers the source as well as the binary
        const INCLUDES_SOURCE = DXC_HASHFLAG_INCLUDES_SOURCE;
    }
}
