//! Code pages, container part codes, argument literals and flag values.

use crate::types::UINT32;

pub const DXC_CP_UTF8: u32 = 65001;
pub const DXC_CP_UTF16: u32 = 1200;
pub const DXC_CP_UTF32: u32 = 12000;
pub const DXC_CP_ACP: u32 = 0;

/// Code page matching [`WCHAR`](crate::WCHAR).
#[cfg(windows)]
pub const DXC_CP_WIDE: u32 = DXC_CP_UTF16;
#[cfg(not(windows))]
pub const DXC_CP_WIDE: u32 = DXC_CP_UTF32;

pub const DXC_HASHFLAG_INCLUDES_SOURCE: u32 = 1;

/// Packs four characters little-endian, `ch0` in the low byte.
pub const fn DXC_FOURCC(ch0: u8, ch1: u8, ch2: u8, ch3: u8) -> UINT32 {
    (ch0 as u32) | (ch1 as u32) << 8 | (ch2 as u32) << 16 | (ch3 as u32) << 24
}

pub const DXC_PART_PDB: UINT32 = DXC_FOURCC(b'I', b'L', b'D', b'B');
pub const DXC_PART_PDB_NAME: UINT32 = DXC_FOURCC(b'I', b'L', b'D', b'N');
pub const DXC_PART_PRIVATE_DATA: UINT32 = DXC_FOURCC(b'P', b'R', b'I', b'V');
pub const DXC_PART_ROOT_SIGNATURE: UINT32 = DXC_FOURCC(b'R', b'T', b'S', b'0');
pub const DXC_PART_DXIL: UINT32 = DXC_FOURCC(b'D', b'X', b'I', b'L');
pub const DXC_PART_REFLECTION_DATA: UINT32 = DXC_FOURCC(b'S', b'T', b'A', b'T');
pub const DXC_PART_SHADER_HASH: UINT32 = DXC_FOURCC(b'H', b'A', b'S', b'H');
pub const DXC_PART_INPUT_SIGNATURE: UINT32 = DXC_FOURCC(b'I', b'S', b'G', b'1');
pub const DXC_PART_OUTPUT_SIGNATURE: UINT32 = DXC_FOURCC(b'O', b'S', b'G', b'1');
pub const DXC_PART_PATCH_CONSTANT_SIGNATURE: UINT32 = DXC_FOURCC(b'P', b'S', b'G', b'1');

// Argument literals. The compiler takes them as wide strings; convert at the call site.
pub const DXC_ARG_DEBUG: &str = "-Zi";
pub const DXC_ARG_SKIP_VALIDATION: &str = "-Vd";
pub const DXC_ARG_SKIP_OPTIMIZATIONS: &str = "-Od";
pub const DXC_ARG_PACK_MATRIX_ROW_MAJOR: &str = "-Zpr";
pub const DXC_ARG_PACK_MATRIX_COLUMN_MAJOR: &str = "-Zpc";
pub const DXC_ARG_AVOID_FLOW_CONTROL: &str = "-Gfa";
pub const DXC_ARG_PREFER_FLOW_CONTROL: &str = "-Gfp";
pub const DXC_ARG_ENABLE_STRICTNESS: &str = "-Ges";
pub const DXC_ARG_ENABLE_BACKWARDS_COMPATIBILITY: &str = "-Gec";
pub const DXC_ARG_IEEE_STRICTNESS: &str = "-Gis";
pub const DXC_ARG_OPTIMIZATION_LEVEL0: &str = "-O0";
pub const DXC_ARG_OPTIMIZATION_LEVEL1: &str = "-O1";
pub const DXC_ARG_OPTIMIZATION_LEVEL2: &str = "-O2";
pub const DXC_ARG_OPTIMIZATION_LEVEL3: &str = "-O3";
pub const DXC_ARG_WARNINGS_ARE_ERRORS: &str = "-WX";
pub const DXC_ARG_RESOURCES_MAY_ALIAS: &str = "-res_may_alias";
pub const DXC_ARG_ALL_RESOURCES_BOUND: &str = "-all_resources_bound";
pub const DXC_ARG_DEBUG_NAME_FOR_SOURCE: &str = "-Zss";
pub const DXC_ARG_DEBUG_NAME_FOR_BINARY: &str = "-Zsb";

pub const DxcValidatorFlags_Default: UINT32 = 0;
pub const DxcValidatorFlags_InPlaceEdit: UINT32 = 1;
pub const DxcValidatorFlags_RootSignatureOnly: UINT32 = 2;
pub const DxcValidatorFlags_ModuleOnly: UINT32 = 4;
pub const DxcValidatorFlags_ValidMask: UINT32 = 0x7;

pub const DxcVersionInfoFlags_None: UINT32 = 0;
pub const DxcVersionInfoFlags_Debug: UINT32 = 1;
pub const DxcVersionInfoFlags_Internal: UINT32 = 2;

pub const DXC_EXTRA_OUTPUT_NAME_STDOUT: &str = "*stdout*";
pub const DXC_EXTRA_OUTPUT_NAME_STDERR: &str = "*stderr*";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_is_little_endian() {
        assert_eq!(DXC_PART_DXIL, u32::from_le_bytes(*b"DXIL"));
        assert_eq!(DXC_PART_DXIL, 0x4c49_5844);
        assert_eq!(DXC_PART_ROOT_SIGNATURE.to_le_bytes(), *b"RTS0");
        assert_eq!(DXC_PART_PATCH_CONSTANT_SIGNATURE.to_le_bytes(), *b"PSG1");
    }

    #[test]
    fn test_wide_code_page() {
        #[cfg(windows)]
        assert_eq!(DXC_CP_WIDE, 1200);
        #[cfg(not(windows))]
        assert_eq!(DXC_CP_WIDE, 12000);
    }

    #[test]
    fn test_validator_mask_covers_flags() {
        let all = DxcValidatorFlags_InPlaceEdit
            | DxcValidatorFlags_RootSignatureOnly
            | DxcValidatorFlags_ModuleOnly;
        assert_eq!(all, DxcValidatorFlags_ValidMask);
    }
}
