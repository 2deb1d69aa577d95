//! Interface and class identifiers.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// 128-bit COM identifier in its native memory layout.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GUID {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

pub type IID = GUID;
pub type CLSID = GUID;

impl GUID {
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_fields(self.data1, self.data2, self.data3, &self.data4)
    }

    pub fn from_uuid(uuid: &Uuid) -> Self {
        let (data1, data2, data3, data4) = uuid.as_fields();
        Self::from_fields(data1, data2, data3, *data4)
    }

    /// Name of the interface or class this identifier belongs to, if known.
    pub fn name(&self) -> Option<&'static str> {
        IIDS.iter()
            .chain(CLSIDS.iter())
            .find(|(_, guid)| guid == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_uuid().hyphenated(), f)
    }
}

impl fmt::Debug for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self, name),
            None => write!(f, "{}", self),
        }
    }
}

impl FromStr for GUID {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(|uuid| Self::from_uuid(&uuid))
    }
}

macro_rules! define_guids {
    ($prefix:ident {
        $( $name:ident = $d1:literal, $d2:literal, $d3:literal, [$($d4:literal),* $(,)?]; )*
    }) => {
        paste::paste! {
            $(
                pub const [<$prefix _ $name>]: GUID = GUID::from_fields($d1, $d2, $d3, [$($d4),*]);
            )*

            pub const [<$prefix S>]: &[(&str, GUID)] = &[
                $( (stringify!([<$prefix _ $name>]), [<$prefix _ $name>]), )*
            ];
        }
    };
}

define_guids!(IID {
    IUnknown                = 0x00000000, 0x0000, 0x0000, [0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46];
    IDxcBlob                = 0x8ba5fb08, 0x5195, 0x40e2, [0xac, 0x58, 0x0d, 0x98, 0x9c, 0x3a, 0x01, 0x02];
    IDxcBlobEncoding        = 0x7241d424, 0x2646, 0x4191, [0x97, 0xc0, 0x98, 0xe9, 0x6e, 0x42, 0xfc, 0x68];
    IDxcBlobWide            = 0xa3f84eab, 0x0faa, 0x497e, [0xa3, 0x9c, 0xee, 0x6e, 0xd6, 0x0b, 0x2d, 0x84];
    IDxcBlobUtf8            = 0x3da636c9, 0xba71, 0x4024, [0xa3, 0x01, 0x30, 0xcb, 0xf1, 0x25, 0x30, 0x5b];
    IDxcIncludeHandler      = 0x7f61fc7d, 0x950d, 0x467f, [0xb3, 0xe3, 0x3c, 0x02, 0xfb, 0x49, 0x18, 0x7c];
    IDxcCompilerArgs        = 0x73effe2a, 0x70dc, 0x45f8, [0x96, 0x90, 0xef, 0xf6, 0x4c, 0x02, 0x42, 0x9d];
    IDxcLibrary             = 0xe5204dc7, 0xd18c, 0x4c3c, [0xbd, 0xfb, 0x85, 0x16, 0x73, 0x98, 0x0f, 0xe7];
    IDxcOperationResult     = 0xcedb484a, 0xd4e9, 0x445a, [0xb9, 0x91, 0xca, 0x21, 0xca, 0x15, 0x7d, 0xc2];
    IDxcCompiler            = 0x8c210bf3, 0x011f, 0x4422, [0x8d, 0x70, 0x6f, 0x9a, 0xcb, 0x8d, 0xb6, 0x17];
    IDxcCompiler2           = 0xa005a9d9, 0xb8bb, 0x4594, [0xb5, 0xc9, 0x0e, 0x63, 0x3b, 0xec, 0x4d, 0x37];
    IDxcCompiler3           = 0x228b4687, 0x5a6a, 0x4730, [0x90, 0x0c, 0x97, 0x02, 0xb2, 0x20, 0x3f, 0x54];
    IDxcLinker              = 0xf1b5be2a, 0x62dd, 0x4327, [0xa1, 0xc2, 0x42, 0xac, 0x1e, 0x1e, 0x78, 0xe6];
    IDxcUtils               = 0x4605c4cb, 0x2019, 0x492a, [0xad, 0xa4, 0x65, 0xf2, 0x0b, 0xb7, 0xd6, 0x7f];
    IDxcResult              = 0x58346cda, 0xdde7, 0x4497, [0x94, 0x61, 0x6f, 0x87, 0xaf, 0x5e, 0x06, 0x59];
    IDxcExtraOutputs        = 0x319b37a2, 0xa5c2, 0x494a, [0xa5, 0xde, 0x48, 0x01, 0xb2, 0xfa, 0xf9, 0x89];
    IDxcValidator           = 0xa6e82bd2, 0x1fd7, 0x4826, [0x98, 0x11, 0x28, 0x57, 0xe7, 0x97, 0xf4, 0x9a];
    IDxcValidator2          = 0x458e1fd1, 0xb1b2, 0x4750, [0xa6, 0xe1, 0x9c, 0x10, 0xf0, 0x3b, 0xed, 0x92];
    IDxcContainerBuilder    = 0x334b1f50, 0x2292, 0x4b35, [0x99, 0xa1, 0x25, 0x58, 0x8d, 0x8c, 0x17, 0xfe];
    IDxcAssembler           = 0x091f7a26, 0x1c1f, 0x4948, [0x90, 0x4b, 0xe6, 0xe3, 0xa8, 0xa7, 0x71, 0xd5];
    IDxcContainerReflection = 0xd2c21b26, 0x8350, 0x4bdc, [0x97, 0x6a, 0x33, 0x1c, 0xe6, 0xf4, 0xc5, 0x4c];
    IDxcOptimizerPass       = 0xae2cd79f, 0xcc22, 0x453f, [0x9b, 0x6b, 0xb1, 0x24, 0xe7, 0xa5, 0x20, 0x4c];
    IDxcOptimizer           = 0x25740e2e, 0x9cba, 0x401b, [0x91, 0x19, 0x4f, 0xb4, 0x2f, 0x39, 0xf2, 0x70];
    IDxcVersionInfo         = 0xb04f5b50, 0x2059, 0x4f12, [0xa8, 0xff, 0xa1, 0xe0, 0xcd, 0xe1, 0xcc, 0x7e];
    IDxcVersionInfo2        = 0xfb6904c4, 0x42f0, 0x4b62, [0x9c, 0x46, 0x98, 0x3a, 0xf7, 0xda, 0x7c, 0x83];
    IDxcVersionInfo3        = 0x5e13e843, 0x9d25, 0x473c, [0x9a, 0xd2, 0x03, 0xb2, 0xd0, 0xb4, 0x4b, 0x1e];
    IDxcPdbUtils            = 0xe6c9647e, 0x9d6a, 0x4c3b, [0xb9, 0x4c, 0x52, 0x4b, 0x5a, 0x6c, 0x34, 0x3d];
    IDxcPdbUtils2           = 0x4315d938, 0xf369, 0x4f93, [0x95, 0xa2, 0x25, 0x20, 0x17, 0xcc, 0x38, 0x07];
});

define_guids!(CLSID {
    DxcCompiler             = 0x73e22d93, 0xe6ce, 0x47f3, [0xb5, 0xbf, 0xf0, 0x66, 0x4f, 0x39, 0xc1, 0xb0];
    DxcLinker               = 0xef6a8087, 0xb0ea, 0x4d56, [0x9e, 0x45, 0xd0, 0x7e, 0x1a, 0x8b, 0x78, 0x06];
    DxcDiaDataSource        = 0xcd1f6b73, 0x2ab0, 0x484d, [0x8e, 0xdc, 0xeb, 0xe7, 0xa4, 0x3c, 0xa0, 0x9f];
    DxcCompilerArgs         = 0x3e56ae82, 0x224d, 0x470f, [0xa1, 0xa1, 0xfe, 0x30, 0x16, 0xee, 0x9f, 0x9d];
    DxcLibrary              = 0x6245d6af, 0x66e0, 0x48fd, [0x80, 0xb4, 0x4d, 0x27, 0x17, 0x96, 0x74, 0x8c];
    DxcValidator            = 0x8ca3e215, 0xf728, 0x4cf3, [0x8c, 0xdd, 0x88, 0xaf, 0x91, 0x75, 0x87, 0xa1];
    DxcAssembler            = 0xd728db68, 0xf903, 0x4f80, [0x94, 0xcd, 0xdc, 0xcf, 0x76, 0xec, 0x71, 0x51];
    DxcContainerReflection  = 0xb9f54489, 0x55b8, 0x400c, [0xba, 0x3a, 0x16, 0x75, 0xe4, 0x72, 0x8b, 0x91];
    // Shares its value with IID_IDxcOptimizerPass.
    DxcOptimizer            = 0xae2cd79f, 0xcc22, 0x453f, [0x9b, 0x6b, 0xb1, 0x24, 0xe7, 0xa5, 0x20, 0x4c];
    DxcContainerBuilder     = 0x94134294, 0x411f, 0x4574, [0xb4, 0xd0, 0x87, 0x41, 0xe2, 0x52, 0x40, 0xd2];
    DxcPdbUtils             = 0x54621dfb, 0xf2ce, 0x457e, [0xae, 0x8c, 0xec, 0x35, 0x5f, 0xae, 0xec, 0x7c];
});

pub const CLSID_DxcUtils: CLSID = CLSID_DxcLibrary;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blob_iid_fields() {
        assert_eq!(IID_IDxcBlob.data1, 0x8ba5fb08);
        assert_eq!(IID_IDxcBlob.data2, 0x5195);
        assert_eq!(IID_IDxcBlob.data3, 0x40e2);
        assert_eq!(
            IID_IDxcBlob.data4,
            [0xac, 0x58, 0x0d, 0x98, 0x9c, 0x3a, 0x01, 0x02]
        );
    }

    #[test]
    fn test_display_registry_form() {
        assert_eq!(
            IID_IDxcCompiler3.to_string(),
            "228b4687-5a6a-4730-900c-9702b2203f54"
        );
        assert_eq!(
            CLSID_DxcCompiler.to_string(),
            "73e22d93-e6ce-47f3-b5bf-f0664f39c1b0"
        );
        assert_eq!(IID_IUnknown.to_string(), "00000000-0000-0000-c000-000000000046");
    }

    #[test]
    fn test_parse_registry_form() {
        let parsed: GUID = "4315d938-f369-4f93-95a2-252017cc3807".parse().unwrap();
        assert_eq!(parsed, IID_IDxcPdbUtils2);
        assert!("not-a-guid".parse::<GUID>().is_err());
    }

    #[test]
    fn test_memory_layout() {
        assert_eq!(std::mem::size_of::<GUID>(), 16);
        let bytes: [u8; 16] = unsafe { std::mem::transmute(IID_IDxcUtils) };
        assert_eq!(&bytes[..4], &0x4605c4cbu32.to_ne_bytes());
        assert_eq!(&bytes[8..], &[0xad, 0xa4, 0x65, 0xf2, 0x0b, 0xb7, 0xd6, 0x7f]);
    }

    #[test]
    fn test_aliased_identifiers() {
        assert_eq!(CLSID_DxcUtils, CLSID_DxcLibrary);
        assert_eq!(CLSID_DxcOptimizer, IID_IDxcOptimizerPass);
        assert_ne!(CLSID_DxcOptimizer, IID_IDxcOptimizer);
    }

    #[test]
    fn test_names() {
        assert_eq!(IID_IDxcResult.name(), Some("IID_IDxcResult"));
        assert_eq!(CLSID_DxcPdbUtils.name(), Some("CLSID_DxcPdbUtils"));
        assert_eq!(GUID::default().name(), None);
        assert_eq!(IIDS.len(), 28);
        assert_eq!(CLSIDS.len(), 11);
    }

    #[test]
    fn test_identifiers_are_unique_within_tables() {
        for table in [IIDS, CLSIDS] {
            for (i, (name_a, a)) in table.iter().enumerate() {
                for (name_b, b) in &table[i + 1..] {
                    assert_ne!(a, b, "{} and {} collide", name_a, name_b);
                }
            }
        }
    }
}
