//! Shader target profiles (shader stage + shader model)

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Shader stage, the profile prefix passed with `-T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
    Mesh,
    Amplification,
    /// Library of exported functions, linked later
    Library,
}

impl ShaderType {
    pub fn prefix(&self) -> &'static str {
        match self {
            ShaderType::Vertex => "vs",
            ShaderType::Pixel => "ps",
            ShaderType::Geometry => "gs",
            ShaderType::Hull => "hs",
            ShaderType::Domain => "ds",
            ShaderType::Compute => "cs",
            ShaderType::Mesh => "ms",
            ShaderType::Amplification => "as",
            ShaderType::Library => "lib",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "vs" => ShaderType::Vertex,
            "ps" => ShaderType::Pixel,
            "gs" => ShaderType::Geometry,
            "hs" => ShaderType::Hull,
            "ds" => ShaderType::Domain,
            "cs" => ShaderType::Compute,
            "ms" => ShaderType::Mesh,
            "as" => ShaderType::Amplification,
            "lib" => ShaderType::Library,
            _ => return None,
        })
    }

    /// Lowest shader model that supports this stage.
    pub fn min_model(&self) -> ShaderModel {
        match self {
            ShaderType::Library => ShaderModel::SM6_3,
            ShaderType::Mesh | ShaderType::Amplification => ShaderModel::SM6_5,
            _ => ShaderModel::SM6_0,
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// DXIL shader model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderModel {
    SM6_0,
    SM6_1,
    SM6_2,
    SM6_3,
    SM6_4,
    SM6_5,
    SM6_6,
    SM6_7,
    SM6_8,
}

impl ShaderModel {
    const ALL: [ShaderModel; 9] = [
        ShaderModel::SM6_0,
        ShaderModel::SM6_1,
        ShaderModel::SM6_2,
        ShaderModel::SM6_3,
        ShaderModel::SM6_4,
        ShaderModel::SM6_5,
        ShaderModel::SM6_6,
        ShaderModel::SM6_7,
        ShaderModel::SM6_8,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            ShaderModel::SM6_0 => "6_0",
            ShaderModel::SM6_1 => "6_1",
            ShaderModel::SM6_2 => "6_2",
            ShaderModel::SM6_3 => "6_3",
            ShaderModel::SM6_4 => "6_4",
            ShaderModel::SM6_5 => "6_5",
            ShaderModel::SM6_6 => "6_6",
            ShaderModel::SM6_7 => "6_7",
            ShaderModel::SM6_8 => "6_8",
        }
    }

    pub fn major(&self) -> u32 {
        6
    }

    pub fn minor(&self) -> u32 {
        *self as u32
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.suffix() == suffix)
    }
}

impl fmt::Display for ShaderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Compilation target profile, e.g. `ps_6_0` or `lib_6_3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderTarget {
    pub shader_type: ShaderType,
    pub model: ShaderModel,
}

impl ShaderTarget {
    pub const VS_6_0: ShaderTarget = ShaderTarget::new(ShaderType::Vertex, ShaderModel::SM6_0);
    pub const VS_6_6: ShaderTarget = ShaderTarget::new(ShaderType::Vertex, ShaderModel::SM6_6);

    pub const PS_6_0: ShaderTarget = ShaderTarget::new(ShaderType::Pixel, ShaderModel::SM6_0);
    pub const PS_6_6: ShaderTarget = ShaderTarget::new(ShaderType::Pixel, ShaderModel::SM6_6);

    pub const GS_6_0: ShaderTarget = ShaderTarget::new(ShaderType::Geometry, ShaderModel::SM6_0);
    pub const HS_6_0: ShaderTarget = ShaderTarget::new(ShaderType::Hull, ShaderModel::SM6_0);
    pub const DS_6_0: ShaderTarget = ShaderTarget::new(ShaderType::Domain, ShaderModel::SM6_0);

    pub const CS_6_0: ShaderTarget = ShaderTarget::new(ShaderType::Compute, ShaderModel::SM6_0);
    pub const CS_6_6: ShaderTarget = ShaderTarget::new(ShaderType::Compute, ShaderModel::SM6_6);

    pub const MS_6_5: ShaderTarget = ShaderTarget::new(ShaderType::Mesh, ShaderModel::SM6_5);
    pub const AS_6_5: ShaderTarget = ShaderTarget::new(ShaderType::Amplification, ShaderModel::SM6_5);

    pub const LIB_6_3: ShaderTarget = ShaderTarget::new(ShaderType::Library, ShaderModel::SM6_3);
    pub const LIB_6_6: ShaderTarget = ShaderTarget::new(ShaderType::Library, ShaderModel::SM6_6);

    pub const fn new(shader_type: ShaderType, model: ShaderModel) -> Self {
        ShaderTarget { shader_type, model }
    }

    /// The profile string passed to the compiler.
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Whether the stage exists at this shader model.
    pub fn is_supported(&self) -> bool {
        self.model >= self.shader_type.min_model()
    }
}

impl fmt::Display for ShaderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.shader_type.prefix(), self.model.suffix())
    }
}

impl FromStr for ShaderTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidParameter(format!("unknown shader profile: {s}"));
        let (prefix, suffix) = s.split_once('_').ok_or_else(invalid)?;
        let shader_type = ShaderType::from_prefix(prefix).ok_or_else(invalid)?;
        let model = ShaderModel::from_suffix(suffix).ok_or_else(invalid)?;
        Ok(ShaderTarget::new(shader_type, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_strings() {
        assert_eq!(ShaderTarget::VS_6_0.as_str(), "vs_6_0");
        assert_eq!(ShaderTarget::PS_6_6.as_str(), "ps_6_6");
        assert_eq!(ShaderTarget::LIB_6_3.as_str(), "lib_6_3");
        assert_eq!(ShaderTarget::AS_6_5.as_str(), "as_6_5");
    }

    #[test]
    fn test_shader_model_versions() {
        assert_eq!(ShaderModel::SM6_0.major(), 6);
        assert_eq!(ShaderModel::SM6_0.minor(), 0);
        assert_eq!(ShaderModel::SM6_8.minor(), 8);
    }

    #[test]
    fn test_parse() {
        assert_eq!("cs_6_6".parse::<ShaderTarget>().unwrap(), ShaderTarget::CS_6_6);
        assert_eq!("lib_6_3".parse::<ShaderTarget>().unwrap(), ShaderTarget::LIB_6_3);
        assert!("ps_5_0".parse::<ShaderTarget>().is_err());
        assert!("xs_6_0".parse::<ShaderTarget>().is_err());
        assert!("ps60".parse::<ShaderTarget>().is_err());
    }

    #[test]
    fn test_stage_support() {
        assert!(ShaderTarget::MS_6_5.is_supported());
        assert!(!ShaderTarget::new(ShaderType::Mesh, ShaderModel::SM6_4).is_supported());
        assert!(!ShaderTarget::new(ShaderType::Library, ShaderModel::SM6_0).is_supported());
    }
}
