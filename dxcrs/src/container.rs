//! DXIL container inspection and editing

use crate::com::ComPtr;
use crate::operation::Outcome;
use crate::{Blob, Dxc, Error, HResult, Result};
use dxcompiler::{
    DXC_FOURCC, DXC_PART_DXIL, DXC_PART_INPUT_SIGNATURE, DXC_PART_OUTPUT_SIGNATURE,
    DXC_PART_PATCH_CONSTANT_SIGNATURE, DXC_PART_PDB, DXC_PART_PDB_NAME, DXC_PART_PRIVATE_DATA,
    DXC_PART_REFLECTION_DATA, DXC_PART_ROOT_SIGNATURE, DXC_PART_SHADER_HASH, IDxcBlob,
    IDxcContainerBuilder, IDxcContainerReflection, Interface, UINT32,
};
use log::debug;
use std::fmt;
use std::ptr;
use std::str::FromStr;

/// `HRESULT_FROM_WIN32(ERROR_NOT_FOUND)`, returned when a part kind is absent.
const E_NOT_FOUND: i32 = 0x8007_0490_u32 as i32;

/// Container part identifier (FourCC)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartKind(pub u32);

impl PartKind {
    pub const PDB: PartKind = PartKind(DXC_PART_PDB);
    pub const PDB_NAME: PartKind = PartKind(DXC_PART_PDB_NAME);
    pub const PRIVATE_DATA: PartKind = PartKind(DXC_PART_PRIVATE_DATA);
    pub const ROOT_SIGNATURE: PartKind = PartKind(DXC_PART_ROOT_SIGNATURE);
    pub const DXIL: PartKind = PartKind(DXC_PART_DXIL);
    pub const REFLECTION_DATA: PartKind = PartKind(DXC_PART_REFLECTION_DATA);
    pub const SHADER_HASH: PartKind = PartKind(DXC_PART_SHADER_HASH);
    pub const INPUT_SIGNATURE: PartKind = PartKind(DXC_PART_INPUT_SIGNATURE);
    pub const OUTPUT_SIGNATURE: PartKind = PartKind(DXC_PART_OUTPUT_SIGNATURE);
    pub const PATCH_CONSTANT_SIGNATURE: PartKind = PartKind(DXC_PART_PATCH_CONSTANT_SIGNATURE);
    /// Shader feature flags
    pub const FEATURE_INFO: PartKind = PartKind(DXC_FOURCC(b'S', b'F', b'I', b'0'));
    /// Pipeline state validation data
    pub const PIPELINE_STATE_VALIDATION: PartKind = PartKind(DXC_FOURCC(b'P', b'S', b'V', b'0'));
    /// Runtime data for libraries
    pub const RUNTIME_DATA: PartKind = PartKind(DXC_FOURCC(b'R', b'D', b'A', b'T'));

    const NAMED: [(&'static str, PartKind); 13] = [
        ("pdb", PartKind::PDB),
        ("pdb-name", PartKind::PDB_NAME),
        ("private", PartKind::PRIVATE_DATA),
        ("rootsig", PartKind::ROOT_SIGNATURE),
        ("dxil", PartKind::DXIL),
        ("reflection", PartKind::REFLECTION_DATA),
        ("hash", PartKind::SHADER_HASH),
        ("input", PartKind::INPUT_SIGNATURE),
        ("output", PartKind::OUTPUT_SIGNATURE),
        ("patch-constant", PartKind::PATCH_CONSTANT_SIGNATURE),
        ("features", PartKind::FEATURE_INFO),
        ("psv", PartKind::PIPELINE_STATE_VALIDATION),
        ("rdat", PartKind::RUNTIME_DATA),
    ];

    pub const fn from_fourcc(code: [u8; 4]) -> Self {
        PartKind(DXC_FOURCC(code[0], code[1], code[2], code[3]))
    }

    pub const fn fourcc(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Short name accepted by [`FromStr`], if this is a known part.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.fourcc() {
            let c = if b.is_ascii_graphic() { b as char } else { '.' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartKind({self})")
    }
}

impl FromStr for PartKind {
    type Err = Error;

    /// Parses a short name (`dxil`, `rootsig`, ...) or a four-character code.
    fn from_str(s: &str) -> Result<Self> {
        if let Some((_, kind)) = Self::NAMED.iter().find(|(name, _)| name.eq_ignore_ascii_case(s)) {
            return Ok(*kind);
        }
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidParameter(format!("unknown container part: {s}")))?;
        Ok(PartKind::from_fourcc(bytes))
    }
}

/// One part of a container
#[derive(Debug, Clone)]
pub struct ContainerPart {
    pub index: u32,
    pub kind: PartKind,
    pub data: Blob,
}

/// Reads parts of a DXIL container (`IDxcContainerReflection`)
#[derive(Debug, Clone)]
pub struct ContainerReflection {
    inner: ComPtr<IDxcContainerReflection>,
}

impl ContainerReflection {
    pub(crate) fn new(inner: ComPtr<IDxcContainerReflection>) -> Self {
        ContainerReflection { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcContainerReflection> {
        &self.inner
    }

    /// Loads `container`; the other methods refer to it until the next load.
    pub fn load(&self, container: &Blob) -> Result<()> {
        container_call("Load", unsafe { self.inner.Load(container.as_ptr()) })
    }

    pub fn part_count(&self) -> Result<u32> {
        let mut count: UINT32 = 0;
        container_call("GetPartCount", unsafe { self.inner.GetPartCount(&mut count) })?;
        Ok(count)
    }

    pub fn part_kind(&self, index: u32) -> Result<PartKind> {
        let mut kind: UINT32 = 0;
        container_call("GetPartKind", unsafe { self.inner.GetPartKind(index, &mut kind) })?;
        Ok(PartKind(kind))
    }

    pub fn part_content(&self, index: u32) -> Result<Blob> {
        let mut blob: *mut IDxcBlob = ptr::null_mut();
        container_call("GetPartContent", unsafe {
            self.inner.GetPartContent(index, &mut blob)
        })?;
        // Empty parts may come back as null.
        Ok(unsafe { Blob::from_raw(blob) }.unwrap_or_else(|| Blob::from_vec(Vec::new())))
    }

    /// Index of the first part of `kind`.
    pub fn find_first_part(&self, kind: PartKind) -> Result<Option<u32>> {
        let mut index: UINT32 = 0;
        let hr = unsafe { self.inner.FindFirstPartKind(kind.0, &mut index) };
        match hr {
            E_NOT_FOUND => Ok(None),
            hr => container_call("FindFirstPartKind", hr).map(|()| Some(index)),
        }
    }

    /// Contents of the first part of `kind`.
    pub fn part(&self, kind: PartKind) -> Result<Blob> {
        match self.find_first_part(kind)? {
            Some(index) => self.part_content(index),
            None => Err(Error::PartNotFound(kind.to_string())),
        }
    }

    /// Reflection interface over part `index`, e.g. a shader reflection.
    pub fn part_reflection<T: Interface>(&self, index: u32) -> Result<ComPtr<T>> {
        unsafe {
            ComPtr::from_iid_out_param("GetPartReflection", |iid, out| {
                self.inner.GetPartReflection(index, iid, out)
            })
        }
    }

    /// Iterates over all parts of the loaded container.
    pub fn parts(&self) -> Result<Parts<'_>> {
        Ok(Parts {
            reflection: self,
            next: 0,
            count: self.part_count()?,
        })
    }
}

/// Iterator over container parts, see [`ContainerReflection::parts`].
pub struct Parts<'a> {
    reflection: &'a ContainerReflection,
    next: u32,
    count: u32,
}

impl Iterator for Parts<'_> {
    type Item = Result<ContainerPart>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(
            self.reflection
                .part_kind(index)
                .and_then(|kind| {
                    Ok(ContainerPart {
                        index,
                        kind,
                        data: self.reflection.part_content(index)?,
                    })
                }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

/// Edits and reserializes a container (`IDxcContainerBuilder`)
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    inner: ComPtr<IDxcContainerBuilder>,
}

impl ContainerBuilder {
    pub(crate) fn new(inner: ComPtr<IDxcContainerBuilder>) -> Self {
        ContainerBuilder { inner }
    }

    pub fn as_com(&self) -> &ComPtr<IDxcContainerBuilder> {
        &self.inner
    }

    pub fn load(&self, container: &Blob) -> Result<()> {
        container_call("Load", unsafe { self.inner.Load(container.as_ptr()) })
    }

    pub fn add_part(&self, kind: PartKind, data: &Blob) -> Result<()> {
        container_call("AddPart", unsafe { self.inner.AddPart(kind.0, data.as_ptr()) })
    }

    pub fn remove_part(&self, kind: PartKind) -> Result<()> {
        container_call("RemovePart", unsafe { self.inner.RemovePart(kind.0) })
    }

    /// Writes out the container with the edits applied.
    pub fn serialize(&self) -> Result<Blob> {
        let result = unsafe {
            ComPtr::from_out_param("SerializeContainer", |out| {
                self.inner.SerializeContainer(out)
            })
        }?;
        let outcome = Outcome::read(&result)?;
        if outcome.status.is_error() {
            return Err(Error::Container {
                operation: "SerializeContainer",
                hresult: outcome.status,
            });
        }
        outcome.result.ok_or(Error::MissingOutput("container"))
    }
}

fn container_call(operation: &'static str, hr: i32) -> Result<()> {
    let hresult = HResult(hr);
    if hresult.is_error() {
        return Err(Error::Container { operation, hresult });
    }
    Ok(())
}

impl Dxc {
    /// Returns `container` without the parts of the given kinds. Absent kinds are ignored.
    pub fn strip_parts(&self, container: &Blob, kinds: &[PartKind]) -> Result<Blob> {
        let reflection = self.container_reflection()?;
        reflection.load(container)?;
        let builder = self.container_builder()?;
        builder.load(container)?;
        for &kind in kinds {
            if reflection.find_first_part(kind)?.is_some() {
                debug!("removing container part {kind}");
                builder.remove_part(kind)?;
            }
        }
        builder.serialize()
    }

    /// Returns `container` with the part of `kind` replaced by (or added as) `data`.
    pub fn set_part(&self, container: &Blob, kind: PartKind, data: &Blob) -> Result<Blob> {
        let reflection = self.container_reflection()?;
        reflection.load(container)?;
        let builder = self.container_builder()?;
        builder.load(container)?;
        if reflection.find_first_part(kind)?.is_some() {
            builder.remove_part(kind)?;
        }
        builder.add_part(kind, data)?;
        builder.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fourcc_round_trip() {
        assert_eq!(PartKind::DXIL.fourcc(), *b"DXIL");
        assert_eq!(PartKind::from_fourcc(*b"RTS0"), PartKind::ROOT_SIGNATURE);
        assert_eq!(PartKind::PDB.to_string(), "ILDB");
        assert_eq!(format!("{:?}", PartKind::SHADER_HASH), "PartKind(HASH)");
    }

    #[test]
    fn test_display_unprintable() {
        assert_eq!(PartKind(0x0041_0042).to_string(), "B.A.");
    }

    #[test]
    fn test_parse() {
        assert_eq!("dxil".parse::<PartKind>().unwrap(), PartKind::DXIL);
        assert_eq!("RootSig".parse::<PartKind>().unwrap(), PartKind::ROOT_SIGNATURE);
        assert_eq!("ISG1".parse::<PartKind>().unwrap(), PartKind::INPUT_SIGNATURE);
        assert_eq!("SFI0".parse::<PartKind>().unwrap(), PartKind::FEATURE_INFO);
        assert!("toolong".parse::<PartKind>().is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(PartKind::PRIVATE_DATA.name(), Some("private"));
        assert_eq!(PartKind::from_fourcc(*b"XXXX").name(), None);
    }

    #[test]
    fn test_container_call() {
        assert!(container_call("Load", 0).is_ok());
        let err = container_call("Load", E_NOT_FOUND).unwrap_err();
        assert_eq!(err.to_string(), "Container Load failed (HRESULT: 0x80070490)");
    }
}
