//! Dispatch tests for the interface call shims.
//!
//! The objects here are implemented in Rust with hand-built function tables,
//! so these run without the compiler library present.

use dxcompiler::*;
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::ptr;

// ---------------------------------------------------------------------------
// Fake IDxcBlobEncoding
// ---------------------------------------------------------------------------

#[repr(C)]
struct FakeBlob {
    vtbl: *const *const c_void,
    table: Vec<*const c_void>,
    refs: Cell<u32>,
    data: Vec<u8>,
    code_page: Option<u32>,
}

unsafe extern "system" fn blob_query_interface(
    this: *mut FakeBlob,
    riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    unsafe {
        let riid = *riid;
        if riid == IID_IUnknown || riid == IID_IDxcBlob || riid == IID_IDxcBlobEncoding {
            blob_add_ref(this);
            *ppv = this.cast();
            S_OK
        } else {
            *ppv = ptr::null_mut();
            E_NOINTERFACE
        }
    }
}

unsafe extern "system" fn blob_add_ref(this: *mut FakeBlob) -> u32 {
    let this = unsafe { &*this };
    this.refs.set(this.refs.get() + 1);
    this.refs.get()
}

unsafe extern "system" fn blob_release(this: *mut FakeBlob) -> u32 {
    let this = unsafe { &*this };
    this.refs.set(this.refs.get() - 1);
    this.refs.get()
}

unsafe extern "system" fn blob_get_buffer_pointer(this: *mut FakeBlob) -> LPVOID {
    unsafe { (*this).data.as_ptr() as LPVOID }
}

unsafe extern "system" fn blob_get_buffer_size(this: *mut FakeBlob) -> SIZE_T {
    unsafe { (*this).data.len() }
}

unsafe extern "system" fn blob_get_encoding(
    this: *mut FakeBlob,
    known: *mut BOOL,
    code_page: *mut UINT32,
) -> HRESULT {
    unsafe {
        match (*this).code_page {
            Some(cp) => {
                *known = TRUE;
                *code_page = cp;
            }
            None => {
                *known = FALSE;
                *code_page = 0;
            }
        }
    }
    S_OK
}

impl FakeBlob {
    fn new(data: &[u8], code_page: Option<u32>) -> Box<Self> {
        let table = vec![
            blob_query_interface as *const c_void,
            blob_add_ref as *const c_void,
            blob_release as *const c_void,
            blob_get_buffer_pointer as *const c_void,
            blob_get_buffer_size as *const c_void,
            blob_get_encoding as *const c_void,
        ];
        let mut blob = Box::new(FakeBlob {
            vtbl: ptr::null(),
            table,
            refs: Cell::new(1),
            data: data.to_vec(),
            code_page,
        });
        blob.vtbl = blob.table.as_ptr();
        blob
    }

    fn as_interface<T: Interface>(&self) -> &T {
        unsafe { &*(self as *const Self as *const T) }
    }
}

#[test]
fn test_blob_round_trips_buffer() {
    let fake = FakeBlob::new(b"DXBC\x01\x02\x03", None);
    let blob: &IDxcBlob = fake.as_interface();
    unsafe {
        assert_eq!(blob.GetBufferPointer() as *const u8, fake.data.as_ptr());
        assert_eq!(blob.GetBufferSize(), 7);
        let bytes = std::slice::from_raw_parts(
            blob.GetBufferPointer() as *const u8,
            blob.GetBufferSize(),
        );
        assert_eq!(bytes, b"DXBC\x01\x02\x03");
    }
}

#[test]
fn test_empty_blob() {
    let fake = FakeBlob::new(b"", None);
    let blob: &IDxcBlob = fake.as_interface();
    unsafe {
        assert_eq!(blob.GetBufferSize(), 0);
    }
}

#[test]
fn test_blob_encoding_reports_code_page() {
    let fake = FakeBlob::new(b"float4 main() : SV_Target { return 1; }", Some(DXC_CP_UTF8));
    let blob: &IDxcBlobEncoding = fake.as_interface();
    let mut known: BOOL = FALSE;
    let mut code_page: UINT32 = 0;
    unsafe {
        assert_eq!(blob.GetEncoding(&mut known, &mut code_page), S_OK);
    }
    assert_eq!(known, TRUE);
    assert_eq!(code_page, DXC_CP_UTF8);
}

#[test]
fn test_reference_counting_is_forwarded() {
    let fake = FakeBlob::new(b"x", None);
    let blob: &IDxcBlob = fake.as_interface();
    unsafe {
        assert_eq!(blob.AddRef(), 2);
        assert_eq!(blob.AddRef(), 3);
        assert_eq!(blob.Release(), 2);
        assert_eq!(blob.Release(), 1);
    }
}

#[test]
fn test_query_interface_supported() {
    let fake = FakeBlob::new(b"x", None);
    let blob: &IDxcBlob = fake.as_interface();
    let mut out: *mut c_void = ptr::null_mut();
    unsafe {
        assert_eq!(blob.QueryInterface(&IID_IDxcBlobEncoding, &mut out), S_OK);
    }
    assert_eq!(out as *const FakeBlob, &*fake as *const FakeBlob);
    assert_eq!(fake.refs.get(), 2);
}

#[test]
fn test_query_interface_unsupported() {
    let fake = FakeBlob::new(b"x", None);
    let blob: &IDxcBlob = fake.as_interface();
    let mut out: *mut c_void = 0x1 as *mut c_void;
    unsafe {
        assert_eq!(blob.QueryInterface(&IID_IDxcCompiler3, &mut out), E_NOINTERFACE);
    }
    assert!(out.is_null());
    assert_eq!(fake.refs.get(), 1);
}

// ---------------------------------------------------------------------------
// Recording IDxcResult
// ---------------------------------------------------------------------------

#[repr(C)]
struct RecordingResult {
    vtbl: *const *const c_void,
    table: Vec<*const c_void>,
    calls: RefCell<Vec<usize>>,
}

impl RecordingResult {
    fn record(this: *mut RecordingResult, slot: usize) {
        unsafe { (*this).calls.borrow_mut().push(slot) }
    }
}

unsafe extern "system" fn result_unknown_qi(
    this: *mut RecordingResult,
    _riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    RecordingResult::record(this, 0);
    unsafe { *ppv = ptr::null_mut() };
    E_NOINTERFACE
}

unsafe extern "system" fn result_add_ref(this: *mut RecordingResult) -> u32 {
    RecordingResult::record(this, 1);
    1
}

unsafe extern "system" fn result_release(this: *mut RecordingResult) -> u32 {
    RecordingResult::record(this, 2);
    1
}

unsafe extern "system" fn result_get_status(this: *mut RecordingResult, status: *mut HRESULT) -> HRESULT {
    RecordingResult::record(this, 3);
    unsafe { *status = E_INVALIDARG };
    S_OK
}

unsafe extern "system" fn result_get_result(
    this: *mut RecordingResult,
    out: *mut *mut IDxcBlob,
) -> HRESULT {
    RecordingResult::record(this, 4);
    unsafe { *out = ptr::null_mut() };
    S_FALSE
}

unsafe extern "system" fn result_get_error_buffer(
    this: *mut RecordingResult,
    out: *mut *mut IDxcBlobEncoding,
) -> HRESULT {
    RecordingResult::record(this, 5);
    unsafe { *out = ptr::null_mut() };
    E_OUTOFMEMORY
}

unsafe extern "system" fn result_has_output(this: *mut RecordingResult, kind: DXC_OUT_KIND) -> BOOL {
    RecordingResult::record(this, 6);
    (kind == DXC_OUT_KIND::OBJECT) as BOOL
}

unsafe extern "system" fn result_get_output(
    this: *mut RecordingResult,
    _kind: DXC_OUT_KIND,
    _iid: REFIID,
    out: *mut *mut c_void,
    name: *mut *mut IDxcBlobWide,
) -> HRESULT {
    RecordingResult::record(this, 7);
    unsafe {
        *out = ptr::null_mut();
        if !name.is_null() {
            *name = ptr::null_mut();
        }
    }
    E_INVALIDARG
}

unsafe extern "system" fn result_get_num_outputs(this: *mut RecordingResult) -> UINT32 {
    RecordingResult::record(this, 8);
    3
}

unsafe extern "system" fn result_get_output_by_index(
    this: *mut RecordingResult,
    index: UINT32,
) -> DXC_OUT_KIND {
    RecordingResult::record(this, 9);
    DXC_OUT_KIND(index + 1)
}

unsafe extern "system" fn result_primary_output(this: *mut RecordingResult) -> DXC_OUT_KIND {
    RecordingResult::record(this, 10);
    DXC_OUT_KIND::OBJECT
}

impl RecordingResult {
    fn new() -> Box<Self> {
        let table = vec![
            result_unknown_qi as *const c_void,
            result_add_ref as *const c_void,
            result_release as *const c_void,
            result_get_status as *const c_void,
            result_get_result as *const c_void,
            result_get_error_buffer as *const c_void,
            result_has_output as *const c_void,
            result_get_output as *const c_void,
            result_get_num_outputs as *const c_void,
            result_get_output_by_index as *const c_void,
            result_primary_output as *const c_void,
        ];
        let mut result = Box::new(RecordingResult {
            vtbl: ptr::null(),
            table,
            calls: RefCell::new(Vec::new()),
        });
        result.vtbl = result.table.as_ptr();
        result
    }

    fn as_result(&self) -> &IDxcResult {
        unsafe { &*(self as *const Self as *const IDxcResult) }
    }

    fn take_calls(&self) -> Vec<usize> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

#[test]
fn test_result_operations_dispatch_to_their_slots() {
    let fake = RecordingResult::new();
    let result = fake.as_result();

    unsafe {
        let mut status: HRESULT = S_OK;
        assert_eq!(result.GetStatus(&mut status), S_OK);
        assert_eq!(status, E_INVALIDARG);
        assert_eq!(fake.take_calls(), vec![3]);

        let mut blob: *mut IDxcBlob = ptr::null_mut();
        assert_eq!(result.GetResult(&mut blob), S_FALSE);
        assert_eq!(fake.take_calls(), vec![4]);

        let mut errors: *mut IDxcBlobEncoding = ptr::null_mut();
        assert_eq!(result.GetErrorBuffer(&mut errors), E_OUTOFMEMORY);
        assert_eq!(fake.take_calls(), vec![5]);

        assert_eq!(result.HasOutput(DXC_OUT_KIND::OBJECT), TRUE);
        assert_eq!(result.HasOutput(DXC_OUT_KIND::PDB), FALSE);
        assert_eq!(fake.take_calls(), vec![6, 6]);

        let mut out: *mut c_void = ptr::null_mut();
        let hr = result.GetOutput(
            DXC_OUT_KIND::PDB,
            &IID_IDxcBlob,
            &mut out,
            ptr::null_mut(),
        );
        assert_eq!(hr, E_INVALIDARG);
        assert_eq!(fake.take_calls(), vec![7]);

        assert_eq!(result.GetNumOutputs(), 3);
        assert_eq!(fake.take_calls(), vec![8]);

        assert_eq!(result.GetOutputByIndex(1), DXC_OUT_KIND::ERRORS);
        assert_eq!(fake.take_calls(), vec![9]);

        assert_eq!(result.PrimaryOutput(), DXC_OUT_KIND::OBJECT);
        assert_eq!(fake.take_calls(), vec![10]);

        result.AddRef();
        result.Release();
        assert_eq!(fake.take_calls(), vec![1, 2]);
    }
}

#[test]
fn test_operation_result_view_shares_leading_slots() {
    // IDxcResult extends IDxcOperationResult, so the same table serves both.
    let fake = RecordingResult::new();
    let result = unsafe { &*(&*fake as *const RecordingResult as *const IDxcOperationResult) };
    unsafe {
        let mut status: HRESULT = S_OK;
        result.GetStatus(&mut status);
        let mut errors: *mut IDxcBlobEncoding = ptr::null_mut();
        result.GetErrorBuffer(&mut errors);
    }
    assert_eq!(fake.take_calls(), vec![3, 5]);
}

// ---------------------------------------------------------------------------
// Slot tables
// ---------------------------------------------------------------------------

fn slot_of(slots: &[(&str, usize)], name: &str) -> Option<usize> {
    slots.iter().find(|(n, _)| *n == name).map(|(_, i)| *i)
}

#[test]
fn test_unknown_slots_lead_every_table() {
    let tables: &[&[(&str, usize)]] = &[
        IUnknown::SLOTS,
        IDxcBlob::SLOTS,
        IDxcCompiler3::SLOTS,
        IDxcPdbUtils2::SLOTS,
        IDxcVersionInfo3::SLOTS,
    ];
    for slots in tables {
        assert_eq!(
            &slots[..3],
            &[("QueryInterface", 0), ("AddRef", 1), ("Release", 2)]
        );
    }
}

#[test]
fn test_result_slot_table() {
    assert_eq!(
        IDxcResult::SLOTS,
        &[
            ("QueryInterface", 0),
            ("AddRef", 1),
            ("Release", 2),
            ("GetStatus", 3),
            ("GetResult", 4),
            ("GetErrorBuffer", 5),
            ("HasOutput", 6),
            ("GetOutput", 7),
            ("GetNumOutputs", 8),
            ("GetOutputByIndex", 9),
            ("PrimaryOutput", 10),
        ]
    );
}

/// `IUnknown`'s three slots followed by `methods` in declaration order.
fn numbered(methods: &[&'static str]) -> Vec<(&'static str, usize)> {
    ["QueryInterface", "AddRef", "Release"]
        .iter()
        .chain(methods)
        .copied()
        .enumerate()
        .map(|(slot, name)| (name, slot))
        .collect()
}

#[test]
fn test_every_slot_table() {
    assert_eq!(IUnknown::SLOTS.to_vec(), numbered(&[]));

    let tables: &[(&[(&str, usize)], &[&'static str])] = &[
        (
            IDxcBlob::SLOTS,
            &[
                "GetBufferPointer",
                "GetBufferSize",
            ],
        ),
        (
            IDxcBlobEncoding::SLOTS,
            &[
                "GetBufferPointer",
                "GetBufferSize",
                "GetEncoding",
            ],
        ),
        (
            IDxcBlobWide::SLOTS,
            &[
                "GetBufferPointer",
                "GetBufferSize",
                "GetEncoding",
                "GetStringPointer",
                "GetStringLength",
            ],
        ),
        (
            IDxcBlobUtf8::SLOTS,
            &[
                "GetBufferPointer",
                "GetBufferSize",
                "GetEncoding",
                "GetStringPointer",
                "GetStringLength",
            ],
        ),
        (
            IDxcIncludeHandler::SLOTS,
            &[
                "LoadSource",
            ],
        ),
        (
            IDxcCompilerArgs::SLOTS,
            &[
                "GetArguments",
                "GetCount",
                "AddArguments",
                "AddArgumentsUTF8",
                "AddDefines",
            ],
        ),
        (
            IDxcLibrary::SLOTS,
            &[
                "SetMalloc",
                "CreateBlobFromBlob",
                "CreateBlobFromFile",
                "CreateBlobWithEncodingFromPinned",
                "CreateBlobWithEncodingOnHeapCopy",
                "CreateBlobWithEncodingOnMalloc",
                "CreateIncludeHandler",
                "CreateStreamFromBlobReadOnly",
                "GetBlobAsUtf8",
                "GetBlobAsWide",
            ],
        ),
        (
            IDxcOperationResult::SLOTS,
            &[
                "GetStatus",
                "GetResult",
                "GetErrorBuffer",
            ],
        ),
        (
            IDxcCompiler::SLOTS,
            &[
                "Compile",
                "Preprocess",
                "Disassemble",
            ],
        ),
        (
            IDxcCompiler2::SLOTS,
            &[
                "Compile",
                "Preprocess",
                "Disassemble",
                "CompileWithDebug",
            ],
        ),
        (
            IDxcLinker::SLOTS,
            &[
                "RegisterLibrary",
                "Link",
            ],
        ),
        (
            IDxcUtils::SLOTS,
            &[
                "CreateBlobFromBlob",
                "CreateBlobFromPinned",
                "MoveToBlob",
                "CreateBlob",
                "LoadFile",
                "CreateReadOnlyStreamFromBlob",
                "CreateDefaultIncludeHandler",
                "GetBlobAsUtf8",
                "GetBlobAsWide",
                "GetDxilContainerPart",
                "CreateReflection",
                "BuildArguments",
                "GetPDBContents",
            ],
        ),
        (
            IDxcResult::SLOTS,
            &[
                "GetStatus",
                "GetResult",
                "GetErrorBuffer",
                "HasOutput",
                "GetOutput",
                "GetNumOutputs",
                "GetOutputByIndex",
                "PrimaryOutput",
            ],
        ),
        (
            IDxcExtraOutputs::SLOTS,
            &[
                "GetOutputCount",
                "GetOutput",
            ],
        ),
        (
            IDxcCompiler3::SLOTS,
            &[
                "Compile",
                "Disassemble",
            ],
        ),
        (
            IDxcValidator::SLOTS,
            &[
                "Validate",
            ],
        ),
        (
            IDxcValidator2::SLOTS,
            &[
                "Validate",
                "ValidateWithDebug",
            ],
        ),
        (
            IDxcContainerBuilder::SLOTS,
            &[
                "Load",
                "AddPart",
                "RemovePart",
                "SerializeContainer",
            ],
        ),
        (
            IDxcAssembler::SLOTS,
            &[
                "AssembleToContainer",
            ],
        ),
        (
            IDxcContainerReflection::SLOTS,
            &[
                "Load",
                "GetPartCount",
                "GetPartKind",
                "GetPartContent",
                "FindFirstPartKind",
                "GetPartReflection",
            ],
        ),
        (
            IDxcOptimizerPass::SLOTS,
            &[
                "GetOptionName",
                "GetDescription",
                "GetOptionArgCount",
                "GetOptionArgName",
                "GetOptionArgDescription",
            ],
        ),
        (
            IDxcOptimizer::SLOTS,
            &[
                "GetAvailablePassCount",
                "GetAvailablePass",
                "RunOptimizer",
            ],
        ),
        (
            IDxcVersionInfo::SLOTS,
            &[
                "GetVersion",
                "GetFlags",
            ],
        ),
        (
            IDxcVersionInfo2::SLOTS,
            &[
                "GetVersion",
                "GetFlags",
                "GetCommitInfo",
            ],
        ),
        (
            IDxcVersionInfo3::SLOTS,
            &[
                "GetCustomVersionString",
            ],
        ),
        (
            IDxcPdbUtils::SLOTS,
            &[
                "Load",
                "GetSourceCount",
                "GetSource",
                "GetSourceName",
                "GetFlagCount",
                "GetFlag",
                "GetArgCount",
                "GetArg",
                "GetArgPairCount",
                "GetArgPair",
                "GetDefineCount",
                "GetDefine",
                "GetTargetProfile",
                "GetEntryPoint",
                "GetMainFileName",
                "GetHash",
                "GetName",
                "IsFullPDB",
                "GetFullPDB",
                "GetVersionInfo",
                "SetCompiler",
                "CompileForFullPDB",
                "OverrideArgs",
                "OverrideRootSignature",
            ],
        ),
        (
            IDxcPdbUtils2::SLOTS,
            &[
                "Load",
                "GetSourceCount",
                "GetSource",
                "GetSourceName",
                "GetLibraryPDBCount",
                "GetLibraryPDB",
                "GetFlagCount",
                "GetFlag",
                "GetArgCount",
                "GetArg",
                "GetArgPairCount",
                "GetArgPair",
                "GetDefineCount",
                "GetDefine",
                "GetTargetProfile",
                "GetEntryPoint",
                "GetMainFileName",
                "GetHash",
                "GetName",
                "GetVersionInfo",
                "GetCustomToolchainID",
                "GetCustomToolchainData",
                "GetWholeDxil",
                "IsFullPDB",
                "IsPDBRef",
            ],
        ),
    ];
    for (slots, methods) in tables {
        assert_eq!(slots.to_vec(), numbered(methods));
    }
}

#[test]
fn test_slot_counts() {
    assert_eq!(IUnknown::SLOT_COUNT, 3);
    assert_eq!(IDxcBlob::SLOT_COUNT, 5);
    assert_eq!(IDxcBlobEncoding::SLOT_COUNT, 6);
    assert_eq!(IDxcBlobWide::SLOT_COUNT, 8);
    assert_eq!(IDxcBlobUtf8::SLOT_COUNT, 8);
    assert_eq!(IDxcIncludeHandler::SLOT_COUNT, 4);
    assert_eq!(IDxcCompilerArgs::SLOT_COUNT, 8);
    assert_eq!(IDxcLibrary::SLOT_COUNT, 13);
    assert_eq!(IDxcOperationResult::SLOT_COUNT, 6);
    assert_eq!(IDxcCompiler::SLOT_COUNT, 6);
    assert_eq!(IDxcCompiler2::SLOT_COUNT, 7);
    assert_eq!(IDxcLinker::SLOT_COUNT, 5);
    assert_eq!(IDxcUtils::SLOT_COUNT, 16);
    assert_eq!(IDxcResult::SLOT_COUNT, 11);
    assert_eq!(IDxcExtraOutputs::SLOT_COUNT, 5);
    assert_eq!(IDxcCompiler3::SLOT_COUNT, 5);
    assert_eq!(IDxcValidator::SLOT_COUNT, 4);
    assert_eq!(IDxcValidator2::SLOT_COUNT, 5);
    assert_eq!(IDxcContainerBuilder::SLOT_COUNT, 7);
    assert_eq!(IDxcAssembler::SLOT_COUNT, 4);
    assert_eq!(IDxcContainerReflection::SLOT_COUNT, 9);
    assert_eq!(IDxcOptimizerPass::SLOT_COUNT, 8);
    assert_eq!(IDxcOptimizer::SLOT_COUNT, 6);
    assert_eq!(IDxcVersionInfo::SLOT_COUNT, 5);
    assert_eq!(IDxcVersionInfo2::SLOT_COUNT, 6);
    assert_eq!(IDxcVersionInfo3::SLOT_COUNT, 4);
    assert_eq!(IDxcPdbUtils::SLOT_COUNT, 27);
    assert_eq!(IDxcPdbUtils2::SLOT_COUNT, 28);
}

#[test]
fn test_selected_slot_indices() {
    assert_eq!(slot_of(IDxcCompiler2::SLOTS, "CompileWithDebug"), Some(6));
    assert_eq!(slot_of(IDxcCompilerArgs::SLOTS, "AddDefines"), Some(7));
    assert_eq!(slot_of(IDxcLibrary::SLOTS, "GetBlobAsWide"), Some(12));
    assert_eq!(slot_of(IDxcUtils::SLOTS, "GetDxilContainerPart"), Some(12));
    assert_eq!(slot_of(IDxcUtils::SLOTS, "GetPDBContents"), Some(15));
    assert_eq!(slot_of(IDxcCompiler3::SLOTS, "Disassemble"), Some(4));
    assert_eq!(slot_of(IDxcValidator2::SLOTS, "ValidateWithDebug"), Some(4));
    assert_eq!(slot_of(IDxcContainerReflection::SLOTS, "GetPartReflection"), Some(8));
    assert_eq!(slot_of(IDxcOptimizer::SLOTS, "RunOptimizer"), Some(5));
    assert_eq!(slot_of(IDxcVersionInfo2::SLOTS, "GetCommitInfo"), Some(5));
    assert_eq!(slot_of(IDxcPdbUtils::SLOTS, "OverrideRootSignature"), Some(26));
    assert_eq!(slot_of(IDxcPdbUtils2::SLOTS, "GetLibraryPDB"), Some(8));
    assert_eq!(slot_of(IDxcPdbUtils2::SLOTS, "IsPDBRef"), Some(27));
}

#[test]
fn test_interface_identity() {
    assert_eq!(<IDxcCompiler3 as Interface>::IID, IID_IDxcCompiler3);
    assert_eq!(<IDxcCompiler3 as Interface>::NAME, "IDxcCompiler3");
    assert_eq!(<IUnknown as Interface>::IID, IID_IUnknown);
    assert_eq!(<IDxcBlobWide as Interface>::IID, IID_IDxcBlobWide);
}

#[test]
fn test_struct_layouts() {
    use std::mem::{align_of, size_of};

    assert_eq!(size_of::<DxcShaderHash>(), 20);
    assert_eq!(size_of::<DxcBuffer>(), 3 * size_of::<usize>());
    assert_eq!(size_of::<DxcDefine>(), 2 * size_of::<usize>());
    assert_eq!(size_of::<DxcArgPair>(), 2 * size_of::<usize>());
    assert_eq!(size_of::<DXC_OUT_KIND>(), 4);
    assert_eq!(size_of::<IDxcBlob>(), size_of::<usize>());
    assert_eq!(align_of::<GUID>(), 4);
}

#[test]
fn test_out_kind_values() {
    assert_eq!(DXC_OUT_KIND::NONE.0, 0);
    assert_eq!(DXC_OUT_KIND::SHADER_HASH.0, 4);
    assert_eq!(DXC_OUT_KIND::TIME_TRACE.0, 13);
    assert_eq!(DXC_OUT_KIND::LAST, DXC_OUT_KIND::TIME_TRACE);
    assert_eq!(DXC_OUT_KIND::NUM_ENUMS, 14);
    assert_eq!(DXC_OUT_KIND::FORCE_DWORD.0, 0xFFFF_FFFF);
    assert_eq!(format!("{:?}", DXC_OUT_KIND::REFLECTION), "DXC_OUT_REFLECTION");
    assert_eq!(format!("{:?}", DXC_OUT_KIND(99)), "DXC_OUT_KIND(99)");
}
