//! Compiler interfaces as opaque handles.
//!
//! Every method reads its entry out of the object's function table at a fixed
//! index and forwards the call unchanged. No arguments are checked and the
//! returned status is never translated. Slots 0 to 2 (`QueryInterface`,
//! `AddRef`, `Release`) exist on every interface.

use std::ffi::c_void;

use dxcompiler_proc::com_interface;

use crate::guid::*;
use crate::types::*;

com_interface! {
    /// Root of every interface.
    interface IUnknown {
        iid: IID_IUnknown,
    }

    /// Owned byte buffer.
    interface IDxcBlob {
        iid: IID_IDxcBlob,
        [3] fn GetBufferPointer() -> LPVOID;
        [4] fn GetBufferSize() -> SIZE_T;
    }

    /// Byte buffer with an optional known code page.
    interface IDxcBlobEncoding {
        iid: IID_IDxcBlobEncoding,
        [3] fn GetBufferPointer() -> LPVOID;
        [4] fn GetBufferSize() -> SIZE_T;
        [5] fn GetEncoding(pKnown: *mut BOOL, pCodePage: *mut UINT32) -> HRESULT;
    }

    /// Null-terminated wide string blob.
    interface IDxcBlobWide {
        iid: IID_IDxcBlobWide,
        [3] fn GetBufferPointer() -> LPVOID;
        [4] fn GetBufferSize() -> SIZE_T;
        [5] fn GetEncoding(pKnown: *mut BOOL, pCodePage: *mut UINT32) -> HRESULT;
        [6] fn GetStringPointer() -> LPCWSTR;
        /// Length in characters, excluding the terminator.
        [7] fn GetStringLength() -> SIZE_T;
    }

    /// Null-terminated UTF-8 string blob.
    interface IDxcBlobUtf8 {
        iid: IID_IDxcBlobUtf8,
        [3] fn GetBufferPointer() -> LPVOID;
        [4] fn GetBufferSize() -> SIZE_T;
        [5] fn GetEncoding(pKnown: *mut BOOL, pCodePage: *mut UINT32) -> HRESULT;
        [6] fn GetStringPointer() -> LPCSTR;
        /// Length in bytes, excluding the terminator.
        [7] fn GetStringLength() -> SIZE_T;
    }

    interface IDxcIncludeHandler {
        iid: IID_IDxcIncludeHandler,
        [3] fn LoadSource(pFilename: LPCWSTR, ppIncludeSource: *mut *mut IDxcBlob) -> HRESULT;
    }

    interface IDxcCompilerArgs {
        iid: IID_IDxcCompilerArgs,
        [3] fn GetArguments() -> *mut LPCWSTR;
        [4] fn GetCount() -> UINT32;
        [5] fn AddArguments(pArguments: *mut LPCWSTR, argCount: UINT32) -> HRESULT;
        [6] fn AddArgumentsUTF8(pArguments: *mut LPCSTR, argCount: UINT32) -> HRESULT;
        [7] fn AddDefines(pDefines: *const DxcDefine, defineCount: UINT32) -> HRESULT;
    }

    /// Legacy blob and stream factory. Superseded by [`IDxcUtils`].
    interface IDxcLibrary {
        iid: IID_IDxcLibrary,
        [3] fn SetMalloc(pMalloc: *mut IMalloc) -> HRESULT;
        [4] fn CreateBlobFromBlob(pBlob: *mut IDxcBlob, offset: UINT32, length: UINT32, ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [5] fn CreateBlobFromFile(pFileName: LPCWSTR, codePage: *mut UINT32, pBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [6] fn CreateBlobWithEncodingFromPinned(pText: LPCVOID, size: UINT32, codePage: UINT32, pBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [7] fn CreateBlobWithEncodingOnHeapCopy(pText: LPCVOID, size: UINT32, codePage: UINT32, pBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [8] fn CreateBlobWithEncodingOnMalloc(pText: LPCVOID, pIMalloc: *mut IMalloc, size: UINT32, codePage: UINT32, pBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [9] fn CreateIncludeHandler(ppResult: *mut *mut IDxcIncludeHandler) -> HRESULT;
        [10] fn CreateStreamFromBlobReadOnly(pBlob: *mut IDxcBlob, ppStream: *mut *mut IStream) -> HRESULT;
        [11] fn GetBlobAsUtf8(pBlob: *mut IDxcBlob, pBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [12] fn GetBlobAsWide(pBlob: *mut IDxcBlob, pBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
    }

    interface IDxcOperationResult {
        iid: IID_IDxcOperationResult,
        [3] fn GetStatus(pStatus: *mut HRESULT) -> HRESULT;
        [4] fn GetResult(ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [5] fn GetErrorBuffer(ppErrors: *mut *mut IDxcBlobEncoding) -> HRESULT;
    }

    interface IDxcCompiler {
        iid: IID_IDxcCompiler,
        [3] fn Compile(
            pSource: *mut IDxcBlob,
            pSourceName: LPCWSTR,
            pEntryPoint: LPCWSTR,
            pTargetProfile: LPCWSTR,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pDefines: *const DxcDefine,
            defineCount: UINT32,
            pIncludeHandler: *mut IDxcIncludeHandler,
            ppResult: *mut *mut IDxcOperationResult,
        ) -> HRESULT;
        [4] fn Preprocess(
            pSource: *mut IDxcBlob,
            pSourceName: LPCWSTR,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pDefines: *const DxcDefine,
            defineCount: UINT32,
            pIncludeHandler: *mut IDxcIncludeHandler,
            ppResult: *mut *mut IDxcOperationResult,
        ) -> HRESULT;
        [5] fn Disassemble(pSource: *mut IDxcBlob, ppDisassembly: *mut *mut IDxcBlobEncoding) -> HRESULT;
    }

    interface IDxcCompiler2 {
        iid: IID_IDxcCompiler2,
        [3] fn Compile(
            pSource: *mut IDxcBlob,
            pSourceName: LPCWSTR,
            pEntryPoint: LPCWSTR,
            pTargetProfile: LPCWSTR,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pDefines: *const DxcDefine,
            defineCount: UINT32,
            pIncludeHandler: *mut IDxcIncludeHandler,
            ppResult: *mut *mut IDxcOperationResult,
        ) -> HRESULT;
        [4] fn Preprocess(
            pSource: *mut IDxcBlob,
            pSourceName: LPCWSTR,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pDefines: *const DxcDefine,
            defineCount: UINT32,
            pIncludeHandler: *mut IDxcIncludeHandler,
            ppResult: *mut *mut IDxcOperationResult,
        ) -> HRESULT;
        [5] fn Disassemble(pSource: *mut IDxcBlob, ppDisassembly: *mut *mut IDxcBlobEncoding) -> HRESULT;
        /// `ppDebugBlobName` receives a string the caller frees with `CoTaskMemFree`.
        [6] fn CompileWithDebug(
            pSource: *mut IDxcBlob,
            pSourceName: LPCWSTR,
            pEntryPoint: LPCWSTR,
            pTargetProfile: LPCWSTR,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pDefines: *const DxcDefine,
            defineCount: UINT32,
            pIncludeHandler: *mut IDxcIncludeHandler,
            ppResult: *mut *mut IDxcOperationResult,
            ppDebugBlobName: *mut LPWSTR,
            ppDebugBlob: *mut *mut IDxcBlob,
        ) -> HRESULT;
    }

    interface IDxcLinker {
        iid: IID_IDxcLinker,
        [3] fn RegisterLibrary(pLibName: LPCWSTR, pLib: *mut IDxcBlob) -> HRESULT;
        [4] fn Link(
            pEntryName: LPCWSTR,
            pTargetProfile: LPCWSTR,
            pLibNames: *const LPCWSTR,
            libCount: UINT32,
            pArguments: *const LPCWSTR,
            argCount: UINT32,
            ppResult: *mut *mut IDxcOperationResult,
        ) -> HRESULT;
    }

    interface IDxcUtils {
        iid: IID_IDxcUtils,
        [3] fn CreateBlobFromBlob(pBlob: *mut IDxcBlob, offset: UINT32, length: UINT32, ppResult: *mut *mut IDxcBlob) -> HRESULT;
        /// The blob references `pData` without copying it.
        [4] fn CreateBlobFromPinned(pData: LPCVOID, size: UINT32, codePage: UINT32, ppBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [5] fn MoveToBlob(pData: LPCVOID, pIMalloc: *mut IMalloc, size: UINT32, codePage: UINT32, ppBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [6] fn CreateBlob(pData: LPCVOID, size: UINT32, codePage: UINT32, ppBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [7] fn LoadFile(pFileName: LPCWSTR, pCodePage: *mut UINT32, ppBlobEncoding: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [8] fn CreateReadOnlyStreamFromBlob(pBlob: *mut IDxcBlob, ppStream: *mut *mut IStream) -> HRESULT;
        [9] fn CreateDefaultIncludeHandler(ppResult: *mut *mut IDxcIncludeHandler) -> HRESULT;
        [10] fn GetBlobAsUtf8(pBlob: *mut IDxcBlob, ppBlobEncoding: *mut *mut IDxcBlobUtf8) -> HRESULT;
        [11] fn GetBlobAsWide(pBlob: *mut IDxcBlob, ppBlobEncoding: *mut *mut IDxcBlobWide) -> HRESULT;
        /// `ppPartData` points into `pShader`; nothing is allocated.
        [12] fn GetDxilContainerPart(pShader: *const DxcBuffer, DxcPart: UINT32, ppPartData: *mut *mut c_void, pPartSizeInBytes: *mut UINT32) -> HRESULT;
        [13] fn CreateReflection(pData: *const DxcBuffer, iid: REFIID, ppvReflection: *mut *mut c_void) -> HRESULT;
        [14] fn BuildArguments(
            pSourceName: LPCWSTR,
            pEntryPoint: LPCWSTR,
            pTargetProfile: LPCWSTR,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pDefines: *const DxcDefine,
            defineCount: UINT32,
            ppArgs: *mut *mut IDxcCompilerArgs,
        ) -> HRESULT;
        [15] fn GetPDBContents(pPDBBlob: *mut IDxcBlob, ppHash: *mut *mut IDxcBlob, ppContainer: *mut *mut IDxcBlob) -> HRESULT;
    }

    interface IDxcResult {
        iid: IID_IDxcResult,
        [3] fn GetStatus(pStatus: *mut HRESULT) -> HRESULT;
        [4] fn GetResult(ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [5] fn GetErrorBuffer(ppErrors: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [6] fn HasOutput(dxcOutKind: DXC_OUT_KIND) -> BOOL;
        [7] fn GetOutput(dxcOutKind: DXC_OUT_KIND, iid: REFIID, ppvObject: *mut *mut c_void, ppOutputName: *mut *mut IDxcBlobWide) -> HRESULT;
        [8] fn GetNumOutputs() -> UINT32;
        [9] fn GetOutputByIndex(Index: UINT32) -> DXC_OUT_KIND;
        [10] fn PrimaryOutput() -> DXC_OUT_KIND;
    }

    interface IDxcExtraOutputs {
        iid: IID_IDxcExtraOutputs,
        [3] fn GetOutputCount() -> UINT32;
        [4] fn GetOutput(
            uIndex: UINT32,
            iid: REFIID,
            ppvObject: *mut *mut c_void,
            ppOutputType: *mut *mut IDxcBlobWide,
            ppOutputName: *mut *mut IDxcBlobWide,
        ) -> HRESULT;
    }

    interface IDxcCompiler3 {
        iid: IID_IDxcCompiler3,
        [3] fn Compile(
            pSource: *const DxcBuffer,
            pArguments: *mut LPCWSTR,
            argCount: UINT32,
            pIncludeHandler: *mut IDxcIncludeHandler,
            riid: REFIID,
            ppResult: *mut *mut c_void,
        ) -> HRESULT;
        [4] fn Disassemble(pObject: *const DxcBuffer, riid: REFIID, ppResult: *mut *mut c_void) -> HRESULT;
    }

    interface IDxcValidator {
        iid: IID_IDxcValidator,
        [3] fn Validate(pShader: *mut IDxcBlob, Flags: UINT32, ppResult: *mut *mut IDxcOperationResult) -> HRESULT;
    }

    interface IDxcValidator2 {
        iid: IID_IDxcValidator2,
        [3] fn Validate(pShader: *mut IDxcBlob, Flags: UINT32, ppResult: *mut *mut IDxcOperationResult) -> HRESULT;
        [4] fn ValidateWithDebug(
            pShader: *mut IDxcBlob,
            Flags: UINT32,
            pOptDebugBitcode: *mut DxcBuffer,
            ppResult: *mut *mut IDxcOperationResult,
        ) -> HRESULT;
    }

    interface IDxcContainerBuilder {
        iid: IID_IDxcContainerBuilder,
        [3] fn Load(pDxilContainerHeader: *mut IDxcBlob) -> HRESULT;
        [4] fn AddPart(fourCC: UINT32, pSource: *mut IDxcBlob) -> HRESULT;
        [5] fn RemovePart(fourCC: UINT32) -> HRESULT;
        [6] fn SerializeContainer(ppResult: *mut *mut IDxcOperationResult) -> HRESULT;
    }

    interface IDxcAssembler {
        iid: IID_IDxcAssembler,
        [3] fn AssembleToContainer(pShader: *mut IDxcBlob, ppResult: *mut *mut IDxcOperationResult) -> HRESULT;
    }

    interface IDxcContainerReflection {
        iid: IID_IDxcContainerReflection,
        [3] fn Load(pContainer: *mut IDxcBlob) -> HRESULT;
        [4] fn GetPartCount(pResult: *mut UINT32) -> HRESULT;
        [5] fn GetPartKind(idx: UINT32, pResult: *mut UINT32) -> HRESULT;
        [6] fn GetPartContent(idx: UINT32, ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [7] fn FindFirstPartKind(kind: UINT32, pResult: *mut UINT32) -> HRESULT;
        [8] fn GetPartReflection(idx: UINT32, iid: REFIID, ppvObject: *mut *mut c_void) -> HRESULT;
    }

    /// Strings returned by this interface are freed with `CoTaskMemFree`.
    interface IDxcOptimizerPass {
        iid: IID_IDxcOptimizerPass,
        [3] fn GetOptionName(ppResult: *mut LPWSTR) -> HRESULT;
        [4] fn GetDescription(ppResult: *mut LPWSTR) -> HRESULT;
        [5] fn GetOptionArgCount(pCount: *mut UINT32) -> HRESULT;
        [6] fn GetOptionArgName(argIndex: UINT32, ppResult: *mut LPWSTR) -> HRESULT;
        [7] fn GetOptionArgDescription(argIndex: UINT32, ppResult: *mut LPWSTR) -> HRESULT;
    }

    interface IDxcOptimizer {
        iid: IID_IDxcOptimizer,
        [3] fn GetAvailablePassCount(pCount: *mut UINT32) -> HRESULT;
        [4] fn GetAvailablePass(index: UINT32, ppResult: *mut *mut IDxcOptimizerPass) -> HRESULT;
        [5] fn RunOptimizer(
            pBlob: *mut IDxcBlob,
            ppOptions: *mut LPCWSTR,
            optionCount: UINT32,
            pOutputModule: *mut *mut IDxcBlob,
            ppOutputText: *mut *mut IDxcBlobEncoding,
        ) -> HRESULT;
    }

    interface IDxcVersionInfo {
        iid: IID_IDxcVersionInfo,
        [3] fn GetVersion(pMajor: *mut UINT32, pMinor: *mut UINT32) -> HRESULT;
        [4] fn GetFlags(pFlags: *mut UINT32) -> HRESULT;
    }

    interface IDxcVersionInfo2 {
        iid: IID_IDxcVersionInfo2,
        [3] fn GetVersion(pMajor: *mut UINT32, pMinor: *mut UINT32) -> HRESULT;
        [4] fn GetFlags(pFlags: *mut UINT32) -> HRESULT;
        /// `pCommitHash` receives a string the caller frees with `CoTaskMemFree`.
        [5] fn GetCommitInfo(pCommitCount: *mut UINT32, pCommitHash: *mut LPSTR) -> HRESULT;
    }

    interface IDxcVersionInfo3 {
        iid: IID_IDxcVersionInfo3,
        /// `pVersionString` receives a string the caller frees with `CoTaskMemFree`.
        [3] fn GetCustomVersionString(pVersionString: *mut LPSTR) -> HRESULT;
    }

    /// Strings returned by this interface are `BSTR`s freed with `SysFreeString`.
    interface IDxcPdbUtils {
        iid: IID_IDxcPdbUtils,
        [3] fn Load(pPdbOrDxil: *mut IDxcBlob) -> HRESULT;
        [4] fn GetSourceCount(pCount: *mut UINT32) -> HRESULT;
        [5] fn GetSource(uIndex: UINT32, ppResult: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [6] fn GetSourceName(uIndex: UINT32, pResult: *mut BSTR) -> HRESULT;
        [7] fn GetFlagCount(pCount: *mut UINT32) -> HRESULT;
        [8] fn GetFlag(uIndex: UINT32, pResult: *mut BSTR) -> HRESULT;
        [9] fn GetArgCount(pCount: *mut UINT32) -> HRESULT;
        [10] fn GetArg(uIndex: UINT32, pResult: *mut BSTR) -> HRESULT;
        [11] fn GetArgPairCount(pCount: *mut UINT32) -> HRESULT;
        [12] fn GetArgPair(uIndex: UINT32, pName: *mut BSTR, pValue: *mut BSTR) -> HRESULT;
        [13] fn GetDefineCount(pCount: *mut UINT32) -> HRESULT;
        [14] fn GetDefine(uIndex: UINT32, pResult: *mut BSTR) -> HRESULT;
        [15] fn GetTargetProfile(pResult: *mut BSTR) -> HRESULT;
        [16] fn GetEntryPoint(pResult: *mut BSTR) -> HRESULT;
        [17] fn GetMainFileName(pResult: *mut BSTR) -> HRESULT;
        [18] fn GetHash(ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [19] fn GetName(pResult: *mut BSTR) -> HRESULT;
        [20] fn IsFullPDB() -> BOOL;
        [21] fn GetFullPDB(ppFullPDB: *mut *mut IDxcBlob) -> HRESULT;
        [22] fn GetVersionInfo(ppVersionInfo: *mut *mut IDxcVersionInfo) -> HRESULT;
        [23] fn SetCompiler(pCompiler: *mut IDxcCompiler3) -> HRESULT;
        [24] fn CompileForFullPDB(ppResult: *mut *mut IDxcResult) -> HRESULT;
        [25] fn OverrideArgs(pArgPairs: *mut DxcArgPair, uNumArgPairs: UINT32) -> HRESULT;
        [26] fn OverrideRootSignature(pRootSignature: *const WCHAR) -> HRESULT;
    }

    interface IDxcPdbUtils2 {
        iid: IID_IDxcPdbUtils2,
        [3] fn Load(pPdbOrDxil: *mut IDxcBlob) -> HRESULT;
        [4] fn GetSourceCount(pCount: *mut UINT32) -> HRESULT;
        [5] fn GetSource(uIndex: UINT32, ppResult: *mut *mut IDxcBlobEncoding) -> HRESULT;
        [6] fn GetSourceName(uIndex: UINT32, ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [7] fn GetLibraryPDBCount(pCount: *mut UINT32) -> HRESULT;
        [8] fn GetLibraryPDB(uIndex: UINT32, ppOutPdbUtils: *mut *mut IDxcPdbUtils2, ppLibraryName: *mut *mut IDxcBlobWide) -> HRESULT;
        [9] fn GetFlagCount(pCount: *mut UINT32) -> HRESULT;
        [10] fn GetFlag(uIndex: UINT32, ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [11] fn GetArgCount(pCount: *mut UINT32) -> HRESULT;
        [12] fn GetArg(uIndex: UINT32, ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [13] fn GetArgPairCount(pCount: *mut UINT32) -> HRESULT;
        [14] fn GetArgPair(uIndex: UINT32, ppName: *mut *mut IDxcBlobWide, ppValue: *mut *mut IDxcBlobWide) -> HRESULT;
        [15] fn GetDefineCount(pCount: *mut UINT32) -> HRESULT;
        [16] fn GetDefine(uIndex: UINT32, ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [17] fn GetTargetProfile(ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [18] fn GetEntryPoint(ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [19] fn GetMainFileName(ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [20] fn GetHash(ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [21] fn GetName(ppResult: *mut *mut IDxcBlobWide) -> HRESULT;
        [22] fn GetVersionInfo(ppVersionInfo: *mut *mut IDxcVersionInfo) -> HRESULT;
        [23] fn GetCustomToolchainID(pID: *mut UINT32) -> HRESULT;
        [24] fn GetCustomToolchainData(ppBlob: *mut *mut IDxcBlob) -> HRESULT;
        [25] fn GetWholeDxil(ppResult: *mut *mut IDxcBlob) -> HRESULT;
        [26] fn IsFullPDB() -> BOOL;
        [27] fn IsPDBRef() -> BOOL;
    }
}

/// Implemented by every interface handle in this module.
///
/// # Safety
///
/// `IID` must be the identifier the compiler library answers to in
/// `QueryInterface` for an object with this exact function table layout.
pub unsafe trait Interface: Sized {
    const IID: GUID;
    const NAME: &'static str;
}
