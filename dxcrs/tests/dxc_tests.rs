//! End-to-end tests against the real compiler library.
//!
//! Each test returns early when the library cannot be loaded; see
//! `dxcompiler::library_path` for where it is looked up.

use dxcrs::{Blob, Dxc, Error, MemoryInclude, OutputKind, PartKind, ShaderTarget, ValidatorFlags};
use pretty_assertions::assert_eq;

const PIXEL_SHADER: &str = r#"
float4 tint;

float4 main(float4 pos : SV_Position) : SV_Target {
    return pos * tint;
}
"#;

fn dxc() -> Option<Dxc> {
    match Dxc::new() {
        Ok(dxc) => Some(dxc),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

fn compile_pixel(dxc: &Dxc) -> Blob {
    dxc.compiler()
        .unwrap()
        .compile(PIXEL_SHADER, "main", ShaderTarget::PS_6_0)
        .run()
        .unwrap()
        .object()
        .unwrap()
}

#[test]
fn test_compile_produces_container() {
    let Some(dxc) = dxc() else { return };
    let output = dxc
        .compiler()
        .unwrap()
        .compile(PIXEL_SHADER, "main", ShaderTarget::PS_6_0)
        .run()
        .unwrap();

    assert!(output.status().unwrap().is_success());
    assert!(output.has_output(OutputKind::Object));
    let object = output.object().unwrap();
    assert_eq!(&object.as_bytes()[..4], b"DXBC");
}

#[test]
fn test_compile_error_reports_diagnostics() {
    let Some(dxc) = dxc() else { return };
    let err = dxc
        .compiler()
        .unwrap()
        .compile(
            "float4 main() : SV_Target { return undefined_symbol; }",
            "main",
            ShaderTarget::PS_6_0,
        )
        .run()
        .unwrap_err();

    match err {
        Error::Compilation { hresult, message } => {
            assert!(hresult.is_error());
            assert!(message.contains("undefined_symbol"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_compile_with_memory_include() {
    let Some(dxc) = dxc() else { return };
    let mut include = MemoryInclude::new();
    include.add("common.hlsli", b"#define SCALE 2.0\n");

    let compiler = dxc.compiler().unwrap();
    let output = compiler
        .compile(
            "#include \"common.hlsli\"\nfloat4 main() : SV_Target { return SCALE; }",
            "main",
            ShaderTarget::PS_6_0,
        )
        .include_handler(&mut include)
        .run()
        .unwrap();
    assert!(!output.object().unwrap().is_empty());
}

#[test]
fn test_preprocess_expands_defines() {
    let Some(dxc) = dxc() else { return };
    let compiler = dxc.compiler().unwrap();
    let result = compiler
        .preprocess("float value = FACTOR;")
        .define("FACTOR", "42")
        .run()
        .unwrap();
    assert!(result.source.contains("42"), "{}", result.source);
    assert!(!result.source.contains("FACTOR"));
}

#[test]
fn test_disassemble_round_trip() {
    let Some(dxc) = dxc() else { return };
    let object = compile_pixel(&dxc);
    let text = dxc.compiler().unwrap().disassemble(&object).unwrap();
    assert!(text.contains("@main"), "{text}");
}

#[test]
fn test_container_parts() {
    let Some(dxc) = dxc() else { return };
    let object = compile_pixel(&dxc);

    let reflection = dxc.container_reflection().unwrap();
    reflection.load(&object).unwrap();
    let kinds: Vec<PartKind> = reflection
        .parts()
        .unwrap()
        .map(|p| p.unwrap().kind)
        .collect();
    assert!(kinds.contains(&PartKind::DXIL));
    assert!(kinds.contains(&PartKind::INPUT_SIGNATURE));
    assert_eq!(reflection.find_first_part(PartKind::PRIVATE_DATA).unwrap(), None);
}

#[test]
fn test_set_and_strip_private_data() {
    let Some(dxc) = dxc() else { return };
    let object = compile_pixel(&dxc);
    let payload = Blob::from_bytes(b"build-id:1234");

    let with_data = dxc.set_part(&object, PartKind::PRIVATE_DATA, &payload).unwrap();
    let reflection = dxc.container_reflection().unwrap();
    reflection.load(&with_data).unwrap();
    let stored = reflection.part(PartKind::PRIVATE_DATA).unwrap();
    assert_eq!(&stored.as_bytes()[..payload.len()], payload.as_bytes());

    let stripped = dxc.strip_parts(&with_data, &[PartKind::PRIVATE_DATA]).unwrap();
    reflection.load(&stripped).unwrap();
    assert!(matches!(
        reflection.part(PartKind::PRIVATE_DATA),
        Err(Error::PartNotFound(_))
    ));
}

#[test]
fn test_validate_compiled_shader() {
    let Some(dxc) = dxc() else { return };
    let Ok(validator) = dxc.validator() else {
        eprintln!("skipping: no validator");
        return;
    };
    let object = compile_pixel(&dxc);
    validator.validate(&object, ValidatorFlags::empty()).unwrap();
}

#[test]
fn test_sign_returns_owned_container() {
    let Some(dxc) = dxc() else { return };
    let Ok(validator) = dxc.validator() else {
        eprintln!("skipping: no validator");
        return;
    };
    let object = compile_pixel(&dxc);
    let original = object.as_bytes().to_vec();
    let (signed, _) = validator
        .sign(original.clone(), ValidatorFlags::empty())
        .unwrap();
    assert_eq!(signed.len(), original.len());
    assert_eq!(&signed.as_bytes()[..4], b"DXBC");
    // The caller's blob is left untouched.
    assert_eq!(object.as_bytes(), original.as_slice());
}

#[test]
fn test_pinned_blob_aliases_caller_memory() {
    let Some(dxc) = dxc() else { return };
    let utils = dxc.utils().unwrap();
    let data = b"pinned source".to_vec();
    let pinned = utils.create_blob_pinned(&data, None).unwrap();
    assert_eq!(pinned.as_bytes().as_ptr(), data.as_ptr());
    assert_eq!(pinned.len(), data.len());
    assert_eq!(pinned.as_bytes(), b"pinned source");
}

#[test]
fn test_compiler_args_collects_arguments() {
    let Some(dxc) = dxc() else { return };
    let Ok(args) = dxc.compiler_args() else {
        eprintln!("skipping: no argument builder");
        return;
    };
    assert!(args.is_empty());
    args.add_arguments(["-E", "main"]).unwrap();
    args.add_arguments_utf8(["-T", "ps_6_0"]).unwrap();
    assert_eq!(args.to_vec().unwrap(), vec!["-E", "main", "-T", "ps_6_0"]);
}

#[test]
fn test_compiler_version() {
    let Some(dxc) = dxc() else { return };
    let version = dxc.compiler_version().unwrap();
    assert!(version.major >= 1);
}

#[test]
fn test_optimizer_lists_passes() {
    let Some(dxc) = dxc() else { return };
    let passes = dxc.optimizer().unwrap().passes().unwrap();
    assert!(!passes.is_empty());
    assert!(passes.iter().all(|p| !p.name.is_empty()));
}

#[test]
fn test_pdb_records_entry_point() {
    let Some(dxc) = dxc() else { return };
    let output = dxc
        .compiler()
        .unwrap()
        .compile(PIXEL_SHADER, "main", ShaderTarget::PS_6_0)
        .source_name("tint.hlsl")
        .debug()
        .run()
        .unwrap();
    let (pdb, _name) = output.pdb().unwrap().expect("debug compile emits a PDB");

    let utils = dxc.pdb_utils().unwrap();
    utils.load(&pdb).unwrap();
    assert_eq!(utils.entry_point().unwrap().as_deref(), Some("main"));
    assert_eq!(utils.target_profile().unwrap().as_deref(), Some("ps_6_0"));
    assert!(utils.source_count().unwrap() >= 1);
}
