//! DirectX Shader Compiler CLI tool using the safe Rust API

use clap::{Parser, Subcommand};
use dxcrs::{Blob, Dxc, FileSystemInclude, PartKind, PdbSummary, ShaderTarget, ValidatorFlags};
use log::{LevelFilter, debug};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dxcrs")]
#[command(about = "DirectX Shader Compiler command-line tool", long_about = None)]
struct Cli {
    /// Path to the compiler library (default: DXC_LIBRARY_PATH or next to this tool)
    #[arg(long, global = true, value_name = "PATH")]
    dxc_path: Option<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile HLSL shader to DXIL
    Compile {
        /// Input HLSL file
        input: PathBuf,

        /// Entry point function name
        #[arg(short = 'E', long, default_value = "main")]
        entry: String,

        /// Shader target (e.g., vs_6_0, ps_6_6, lib_6_3)
        #[arg(short = 'T', long)]
        target: ShaderTarget,

        /// Output file (default: <input>.dxil)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Optimization level 0-3
        #[arg(short = 'O', long, default_value = "3", value_parser = clap::value_parser!(u32).range(0..=3))]
        optimize: u32,

        /// Preprocessor defines (NAME=VALUE or NAME)
        #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
        defines: Vec<String>,

        /// Include search directories
        #[arg(short = 'I', long = "include", value_name = "DIR")]
        includes: Vec<PathBuf>,

        /// Emit debug information
        #[arg(long)]
        debug: bool,

        /// Write the PDB to this file (implies --debug)
        #[arg(long, value_name = "FILE")]
        pdb: Option<PathBuf>,

        /// Print the disassembly after compiling
        #[arg(long)]
        disasm: bool,

        /// Skip validation
        #[arg(long)]
        no_validate: bool,

        /// Treat warnings as errors
        #[arg(long)]
        werror: bool,
    },

    /// Disassemble a DXIL container
    #[command(alias = "disassemble")]
    Disasm {
        /// Input container file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preprocess HLSL source
    #[command(alias = "pp")]
    Preprocess {
        /// Input HLSL file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preprocessor defines (NAME=VALUE or NAME)
        #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
        defines: Vec<String>,

        /// Include search directories
        #[arg(short = 'I', long = "include", value_name = "DIR")]
        includes: Vec<PathBuf>,
    },

    /// Validate (and sign) a DXIL container
    Validate {
        /// Input container file
        input: PathBuf,

        /// Write the signed container here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Validate the root signature part only
        #[arg(long)]
        root_signature_only: bool,
    },

    /// List the parts of a container
    Parts {
        /// Input container file
        input: PathBuf,
    },

    /// Extract a part from a container
    Extract {
        /// Input container file
        input: PathBuf,

        /// Part name (dxil, rootsig, pdb, ...) or four-character code
        #[arg(short, long)]
        part: PartKind,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove debug info and/or reflection data from a container
    Strip {
        /// Input container file
        input: PathBuf,

        /// Output file (default: <input>.stripped.dxil)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep debug information (stripped by default)
        #[arg(long)]
        keep_debug: bool,

        /// Keep reflection data (stripped by default)
        #[arg(long)]
        keep_reflection: bool,

        /// Additional parts to remove
        #[arg(short, long = "part")]
        parts: Vec<PartKind>,
    },

    /// Add or replace a container part
    Inject {
        /// Input container file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Data file to inject
        #[arg(short, long)]
        data: PathBuf,

        /// Part to replace
        #[arg(short, long, default_value = "private")]
        part: PartKind,
    },

    /// Link shader libraries into a shader
    Link {
        /// Library containers; each is registered under its file stem
        #[arg(required = true)]
        libraries: Vec<PathBuf>,

        /// Entry point function name
        #[arg(short = 'E', long, default_value = "main")]
        entry: String,

        /// Shader target
        #[arg(short = 'T', long)]
        target: ShaderTarget,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show compiler and validator versions
    Version,

    /// List available optimizer passes
    Passes {
        /// Also list each pass's arguments
        #[arg(long)]
        args: bool,
    },

    /// Show the compile information recorded in a PDB
    Pdb {
        /// PDB or container with embedded debug info
        input: PathBuf,

        /// Extract embedded sources into this directory
        #[arg(long, value_name = "DIR")]
        extract_sources: Option<PathBuf>,
    },
}

fn parse_define(s: &str) -> (String, String) {
    s.split_once('=')
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .unwrap_or_else(|| (s.to_string(), "1".to_string()))
}

fn read_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), String> {
    std::fs::write(path, data).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn include_handler(input: &Path, includes: Vec<PathBuf>) -> FileSystemInclude {
    let mut handler = FileSystemInclude::new();
    match input.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => handler.add_path(dir),
        None => handler.add_path("."),
    }
    for dir in includes {
        handler.add_path(dir);
    }
    handler
}

#[allow(clippy::too_many_arguments)]
fn compile_shader(
    dxc: Dxc,
    input: PathBuf,
    entry: String,
    target: ShaderTarget,
    output: Option<PathBuf>,
    optimize: u32,
    defines: Vec<String>,
    includes: Vec<PathBuf>,
    debug: bool,
    pdb: Option<PathBuf>,
    disasm: bool,
    no_validate: bool,
    werror: bool,
) -> Result<(), String> {
    let output = output.unwrap_or_else(|| input.with_extension("dxil"));

    let source = std::fs::read_to_string(&input)
        .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;

    let compiler = dxc.compiler().map_err(|e| e.to_string())?;
    let mut handler = include_handler(&input, includes);

    let mut builder = compiler
        .compile(&source, &entry, target)
        .source_name(&input.to_string_lossy())
        .optimization_level(optimize)
        .include_handler(&mut handler);

    for def in &defines {
        let (name, value) = parse_define(def);
        builder = builder.define(&name, &value);
    }
    if debug || pdb.is_some() {
        builder = builder.debug();
    }
    if no_validate {
        builder = builder.skip_validation();
    }
    if werror {
        builder = builder.warnings_are_errors();
    }
    debug!("arguments: {:?}", builder.arguments());

    let result = builder.run().map_err(|e| e.to_string())?;

    let object = result.object().map_err(|e| e.to_string())?;
    write_file(&output, object.as_bytes())?;

    eprintln!(
        "Compiled {} -> {} ({} bytes)",
        input.display(),
        output.display(),
        object.len()
    );

    if let Some(path) = pdb {
        match result.pdb().map_err(|e| e.to_string())? {
            Some((blob, name)) => {
                write_file(&path, blob.as_bytes())?;
                eprintln!(
                    "PDB {} -> {} ({} bytes)",
                    name.unwrap_or_default(),
                    path.display(),
                    blob.len()
                );
            }
            None => eprintln!("No PDB produced"),
        }
    }

    if let Some(warnings) = result.errors().map_err(|e| e.to_string())? {
        eprintln!("Warnings:\n{}", warnings);
    }

    if disasm {
        let text = compiler.disassemble(&object).map_err(|e| e.to_string())?;
        print!("{}", text);
    }

    Ok(())
}

fn disassemble_shader(dxc: Dxc, input: PathBuf, output: Option<PathBuf>) -> Result<(), String> {
    let object = read_file(&input)?;

    let text = dxc
        .compiler()
        .and_then(|c| c.disassemble(&object))
        .map_err(|e| e.to_string())?;

    if let Some(output) = output {
        write_file(&output, text.as_bytes())?;
        eprintln!("Disassembled {} -> {}", input.display(), output.display());
    } else {
        print!("{}", text);
    }

    Ok(())
}

fn preprocess_shader(
    dxc: Dxc,
    input: PathBuf,
    output: Option<PathBuf>,
    defines: Vec<String>,
    includes: Vec<PathBuf>,
) -> Result<(), String> {
    let source = std::fs::read_to_string(&input)
        .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;

    let compiler = dxc.compiler().map_err(|e| e.to_string())?;
    let mut handler = include_handler(&input, includes);
    let mut builder = compiler
        .preprocess(&source)
        .source_name(&input.to_string_lossy())
        .include_handler(&mut handler);

    for def in &defines {
        let (name, value) = parse_define(def);
        builder = builder.define(&name, &value);
    }

    let result = builder.run().map_err(|e| e.to_string())?;

    if let Some(output) = output {
        write_file(&output, result.source.as_bytes())?;
        eprintln!("Preprocessed {} -> {}", input.display(), output.display());
    } else {
        print!("{}", result.source);
    }

    if let Some(warnings) = result.warnings {
        eprintln!("Warnings:\n{}", warnings);
    }

    Ok(())
}

fn validate_container(
    dxc: Dxc,
    input: PathBuf,
    output: Option<PathBuf>,
    root_signature_only: bool,
) -> Result<(), String> {
    let data = read_file(&input)?;

    let mut flags = ValidatorFlags::empty();
    if root_signature_only {
        flags |= ValidatorFlags::ROOT_SIGNATURE_ONLY;
    }

    let validator = dxc.validator().map_err(|e| e.to_string())?;
    let (signed, result) = match output {
        Some(_) => {
            let (signed, result) = validator.sign(data, flags).map_err(|e| e.to_string())?;
            (Some(signed), result)
        }
        None => {
            let container = Blob::from_vec(data);
            let result = validator
                .validate(&container, flags)
                .map_err(|e| e.to_string())?;
            (None, result)
        }
    };

    if let Some(warnings) = result.warnings {
        eprintln!("Warnings:\n{}", warnings);
    }
    eprintln!("{} is valid", input.display());

    if let (Some(output), Some(signed)) = (output, signed) {
        write_file(&output, signed.as_bytes())?;
        eprintln!("Signed container -> {}", output.display());
    }

    Ok(())
}

fn list_parts(dxc: Dxc, input: PathBuf) -> Result<(), String> {
    let container = Blob::from_vec(read_file(&input)?);

    let reflection = dxc.container_reflection().map_err(|e| e.to_string())?;
    reflection.load(&container).map_err(|e| e.to_string())?;

    println!("Parts in {}:", input.display());
    println!("  Size: {} bytes", container.len());

    for part in reflection.parts().map_err(|e| e.to_string())? {
        let part = part.map_err(|e| e.to_string())?;
        match part.kind.name() {
            Some(name) => println!(
                "  [{}] {} ({}): {} bytes",
                part.index,
                part.kind,
                name,
                part.data.len()
            ),
            None => println!(
                "  [{}] {}: {} bytes",
                part.index,
                part.kind,
                part.data.len()
            ),
        }
    }

    Ok(())
}

fn extract_part(
    dxc: Dxc,
    input: PathBuf,
    part: PartKind,
    output: Option<PathBuf>,
) -> Result<(), String> {
    let container = Blob::from_vec(read_file(&input)?);

    let reflection = dxc.container_reflection().map_err(|e| e.to_string())?;
    reflection.load(&container).map_err(|e| e.to_string())?;
    let data = reflection.part(part).map_err(|e| e.to_string())?;

    write_blob_output(&data, output, &part.to_string())
}

fn write_blob_output(blob: &Blob, output: Option<PathBuf>, name: &str) -> Result<(), String> {
    if let Some(output) = output {
        write_file(&output, blob.as_bytes())?;
        eprintln!(
            "Extracted {} -> {} ({} bytes)",
            name,
            output.display(),
            blob.len()
        );
    } else {
        use std::io::Write;
        std::io::stdout()
            .write_all(blob.as_bytes())
            .map_err(|e| format!("Failed to write to stdout: {}", e))?;
    }
    Ok(())
}

fn strip_container(
    dxc: Dxc,
    input: PathBuf,
    output: Option<PathBuf>,
    keep_debug: bool,
    keep_reflection: bool,
    mut parts: Vec<PartKind>,
) -> Result<(), String> {
    let output = output.unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}.stripped.dxil", stem))
    });

    if !keep_debug {
        parts.extend([PartKind::PDB, PartKind::PDB_NAME]);
    }
    if !keep_reflection {
        parts.push(PartKind::REFLECTION_DATA);
    }
    if parts.is_empty() {
        return Err("Nothing to strip (--keep-debug and --keep-reflection both specified)".into());
    }

    let container = Blob::from_vec(read_file(&input)?);
    let stripped = dxc
        .strip_parts(&container, &parts)
        .map_err(|e| e.to_string())?;

    write_file(&output, stripped.as_bytes())?;

    eprintln!(
        "Stripped {} -> {} ({} -> {} bytes)",
        input.display(),
        output.display(),
        container.len(),
        stripped.len()
    );

    Ok(())
}

fn inject_part(
    dxc: Dxc,
    input: PathBuf,
    output: PathBuf,
    data: PathBuf,
    part: PartKind,
) -> Result<(), String> {
    let container = Blob::from_vec(read_file(&input)?);
    let payload = Blob::from_vec(read_file(&data)?);

    let result = dxc
        .set_part(&container, part, &payload)
        .map_err(|e| e.to_string())?;

    write_file(&output, result.as_bytes())?;

    eprintln!(
        "Injected {} bytes from {} as {} into {} -> {}",
        payload.len(),
        data.display(),
        part,
        input.display(),
        output.display()
    );

    Ok(())
}

fn link_libraries(
    dxc: Dxc,
    libraries: Vec<PathBuf>,
    entry: String,
    target: ShaderTarget,
    output: PathBuf,
) -> Result<(), String> {
    let linker = dxc.linker().map_err(|e| e.to_string())?;

    let mut names = Vec::new();
    for path in &libraries {
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let library = Blob::from_vec(read_file(path)?);
        linker
            .register_library(&name, &library)
            .map_err(|e| e.to_string())?;
        names.push(name);
    }

    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let result = linker
        .link(&entry, target, &names, &[])
        .map_err(|e| e.to_string())?;

    write_file(&output, result.object.as_bytes())?;
    eprintln!(
        "Linked {} libraries -> {} ({} bytes)",
        names.len(),
        output.display(),
        result.object.len()
    );

    if let Some(warnings) = result.warnings {
        eprintln!("Warnings:\n{}", warnings);
    }

    Ok(())
}

fn show_version(dxc: Dxc) -> Result<(), String> {
    println!("Library: {}", dxc.library().path().display());
    let compiler = dxc.compiler_version().map_err(|e| e.to_string())?;
    println!("Compiler: {}", compiler);
    match dxc.validator_version() {
        Ok(validator) => println!("Validator: {}", validator),
        Err(e) => println!("Validator: unavailable ({})", e),
    }
    Ok(())
}

fn list_passes(dxc: Dxc, args: bool) -> Result<(), String> {
    let passes = dxc
        .optimizer()
        .and_then(|o| o.passes())
        .map_err(|e| e.to_string())?;

    for pass in passes {
        println!("-{:32} {}", pass.name, pass.description);
        if args {
            for arg in &pass.arguments {
                println!("    {:30} {}", arg.name, arg.description);
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &PdbSummary) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("Name: {}", field(&summary.name));
    println!("Main file: {}", field(&summary.main_file_name));
    println!("Entry point: {}", field(&summary.entry_point));
    println!("Target: {}", field(&summary.target_profile));
    println!("Full PDB: {}", summary.full_pdb);

    if !summary.source_names.is_empty() {
        println!("Sources ({}):", summary.source_names.len());
        for name in &summary.source_names {
            println!("  {}", name);
        }
    }
    if !summary.defines.is_empty() {
        println!("Defines: {}", summary.defines.join(" "));
    }
    if !summary.args.is_empty() {
        println!("Arguments: {}", summary.args.join(" "));
    }
}

fn show_pdb(dxc: Dxc, input: PathBuf, extract_sources: Option<PathBuf>) -> Result<(), String> {
    let pdb = Blob::from_vec(read_file(&input)?);

    let utils = dxc.pdb_utils().map_err(|e| e.to_string())?;
    utils.load(&pdb).map_err(|e| e.to_string())?;

    let summary = utils.summary().map_err(|e| e.to_string())?;
    print_summary(&summary);

    if let Some(hash) = utils.hash().map_err(|e| e.to_string())? {
        let hex: String = hash.as_bytes().iter().map(|b| format!("{b:02x}")).collect();
        println!("Hash: {}", hex);
    }
    if let Some(version) = utils.version_info().map_err(|e| e.to_string())? {
        println!("Compiler: {}", version);
    }

    if let Some(dir) = extract_sources {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
        for source in utils.sources().map_err(|e| e.to_string())? {
            let file_name = Path::new(&source.name)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "source.hlsl".into());
            let path = dir.join(file_name);
            write_file(&path, source.contents.as_bytes())?;
            eprintln!("Extracted {} -> {}", source.name, path.display());
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();

    let dxc = match Dxc::from_path(cli.dxc_path.as_deref()) {
        Ok(dxc) => dxc,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Compile {
            input,
            entry,
            target,
            output,
            optimize,
            defines,
            includes,
            debug,
            pdb,
            disasm,
            no_validate,
            werror,
        } => compile_shader(
            dxc, input, entry, target, output, optimize, defines, includes, debug, pdb, disasm,
            no_validate, werror,
        ),
        Commands::Disasm { input, output } => disassemble_shader(dxc, input, output),
        Commands::Preprocess {
            input,
            output,
            defines,
            includes,
        } => preprocess_shader(dxc, input, output, defines, includes),
        Commands::Validate {
            input,
            output,
            root_signature_only,
        } => validate_container(dxc, input, output, root_signature_only),
        Commands::Parts { input } => list_parts(dxc, input),
        Commands::Extract {
            input,
            part,
            output,
        } => extract_part(dxc, input, part, output),
        Commands::Strip {
            input,
            output,
            keep_debug,
            keep_reflection,
            parts,
        } => strip_container(dxc, input, output, keep_debug, keep_reflection, parts),
        Commands::Inject {
            input,
            output,
            data,
            part,
        } => inject_part(dxc, input, output, data, part),
        Commands::Link {
            libraries,
            entry,
            target,
            output,
        } => link_libraries(dxc, libraries, entry, target, output),
        Commands::Version => show_version(dxc),
        Commands::Passes { args } => list_passes(dxc, args),
        Commands::Pdb {
            input,
            extract_sources,
        } => show_pdb(dxc, input, extract_sources),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
