//! iborb-idl CLI
//!
//! The command-line driver for the IDL compiler.
//!
//! # Usage
//!
//! ```text
//! iborb-idl [OPTIONS] <FILES>...
//!
//! Options:
//!   -h, --help            Show help
//!   -v, --version         Show version information
//!   -o, --output <DIR>    Output directory for generated files (default: .)
//!   -I, --include <PATH>  Add include search path (repeatable)
//!   -D, --define <NAME[=VALUE]>  Define preprocessor macro
//!   -E, --no-preprocess   Skip preprocessor (process raw IDL)
//!   -p, --parse-only      Parse only, don't generate code
//!       --verbose         Enable verbose output
//! ```
//!
//! Exit code is 0 on full success, 1 when any input fails to parse or
//! generate or when no inputs were given. Unknown flags are warned about on
//! stderr and ignored.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser as ClapParser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use iborb_idl::diagnostics::DiagnosticEmitter;
use iborb_idl::generator::{Cpp11Generator, GeneratorConfig};
use iborb_idl::parser::Parser;
use iborb_idl::preprocessor::Preprocessor;

/// CORBA IDL to C++11 compiler.
#[derive(ClapParser)]
#[command(name = "iborb-idl")]
#[command(about = "CORBA IDL to C++11 compiler", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Show version information
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Output directory for generated files
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Add include search path for the preprocessor
    #[arg(short = 'I', long = "include", value_name = "PATH")]
    include: Vec<String>,

    /// Define preprocessor macro NAME[=VALUE] (VALUE defaults to 1)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    define: Vec<String>,

    /// Skip preprocessor (process raw IDL)
    #[arg(short = 'E', long = "no-preprocess")]
    no_preprocess: bool,

    /// Parse only, don't generate code
    #[arg(short = 'p', long = "parse-only")]
    parse_only: bool,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// IDL input files
    #[arg(value_name = "FILES")]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from(filter_known_args());

    if cli.version {
        println!("iborb-idl version {}", env!("CARGO_PKG_VERSION"));
        println!("CORBA IDL to C++11 Compiler");
        println!("Part of the ibORB project");
        return ExitCode::SUCCESS;
    }

    if cli.inputs.is_empty() {
        eprintln!("Error: No input files specified.");
        let _ = Cli::command().print_help();
        return ExitCode::from(1);
    }

    // Create the output directory up front so per-file generation can
    // assume it exists.
    if !cli.parse_only {
        if let Err(e) = fs::create_dir_all(&cli.output) {
            eprintln!(
                "Error creating output directory {}: {}",
                cli.output.display(),
                e
            );
            return ExitCode::from(1);
        }
    }

    let mut failures = 0usize;
    for input in &cli.inputs {
        if !process_file(input, &cli) {
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("{} file(s) failed to process.", failures);
        return ExitCode::from(1);
    }

    if cli.verbose {
        println!("Successfully processed {} file(s).", cli.inputs.len());
    }

    ExitCode::SUCCESS
}

/// Drop unknown flags (with a warning) before clap sees the arguments.
/// Known value-taking flags keep their values, in both separate-argument
/// and attached (`-Ipath`, `--output=dir`) forms.
fn filter_known_args() -> Vec<OsString> {
    const KNOWN: &[&str] = &[
        "-h",
        "--help",
        "-v",
        "--version",
        "-o",
        "--output",
        "-I",
        "--include",
        "-D",
        "--define",
        "-E",
        "--no-preprocess",
        "-p",
        "--parse-only",
        "--verbose",
    ];
    const VALUE_FLAGS: &[&str] = &["-o", "--output", "-I", "--include", "-D", "--define"];
    const SHORT_VALUE_PREFIXES: &[&str] = &["-o", "-I", "-D"];

    let mut filtered = Vec::new();
    let mut args = std::env::args_os();
    if let Some(program) = args.next() {
        filtered.push(program);
    }

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();

        if !text.starts_with('-') {
            filtered.push(arg);
            continue;
        }

        let flag_name = text.split('=').next().unwrap_or(&text);
        if KNOWN.contains(&flag_name) {
            let takes_separate_value =
                VALUE_FLAGS.contains(&flag_name) && !text.contains('=');
            filtered.push(arg);
            if takes_separate_value {
                if let Some(value) = args.next() {
                    filtered.push(value);
                }
            }
            continue;
        }

        // Attached short-flag values: -Ipath, -Dname=1, -odir.
        if SHORT_VALUE_PREFIXES
            .iter()
            .any(|prefix| text.starts_with(prefix) && text.len() > prefix.len())
        {
            filtered.push(arg);
            continue;
        }

        eprintln!("Warning: Unknown option: {}", text);
    }

    filtered
}

/// Read (and optionally preprocess) one input. Falls back to the raw file
/// when no preprocessor is available or when it fails.
fn load_source(input: &Path, cli: &Cli) -> Result<String, String> {
    let read_raw = || {
        fs::read_to_string(input)
            .map_err(|e| format!("Error reading file '{}': {}", input.display(), e))
    };

    if cli.no_preprocess {
        return read_raw();
    }

    if cli.verbose {
        println!("  Running preprocessor...");
    }

    let mut pp = Preprocessor::detect();
    if !pp.is_available() {
        if cli.verbose {
            println!("  No C preprocessor found, using raw IDL...");
        }
        return read_raw();
    }

    for path in &cli.include {
        pp.add_include_path(path.clone());
    }
    for def in &cli.define {
        match def.split_once('=') {
            Some((name, value)) => pp.add_define(name, value),
            None => pp.add_define(def.as_str(), "1"),
        }
    }

    match pp.preprocess_file(input) {
        Ok(output) => Ok(output),
        Err(e) => {
            debug!(error = %e, "preprocessor failed, falling back to raw input");
            if cli.verbose {
                println!("  Preprocessor failed, using raw IDL...");
            }
            read_raw()
        }
    }
}

/// Process a single IDL file through the whole pipeline.
fn process_file(input: &Path, cli: &Cli) -> bool {
    if cli.verbose {
        println!("Processing: {}", input.display());
    }

    let source = match load_source(input, cli) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("{}", message);
            return false;
        }
    };

    if cli.verbose {
        println!("  Parsing...");
    }

    let filename = input.to_string_lossy();
    let mut parser = Parser::new(&source, filename.as_ref());
    let unit = parser.parse();
    let diagnostics = parser.take_diagnostics();

    let emitter = DiagnosticEmitter::new(filename.as_ref(), &source);
    let mut had_errors = false;
    for diagnostic in &diagnostics {
        emitter.emit(diagnostic);
        if !diagnostic.is_warning() {
            had_errors = true;
        }
    }

    if had_errors {
        eprintln!("Parsing failed with errors.");
        return false;
    }

    if cli.verbose {
        println!("  Parsed {} top-level definitions.", unit.definitions.len());
    }

    if cli.parse_only {
        return true;
    }

    if cli.verbose {
        println!("  Generating C++11 code...");
    }

    let config = GeneratorConfig {
        output_dir: Some(cli.output.clone()),
        ..GeneratorConfig::default()
    };
    let mut generator = Cpp11Generator::new(config).with_symbol_table(parser.symbol_table());
    let ok = generator.generate(&unit);

    for diagnostic in generator.diagnostics() {
        eprintln!("{}", diagnostic.render_line());
    }

    if !ok {
        return false;
    }

    if cli.verbose {
        let base = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "generated".to_string());
        println!("  Generated: {}", cli.output.join(base + ".hpp").display());
    }

    true
}
