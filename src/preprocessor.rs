//! External C preprocessor invocation.
//!
//! IDL shares the C preprocessor's `#include`/`#define` layer, so the
//! compiler shells out to a real preprocessor (`gcc -E`, `clang -E`, ...)
//! and consumes its output, `#line` markers included. When no preprocessor
//! can be found, or when it fails, the driver falls back to reading the
//! input verbatim.
//!
//! The child process is spawned synchronously; stdout and stderr are
//! collected until exit and the handle is closed before returning.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Why preprocessing did not produce output.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("no suitable C preprocessor found")]
    NotAvailable,
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("failed to run preprocessor: {0}")]
    Io(#[from] std::io::Error),
    #[error("preprocessor exited with status {code}")]
    Failed { code: i32, output: String },
}

/// Drives an external C preprocessor over IDL input.
pub struct Preprocessor {
    compiler: Option<String>,
    include_paths: Vec<String>,
    defines: Vec<(String, String)>,
}

impl Preprocessor {
    /// Probe the system for a usable preprocessor.
    pub fn detect() -> Self {
        let compiler = candidates()
            .iter()
            .find(|c| command_exists(c))
            .map(|c| c.to_string());
        Self {
            compiler,
            include_paths: Vec::new(),
            defines: Vec::new(),
        }
    }

    /// Use a specific preprocessor executable.
    pub fn with_compiler(compiler: impl Into<String>) -> Self {
        Self {
            compiler: Some(compiler.into()),
            include_paths: Vec::new(),
            defines: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.compiler.is_some()
    }

    pub fn add_include_path(&mut self, path: impl Into<String>) {
        self.include_paths.push(path.into());
    }

    /// Define a macro; an empty value defines the bare name.
    pub fn add_define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.defines.push((name.into(), value.into()));
    }

    /// Preprocess a file, returning the expanded text.
    pub fn preprocess_file(&self, input: &Path) -> Result<String, PreprocessError> {
        let Some(compiler) = &self.compiler else {
            return Err(PreprocessError::NotAvailable);
        };
        if !input.exists() {
            return Err(PreprocessError::InputNotFound(input.to_path_buf()));
        }

        let mut cmd = Command::new(compiler);
        if cfg!(windows) && compiler == "cl" {
            cmd.arg("/E").arg("/nologo");
            for path in &self.include_paths {
                cmd.arg(format!("/I{}", path));
            }
            for (name, value) in &self.defines {
                if value.is_empty() {
                    cmd.arg(format!("/D{}", name));
                } else {
                    cmd.arg(format!("/D{}={}", name, value));
                }
            }
        } else {
            cmd.arg("-E").arg("-x").arg("c");
            for path in &self.include_paths {
                cmd.arg(format!("-I{}", path));
            }
            for (name, value) in &self.defines {
                if value.is_empty() {
                    cmd.arg(format!("-D{}", name));
                } else {
                    cmd.arg(format!("-D{}={}", name, value));
                }
            }
        }
        cmd.arg(input);

        debug!(compiler = %compiler, input = %input.display(), "running preprocessor");

        let output = cmd.output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(PreprocessError::Failed {
                code: output.status.code().unwrap_or(-1),
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    /// Preprocess in-memory content. A scratch file is created, prefixed
    /// with a `#line 1 "filename"` directive so diagnostics keep the
    /// caller's filename, and removed on every exit path.
    pub fn preprocess_string(
        &self,
        content: &str,
        filename: &str,
    ) -> Result<String, PreprocessError> {
        use std::io::Write;

        let mut scratch = tempfile::Builder::new()
            .prefix("iborb_idl_")
            .suffix(".idl")
            .tempfile()?;
        writeln!(scratch, "#line 1 \"{}\"", filename)?;
        scratch.write_all(content.as_bytes())?;
        scratch.flush()?;

        self.preprocess_file(scratch.path())
    }
}

fn candidates() -> &'static [&'static str] {
    if cfg!(windows) {
        &["gcc", "clang", "cl"]
    } else {
        &["gcc", "clang", "cc"]
    }
}

fn command_exists(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
