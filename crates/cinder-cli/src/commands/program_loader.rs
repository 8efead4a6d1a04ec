//! Shared front half of `build` and `check`: read, load, generate.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use cinder_compiler::{Context, codegen, load_program};

use super::error::CliError;

/// Read program text from `path`, or stdin when `path` is `-`.
pub fn load_program_text(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(CliError::Stdin)?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate the image for `text`.
///
/// Diagnostics are rendered to stderr and turned into
/// [`CliError::Diagnostics`].
pub fn compile(path: &Path, text: &str, color: bool) -> Result<Vec<u8>, CliError> {
    let (program, analysis) = load_program(text).map_err(|source| CliError::Program {
        path: path.to_path_buf(),
        source,
    })?;

    let mut ctx = Context::new();
    let image = codegen(&mut ctx, &program, &analysis);

    let diagnostics = ctx.diagnostics();
    if diagnostics.has_errors() {
        let display_path = path.to_string_lossy();
        let mut printer = diagnostics.printer().path(&display_path).colored(color);
        if let Some(source) = program.source() {
            printer = printer.source(source);
        }
        eprint!("{}", printer.render());
        return Err(CliError::Diagnostics(diagnostics.error_count()));
    }

    tracing::info!(bytes = image.len(), "compiled {}", path.display());
    Ok(image)
}
