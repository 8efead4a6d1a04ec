use std::fs;
use std::path::PathBuf;

use super::error::CliError;
use super::program_loader::{compile, load_program_text};

pub struct BuildArgs {
    pub program_path: PathBuf,
    pub output: PathBuf,
    pub color: bool,
}

pub fn run(args: BuildArgs) {
    if let Err(e) = execute(&args) {
        e.exit();
    }
}

fn execute(args: &BuildArgs) -> Result<(), CliError> {
    let text = load_program_text(&args.program_path)?;
    let image = compile(&args.program_path, &text, args.color)?;

    fs::write(&args.output, &image).map_err(|source| CliError::Write {
        path: args.output.clone(),
        source,
    })
}
