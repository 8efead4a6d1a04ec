use std::path::PathBuf;

use super::error::CliError;
use super::program_loader::{compile, load_program_text};

pub struct CheckArgs {
    pub program_path: PathBuf,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    if let Err(e) = execute(&args) {
        e.exit();
    }

    // Silent on success (like cargo check)
}

fn execute(args: &CheckArgs) -> Result<(), CliError> {
    let text = load_program_text(&args.program_path)?;
    compile(&args.program_path, &text, args.color)?;
    Ok(())
}
