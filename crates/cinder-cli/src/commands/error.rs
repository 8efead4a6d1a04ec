use std::io;
use std::path::PathBuf;

use cinder_bytecode::ImageError;
use cinder_compiler::InterchangeError;

/// Failure of a CLI command, printed as `error: {self}`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),
    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Program {
        path: PathBuf,
        source: InterchangeError,
    },
    #[error("'{}' is not a valid image: {source}", path.display())]
    Image { path: PathBuf, source: ImageError },
    #[error("could not compile due to {0} previous error(s)")]
    Diagnostics(usize),
}

impl CliError {
    /// Print to stderr and exit with status 1.
    pub fn exit(self) -> ! {
        eprintln!("error: {self}");
        std::process::exit(1);
    }
}
