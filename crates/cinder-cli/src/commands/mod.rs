pub mod build;
pub mod check;
pub mod dump;
pub mod error;
pub mod program_loader;
