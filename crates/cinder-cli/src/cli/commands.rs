//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("cinder")
        .about("Bytecode generator for Cinder programs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_command())
        .subcommand(check_command())
        .subcommand(dump_command())
}

/// Compile a program to a bytecode image.
pub fn build_command() -> Command {
    Command::new("build")
        .about("Compile a program to a bytecode image")
        .after_help(
            r#"EXAMPLES:
  cinder build app.json               # writes app.cbc
  cinder build app.json -o out.cbc
  front-end --emit json | cinder build - -o app.cbc"#,
        )
        .arg(program_path_arg())
        .arg(output_arg())
        .arg(color_arg())
}

/// Validate a program without writing an image.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Check that a program compiles, without writing an image")
        .after_help(
            r#"EXAMPLES:
  cinder check app.json
  cinder check - < app.json"#,
        )
        .arg(program_path_arg())
        .arg(color_arg())
}

/// Disassemble a bytecode image.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the contents of a bytecode image")
        .after_help(
            r#"EXAMPLES:
  cinder dump app.cbc
  cinder dump app.cbc --color never"#,
        )
        .arg(image_path_arg())
        .arg(color_arg())
}
