//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::build::BuildArgs;
use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;

pub struct BuildParams {
    pub program_path: PathBuf,
    pub output: Option<PathBuf>,
    pub color: ColorChoice,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program_path: required_path(m, "program_path"),
            output: m.get_one::<PathBuf>("output").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        let output = p
            .output
            .unwrap_or_else(|| default_output_path(&p.program_path));
        Self {
            program_path: p.program_path,
            output,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub program_path: PathBuf,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program_path: required_path(m, "program_path"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            program_path: p.program_path,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub image_path: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: required_path(m, "image_path"),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            image_path: p.image_path,
            color: p.color.should_colorize(),
        }
    }
}

/// `app.json` becomes `app.cbc` next to it; stdin becomes `out.cbc`.
pub fn default_output_path(program_path: &std::path::Path) -> PathBuf {
    if program_path.as_os_str() == "-" {
        return PathBuf::from("out.cbc");
    }
    program_path.with_extension("cbc")
}

fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| unreachable!("clap enforces required argument `{id}`"))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
