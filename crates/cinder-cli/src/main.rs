mod cli;
mod commands;

use tracing_subscriber::EnvFilter;

use cli::{BuildParams, CheckParams, DumpParams, build_cli};

fn main() {
    // Logging is off unless CINDER_LOG is set, e.g. `CINDER_LOG=cinder_compiler=trace`.
    if let Ok(filter) = EnvFilter::try_from_env("CINDER_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("build", m)) => {
            let params = BuildParams::from_matches(m);
            commands::build::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
