//! weft - compositor control core
//!
//! Replays a script of commands against a headless core and prints every IPC
//! message it emits as `event>>data`.
//!
//! Run with `--help` to see the available options.

use std::path::{Path, PathBuf};

use weft::backend::Backends;
use weft::command::{Command, CommandExecutor};
use weft::config::Config;
use weft::error::{log_error, WeftError, WeftResult};
use weft::WeftState;

static USAGE: &[&str] = &[
    "USAGE: weft [--config <file.json>] --script <file.json>",
    "",
    "  --config <file>  configuration snapshot (defaults apply for missing keys)",
    "  --script <file>  JSON array of commands to replay",
];

struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = Args {
        config: None,
        script: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next()?.into()),
            "--script" => args.script = Some(iter.next()?.into()),
            "--help" | "-h" => return None,
            other => {
                tracing::error!("Unknown argument: {other}");
                return None;
            }
        }
    }
    Some(args)
}

fn load_script(path: &Path) -> WeftResult<Vec<Command>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn run(args: Args) -> WeftResult<()> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Using config file: {}", path.display());
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };
    let script_path = args
        .script
        .ok_or_else(|| WeftError::Config("no script given".into()))?;
    let script = load_script(&script_path)?;

    let (backends, _journal) = Backends::headless();
    let mut state = WeftState::new(config, backends);
    state.events.add_sink(|message: &weft::event::IpcMessage| {
        #[allow(clippy::disallowed_macros)]
        {
            println!("{message}");
        }
    });

    let mut executor = CommandExecutor::new();
    for command in &script {
        if let Err(e) = executor.execute(command, &mut state) {
            tracing::warn!("{}: {e}", command.description());
        }
    }
    tracing::info!(
        "Replayed {} of {} commands",
        executor.executed(),
        script.len()
    );

    if let Err(errors) = state.validate_consistency() {
        for error in &errors {
            tracing::error!("State validation error: {error:?}");
        }
    }
    Ok(())
}

fn main() {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(feature = "profile-with-tracy")]
    profiling::tracy_client::Client::start();

    profiling::register_thread!("Main Thread");

    let Some(args) = parse_args() else {
        #[allow(clippy::disallowed_macros)]
        {
            for line in USAGE {
                println!("{line}");
            }
        }
        return;
    };

    if log_error(run(args)).is_none() {
        std::process::exit(1);
    }
}
