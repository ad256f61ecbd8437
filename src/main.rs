//! orbstare - stare at the orb from a terminal
//!
//! Usage:
//!   orbstare                       → run a session (same as `orbstare run`)
//!   orbstare run --offline         → fallback wisdom only, no remote calls
//!   orbstare config                → print the effective configuration
//!   orbstare version               → show version

use anyhow::Context;
use clap::{Parser, Subcommand};
use orb_engine::{Backend, OrbConfig, OrbController, OrbLoop};
use orbstare::console::{Console, ConsoleCommand, HELP};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "orbstare",
    about = "Stare at the orb. It stares back.",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file (TOML)
    #[arg(short, long, global = true, default_value = "orbstare.toml")]
    config: PathBuf,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session in the terminal
    Run {
        /// Ignore configured backends and use fallback wisdom only
        #[arg(long, default_value_t = false)]
        offline: bool,
        /// Start with the voice muted
        #[arg(long, default_value_t = false)]
        mute: bool,
        /// Start with the music muted
        #[arg(long, default_value_t = false)]
        no_music: bool,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Version) => {
            println!("orbstare v{}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Config) => {
            let _guard = init_tracing(&cli)?;
            print!("{}", load_config(&cli.config).to_toml());
        }
        Some(Commands::Run {
            offline,
            mute,
            no_music,
        }) => {
            let _guard = init_tracing(&cli)?;
            run(&cli, *offline, *mute, *no_music).await?;
        }
        None => {
            let _guard = init_tracing(&cli)?;
            run(&cli, false, false, false).await?;
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orbstare=info,orb_engine=info,orb_remote=info".into());

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .context("--log-file needs a file name")?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // stdout belongs to the console, logs go to stderr
    let json_layer = cli
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!cli.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(path: &Path) -> OrbConfig {
    let mut config = OrbConfig::load(path);
    config.apply_process_env();
    config
}

async fn run(cli: &Cli, offline: bool, mute: bool, no_music: bool) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config);
    if offline {
        config.remote.backend = Backend::Offline;
    }
    if mute {
        config.speech.start_muted = true;
    }
    if no_music {
        config.audio.music_muted = true;
    }

    tracing::info!(backend = ?config.remote.backend, "Starting orb session");
    let controller = OrbController::new(config.settings());
    let (orb, handle) = OrbLoop::new(controller, config.collaborators());
    let session = tokio::spawn(orb.run());

    println!("{}", HELP);
    let mut console = Console::new();
    let mut snapshots = handle.subscribe();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                for line in console.render(&snapshot) {
                    println!("{}", line);
                }
            }

            line = stdin.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let command = ConsoleCommand::parse(&line);
                if command == ConsoleCommand::Help {
                    println!("{}", HELP);
                }
                if command.dispatch(&handle).is_err() || command == ConsoleCommand::Quit {
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    // already gone if the loop stopped on its own
    let _ = handle.shutdown();
    let summary = session.await.context("orb session task failed")?;

    if cli.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "You stared for {}s and reached level {}{}. The orb spoke {} time{}.",
            summary.staring_duration,
            summary.max_intensity,
            if summary.ultimate_achieved { " (ascended)" } else { "" },
            summary.total_speeches,
            if summary.total_speeches == 1 { "" } else { "s" },
        );
    }
    Ok(())
}
