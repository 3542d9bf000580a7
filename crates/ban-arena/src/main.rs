use anyhow::Context;
use ban_arena::config::ArenaConfig;
use ban_arena::output;
use ban_arena::runner::{run_session, SelfPlay};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ban-arena")]
#[command(about = "Ban Chess self-play harness")]
struct Cli {
    /// Configuration file [default: arena.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play random games
    Play {
        /// Number of games to play
        #[arg(short, long)]
        games: Option<u32>,
        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Plies after which a game stops unfinished
        #[arg(long)]
        max_plies: Option<u32>,
        /// Directory for JSON and PGN game files
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replay a saved game record
    Replay {
        /// JSON game file or record
        record: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Play {
            games,
            seed,
            max_plies,
            out,
        } => {
            let config = ArenaConfig {
                games: games.unwrap_or(config.games),
                seed: seed.or(config.seed),
                max_plies: max_plies.unwrap_or(config.max_plies),
                out_dir: out.or(config.out_dir),
                ..config
            };
            play(&config)
        }
        Commands::Replay { record } => replay(&record),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ArenaConfig> {
    let config = match path {
        Some(path) => ArenaConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ArenaConfig::load().context("loading arena.toml")?,
    };
    Ok(config)
}

fn play(config: &ArenaConfig) -> anyhow::Result<()> {
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        games = config.games,
        seed,
        max_plies = config.max_plies,
        "starting self-play"
    );

    let mut runner = SelfPlay::new(seed, config.max_plies);
    if let Some(start) = &config.start {
        runner = runner.with_start(start).context("invalid start position")?;
    }

    let run_dir = match &config.out_dir {
        Some(dir) => {
            let dir = dir.join(chrono::Utc::now().format("%Y-%m-%d").to_string());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            Some(dir)
        }
        None => None,
    };

    let summary = run_session(&mut runner, config.games, |index, game| {
        let Some(dir) = &run_dir else {
            return;
        };
        let id = format!("{}-{:04}", seed, index);
        if config.write_json {
            let path = dir.join(format!("{}.json", id));
            if let Err(e) = output::write_json(&path, &id, &config.event, game) {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
            }
        }
        if config.write_pgn {
            let path = dir.join(format!("{}.pgn", id));
            if let Err(e) = output::write_pgn(&path, &config.event, game) {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
            }
        }
    })?;

    println!("\nSession Results ({} games): {}", summary.total(), summary);
    Ok(())
}

fn replay(path: &Path) -> anyhow::Result<()> {
    let record = output::read_record(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let engine = record.replay()?;
    println!("{}", engine.serialize());
    println!("{}", output::describe(engine.outcome()));
    Ok(())
}
