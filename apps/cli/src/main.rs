#![deny(warnings)]

//! Headless front end: inspect a save, drive it with commands, or let the
//! auto-painters run for a while.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use persistence::{default_save_path, FileStore, SaveStore};
use sim_core::catalog::{legend, next_grid_tier, COLORS};
use sim_core::GameState;
use sim_runtime::{Command, Game, Outcome, Session, TimerConfig};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Debug, Parser)]
#[command(name = "gridpaint", version, long_version = LONG_VERSION, about = "Grid painting idle game")]
struct Cli {
    /// Save file to read and update.
    #[arg(long, global = true)]
    save: Option<PathBuf>,
    /// Seed for contract generation.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,
    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print money, grid and the active contract.
    Status {
        /// Print the raw save document instead.
        #[arg(long)]
        json: bool,
    },
    /// List colors, upgrades and the next grid expansion.
    Shop,
    /// Run JSON commands such as '{"command":"buy_color","id":"red"}'.
    Exec {
        #[arg(required = true)]
        commands: Vec<String>,
    },
    /// Accept contracts and paint them by hand.
    Play {
        #[arg(long, default_value_t = 1)]
        contracts: u32,
    },
    /// Let the automation timers run in real time.
    Run {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
    /// Print an export string.
    Export,
    /// Replace the save from an export string.
    Import { blob: String },
    /// Delete the save.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.save.clone().unwrap_or_else(default_save_path);
    info!(path = %path.display(), seed = cli.seed, "starting CLI");
    let store: Arc<dyn SaveStore> = Arc::new(FileStore::new(&path));

    if let Action::Reset = cli.command {
        store.clear()?;
        println!("Save removed at {}", path.display());
        return Ok(());
    }

    let session = Session::new(Game::new(cli.seed), Arc::clone(&store));
    if reads_existing_save(&cli.command) {
        if let Outcome::Loaded(false) = session.execute(Command::Load).await? {
            info!("no save found, starting fresh");
        }
    }

    match cli.command {
        Action::Status { json } => {
            let game = session.game();
            let game = game.lock().await;
            if json {
                println!("{}", game.state.to_document().to_json()?);
            } else {
                print_status(&game.state);
            }
            return Ok(());
        }
        Action::Shop => {
            let game = session.game();
            print_shop(&game.lock().await.state)?;
            return Ok(());
        }
        Action::Exec { commands } => {
            for raw in commands {
                let command: Command = serde_json::from_str(&raw)
                    .with_context(|| format!("not a command: {raw}"))?;
                match session.execute(command).await {
                    Ok(outcome) => println!("ok: {}", describe(&outcome)),
                    Err(err) => println!("rejected: {err}"),
                }
            }
        }
        Action::Play { contracts } => play(&session, contracts).await?,
        Action::Run { seconds } => {
            let mut timers = session.timers(TimerConfig::default());
            timers.start();
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            timers.stop();
            let game = session.game();
            let game = game.lock().await;
            print_status(&game.state);
        }
        Action::Export => {
            if let Outcome::Exported(blob) = session.execute(Command::Export).await? {
                println!("{blob}");
            }
            return Ok(());
        }
        Action::Import { blob } => {
            let _ = session.execute(Command::Import { blob }).await?;
            println!("Imported save into {}", path.display());
        }
        Action::Reset => {}
    }

    let _ = session.execute(Command::Save).await?;
    info!(path = %path.display(), "saved");
    Ok(())
}

/// Whether an action starts from the stored game. `import` replaces it
/// wholesale, so an unreadable save must not block it.
fn reads_existing_save(action: &Action) -> bool {
    !matches!(action, Action::Import { .. } | Action::Reset)
}

/// Accepts and fills `count` contracts with exactly their pattern.
async fn play(session: &Session, count: u32) -> Result<()> {
    for _ in 0..count {
        let contract = match session.execute(Command::AcceptContract { rank: None }).await? {
            Outcome::Contract(contract) => contract,
            other => bail!("unexpected outcome {other:?}"),
        };
        let cells = contract
            .pattern
            .filled()
            .map(|(coord, color)| (coord, Some(color.clone())))
            .collect();
        let _ = session.execute(Command::SetCells { cells }).await?;
        let game = session.game();
        let game = game.lock().await;
        println!(
            "Contract #{} (rank {}, {} cells) paid {} -> balance {}",
            contract.id.get(),
            contract.rank_level,
            contract.cell_count,
            contract.reward,
            game.state.money()
        );
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Done => "done".into(),
        Outcome::Contract(c) => format!(
            "contract #{} rank {} reward {}",
            c.id.get(),
            c.rank_level,
            c.reward
        ),
        Outcome::Changed(changed) => format!("changed={changed}"),
        Outcome::Painted(n) => format!("{n} cells changed"),
        Outcome::Level(level) => format!("now {level}"),
        Outcome::Loaded(found) => format!("loaded={found}"),
        Outcome::Exported(blob) => blob.clone(),
    }
}

/// One-letter key for a color, matching the curated pattern legend.
fn symbol(id: &str) -> char {
    "KWRBGYOPICN"
        .chars()
        .find(|&ch| legend(ch) == Some(id))
        .unwrap_or('?')
}

fn print_status(state: &GameState) {
    let grid = state.grid();
    println!(
        "Money {} | grid {}x{} (level {}) | contracts completed {} | brush {}",
        state.money(),
        grid.width(),
        grid.height(),
        state.grid_level(),
        state.completed_contracts(),
        state.selected_color()
    );
    let colors: Vec<&str> = state.unlocked_colors().iter().map(|c| c.as_str()).collect();
    println!(
        "Colors: {} | highest rank {}",
        colors.join(", "),
        sim_contracts::highest_accessible_rank(state)
    );

    let contract = state.active_contract();
    for y in 0..grid.height() as i32 {
        let mut line = String::new();
        for x in 0..grid.width() as i32 {
            line.push(grid.get_cell(x, y).map_or('.', |c| symbol(c.as_str())));
        }
        if let Some(contract) = contract {
            line.push_str("   ");
            for x in 0..contract.pattern.width() as i32 {
                line.push(contract.pattern.get(x, y).map_or('.', |c| symbol(c.as_str())));
            }
        }
        println!("{line}");
    }
    match (contract, state.progress()) {
        (Some(contract), Some(progress)) => println!(
            "Contract #{} rank {} reward {}: {}/{} correct, {} wrong ({}%)",
            contract.id.get(),
            contract.rank_level,
            contract.reward,
            progress.correct,
            progress.total,
            progress.wrong,
            progress.percent
        ),
        _ => println!("No active contract"),
    }
}

fn print_shop(state: &GameState) -> Result<()> {
    println!("Colors:");
    for color in COLORS {
        let owned = state.is_color_unlocked(color.id);
        println!(
            "  {:<8} {:>7} {}",
            color.id,
            color.cost,
            if owned { "owned" } else { "" }
        );
    }
    println!("Upgrades:");
    for offer in sim_econ::upgrade_offers(state) {
        println!("  {}", serde_json::to_string(&offer)?);
    }
    match next_grid_tier(state.grid_level()) {
        Some(tier) => println!("Next grid: {0}x{0} for {1}", tier.size, tier.cost),
        None => println!("Grid is at the maximum size"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_skips_the_startup_load() {
        let import = Cli::parse_from(["gridpaint", "import", "gridpaint:v4:e30"]);
        assert!(!reads_existing_save(&import.command));
        let reset = Cli::parse_from(["gridpaint", "reset"]);
        assert!(!reads_existing_save(&reset.command));
        let status = Cli::parse_from(["gridpaint", "--seed", "7", "status"]);
        assert!(reads_existing_save(&status.command));
        assert_eq!(status.seed, 7);
    }

    #[tokio::test]
    async fn import_recovers_from_a_corrupt_save() {
        let dir = std::env::temp_dir().join(format!("gridpaint-cli-{}", std::process::id()));
        let path = dir.join("save.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "{ broken").unwrap();
        let store: Arc<dyn SaveStore> = Arc::new(FileStore::new(&path));

        let mut donor = Game::new(1);
        let _ = donor.state.add_money(64).unwrap();
        let blob = persistence::encode(&donor.state.to_document()).unwrap();

        let session = Session::new(Game::new(1), Arc::clone(&store));
        assert!(session.execute(Command::Load).await.is_err());
        let _ = session.execute(Command::Import { blob }).await.unwrap();
        let _ = session.execute(Command::Save).await.unwrap();
        let doc = store.load().unwrap().unwrap();
        assert_eq!(doc.money, 64);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
