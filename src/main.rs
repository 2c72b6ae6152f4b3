//! MTG tabletop - command line driver
//!
//! Creates matches from deck lists and replays action scripts against saved
//! match snapshots.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use mtg_tabletop::{
    core::PlayerId,
    game::{GameAction, GameFormat, MatchConfig, MatchSnapshot, PhaseMode, VerbosityLevel},
    loader::{CardCatalog, DeckLoader, GameInitializer, Seat},
};
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Standard,
    Commander,
}

impl From<FormatArg> for GameFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Standard => GameFormat::Standard,
            FormatArg::Commander => GameFormat::Commander,
        }
    }
}

/// Verbosity level for match output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "mtg-table")]
#[command(about = "MTG tabletop - two-player rules engine", long_about = None)]
struct Cli {
    /// Card catalog (JSON array of card definitions)
    #[arg(long, global = true, default_value = "cards.json")]
    cards: PathBuf,

    /// Verbosity level for match output (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, short = 'v', global = true, default_value = "normal")]
    verbosity: VerbosityArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a match from two deck lists and save it as a snapshot
    New {
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: PathBuf,

        #[arg(value_name = "PLAYER2_DECK")]
        deck2: PathBuf,

        #[arg(long, value_enum, default_value = "standard")]
        format: FormatArg,

        /// Send every non-land spell through the stack
        #[arg(long)]
        strict: bool,

        /// Seed for library shuffles
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Match id
        #[arg(long, default_value = "match")]
        id: String,

        /// Output snapshot file
        #[arg(long, short = 'o', default_value = "match.json")]
        output: PathBuf,
    },

    /// Apply action scripts to a saved match. Several scripts run in parallel,
    /// each against its own copy of the match.
    Apply {
        /// Snapshot to start from
        #[arg(long, short = 's')]
        snapshot: PathBuf,

        /// Script files, each a JSON array of wire actions
        #[arg(required = true)]
        scripts: Vec<PathBuf>,

        /// Keep applying after a rejected action
        #[arg(long)]
        keep_going: bool,
    },

    /// Print a summary of a saved match
    Show {
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from(cli.verbosity);

    match cli.command {
        Commands::New {
            deck1,
            deck2,
            format,
            strict,
            seed,
            p1_name,
            p2_name,
            id,
            output,
        } => {
            let catalog = CardCatalog::load_from_file_async(&cli.cards)
                .await
                .with_context(|| format!("loading {}", cli.cards.display()))?;
            let mut config = MatchConfig::new(format.into()).with_seed(seed);
            if strict {
                config = config.with_phase_mode(PhaseMode::Strict);
            }
            run_new(&catalog, &config, &deck1, &deck2, p1_name, p2_name, id, &output)
        }
        Commands::Apply {
            snapshot,
            scripts,
            keep_going,
        } => {
            let catalog = CardCatalog::load_from_file_async(&cli.cards)
                .await
                .with_context(|| format!("loading {}", cli.cards.display()))?;
            let snapshot = MatchSnapshot::load_from_file(&snapshot)?;
            run_apply(&catalog, snapshot, &scripts, keep_going, verbosity)
        }
        Commands::Show { snapshot } => {
            let snapshot = MatchSnapshot::load_from_file(&snapshot)?;
            print_summary(&snapshot);
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_new(
    catalog: &CardCatalog,
    config: &MatchConfig,
    deck1: &Path,
    deck2: &Path,
    p1_name: String,
    p2_name: String,
    id: String,
    output: &Path,
) -> anyhow::Result<()> {
    let deck1 = DeckLoader::load_from_file(deck1)
        .with_context(|| format!("loading {}", deck1.display()))?;
    let deck2 = DeckLoader::load_from_file(deck2)
        .with_context(|| format!("loading {}", deck2.display()))?;

    let seats = [
        Seat::new(PlayerId::new(0), p1_name, deck1),
        Seat::new(PlayerId::new(1), p2_name, deck2),
    ];
    let game = GameInitializer::new(catalog).init_game(id, config, seats)?;

    MatchSnapshot::capture(&game).save_to_file(output)?;
    println!("Created match {} -> {}", game.id, output.display());
    Ok(())
}

fn run_apply(
    catalog: &CardCatalog,
    snapshot: MatchSnapshot,
    scripts: &[PathBuf],
    keep_going: bool,
    verbosity: VerbosityLevel,
) -> anyhow::Result<()> {
    // GameState is not Sync; each worker takes its own copy
    let jobs: Vec<_> = scripts
        .iter()
        .map(|script| (script, snapshot.game_state.clone()))
        .collect();

    let results: Vec<anyhow::Result<PathBuf>> = jobs
        .into_par_iter()
        .map(|(script, mut game)| {
            let actions = load_script(script)?;
            game.logger.set_verbosity(verbosity);

            for (n, action) in actions.iter().enumerate() {
                if let Err(e) = game.process_action(catalog, action) {
                    let message = format!(
                        "{}: action {n} ({}) rejected: {e}",
                        script.display(),
                        action.action_type()
                    );
                    if !keep_going {
                        bail!(message);
                    }
                    eprintln!("{message}");
                }
            }

            let output = script.with_extension("snapshot.json");
            MatchSnapshot::capture(&game).save_to_file(&output)?;
            Ok(output)
        })
        .collect();

    let mut failed = 0;
    for (script, result) in scripts.iter().zip(results) {
        match result {
            Ok(output) => println!("{} -> {}", script.display(), output.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{e:#}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} scripts failed", scripts.len());
    }
    Ok(())
}

fn load_script(path: &Path) -> anyhow::Result<Vec<GameAction>> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: Vec<Value> = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;
    raw.into_iter()
        .enumerate()
        .map(|(n, value)| {
            GameAction::from_value(value)
                .with_context(|| format!("{}: action {n}", path.display()))
        })
        .collect()
}

fn print_summary(snapshot: &MatchSnapshot) {
    let game = &snapshot.game_state;
    println!("Match {}", game.id);
    println!(
        "Turn {} (round {}), phase {}, active {}",
        game.turn,
        game.round,
        game.phase,
        game.active_player_id()
    );
    for player in &game.players {
        println!(
            "  {} [{}]: life {}, hand {}, library {}, battlefield {}, graveyard {}",
            player.name,
            player.id,
            player.life,
            player.zones.hand.len(),
            player.zones.library.len(),
            player.zones.battlefield.len(),
            player.zones.graveyard.len(),
        );
    }
    println!("Stack: {} card(s)", game.stack.len());
    println!("Recorded actions: {}", snapshot.action_count());
}
