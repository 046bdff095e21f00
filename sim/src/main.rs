//! Emoji Battler simulator - runs headless matches between opponent policies.

#![allow(clippy::print_stdout)]

mod store;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use emoji_battler_core::{Difficulty, Match, MatchPhase, Outcome, Record, Side};
use rayon::prelude::*;
use serde::Serialize;

/// Play single-player matches with both seats driven by the opponent policy
#[derive(Parser, Debug)]
#[command(name = "emoji-battler-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of matches to play
    #[arg(short, long, default_value = "100")]
    matches: u64,

    /// Seed of the first match; match i uses seed + i (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty of the opponent (side B)
    #[arg(short, long, value_enum, default_value = "normal")]
    difficulty: DifficultyArg,

    /// Policy profile used for the player seat (side A)
    #[arg(short, long, value_enum, default_value = "normal")]
    player_difficulty: DifficultyArg,

    /// JSON file holding the persisted win/loss record; updated in place
    #[arg(long)]
    record: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Result of one simulated match, from side A's point of view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchSummary {
    seed: u64,
    outcome: Outcome,
    rounds: u32,
    hp: [i32; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    matches: Vec<MatchSummary>,
    tally: Record,
    record: Option<Record>,
}

/// Drive a match to the end without wall-clock time: autoplay side A in
/// every shop, fast-forward fights and jump straight to each due timer.
fn play_match(seed: u64, opponent: Difficulty, player: Difficulty) -> anyhow::Result<MatchSummary> {
    let mut game = Match::start_solo(opponent, seed, 0);
    let mut now = 0;

    while !game.is_over() {
        match game.phase() {
            MatchPhase::Shop => {
                game.autoplay_shop(Side::A, player)?;
                game.advance_phase(now)?;
            }
            MatchPhase::Fight if !game.is_fast_forward() => game.advance_phase(now)?,
            _ => {}
        }
        let Some(at) = game.next_due() else {
            break;
        };
        now = at;
        game.tick(now);
    }

    let Some(outcome) = game.outcome() else {
        bail!(
            "match with seed {seed} stopped in {:?} without an outcome",
            game.phase()
        );
    };
    log::debug!("seed {seed}: {:?} after {} rounds", outcome, game.round());
    Ok(MatchSummary {
        seed,
        outcome: outcome.for_side(Side::A),
        rounds: game.round(),
        hp: [game.player(Side::A).hp, game.player(Side::B).hp],
    })
}

fn print_text(report: &Report, opponent: Difficulty) {
    let tally = &report.tally;
    println!(
        "{} matches vs {}",
        tally.played(),
        opponent.bot_name()
    );
    println!(
        "  wins {}  losses {}  draws {}  points {}",
        tally.wins, tally.losses, tally.draws, tally.points
    );
    let rounds: u64 = report.matches.iter().map(|m| m.rounds as u64).sum();
    if !report.matches.is_empty() {
        println!(
            "  average length {:.1} rounds",
            rounds as f64 / report.matches.len() as f64
        );
    }
    if let Some(record) = &report.record {
        println!(
            "  record: {}W / {}L / {}D / {}P",
            record.wins, record.losses, record.draws, record.points
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let opponent = Difficulty::from(args.difficulty);
    let player = Difficulty::from(args.player_difficulty);
    let base_seed = args.seed.unwrap_or_else(store::clock_seed);
    log::info!(
        "running {} matches from seed {base_seed}: {:?} vs {:?}",
        args.matches,
        player,
        opponent
    );

    let matches = (0..args.matches)
        .into_par_iter()
        .map(|i| play_match(base_seed.wrapping_add(i), opponent, player))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut tally = Record::default();
    for summary in &matches {
        tally.record(summary.outcome);
    }

    let record = match &args.record {
        Some(path) => {
            let mut record = store::load(path)
                .with_context(|| format!("reading record {}", path.display()))?;
            record.merge(&tally);
            store::save(path, &record)
                .with_context(|| format!("writing record {}", path.display()))?;
            Some(record)
        }
        None => None,
    };

    let report = Report {
        matches,
        tally,
        record,
    };
    match args.format {
        OutputFormat::Text => print_text(&report, opponent),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
