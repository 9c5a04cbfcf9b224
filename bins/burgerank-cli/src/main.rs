//! burgerank-cli — Operator command line for the BurgeRank ranking core.
//!
//! Scores statistics files, runs single Elo updates, replays submission
//! logs through the full admission pipeline on an in-memory store, and
//! recomputes rankings from raw rating exports. Input and output are JSON.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use burgerank_core::{
    ItemId, ItemStatistics, RankingConfig, RankingScore, RatingRecord, RatingSubmission, Venue,
};
use burgerank_elo::{EloEngine, RatingBand, Winner, win_probability};
use burgerank_integrity::{CheckContext, local_day_start};
use burgerank_node::{MemoryStore, RankingOrchestrator, SubmissionOutcome};
use burgerank_score::{ScoreCalculator, assign_ranks};

/// BurgeRank operator tools.
#[derive(Parser)]
#[command(name = "burgerank-cli")]
#[command(version, about = "Fraud-resistant ranking of user-rated food items")]
struct Cli {
    /// Ranking config file (TOML or JSON). `BURGERANK__` environment
    /// variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score item statistics read from a JSON file (one object or an array).
    Score(ScoreArgs),
    /// Apply one Elo update to a pair of ratings.
    Elo(EloArgs),
    /// Chance of each side winning a comparison, in whole percent.
    WinProbability(WinProbabilityArgs),
    /// Replay a submissions file through admission, scoring and publication.
    Replay(ReplayArgs),
    /// Derive statistics from a ratings export and rank every item.
    Recompute(RecomputeArgs),
}

#[derive(Args)]
struct ScoreArgs {
    /// JSON file with `ItemStatistics`.
    #[arg(short, long)]
    stats: PathBuf,

    /// Evaluation time (RFC 3339). Defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    A,
    B,
}

#[derive(Args)]
struct EloArgs {
    #[arg(long)]
    rating_a: f64,

    #[arg(long)]
    rating_b: f64,

    /// Which side won.
    #[arg(short, long, value_enum)]
    winner: Side,

    /// Override the configured K-factor.
    #[arg(short, long)]
    k_factor: Option<f64>,
}

#[derive(Args)]
struct WinProbabilityArgs {
    #[arg(long)]
    rating_a: f64,

    #[arg(long)]
    rating_b: f64,
}

#[derive(Args)]
struct ReplayArgs {
    /// JSON array of `RatingSubmission`, replayed in timestamp order.
    #[arg(short, long)]
    submissions: PathBuf,

    /// JSON array of `Venue` records.
    #[arg(long)]
    venues: Option<PathBuf>,

    /// Submitters' UTC offset in minutes, used for the daily quota.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    utc_offset_minutes: i32,

    /// Leaderboard size printed after the replay.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Args)]
struct RecomputeArgs {
    /// JSON array of `RatingRecord`.
    #[arg(short, long)]
    ratings: PathBuf,

    /// JSON array of `Venue` records; supplies item creation times.
    #[arg(long)]
    venues: Option<PathBuf>,

    /// Evaluation time (RFC 3339). Defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Serialize)]
struct ReplayReport {
    published: usize,
    rejected: usize,
    outcomes: Vec<SubmissionOutcome>,
    leaderboard: Vec<RankingScore>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let config = RankingConfig::load(cli.config.as_deref()).context("Failed to load ranking config")?;

    match cli.command {
        Commands::Score(args) => score(args, &config),
        Commands::Elo(args) => elo(args, &config),
        Commands::WinProbability(args) => print_json(&serde_json::json!({
            "a": win_probability(args.rating_a, args.rating_b),
            "b": win_probability(args.rating_b, args.rating_a),
        })),
        Commands::Replay(args) => replay(args, config),
        Commands::Recompute(args) => recompute(args, &config),
    }
}

fn score(args: ScoreArgs, config: &RankingConfig) -> Result<()> {
    let now = args.at.unwrap_or_else(Utc::now);
    let calc = ScoreCalculator::from_ranking_config(config);

    match read_json::<OneOrMany<ItemStatistics>>(&args.stats)? {
        OneOrMany::One(stats) => print_json(&calc.compute(&stats, now)),
        OneOrMany::Many(all) => {
            let mut scores: Vec<_> = all.iter().map(|s| calc.compute(s, now)).collect();
            assign_ranks(&mut scores);
            print_json(&scores)
        }
    }
}

fn elo(args: EloArgs, config: &RankingConfig) -> Result<()> {
    let k = args.k_factor.unwrap_or(config.elo.k_factor);
    if !(k > 0.0) {
        bail!("K-factor must be positive, got {k}");
    }
    let winner = match args.winner {
        Side::A => Winner::A,
        Side::B => Winner::B,
    };
    let update = EloEngine::new(k).update(args.rating_a, args.rating_b, winner);
    print_json(&serde_json::json!({
        "update": update,
        "band_a": RatingBand::for_rating(update.new_a).label(),
        "band_b": RatingBand::for_rating(update.new_b).label(),
    }))
}

fn replay(args: ReplayArgs, config: RankingConfig) -> Result<()> {
    let offset = FixedOffset::east_opt(args.utc_offset_minutes * 60)
        .with_context(|| format!("UTC offset out of range: {} minutes", args.utc_offset_minutes))?;
    let mut submissions: Vec<RatingSubmission> = read_json(&args.submissions)?;
    submissions.sort_by_key(|s| s.submitted_at);

    let store = Arc::new(MemoryStore::with_recent_window(config.score.recency_window_days));
    if let Some(path) = &args.venues {
        for venue in read_json::<Vec<Venue>>(path)? {
            store.add_venue(venue);
        }
    }
    let orchestrator = RankingOrchestrator::new(store, config);

    let mut outcomes = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        let now = submission.submitted_at;
        let ctx = CheckContext::new(now, local_day_start(now, offset));
        let outcome = orchestrator
            .submit(submission, &ctx)
            .with_context(|| format!("Pipeline failed on {} by {}", submission.item_id, submission.submitter_id))?;
        outcomes.push(outcome);
    }

    let end = submissions.last().map_or_else(Utc::now, |s| s.submitted_at);
    orchestrator.recompute_rankings(end).context("Recompute failed")?;

    let published = outcomes.iter().filter(|o| o.is_published()).count();
    let report = ReplayReport {
        published,
        rejected: outcomes.len() - published,
        leaderboard: orchestrator.leaderboard(args.top).context("Failed to read leaderboard")?,
        outcomes,
    };
    info!(published = report.published, rejected = report.rejected, "cli: replay finished");
    print_json(&report)
}

fn recompute(args: RecomputeArgs, config: &RankingConfig) -> Result<()> {
    let now = args.at.unwrap_or_else(Utc::now);
    let ratings: Vec<RatingRecord> = read_json(&args.ratings)?;
    let venues: HashMap<ItemId, Venue> = match &args.venues {
        Some(path) => read_json::<Vec<Venue>>(path)?.into_iter().map(|v| (v.item_id.clone(), v)).collect(),
        None => HashMap::new(),
    };

    let mut by_item: BTreeMap<&ItemId, Vec<RatingRecord>> = BTreeMap::new();
    for r in &ratings {
        by_item.entry(&r.item_id).or_default().push(r.clone());
    }

    let calc = ScoreCalculator::from_ranking_config(config);
    let mut scores = Vec::with_capacity(by_item.len());
    for (item, history) in &by_item {
        let created_at = venues
            .get(*item)
            .map(|v| v.created_at)
            .or_else(|| history.iter().map(|r| r.created_at).min())
            .unwrap_or(now);
        let stats = ItemStatistics::from_ratings(
            (*item).clone(),
            created_at,
            history,
            now,
            config.score.recency_window_days,
        );
        scores.push(calc.compute(&stats, now));
    }
    assign_ranks(&mut scores);
    let ranked = scores.iter().filter(|s| s.rank_position.is_some()).count();
    info!(items = scores.len(), ranked, "cli: recompute finished");
    print_json(&scores)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to encode output")?);
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_offset() {
        let cli = Cli::try_parse_from([
            "burgerank-cli",
            "replay",
            "--submissions",
            "s.json",
            "--utc-offset-minutes",
            "-300",
        ])
        .unwrap();
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.utc_offset_minutes, -300);
    }

    #[test]
    fn statistics_file_may_hold_one_or_many() {
        let one = r#"{"item_id":"b1","total_rating_count":0,"verified_rating_count":0,
            "positive_rating_count":0,"mean_rating":0.0,"created_at":"2024-01-01T00:00:00Z"}"#;
        assert!(matches!(serde_json::from_str::<OneOrMany<ItemStatistics>>(one).unwrap(), OneOrMany::One(_)));
        let many = format!("[{one},{one}]");
        assert!(matches!(
            serde_json::from_str::<OneOrMany<ItemStatistics>>(&many).unwrap(),
            OneOrMany::Many(v) if v.len() == 2
        ));
    }
}
