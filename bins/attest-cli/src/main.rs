//! attest-cli — Command-line front end for the Attest engine.
//!
//! Drives the peer-verification lifecycle against a local RocksDB state
//! directory: register participants, define competencies, request
//! assessments, submit scores, and finalize. The ledger height expected by
//! the engine is a monotonic counter in store metadata, advanced once per
//! mutating command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attest_core::types::{CompetencyId, ParticipantId};
use attest_engine::AssessmentEngine;
use attest_engine::catalog::CompetencyDraft;
use attest_store::RocksStore;

/// Attest command-line interface.
#[derive(Parser)]
#[command(name = "attest-cli")]
#[command(version, about = "Peer-verified competencies with reputation feedback.")]
struct Cli {
    /// State directory (default: platform data dir + "attest").
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a participant identity.
    Register(CallerArgs),
    /// Competency catalog subcommands.
    Competency {
        #[command(subcommand)]
        action: CompetencyAction,
    },
    /// Request assessment of the caller for a competency.
    Request(RequestArgs),
    /// Submit one score to an open assessment.
    Submit(SubmitArgs),
    /// Finalize an assessment and apply reputation feedback.
    Finalize(RecordKeyArgs),
    /// Show the assessment record for a (competency, subject) pair.
    Record(RecordKeyArgs),
    /// Show a participant's reputation, globally or for one competency.
    Reputation(ReputationArgs),
}

#[derive(Subcommand)]
enum CompetencyAction {
    /// Define a new competency (administrator only; the first caller to
    /// use this command is pinned as the administrator).
    Add(CompetencyAddArgs),
    /// Show a competency by id.
    Show(CompetencyShowArgs),
}

#[derive(Args)]
struct CallerArgs {
    /// Caller identity (64 hex chars).
    #[arg(long = "as", value_name = "ID")]
    caller: ParticipantId,
}

#[derive(Args)]
struct CompetencyAddArgs {
    /// Caller identity (64 hex chars).
    #[arg(long = "as", value_name = "ID")]
    caller: ParticipantId,

    #[arg(long)]
    name: String,

    #[arg(long)]
    description: String,

    #[arg(long)]
    category: String,

    /// Number of assessors to collect before submissions close (1..=20).
    #[arg(long)]
    required: u32,
}

#[derive(Args)]
struct CompetencyShowArgs {
    /// Competency id.
    id: CompetencyId,
}

#[derive(Args)]
struct RequestArgs {
    /// Caller identity — the subject under assessment (64 hex chars).
    #[arg(long = "as", value_name = "ID")]
    caller: ParticipantId,

    /// Competency id.
    #[arg(long)]
    competency: CompetencyId,
}

#[derive(Args)]
struct SubmitArgs {
    /// Caller identity — the contributing assessor (64 hex chars).
    #[arg(long = "as", value_name = "ID")]
    caller: ParticipantId,

    /// Competency id.
    #[arg(long)]
    competency: CompetencyId,

    /// Subject under assessment (64 hex chars).
    #[arg(long)]
    subject: ParticipantId,

    /// Score in 0..=100.
    #[arg(long)]
    score: u32,
}

#[derive(Args)]
struct RecordKeyArgs {
    /// Competency id.
    #[arg(long)]
    competency: CompetencyId,

    /// Subject under assessment (64 hex chars).
    #[arg(long)]
    subject: ParticipantId,
}

#[derive(Args)]
struct ReputationArgs {
    /// Participant identity (64 hex chars).
    #[arg(long)]
    id: ParticipantId,

    /// Restrict to one competency's skill-specific counters.
    #[arg(long)]
    competency: Option<CompetencyId>,
}

fn data_dir(cli_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|base| base.join("attest"))
        .context("no platform data directory; pass --data-dir")
}

/// Resolve the engine's administrator: the pinned identity, or pin the
/// caller on first catalog use.
fn engine_for_admin(store: &mut RocksStore, caller: &ParticipantId) -> Result<AssessmentEngine> {
    let admin = match store.admin()? {
        Some(admin) => admin,
        None => {
            store.set_admin(caller)?;
            tracing::info!(admin = %caller, "administrator pinned");
            *caller
        }
    };
    Ok(AssessmentEngine::new(admin))
}

/// Engine for operations that don't touch the catalog. Falls back to a
/// zero admin when none is pinned yet; only `competency add` cares.
fn engine(store: &RocksStore) -> Result<AssessmentEngine> {
    let admin = store.admin()?.unwrap_or_default();
    Ok(AssessmentEngine::new(admin))
}

fn run(cli: Cli) -> Result<()> {
    let dir = data_dir(cli.data_dir)?;
    let mut store =
        RocksStore::open(&dir).with_context(|| format!("opening state at {}", dir.display()))?;

    match cli.command {
        Commands::Register(args) => {
            let height = store.advance_height()?;
            engine(&store)?.register_participant(&mut store, args.caller, height)?;
            println!("registered {}", args.caller);
        }
        Commands::Competency { action } => match action {
            CompetencyAction::Add(args) => {
                store.advance_height()?;
                let engine = engine_for_admin(&mut store, &args.caller)?;
                if args.required < attest_core::constants::MIN_ASSESSORS as u32 {
                    eprintln!(
                        "warning: a competency requiring fewer than {} assessors can never finalize",
                        attest_core::constants::MIN_ASSESSORS
                    );
                }
                let draft = CompetencyDraft {
                    name: args.name,
                    description: args.description,
                    category: args.category,
                    required_assessors: args.required,
                };
                let competency = engine.create_competency(&mut store, &args.caller, draft)?;
                println!("created competency {} ({})", competency.id, competency.name);
            }
            CompetencyAction::Show(args) => {
                use attest_core::store::StateStore;
                match store.get_competency(args.id)? {
                    Some(c) => println!("{}", serde_json::to_string_pretty(&c)?),
                    None => bail!("unknown competency id: {}", args.id),
                }
            }
        },
        Commands::Request(args) => {
            let height = store.advance_height()?;
            engine(&store)?.request_assessment(&mut store, args.competency, args.caller, height)?;
            println!(
                "assessment of {} requested for competency {}",
                args.caller, args.competency
            );
        }
        Commands::Submit(args) => {
            store.advance_height()?;
            engine(&store)?.submit_score(
                &mut store,
                args.competency,
                &args.subject,
                args.caller,
                args.score,
            )?;
            println!("score {} recorded from {}", args.score, args.caller);
        }
        Commands::Finalize(args) => {
            store.advance_height()?;
            let outcome =
                engine(&store)?.finalize(&mut store, args.competency, &args.subject)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Record(args) => {
            let eng = engine(&store)?;
            match eng.get_record(&store, args.competency, &args.subject)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => bail!(
                    "no assessment for competency {} and subject {}",
                    args.competency,
                    args.subject
                ),
            }
        }
        Commands::Reputation(args) => {
            let eng = engine(&store)?;
            match args.competency {
                Some(competency_id) => {
                    let skill = eng.get_skill_reputation(&store, &args.id, competency_id)?;
                    println!("{}", serde_json::to_string_pretty(&skill)?);
                }
                None => {
                    let reputation = eng.get_reputation(&store, &args.id)?;
                    println!("{reputation}");
                }
            }
        }
    }

    store.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run(cli)
}
