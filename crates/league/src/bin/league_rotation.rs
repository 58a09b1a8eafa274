use chrono::{DateTime, Duration, Utc, Weekday};
use clap::{Parser, Subcommand};
use league::{
    DEFAULT_POLL_INTERVAL, RotationOrchestrator, RotationOutcome, RotationSchedule,
    RotationSettings,
    orchestrator::log_report,
    postgres::{PgHistoryStore, PgLeagueCatalog, WEEKLY_ROTATION_JOB, rotation_ports},
    traits::{HistoryStore, LeagueCatalog},
};
use storage::{Database, repository::watermark::WatermarkRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "league-rotation")]
#[command(about = "Weekly league rotation operator tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "ROTATION_WEEKDAY", default_value = "Mon")]
    weekday: Weekday,

    #[arg(long, env = "ROTATION_HOUR", default_value_t = 0)]
    hour: u32,

    #[arg(long, env = "ROTATION_WINDOW_SECS", default_value_t = 3600)]
    window_secs: i64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rotate the period closed by the latest boundary, even outside its window
    Run {
        /// Reference instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        #[arg(long, env = "ROTATION_RANK_LIMIT", default_value_t = 100)]
        rank_limit: i64,
    },
    /// Show the current period, whether it is due and the stored watermark
    Status {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Print snapshot rows for one league and period
    History {
        #[arg(long)]
        league: i32,

        #[arg(long)]
        period_start: DateTime<Utc>,

        /// Defaults to one week after the start
        #[arg(long)]
        period_end: Option<DateTime<Utc>>,
    },
    /// Print the league catalog
    Leagues,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("league_rotation={},league={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let schedule = RotationSchedule::new(cli.weekday, cli.hour, Duration::seconds(cli.window_secs))?;

    tracing::info!("Connecting to database...");
    let db = Database::new(&cli.database_url).await?;
    db.run_migrations().await?;

    match cli.command {
        Commands::Run { at, rank_limit } => {
            handle_run(&db, schedule, at.unwrap_or_else(Utc::now), rank_limit).await?;
        }
        Commands::Status { at } => {
            handle_status(&db, schedule, at.unwrap_or_else(Utc::now)).await?;
        }
        Commands::History {
            league,
            period_start,
            period_end,
        } => {
            let period_end = period_end.unwrap_or(period_start + Duration::days(7));
            handle_history(&db, league, period_start, period_end).await?;
        }
        Commands::Leagues => {
            handle_leagues(&db).await?;
        }
    }

    Ok(())
}

async fn handle_run(
    db: &Database,
    schedule: RotationSchedule,
    at: DateTime<Utc>,
    rank_limit: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = RotationSettings::new(DEFAULT_POLL_INTERVAL, rank_limit)?;
    let orchestrator = RotationOrchestrator::new(rotation_ports(db), schedule, settings);
    let period = schedule.period_ending_at_or_before(at);

    tracing::info!("Rotating period {}", period);

    match orchestrator.rotate_period(period).await? {
        RotationOutcome::Completed(report) => {
            log_report(&report);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RotationOutcome::AlreadyRotated { period } => {
            tracing::info!("Period {} was already claimed, nothing to do", period);
        }
        RotationOutcome::NotDue => {}
    }

    Ok(())
}

async fn handle_status(
    db: &Database,
    schedule: RotationSchedule,
    at: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let period = schedule.period_ending_at_or_before(at);
    let watermark = WatermarkRepository::new(db.pool())
        .find(WEEKLY_ROTATION_JOB)
        .await?;

    tracing::info!("Latest period: {}", period);
    tracing::info!("Inside boundary window: {}", schedule.is_due(at));
    match watermark {
        Some(watermark) => {
            tracing::info!(
                "Last claimed period start: {} (claimed at {})",
                watermark.last_period_start.to_rfc3339(),
                watermark.claimed_at.to_rfc3339()
            );
            match watermark.completed_at {
                Some(completed_at) => {
                    tracing::info!("Completed at {}", completed_at.to_rfc3339())
                }
                None => tracing::warn!(
                    "Rotation not marked complete; it is still running or was interrupted"
                ),
            }
            tracing::info!(
                "Latest period claimed: {}",
                watermark.last_period_start >= period.start
            );
        }
        None => tracing::info!("No rotation recorded yet"),
    }

    Ok(())
}

async fn handle_history(
    db: &Database,
    league_id: i32,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = PgHistoryStore::new(db.pool().clone())
        .query_by_period(period_start, period_end, league_id)
        .await?;

    if records.is_empty() {
        tracing::warn!(
            "No snapshots for league {} between {} and {}",
            league_id,
            period_start.to_rfc3339(),
            period_end.to_rfc3339()
        );
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn handle_leagues(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let leagues = PgLeagueCatalog::new(db.pool().clone()).all_tiers().await?;

    if leagues.is_empty() {
        tracing::warn!("League catalog is empty; rotations will abort until it is populated");
        return Ok(());
    }

    for league in leagues {
        tracing::info!("  {}. {} ({}, id {})", league.order_index, league.name, league.slug, league.league_id);
    }

    Ok(())
}
