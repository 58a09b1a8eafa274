//! Scheduled driver for the weekly league rotation.
//!
//! A rotation runs in a fixed order: the league catalog is validated, the
//! period is claimed in the watermark store, every league is ranked and
//! snapshotted, then promotions and demotions are applied, then weekly scores
//! are reset, then the period is marked complete. The claim is atomic in the
//! store, so instances sharing it rotate a period at most once. A failure
//! inside one league only skips that league. Once started, a rotation is not interrupted by shutdown; the
//! shutdown signal is only observed while waiting for the next poll.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use storage::models::Profile;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::{Result, RotationError};
use crate::ladder::TierLadder;
use crate::leaderboard::{DEFAULT_RANK_LIMIT, LeaderboardReader};
use crate::policy::{self, Movement, TierMove};
use crate::recorder::HistoryRecorder;
use crate::resetter::AccumulatorResetter;
use crate::schedule::{RotationPeriod, RotationSchedule};
use crate::traits::{LeagueCatalog, ProfileStore, RotationPorts, WatermarkStore};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSettings {
    poll_interval: Duration,
    rank_limit: i64,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            rank_limit: DEFAULT_RANK_LIMIT,
        }
    }
}

impl RotationSettings {
    pub fn new(poll_interval: Duration, rank_limit: i64) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(RotationError::Configuration(
                "rotation poll interval must be positive".to_string(),
            ));
        }
        if rank_limit < 1 {
            return Err(RotationError::Configuration(format!(
                "rotation rank limit must be at least 1, got {rank_limit}"
            )));
        }

        Ok(Self {
            poll_interval,
            rank_limit,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Members ranked (and therefore snapshotted and moved) per league
    pub fn rank_limit(&self) -> i64 {
        self.rank_limit
    }

    /// A poll interval longer than the boundary window can skip a boundary.
    pub fn check_schedule(&self, schedule: &RotationSchedule) -> Result<()> {
        let fits = chrono::Duration::from_std(self.poll_interval)
            .is_ok_and(|interval| interval <= schedule.window());
        if !fits {
            return Err(RotationError::Configuration(format!(
                "rotation poll interval of {}s exceeds the {}s boundary window",
                self.poll_interval.as_secs(),
                schedule.window().num_seconds()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationReport {
    pub period: RotationPeriod,
    pub leagues_processed: usize,
    pub leagues_failed: usize,
    pub snapshots_written: usize,
    pub snapshots_duplicate: usize,
    pub snapshot_failures: usize,
    pub promoted: usize,
    pub demoted: usize,
    pub move_failures: usize,
    /// `None` when the reset failed
    pub profiles_reset: Option<u64>,
    pub completion_recorded: bool,
}

impl RotationReport {
    fn new(period: RotationPeriod) -> Self {
        Self {
            period,
            leagues_processed: 0,
            leagues_failed: 0,
            snapshots_written: 0,
            snapshots_duplicate: 0,
            snapshot_failures: 0,
            promoted: 0,
            demoted: 0,
            move_failures: 0,
            profiles_reset: None,
            completion_recorded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RotationOutcome {
    /// Outside the boundary window
    NotDue,
    /// The period was already claimed, here or by another instance; nothing
    /// was done
    AlreadyRotated { period: RotationPeriod },
    Completed(RotationReport),
}

/// Moves decided for one league during the snapshot phase
struct LeaguePlan {
    league_id: i32,
    ranked: Vec<Profile>,
    moves: Vec<TierMove>,
}

pub struct RotationOrchestrator {
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<dyn LeagueCatalog>,
    watermark: Arc<dyn WatermarkStore>,
    reader: LeaderboardReader,
    recorder: HistoryRecorder,
    resetter: AccumulatorResetter,
    schedule: RotationSchedule,
    settings: RotationSettings,
    clock: Clock,
    /// Serializes rotations within this process and remembers the last
    /// period it claimed
    running: Mutex<Option<DateTime<Utc>>>,
}

impl RotationOrchestrator {
    pub fn new(ports: RotationPorts, schedule: RotationSchedule, settings: RotationSettings) -> Self {
        Self {
            reader: LeaderboardReader::new(ports.profiles.clone()),
            recorder: HistoryRecorder::new(ports.history),
            resetter: AccumulatorResetter::new(ports.profiles.clone()),
            profiles: ports.profiles,
            catalog: ports.catalog,
            watermark: ports.watermark,
            schedule,
            settings,
            clock: Arc::new(Utc::now),
            running: Mutex::new(None),
        }
    }

    /// Replace the wall clock used by [`Self::start`]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn schedule(&self) -> &RotationSchedule {
        &self.schedule
    }

    /// Poll until `shutdown` turns true or its sender is dropped.
    pub async fn start(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            weekday = %self.schedule.weekday(),
            hour = self.schedule.hour(),
            poll_interval_secs = self.settings.poll_interval().as_secs(),
            "League rotation scheduler started"
        );

        let mut ticker = tokio::time::interval(self.settings.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let now = (self.clock)();
            match self.poll(now).await {
                Ok(RotationOutcome::NotDue) => debug!("Rotation boundary not reached"),
                Ok(RotationOutcome::AlreadyRotated { period }) => {
                    debug!(%period, "Rotation already completed for this period")
                }
                Ok(RotationOutcome::Completed(report)) => log_report(&report),
                Err(e) => error!(error = %e, "League rotation aborted"),
            }
        }

        info!("League rotation scheduler stopped");
    }

    /// Rotate if `now` is inside a boundary window and that period has not
    /// been rotated yet.
    pub async fn poll(&self, now: DateTime<Utc>) -> Result<RotationOutcome> {
        match self.schedule.due_period(now) {
            Some(period) => self.rotate_period(period).await,
            None => Ok(RotationOutcome::NotDue),
        }
    }

    /// Rotate `period` unless it is already claimed.
    /// Used directly for catching up a missed boundary.
    pub async fn rotate_period(&self, period: RotationPeriod) -> Result<RotationOutcome> {
        let mut last_local = self.running.lock().await;

        if last_local.is_some_and(|start| start >= period.start) {
            return Ok(RotationOutcome::AlreadyRotated { period });
        }

        let watermark = self.watermark.last_rotated_period().await?;
        if watermark.is_some_and(|start| start >= period.start) {
            return Ok(RotationOutcome::AlreadyRotated { period });
        }

        // Validated before claiming, so a broken catalog leaves the period
        // open for the next poll
        let tiers = self.catalog.all_tiers().await.map_err(|e| {
            RotationError::Configuration(format!("league catalog unavailable: {e}"))
        })?;
        let ladder = TierLadder::new(tiers)?;

        if !self.watermark.claim_period(period.start).await? {
            info!(%period, "Period already claimed by another instance");
            return Ok(RotationOutcome::AlreadyRotated { period });
        }
        *last_local = Some(period.start);

        Ok(RotationOutcome::Completed(self.run(period, &ladder).await))
    }

    async fn run(&self, period: RotationPeriod, ladder: &TierLadder) -> RotationReport {
        info!(%period, "Starting league rotation");

        let mut report = RotationReport::new(period);

        // Snapshot every league before any profile is moved, so a member
        // promoted out of one league is not ranked again in the next.
        let mut plans = Vec::with_capacity(ladder.tiers().len());
        for league in ladder.tiers() {
            let ranked = match self.reader.rank(league.league_id, self.settings.rank_limit()).await {
                Ok(ranked) => ranked,
                Err(e) => {
                    error!(
                        league_id = league.league_id,
                        error = %e,
                        "Failed to rank league, skipping it for this rotation"
                    );
                    report.leagues_failed += 1;
                    continue;
                }
            };

            let snapshot = self.recorder.record(&period, league.league_id, &ranked).await;
            report.snapshots_written += snapshot.written;
            report.snapshots_duplicate += snapshot.duplicates;
            report.snapshot_failures += snapshot.failed;

            let moves = policy::decide(&ranked, ladder.position(league));
            debug!(
                league_id = league.league_id,
                members = ranked.len(),
                moves = moves.len(),
                "League ranked and snapshotted"
            );

            plans.push(LeaguePlan {
                league_id: league.league_id,
                ranked,
                moves,
            });
        }

        for plan in &plans {
            self.apply_moves(ladder, plan, &mut report).await;
            report.leagues_processed += 1;
        }

        report.profiles_reset = match self.resetter.reset_all().await {
            Ok(changed) => Some(changed),
            Err(e) => {
                error!(error = %e, "Failed to reset weekly scores");
                None
            }
        };

        report.completion_recorded = match self.watermark.complete_period(period.start).await {
            Ok(()) => true,
            Err(e) => {
                error!(%period, error = %e, "Failed to mark rotation complete");
                false
            }
        };

        report
    }

    async fn apply_moves(&self, ladder: &TierLadder, plan: &LeaguePlan, report: &mut RotationReport) {
        for tier_move in &plan.moves {
            let Some(target) = ladder.at_ordinal(tier_move.to_ordinal) else {
                warn!(
                    league_id = plan.league_id,
                    to_ordinal = tier_move.to_ordinal,
                    "No league at target ordinal"
                );
                report.move_failures += 1;
                continue;
            };

            let Some(member) = plan.ranked.iter().find(|p| p.user_id == tier_move.user_id) else {
                continue;
            };

            let mut moved = member.clone();
            moved.current_league_id = target.league_id;

            match self.profiles.update(&moved).await {
                Ok(()) => {
                    debug!(
                        user_id = %tier_move.user_id,
                        from_league = plan.league_id,
                        to_league = target.league_id,
                        movement = ?tier_move.movement,
                        "Member moved"
                    );
                    match tier_move.movement {
                        Movement::Promote => report.promoted += 1,
                        Movement::Demote => report.demoted += 1,
                    }
                }
                Err(e) => {
                    warn!(
                        user_id = %tier_move.user_id,
                        league_id = plan.league_id,
                        error = %e,
                        "Failed to update member league"
                    );
                    report.move_failures += 1;
                }
            }
        }
    }
}

pub fn log_report(report: &RotationReport) {
    info!(
        period = %report.period,
        leagues_processed = report.leagues_processed,
        leagues_failed = report.leagues_failed,
        snapshots_written = report.snapshots_written,
        snapshot_failures = report.snapshot_failures,
        promoted = report.promoted,
        demoted = report.demoted,
        move_failures = report.move_failures,
        profiles_reset = ?report.profiles_reset,
        completion_recorded = report.completion_recorded,
        "League rotation completed"
    );
}
