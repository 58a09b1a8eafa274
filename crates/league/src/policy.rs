//! Promotion and demotion rules.
//!
//! The top fifth of a tier (at least one member) moves up one ordinal unless
//! the tier is the highest, the bottom fifth (at least one member) moves down
//! unless it is the lowest. Promotion is decided first: a member selected for
//! promotion is never also demoted, which matters for tiers with fewer than
//! ten ranked members.

use std::ops::Range;

use serde::Serialize;
use storage::models::Profile;
use uuid::Uuid;

const QUANTILE_DIVISOR: usize = 5;

/// Where a tier sits in the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPosition {
    pub ordinal: i32,
    pub max_ordinal: i32,
}

impl TierPosition {
    pub fn can_promote(&self) -> bool {
        self.ordinal < self.max_ordinal
    }

    pub fn can_demote(&self) -> bool {
        self.ordinal > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Promote,
    Demote,
}

/// Index ranges into a ranked list. The two ranges never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    pub promoted: Range<usize>,
    pub demoted: Range<usize>,
}

impl RotationPlan {
    pub fn movement_at(&self, index: usize) -> Option<Movement> {
        if self.promoted.contains(&index) {
            Some(Movement::Promote)
        } else if self.demoted.contains(&index) {
            Some(Movement::Demote)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierMove {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub movement: Movement,
    pub from_ordinal: i32,
    pub to_ordinal: i32,
}

/// Members moved in each direction for a tier of `ranked` members:
/// `max(1, ranked / 5)`, or zero for an empty tier.
pub fn quota(ranked: usize) -> usize {
    if ranked == 0 {
        0
    } else {
        (ranked / QUANTILE_DIVISOR).max(1)
    }
}

pub fn plan(ranked: usize, tier: TierPosition) -> RotationPlan {
    let count = quota(ranked);

    let promoted = if tier.can_promote() { 0..count } else { 0..0 };

    let demoted = if tier.can_demote() {
        ranked.saturating_sub(count).max(promoted.end)..ranked
    } else {
        ranked..ranked
    };

    RotationPlan { promoted, demoted }
}

/// Moves for a ranked tier, best first
pub fn decide(ranked: &[Profile], tier: TierPosition) -> Vec<TierMove> {
    let plan = plan(ranked.len(), tier);

    ranked
        .iter()
        .enumerate()
        .filter_map(|(index, profile)| {
            plan.movement_at(index).map(|movement| {
                let to_ordinal = match movement {
                    Movement::Promote => tier.ordinal + 1,
                    Movement::Demote => tier.ordinal - 1,
                };
                TierMove {
                    user_id: profile.user_id,
                    profile_id: profile.profile_id,
                    movement,
                    from_ordinal: tier.ordinal,
                    to_ordinal,
                }
            })
        })
        .collect()
}
