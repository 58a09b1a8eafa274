use std::collections::HashSet;

use storage::models::League;

use crate::error::{Result, RotationError};
use crate::policy::TierPosition;

/// Validated tier catalog: non-empty, ordinals contiguous from 1.
#[derive(Debug, Clone)]
pub struct TierLadder {
    tiers: Vec<League>,
}

impl TierLadder {
    pub fn new(mut tiers: Vec<League>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(RotationError::Configuration(
                "league catalog is empty".to_string(),
            ));
        }

        tiers.sort_by_key(|t| t.order_index);

        let mut ids = HashSet::with_capacity(tiers.len());
        for (expected, tier) in (1..).zip(&tiers) {
            if tier.order_index != expected {
                return Err(RotationError::Configuration(format!(
                    "league ordinals must be contiguous from 1: expected {expected}, found {} ({})",
                    tier.order_index, tier.slug
                )));
            }
            if !ids.insert(tier.league_id) {
                return Err(RotationError::Configuration(format!(
                    "duplicate league id {}",
                    tier.league_id
                )));
            }
        }

        Ok(Self { tiers })
    }

    /// Tiers from lowest to highest
    pub fn tiers(&self) -> &[League] {
        &self.tiers
    }

    pub fn max_ordinal(&self) -> i32 {
        self.tiers.len() as i32
    }

    pub fn at_ordinal(&self, ordinal: i32) -> Option<&League> {
        usize::try_from(ordinal - 1)
            .ok()
            .and_then(|idx| self.tiers.get(idx))
    }

    pub fn position(&self, league: &League) -> TierPosition {
        TierPosition {
            ordinal: league.order_index,
            max_ordinal: self.max_ordinal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn league(id: i32, ordinal: i32) -> League {
        League {
            league_id: id,
            slug: format!("league-{id}"),
            name: format!("League {id}"),
            order_index: ordinal,
            icon_url: None,
        }
    }

    #[test]
    fn test_empty_catalog_is_configuration_error() {
        let result = TierLadder::new(vec![]);
        assert!(matches!(result, Err(RotationError::Configuration(_))));
    }

    #[test]
    fn test_tiers_are_sorted_by_ordinal() {
        let ladder = TierLadder::new(vec![league(30, 3), league(10, 1), league(20, 2)]).unwrap();

        let ids: Vec<i32> = ladder.tiers().iter().map(|t| t.league_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(ladder.max_ordinal(), 3);
        assert_eq!(ladder.at_ordinal(2).unwrap().league_id, 20);
        assert!(ladder.at_ordinal(0).is_none());
        assert!(ladder.at_ordinal(4).is_none());
    }

    #[test]
    fn test_gap_in_ordinals_rejected() {
        let result = TierLadder::new(vec![league(1, 1), league(3, 3)]);
        assert!(matches!(result, Err(RotationError::Configuration(_))));
    }

    #[test]
    fn test_catalog_not_starting_at_one_rejected() {
        let result = TierLadder::new(vec![league(2, 2), league(3, 3)]);
        assert!(matches!(result, Err(RotationError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_ordinal_rejected() {
        let result = TierLadder::new(vec![league(1, 1), league(2, 1)]);
        assert!(matches!(result, Err(RotationError::Configuration(_))));
    }
}
