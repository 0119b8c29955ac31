use serde::Serialize;

use crate::constants::PERFORMANCE_TIERS;
use crate::types::{HazardKind, MatchTotals, PerformanceRating, PlayerStats, RollRecord};

/// Counters recomputed from the roll history; the history stays the source of truth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub players: Vec<PlayerStats>,
    pub totals: MatchTotals,
}

impl MatchStats {
    pub fn from_history(player_count: usize, history: &[RollRecord]) -> Self {
        let mut stats = Self {
            players: vec![PlayerStats::default(); player_count],
            totals: MatchTotals::default(),
        };
        for record in history {
            let Some(player) = stats.players.get_mut(record.player_index) else {
                continue;
            };
            player.rolls += 1;
            player.steps += record.roll as u32;
            stats.totals.rolls += 1;
            match record.hazard.map(|hazard| hazard.kind) {
                Some(HazardKind::Snake) => {
                    player.snake_hits += 1;
                    stats.totals.snake_hits += 1;
                }
                Some(HazardKind::Ladder) => {
                    player.ladder_climbs += 1;
                    stats.totals.ladder_climbs += 1;
                }
                None => {}
            }
        }
        stats
    }

    pub fn average_steps(stats: &PlayerStats) -> f64 {
        if stats.rolls == 0 {
            return 0.0;
        }
        stats.steps as f64 / stats.rolls as f64
    }
}

/// Rating from steps per roll. `None` before the first roll.
pub fn performance_rating(stats: &PlayerStats) -> Option<PerformanceRating> {
    if stats.rolls == 0 {
        return None;
    }
    let average = MatchStats::average_steps(stats);
    let rating = PERFORMANCE_TIERS
        .iter()
        .find(|(floor, _)| average >= *floor)
        .map(|(_, rating)| *rating)
        .unwrap_or(PerformanceRating::Fair);
    Some(rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hazard;

    fn record(player_index: usize, roll: u8, hazard: Option<HazardKind>) -> RollRecord {
        RollRecord {
            player_index,
            roll,
            from: 1,
            landed: 1 + roll,
            hazard: hazard.map(|kind| Hazard {
                kind,
                from: 1 + roll,
                to: 50,
            }),
        }
    }

    #[test]
    fn counters_follow_history() {
        let history = vec![
            record(0, 6, None),
            record(1, 3, Some(HazardKind::Ladder)),
            record(0, 2, Some(HazardKind::Snake)),
            record(7, 5, None),
        ];
        let stats = MatchStats::from_history(2, &history);
        assert_eq!(stats.players[0].rolls, 2);
        assert_eq!(stats.players[0].steps, 8);
        assert_eq!(stats.players[0].snake_hits, 1);
        assert_eq!(stats.players[1].ladder_climbs, 1);
        assert_eq!(stats.totals.rolls, 3);
        assert_eq!(stats.totals.snake_hits, 1);
        assert_eq!(stats.totals.ladder_climbs, 1);
        assert_eq!(MatchStats::from_history(2, &history), stats);
    }

    #[test]
    fn rating_tiers() {
        let stats = |rolls, steps| PlayerStats {
            rolls,
            steps,
            ..PlayerStats::default()
        };
        assert_eq!(performance_rating(&stats(0, 0)), None);
        assert_eq!(
            performance_rating(&stats(2, 10)),
            Some(PerformanceRating::Outstanding)
        );
        assert_eq!(
            performance_rating(&stats(2, 8)),
            Some(PerformanceRating::VeryGood)
        );
        assert_eq!(
            performance_rating(&stats(2, 7)),
            Some(PerformanceRating::Good)
        );
        assert_eq!(
            performance_rating(&stats(2, 6)),
            Some(PerformanceRating::Fair)
        );
    }
}
