use std::cmp::Ordering;

use crate::types::{Player, PlayerStats, RankingEntry};

/// Orders players for both the live standings and the final result.
///
/// Finished players come first by finish rank, then the rest by how far along
/// they are. The sort is stable, so equal positions keep turn order.
pub fn rank(players: &[Player], stats: &[PlayerStats]) -> Vec<RankingEntry> {
    let mut order: Vec<usize> = (0..players.len()).collect();
    order.sort_by(|&a, &b| compare_players(&players[a], &players[b]));

    order
        .into_iter()
        .enumerate()
        .map(|(place, index)| {
            let player = &players[index];
            RankingEntry {
                place: place + 1,
                player_index: index,
                name: player.name.clone(),
                is_bot: player.is_bot,
                position: player.position,
                finished: player.finished,
                finish_rank: player.finish_rank,
                stats: stats.get(index).copied().unwrap_or_default(),
            }
        })
        .collect()
}

fn compare_players(a: &Player, b: &Player) -> Ordering {
    match (a.finished, b.finished) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => a
            .finish_rank
            .unwrap_or(u32::MAX)
            .cmp(&b.finish_rank.unwrap_or(u32::MAX)),
        (false, false) => b.position.cmp(&a.position),
    }
}
