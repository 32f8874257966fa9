use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerScore;
use crate::player::{Player, PlayerColor, PlayerId};

/// One row of an end-of-round leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based; tied scores share the better rank.
    pub rank: u32,
    pub player_id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub score: i32,
}

/// Rank final scores by descending score.
///
/// `scores` must be in roster order; the sort is stable so players with equal
/// scores keep that order. Names and colors are looked up in `roster`, falling
/// back to a generic label for players that already left.
pub fn rank_results(roster: &[Player], scores: &[PlayerScore]) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = scores
        .iter()
        .map(|s| {
            let player = roster.iter().find(|p| p.id == s.player_id);
            RankedEntry {
                rank: 0,
                player_id: s.player_id,
                name: player
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("Player {}", s.player_id)),
                color: player.map(|p| p.color).unwrap_or_default(),
                score: s.score,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.score.cmp(&a.score));

    let mut previous: Option<(i32, u32)> = None;
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = match previous {
            Some((score, rank)) if score == entry.score => rank,
            _ => i as u32 + 1,
        };
        previous = Some((entry.score, entry.rank));
    }
    entries
}
