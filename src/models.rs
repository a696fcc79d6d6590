// Domain models and hub wire format

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One element of the hub directory payload. Tags show up in three places
/// across hub versions (statusData.tags, statusData.inferredTags, and a
/// top-level inferredTags); all are merged into one set on ingest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEntry {
    pub status_data: HubStatusData,
    #[serde(default)]
    pub inferred_tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStatusData {
    pub name: String,
    #[serde(default)]
    pub players: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub inferred_tags: Vec<String>,
}

/// One live server as seen for a single poll cycle.
#[derive(Debug, Clone)]
pub struct RawServer {
    pub name: String,
    pub players: u32,
    pub tags: HashSet<String>,
}

impl From<HubEntry> for RawServer {
    fn from(entry: HubEntry) -> Self {
        let mut tags: HashSet<String> = entry.status_data.tags.into_iter().collect();
        tags.extend(entry.status_data.inferred_tags);
        tags.extend(entry.inferred_tags);
        Self {
            name: entry.status_data.name,
            players: entry.status_data.players,
            tags,
        }
    }
}

/// Per-group summary for one cycle. `ratio` is players per server (0 for an
/// empty group), `rating` a weighted blend of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub name: String,
    pub total_players: u64,
    pub server_count: u32,
    pub ratio: f64,
    pub rating: f64,
}

/// Rank tier over a descending metric board; serializes lowercase (e.g. "high").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankTier {
    High,
    Medium,
    Low,
}

impl RankTier {
    /// Tier for a 0-based position in a descending sort: top 3 high, next 3 medium.
    pub fn for_rank(rank: usize) -> Self {
        if rank < 3 {
            RankTier::High
        } else if rank < 6 {
            RankTier::Medium
        } else {
            RankTier::Low
        }
    }
}

/// One row of a metric board: value plus highlight flag and rank tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    pub group: String,
    pub value: f64,
    pub changed: bool,
    pub tier: RankTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeSegmentStat {
    pub total_players: u64,
    /// Servers with at least one player.
    pub active_servers: u32,
    pub avg_players_per_active: f64,
}

/// 18+ vs general split over the full raw server list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeSegments {
    pub adult: AgeSegmentStat,
    pub general: AgeSegmentStat,
}

/// The render surface: everything a dashboard needs for one cycle.
/// Boards are pre-sorted descending with rank tiers and changed flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub timestamp: u64,
    pub groups: Vec<GroupStat>,
    pub players: Vec<BoardEntry>,
    pub ratios: Vec<BoardEntry>,
    pub ratings: Vec<BoardEntry>,
    pub age: AgeSegments,
}
