// Pure aggregation: group classification, per-group stats, metric boards,
// 18+ segmentation. No I/O; the worker and the snapshot job both call in here.

use crate::config::{AgeGateConfig, GroupDef};
use crate::models::{AgeSegmentStat, AgeSegments, BoardEntry, GroupStat, RankTier, RawServer};

const RATING_PLAYERS_WEIGHT: f64 = 0.7;
const RATING_RATIO_WEIGHT: f64 = 0.3;

/// Which per-group metric a board or sort runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Players,
    Ratio,
    Rating,
}

impl Metric {
    pub fn value_of(self, stat: &GroupStat) -> f64 {
        match self {
            Metric::Players => stat.total_players as f64,
            Metric::Ratio => stat.ratio,
            Metric::Rating => stat.rating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Computes one group's stats per cycle. A server matching several groups
/// counts once per matching group; membership is not deduplicated across
/// groups. Group order follows configuration order.
pub fn aggregate(servers: &[RawServer], groups: &[GroupDef]) -> Vec<GroupStat> {
    groups
        .iter()
        .map(|group| {
            let mut total_players: u64 = 0;
            let mut server_count: u32 = 0;
            for server in servers {
                let matched = group
                    .keywords
                    .iter()
                    .any(|keyword| server.name.contains(keyword.as_str()));
                if matched {
                    total_players += u64::from(server.players);
                    server_count += 1;
                }
            }
            group_stat(&group.name, total_players, server_count)
        })
        .collect()
}

/// Derives ratio and rating from the raw sums. Never divides by zero.
pub fn group_stat(name: &str, total_players: u64, server_count: u32) -> GroupStat {
    let ratio = if server_count > 0 {
        total_players as f64 / f64::from(server_count)
    } else {
        0.0
    };
    let rating = RATING_PLAYERS_WEIGHT * total_players as f64 + RATING_RATIO_WEIGHT * ratio;
    GroupStat {
        name: name.to_string(),
        total_players,
        server_count,
        ratio,
        rating,
    }
}

/// Presentation-time sort over the same stats; does not alter the input.
pub fn sorted_by(stats: &[GroupStat], metric: Metric, order: SortOrder) -> Vec<GroupStat> {
    let mut out = stats.to_vec();
    out.sort_by(|a, b| {
        let ordering = metric.value_of(a).total_cmp(&metric.value_of(b));
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    out
}

/// Descending board for one metric with rank tiers. Changed flags start
/// false; the delta tracker fills them in against the previous cycle.
pub fn board(stats: &[GroupStat], metric: Metric) -> Vec<BoardEntry> {
    sorted_by(stats, metric, SortOrder::Descending)
        .into_iter()
        .enumerate()
        .map(|(rank, stat)| BoardEntry {
            value: metric.value_of(&stat),
            group: stat.name,
            changed: false,
            tier: RankTier::for_rank(rank),
        })
        .collect()
}

/// True when the server passes the configured 18+ heuristic: an exact tag
/// match or a name substring marker.
pub fn is_adult(server: &RawServer, gate: &AgeGateConfig) -> bool {
    gate.tag_markers.iter().any(|marker| server.tags.contains(marker))
        || gate
            .name_markers
            .iter()
            .any(|marker| server.name.contains(marker.as_str()))
}

/// Splits the raw list into 18+ / general partitions.
pub fn age_segments(servers: &[RawServer], gate: &AgeGateConfig) -> AgeSegments {
    let mut segments = AgeSegments::default();
    for server in servers {
        let bucket = if is_adult(server, gate) {
            &mut segments.adult
        } else {
            &mut segments.general
        };
        bucket.total_players += u64::from(server.players);
        if server.players > 0 {
            bucket.active_servers += 1;
        }
    }
    finalize(&mut segments.adult);
    finalize(&mut segments.general);
    segments
}

fn finalize(stat: &mut AgeSegmentStat) {
    stat.avg_players_per_active = if stat.active_servers > 0 {
        stat.total_players as f64 / f64::from(stat.active_servers)
    } else {
        0.0
    };
}
