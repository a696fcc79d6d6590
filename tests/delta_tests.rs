// Delta tracker: change flags across cycles

mod common;

use common::{group, server};
use hubwatch::aggregate::{Metric, aggregate, board};
use hubwatch::delta::{DeltaTracker, MetricTracker, diff};
use hubwatch::models::{BoardEntry, RankTier};
use std::collections::HashMap;

fn entry(group: &str, value: f64) -> BoardEntry {
    BoardEntry {
        group: group.to_string(),
        value,
        changed: false,
        tier: RankTier::Low,
    }
}

#[test]
fn no_group_is_flagged_on_first_cycle() {
    let out = diff(&[entry("Корвакс", 50.0)], &HashMap::new());
    assert!(!out[0].changed);
}

#[test]
fn second_cycle_flags_only_the_changed_group() {
    // Scenario: Корвакс stays at 50, Санрайз rises 30 -> 40.
    let groups = vec![group("Корвакс", &["Corvax"]), group("Санрайз", &["LUST"])];
    let mut tracker = MetricTracker::new();

    let first = vec![server("Corvax Prime", 50), server("LUST Station", 30)];
    tracker.observe(board(&aggregate(&first, &groups), Metric::Players));

    let second = vec![server("Corvax Prime", 50), server("LUST Station", 40)];
    let out = tracker.observe(board(&aggregate(&second, &groups), Metric::Players));

    let corvax = out.iter().find(|e| e.group == "Корвакс").unwrap();
    let sunrise = out.iter().find(|e| e.group == "Санрайз").unwrap();
    assert!(!corvax.changed);
    assert!(sunrise.changed);
    assert_eq!(sunrise.value, 40.0);
}

#[test]
fn diff_with_identical_inputs_is_stable() {
    let previous: HashMap<String, f64> = [("a".to_string(), 50.0)].into();
    let board = vec![entry("a", 50.0), entry("b", 30.0)];
    assert_eq!(diff(&board, &previous), diff(&board, &previous));
}

#[test]
fn each_metric_tracks_independently() {
    let groups = vec![group("Империал", &["Imperial"])];
    let mut tracker = DeltaTracker::new();

    let first = vec![server("Imperial One", 10), server("Imperial Two", 10)];
    let stats = aggregate(&first, &groups);
    tracker.players.observe(board(&stats, Metric::Players));
    tracker.ratios.observe(board(&stats, Metric::Ratio));

    // Total stays at 20 but the server count halves, so only ratio moves.
    let second = vec![server("Imperial One", 20)];
    let stats = aggregate(&second, &groups);
    let players = tracker.players.observe(board(&stats, Metric::Players));
    let ratios = tracker.ratios.observe(board(&stats, Metric::Ratio));

    assert!(!players[0].changed);
    assert!(ratios[0].changed);
}
