// Daily snapshot CSV: header creation, appends, column reconciliation

use chrono::{Local, TimeZone};
use hubwatch::aggregate::group_stat;
use hubwatch::models::GroupStat;
use hubwatch::snapshot_repo::SnapshotRepo;

fn stats(names: &[(&str, u64)]) -> Vec<GroupStat> {
    names
        .iter()
        .map(|(name, players)| group_stat(name, *players, 1))
        .collect()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn creates_monthly_file_with_header() {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = SnapshotRepo::new(dir.path());

    let path = repo
        .record_daily(at(2025, 3, 1, 23, 59), &stats(&[("Корвакс", 50), ("Санрайз", 30)]))
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "stats-2025-03.csv");

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "date,time,timestamp,Корвакс,Санрайз");
    assert!(lines[1].starts_with("2025-03-01,23:59:00,"));
    assert!(lines[1].ends_with(",50,30"));
}

#[test]
fn appends_one_row_per_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = SnapshotRepo::new(dir.path());
    let groups = stats(&[("Корвакс", 50)]);

    repo.record_daily(at(2025, 3, 1, 23, 59), &groups).unwrap();
    let path = repo.record_daily(at(2025, 3, 2, 23, 59), &groups).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn new_month_gets_its_own_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = SnapshotRepo::new(dir.path());
    let groups = stats(&[("Корвакс", 50)]);

    let march = repo.record_daily(at(2025, 3, 31, 23, 59), &groups).unwrap();
    let april = repo.record_daily(at(2025, 4, 1, 23, 59), &groups).unwrap();
    assert_ne!(march, april);
    assert!(april.exists() && march.exists());
}

#[test]
fn widens_header_when_a_group_appears_mid_month() {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = SnapshotRepo::new(dir.path());

    repo.record_daily(at(2025, 3, 1, 23, 59), &stats(&[("Корвакс", 50)]))
        .unwrap();
    let path = repo
        .record_daily(
            at(2025, 3, 2, 23, 59),
            &stats(&[("Корвакс", 55), ("СС220", 70)]),
        )
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,time,timestamp,Корвакс,СС220");
    // Historical row padded with an empty cell for the new column.
    assert!(lines[1].ends_with(",50,"));
    assert!(lines[2].ends_with(",55,70"));
}

#[test]
fn group_absent_this_cycle_keeps_its_column_with_empty_cell() {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = SnapshotRepo::new(dir.path());

    repo.record_daily(
        at(2025, 3, 1, 23, 59),
        &stats(&[("Корвакс", 50), ("Санрайз", 30)]),
    )
    .unwrap();
    let path = repo
        .record_daily(at(2025, 3, 2, 23, 59), &stats(&[("Корвакс", 60)]))
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,time,timestamp,Корвакс,Санрайз");
    assert!(lines[2].ends_with(",60,"));
}

#[test]
fn quotes_group_names_containing_commas() {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = SnapshotRepo::new(dir.path());

    let path = repo
        .record_daily(at(2025, 3, 1, 23, 59), &stats(&[("A, B", 5)]))
        .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().next().unwrap().ends_with("timestamp,\"A, B\""));

    // Reconciliation still recognizes the quoted column.
    repo.record_daily(at(2025, 3, 2, 23, 59), &stats(&[("A, B", 6)]))
        .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
}
