// Daily snapshot persistence: one CSV table per month, one row appended per
// job run. Columns are date, time, timestamp, then one total-players column
// per group. When the group set grows mid-month the file is rewritten with
// the widened header (union of historical and current columns, historical
// order first) and old rows padded with empty cells.

use crate::models::GroupStat;
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const FIXED_COLUMNS: [&str; 3] = ["date", "time", "timestamp"];

pub struct SnapshotRepo {
    dir: PathBuf,
}

impl SnapshotRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Appends one row for `now` to the current month's table, creating the
    /// table with a header if absent. Returns the file path.
    pub fn record_daily(
        &self,
        now: DateTime<Local>,
        stats: &[GroupStat],
    ) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("stats-{}.csv", now.format("%Y-%m")));
        let current: Vec<String> = stats.iter().map(|s| s.name.clone()).collect();
        let columns = self.reconcile_columns(&path, &current)?;

        let mut row = vec![
            now.format("%Y-%m-%d").to_string(),
            now.format("%H:%M:%S").to_string(),
            now.timestamp().to_string(),
        ];
        for column in &columns {
            let value = stats
                .iter()
                .find(|s| &s.name == column)
                .map(|s| s.total_players.to_string())
                .unwrap_or_default();
            row.push(value);
        }

        let mut file = std::fs::OpenOptions::new().append(true).open(&path)?;
        write_row(&mut file, &row)?;
        Ok(path)
    }

    /// Ensures the file exists with a header covering `current`, widening it
    /// when new groups appear. Returns the group column order to write by.
    fn reconcile_columns(&self, path: &Path, current: &[String]) -> anyhow::Result<Vec<String>> {
        if !path.exists() {
            let mut buf = Vec::new();
            write_row(&mut buf, &header_row(current))?;
            std::fs::write(path, buf)?;
            return Ok(current.to_vec());
        }

        let text = std::fs::read_to_string(path)?;
        let rows: Vec<Vec<String>> = text
            .lines()
            .filter(|line| !line.is_empty())
            .map(parse_row)
            .collect();
        let existing: Vec<String> = rows
            .first()
            .map(|h| h.iter().skip(FIXED_COLUMNS.len()).cloned().collect())
            .unwrap_or_default();

        let mut columns = existing.clone();
        for name in current {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        if columns != existing {
            let header = header_row(&columns);
            let width = header.len();
            let mut buf = Vec::new();
            write_row(&mut buf, &header)?;
            for old in rows.iter().skip(1) {
                let mut padded = old.clone();
                padded.resize(width, String::new());
                write_row(&mut buf, &padded)?;
            }
            std::fs::write(path, buf)?;
        }
        Ok(columns)
    }
}

fn header_row(group_columns: &[String]) -> Vec<String> {
    FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(group_columns.iter().cloned())
        .collect()
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Quote-aware parse of a single CSV line (our writer never emits embedded
/// newlines; group names come from config).
fn parse_row(line: &str) -> Vec<String> {
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    row.push(field);
    row
}
