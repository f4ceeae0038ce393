//! Export the outcome table to SQLite for on-demand lookups.
//!
//! Entries without a best move store NULL in every move column.

use std::path::Path;
use std::time::Instant;

use gobblers_core::{Color, Key, Move, Pos, Size};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, SolverError};
use crate::table::{Metadata, Outcome, OutcomeTable};

const BATCH_SIZE: usize = 100_000;

/// Write `table` to a new database at `path`, replacing any existing file.
/// Returns the number of rows inserted.
pub fn export_sqlite(table: &OutcomeTable, path: &Path) -> Result<usize> {
    if path.exists() {
        std::fs::remove_file(path)
            .map_err(|e| SolverError::io(format!("remove {}", path.display()), e))?;
    }

    let start = Instant::now();
    let mut conn = Connection::open(path)?;

    conn.execute(
        "CREATE TABLE positions (
            key INTEGER PRIMARY KEY,
            color INTEGER,
            size INTEGER,
            from_row INTEGER,
            from_col INTEGER,
            to_row INTEGER,
            to_col INTEGER,
            outcome INTEGER NOT NULL,
            distance INTEGER NOT NULL
        )",
        [],
    )?;

    let entries = table.sorted_entries();
    let total = entries.len();
    info!("Inserting {} positions into {}", total, path.display());

    // One transaction for the whole table
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO positions
                (key, color, size, from_row, from_col, to_row, to_col, outcome, distance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for (i, (key, meta)) in entries.iter().enumerate() {
            let mv = meta.best_move;
            let from = mv.and_then(|m| m.from);
            stmt.execute(params![
                key.0 as i64,
                mv.map(|m| m.color as i64),
                mv.map(|m| m.size.rank() as i64),
                from.map(|p| p.row() as i64),
                from.map(|p| p.col() as i64),
                mv.map(|m| m.to.row() as i64),
                mv.map(|m| m.to.col() as i64),
                meta.outcome.code() as i64,
                meta.distance as i64,
            ])?;

            if (i + 1) % BATCH_SIZE == 0 {
                let elapsed = start.elapsed().as_secs_f64();
                info!(
                    "  {:>3.0}% ({}/{}) - {:.0} rows/sec",
                    100.0 * (i + 1) as f64 / total as f64,
                    i + 1,
                    total,
                    (i + 1) as f64 / elapsed
                );
            }
        }
    }
    tx.commit()?;

    info!(
        "Inserted {} positions in {:.2}s",
        total,
        start.elapsed().as_secs_f64()
    );
    Ok(total)
}

type Row = (
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    i64,
    i64,
);

/// Look up one position in an exported database.
pub fn query_sqlite(conn: &Connection, key: Key) -> Result<Option<Metadata>> {
    let row: Option<Row> = conn
        .query_row(
            "SELECT color, size, from_row, from_col, to_row, to_col, outcome, distance
             FROM positions WHERE key = ?1",
            params![key.0 as i64],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            },
        )
        .optional()?;

    row.map(|row| decode_row(key, row)).transpose()
}

fn decode_row(key: Key, row: Row) -> Result<Metadata> {
    let (color, size, from_row, from_col, to_row, to_col, outcome, distance) = row;
    let bad = || SolverError::MalformedRecord {
        line: 0,
        content: format!("{:?}", row),
        reason: format!("database row for {} is malformed", key),
    };
    let pos = |r: i64, c: i64| {
        ((0..3).contains(&r) && (0..3).contains(&c)).then(|| Pos::from_row_col(r as u8, c as u8))
    };

    let best_move = match (color, size, to_row, to_col) {
        (None, None, None, None) => None,
        (Some(color), Some(size), Some(to_row), Some(to_col)) => {
            let from = match (from_row, from_col) {
                (None, None) => None,
                (Some(r), Some(c)) => Some(pos(r, c).ok_or_else(bad)?),
                _ => return Err(bad()),
            };
            Some(Move {
                color: u8::try_from(color)
                    .ok()
                    .and_then(Color::from_bits)
                    .ok_or_else(bad)?,
                size: u8::try_from(size)
                    .ok()
                    .and_then(Size::from_rank)
                    .ok_or_else(bad)?,
                from,
                to: pos(to_row, to_col).ok_or_else(bad)?,
            })
        }
        _ => return Err(bad()),
    };

    Ok(Metadata {
        best_move,
        outcome: u8::try_from(outcome)
            .ok()
            .and_then(Outcome::from_code)
            .filter(|o| o.is_resolved())
            .ok_or_else(bad)?,
        distance: u32::try_from(distance).map_err(|_| bad())?,
    })
}
