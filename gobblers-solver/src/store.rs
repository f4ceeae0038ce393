//! Text outcome records.
//!
//! One line per resolved position, nine comma-separated integers:
//!
//! ```text
//! key, color, size, from_row, from_col, to_row, to_col, outcome, distance
//! ```
//!
//! `from_row`/`from_col` are -1 for a reserve placement. An entry without a
//! best move writes color 0 and -1 for the size and all four coordinates.
//! Colors and outcomes use their domain values (1 = White, 2 = Black,
//! 3 = Draw).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use gobblers_core::codec::KEY_BITS;
use gobblers_core::{Color, Key, Move, Pos, Size};

use crate::error::{Result, SolverError};
use crate::table::{Metadata, Outcome, OutcomeTable};

const FIELDS: usize = 9;
const NONE: i64 = -1;

/// Write every entry of `table`, sorted by key. Returns the number written.
pub fn write_records<W: Write>(writer: W, table: &OutcomeTable) -> Result<usize> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let entries = table.sorted_entries();
    for (key, meta) in &entries {
        w.write_record(encode(*key, meta).map(|field| field.to_string()))?;
    }
    w.flush()
        .map_err(|e| SolverError::io("flush outcome records", e))?;
    Ok(entries.len())
}

/// Parse a whole record stream. Nothing is returned unless every line
/// parsed.
pub fn read_records<R: Read>(reader: R) -> Result<OutcomeTable> {
    let mut r = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = OutcomeTable::new();
    let mut expected_line = 1;
    for record in r.records() {
        let record = record?;
        let line = record.position().map_or(expected_line, |p| p.line());
        // The reader skips empty lines, so a gap in line numbers is one
        if line > expected_line {
            return Err(SolverError::MalformedRecord {
                line: expected_line,
                content: String::new(),
                reason: format!("expected {} fields, found an empty line", FIELDS),
            });
        }
        expected_line = line + 1;
        let malformed = |reason: String| SolverError::MalformedRecord {
            line,
            content: record.iter().collect::<Vec<_>>().join(","),
            reason,
        };

        if record.len() != FIELDS {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                FIELDS,
                record.len()
            )));
        }

        let mut fields = [0i64; FIELDS];
        for (slot, text) in fields.iter_mut().zip(record.iter()) {
            *slot = text
                .parse()
                .map_err(|_| malformed(format!("unparsable integer {:?}", text)))?;
        }

        let (key, meta) = decode(&fields).map_err(malformed)?;
        table
            .insert(key, meta)
            .map_err(|e| malformed(e.to_string()))?;
    }
    Ok(table)
}

/// Save `table` to a record file.
pub fn save(path: &Path, table: &OutcomeTable) -> Result<usize> {
    let file = File::create(path)
        .map_err(|e| SolverError::io(format!("create {}", path.display()), e))?;
    write_records(file, table)
}

/// Load a record file into a fresh table.
pub fn load(path: &Path) -> Result<OutcomeTable> {
    let file =
        File::open(path).map_err(|e| SolverError::io(format!("open {}", path.display()), e))?;
    read_records(file)
}

fn encode(key: Key, meta: &Metadata) -> [i64; FIELDS] {
    let outcome = meta.outcome.code() as i64;
    let distance = meta.distance as i64;
    match meta.best_move {
        None => [key.0 as i64, 0, NONE, NONE, NONE, NONE, NONE, outcome, distance],
        Some(mv) => {
            let (from_row, from_col) = match mv.from {
                Some(from) => (from.row() as i64, from.col() as i64),
                None => (NONE, NONE),
            };
            [
                key.0 as i64,
                mv.color as i64,
                mv.size.rank() as i64,
                from_row,
                from_col,
                mv.to.row() as i64,
                mv.to.col() as i64,
                outcome,
                distance,
            ]
        }
    }
}

fn decode(fields: &[i64; FIELDS]) -> std::result::Result<(Key, Metadata), String> {
    let [key, color, size, from_row, from_col, to_row, to_col, outcome, distance] = *fields;

    if key < 0 || key >> KEY_BITS != 0 {
        return Err(format!("key {} out of range", key));
    }
    let outcome = u8::try_from(outcome)
        .ok()
        .and_then(Outcome::from_code)
        .filter(|o| o.is_resolved())
        .ok_or_else(|| format!("outcome {} out of range", outcome))?;
    let distance =
        u32::try_from(distance).map_err(|_| format!("distance {} out of range", distance))?;

    let best_move = if color == 0 {
        if [size, from_row, from_col, to_row, to_col] != [NONE; 5] {
            return Err("entry without a move has move fields".to_string());
        }
        None
    } else {
        let color = u8::try_from(color)
            .ok()
            .and_then(Color::from_bits)
            .ok_or_else(|| format!("color {} out of range", color))?;
        let size = u8::try_from(size)
            .ok()
            .and_then(Size::from_rank)
            .ok_or_else(|| format!("size {} out of range", size))?;
        let from = match (from_row, from_col) {
            (NONE, NONE) => None,
            (row, col) => Some(cell(row, col)?),
        };
        Some(Move {
            color,
            size,
            from,
            to: cell(to_row, to_col)?,
        })
    };

    Ok((
        Key(key as u64),
        Metadata {
            best_move,
            outcome,
            distance,
        },
    ))
}

fn cell(row: i64, col: i64) -> std::result::Result<Pos, String> {
    if (0..3).contains(&row) && (0..3).contains(&col) {
        Ok(Pos::from_row_col(row as u8, col as u8))
    } else {
        Err(format!("coordinate ({}, {}) out of range", row, col))
    }
}
