//! Binary checkpoint format for the outcome table.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "GBR1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Data section (entry_count × 16 bytes):
//!   - Key: u64 LE (8 bytes)
//!   - Move: u8, `src << 4 | dest` (src 9 = reserve), 0xFF = no move
//!   - Piece: u8, `color << 4 | size`, 0 = no move
//!   - Outcome: u8
//!   - Reserved: u8
//!   - Distance: u32 LE (4 bytes)
//!
//! Entries are sorted by key.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use gobblers_core::{Color, Key, Move, Pos, Size};
use xxhash_rust::xxh64::xxh64;

use crate::error::{Result, SolverError};
use crate::table::{Metadata, Outcome, OutcomeTable};

const MAGIC: &[u8; 4] = b"GBR1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 16;

const NO_MOVE: u8 = 0xFF;
const FROM_RESERVE: u8 = 9;

pub struct Checkpoint;

impl Checkpoint {
    /// Save the outcome table to a binary checkpoint file.
    pub fn save(path: &Path, table: &OutcomeTable) -> Result<usize> {
        let entries = table.sorted_entries();
        let count = entries.len();

        // Build data section
        let mut data = Vec::with_capacity(count * ENTRY_SIZE);
        for (key, meta) in &entries {
            data.extend_from_slice(&encode_entry(*key, meta));
        }

        let checksum = xxh64(&data, 0);

        let file = File::create(path)
            .map_err(|e| SolverError::io(format!("create {}", path.display()), e))?;
        let mut writer = BufWriter::new(file);

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(MAGIC);
        header[4..8].copy_from_slice(&VERSION.to_le_bytes());
        header[8..16].copy_from_slice(&(count as u64).to_le_bytes());
        header[16..24].copy_from_slice(&checksum.to_le_bytes());

        writer
            .write_all(&header)
            .and_then(|_| writer.write_all(&data))
            .and_then(|_| writer.flush())
            .map_err(|e| SolverError::io(format!("write {}", path.display()), e))?;

        Ok(count)
    }

    /// Load a checkpoint file into a fresh table.
    pub fn load(path: &Path) -> Result<OutcomeTable> {
        let file = File::open(path)
            .map_err(|e| SolverError::io(format!("open {}", path.display()), e))?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut header)
            .map_err(|_| SolverError::Checkpoint("truncated header".into()))?;

        if &header[0..4] != MAGIC {
            return Err(SolverError::Checkpoint("invalid magic".into()));
        }

        let version = read_u32(&header[4..8]);
        if version != VERSION {
            return Err(SolverError::Checkpoint(format!(
                "unsupported version: {}",
                version
            )));
        }

        let count = read_u64(&header[8..16]) as usize;
        let stored_checksum = read_u64(&header[16..24]);

        // Read data section, which must end exactly at the last entry
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| SolverError::io(format!("read {}", path.display()), e))?;
        if Some(data.len()) != count.checked_mul(ENTRY_SIZE) {
            return Err(SolverError::Checkpoint(format!(
                "expected {} entries, data section holds {} bytes",
                count,
                data.len()
            )));
        }

        if xxh64(&data, 0) != stored_checksum {
            return Err(SolverError::Checkpoint("checksum mismatch".into()));
        }

        let mut table = OutcomeTable::new();
        for (i, chunk) in data.chunks_exact(ENTRY_SIZE).enumerate() {
            let (key, meta) = decode_entry(chunk)
                .ok_or_else(|| SolverError::Checkpoint(format!("entry {} is malformed", i)))?;
            table.insert(key, meta)?;
        }

        Ok(table)
    }

    /// Get file size estimate for a given number of entries.
    pub fn estimate_size(count: usize) -> usize {
        HEADER_SIZE + count * ENTRY_SIZE
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn encode_entry(key: Key, meta: &Metadata) -> [u8; ENTRY_SIZE] {
    let mut entry = [0u8; ENTRY_SIZE];
    entry[0..8].copy_from_slice(&key.0.to_le_bytes());
    match meta.best_move {
        Some(mv) => {
            let src = mv.from.map_or(FROM_RESERVE, |pos| pos.0);
            entry[8] = (src << 4) | mv.to.0;
            entry[9] = ((mv.color as u8) << 4) | mv.size.rank();
        }
        None => entry[8] = NO_MOVE,
    }
    entry[10] = meta.outcome.code();
    entry[12..16].copy_from_slice(&meta.distance.to_le_bytes());
    entry
}

fn decode_entry(entry: &[u8]) -> Option<(Key, Metadata)> {
    let key = Key(read_u64(&entry[0..8]));
    let outcome = Outcome::from_code(entry[10]).filter(|o| o.is_resolved())?;
    let distance = read_u32(&entry[12..16]);

    let best_move = match (entry[8], entry[9]) {
        (NO_MOVE, 0) => None,
        (NO_MOVE, _) => return None,
        (packed, piece) => {
            let (src, dest) = (packed >> 4, packed & 0x0F);
            let color = Color::from_bits(piece >> 4)?;
            let size = Size::from_rank(piece & 0x0F)?;
            let to = Some(Pos(dest)).filter(|p| p.is_valid())?;
            let from = match src {
                FROM_RESERVE => None,
                s if Pos(s).is_valid() => Some(Pos(s)),
                _ => return None,
            };
            Some(Move {
                color,
                size,
                from,
                to,
            })
        }
    };

    Some((
        key,
        Metadata {
            best_move,
            outcome,
            distance,
        },
    ))
}
