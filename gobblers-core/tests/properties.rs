//! Rule and codec properties over many reachable positions.
//!
//! Walks the game tree breadth-first for a few plies, then random playouts
//! further out, and checks on every visited state:
//! - key round trip (`decompress(compress(s)) == s`)
//! - distinct states never share a key
//! - every generated move applies and keeps the piece counts
//! - no generated move hands the opponent a line

use std::collections::HashMap;

use gobblers_core::{compress, decompress, Key, State};
use rand::prelude::*;

fn check_state(state: &State, seen: &mut HashMap<Key, State>) {
    let key = compress(state);
    assert_eq!(decompress(key).as_ref(), Ok(state), "roundtrip for {}", key);
    if let Some(previous) = seen.insert(key, *state) {
        assert_eq!(previous, *state, "key collision at {}", key);
    }

    if state.winner().is_some() {
        return;
    }
    for mov in state.legal_moves() {
        let next = state
            .apply_move(mov)
            .unwrap_or_else(|e| panic!("{} rejected in {}: {}", mov, key, e));
        assert!(next.is_consistent());
        assert_ne!(next.winner(), Some(state.mover().opponent()), "{} exposes", mov);
    }
}

#[test]
fn test_first_plies() {
    let mut seen = HashMap::new();
    let mut frontier = vec![State::new()];

    for _ in 0..3 {
        let mut next = Vec::new();
        for state in &frontier {
            check_state(state, &mut seen);
            if state.winner().is_none() {
                for mov in state.legal_moves() {
                    next.push(state.apply_move(mov).unwrap());
                }
            }
        }
        frontier = next;
    }

    // 27 openings, each answered by 27 placements minus the covered ones
    assert!(seen.len() > 27 * 20);
}

#[test]
fn test_random_playouts() {
    let mut rng = rand::rng();
    let mut seen = HashMap::new();

    for _ in 0..300 {
        let mut state = State::new();
        for _ in 0..40 {
            check_state(&state, &mut seen);
            if state.winner().is_some() {
                break;
            }
            let moves = state.legal_moves();
            let Some(&mov) = moves.choose(&mut rng) else {
                break;
            };
            state = state.apply_move(mov).unwrap();
        }
    }
}
