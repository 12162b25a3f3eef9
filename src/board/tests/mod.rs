//! Board module tests.
//!
//! - `perft.rs` - node-count validation of move generation
//! - `make_unmake.rs` - make/undo round trips and hash maintenance
//! - `movegen.rs` - generated-move properties per piece kind
//! - `edge_cases.rs` - special positions and derived-state invariants
//! - `proptest.rs` - property-based tests

mod edge_cases;
mod perft;

use super::{Board, Move};

/// Collect the legal subset of the generated moves.
pub(crate) fn legal_moves(board: &mut Board) -> Vec<Move> {
    let mut legal = Vec::new();
    for m in board.generate_moves().iter() {
        if board.make_move(*m) {
            board.undo_move();
            legal.push(*m);
        }
    }
    legal
}

/// Assert two boards agree on every piece of observable state.
pub(crate) fn assert_boards_identical(a: &Board, b: &Board) {
    assert_eq!(a.pieces, b.pieces, "piece bitboards differ");
    assert_eq!(a.occupied, b.occupied, "occupancy differs");
    assert_eq!(a.all_occupied, b.all_occupied, "aggregate occupancy differs");
    assert_eq!(a.side_to_move, b.side_to_move);
    assert_eq!(a.castling_rights, b.castling_rights);
    assert_eq!(a.en_passant_target, b.en_passant_target);
    assert_eq!(a.halfmove_clock, b.halfmove_clock);
    assert_eq!(a.fullmove_number, b.fullmove_number);
    assert_eq!(a.hash, b.hash, "position hash differs");
}
