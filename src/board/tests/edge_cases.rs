//! Special positions and derived-state invariants.

use rand::prelude::*;

use super::legal_moves;
use crate::board::{Bitboard, Board, Color, Piece, Square};

/// Check the aggregate bitboards against the per-piece boards and make
/// sure no square carries two pieces.
fn assert_occupancy_invariants(board: &Board) {
    for color in [Color::White, Color::Black] {
        let mut union = Bitboard::EMPTY;
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            let bb = board.pieces[color.index()][piece.index()];
            // No overlap with what we have seen so far
            assert!(
                (union & bb).is_empty(),
                "square holds two pieces of {color}"
            );
            union |= bb;
        }
        assert_eq!(union, board.occupied[color.index()], "occ[{color}] stale");
    }

    assert!(
        (board.occupied[0] & board.occupied[1]).is_empty(),
        "colors overlap"
    );
    assert_eq!(
        board.occupied[0] | board.occupied[1],
        board.all_occupied,
        "all_occupied stale"
    );
}

#[test]
fn test_occupancy_invariants_startpos() {
    assert_occupancy_invariants(&Board::new());
}

#[test]
fn test_occupancy_invariants_along_random_playout() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(0xBADA55);

    for _ in 0..120 {
        let moves = legal_moves(&mut board);
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        assert!(board.make_move(mv));
        assert_occupancy_invariants(&board);
    }
}

#[test]
fn test_occupancy_invariants_in_perft_positions() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    ] {
        assert_occupancy_invariants(&Board::from_fen(fen));
    }
}

#[test]
fn test_piece_at_agrees_with_bitboards() {
    let board =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        match board.piece_at(sq) {
            Some((color, piece)) => {
                assert!(board.pieces[color.index()][piece.index()].contains(sq));
            }
            None => {
                assert!(!board.all_occupied.contains(sq));
            }
        }
    }
}

#[test]
fn test_kings_always_present_during_play() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..80 {
        let moves = legal_moves(&mut board);
        if moves.is_empty() {
            break;
        }
        board.make_move(moves[rng.gen_range(0..moves.len())]);
        assert_eq!(board.piece_count(Color::White, Piece::King), 1);
        assert_eq!(board.piece_count(Color::Black, Piece::King), 1);
    }
}

#[test]
fn test_en_passant_target_always_empty_square() {
    // The ep target is the square behind the double push, never occupied
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..100 {
        let moves = legal_moves(&mut board);
        if moves.is_empty() {
            break;
        }
        board.make_move(moves[rng.gen_range(0..moves.len())]);
        if let Some(ep) = board.en_passant_target() {
            assert!(!board.all_occupied.contains(ep));
        }
    }
}

#[test]
fn test_deep_history_round_trip() {
    // Long games stay reversible all the way back to the start
    let mut board = Board::new();
    let start_fen = board.to_fen();
    let mut rng = StdRng::seed_from_u64(0xDEAD);
    let mut made = 0;

    for _ in 0..400 {
        let moves = legal_moves(&mut board);
        if moves.is_empty() {
            break;
        }
        board.make_move(moves[rng.gen_range(0..moves.len())]);
        made += 1;
    }

    for _ in 0..made {
        board.undo_move();
    }
    assert_eq!(board.to_fen(), start_fen);
}

#[test]
#[should_panic(expected = "undo_move")]
fn test_undo_with_empty_history_panics() {
    let mut board = Board::new();
    board.undo_move();
}
