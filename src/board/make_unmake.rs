//! Making and unmaking moves.

use super::masks::SQUARES;
use super::state::UnmakeInfo;
use super::types::{Color, Move, Piece, Square};
use super::zobrist::ZOBRIST;
use super::Board;

impl Board {
    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = SQUARES[sq.index()];
        self.pieces[color.index()][piece.index()] |= bit;
        self.occupied[color.index()] |= bit;
        self.all_occupied |= bit;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = !SQUARES[sq.index()];
        self.pieces[color.index()][piece.index()] &= bit;
        self.occupied[color.index()] &= bit;
        self.all_occupied &= bit;
    }

    /// The piece occupying `sq`, if any.
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.all_occupied.contains(sq) {
            return None;
        }

        let color = if self.occupied[Color::White.index()].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            if self.pieces[color.index()][piece.index()].contains(sq) {
                return Some((color, piece));
            }
        }

        None
    }

    /// The square a pawn captured en passant actually occupies: one rank
    /// behind the capture target from the mover's point of view.
    fn en_passant_victim_square(mover: Color, target: Square) -> Square {
        let rank = match mover {
            Color::White => target.rank() - 1,
            Color::Black => target.rank() + 1,
        };
        Square::new(rank, target.file())
    }

    /// Clear any castling rights invalidated by this move: the king
    /// moving, a rook leaving its home square, or a rook being captured
    /// on its home square.
    fn update_castling_rights(&mut self, m: Move, mover: Color) {
        if m.piece() == Piece::King {
            self.castling_rights.remove(mover, true);
            self.castling_rights.remove(mover, false);
        } else if m.piece() == Piece::Rook {
            let home_rank = match mover {
                Color::White => 0,
                Color::Black => 7,
            };
            if m.from() == Square::new(home_rank, 0) {
                self.castling_rights.remove(mover, false);
            } else if m.from() == Square::new(home_rank, 7) {
                self.castling_rights.remove(mover, true);
            }
        }

        if m.captured() == Some(Piece::Rook) && !m.is_en_passant() {
            let opponent = mover.opponent();
            let home_rank = match opponent {
                Color::White => 0,
                Color::Black => 7,
            };
            if m.to() == Square::new(home_rank, 0) {
                self.castling_rights.remove(opponent, false);
            } else if m.to() == Square::new(home_rank, 7) {
                self.castling_rights.remove(opponent, true);
            }
        }
    }

    /// Play a pseudo-legal move.
    ///
    /// Returns `true` if the move is legal. Returns `false` if it would
    /// leave the mover's own king attacked; in that case the board is
    /// restored to its exact state before the call.
    pub fn make_move(&mut self, m: Move) -> bool {
        let mover = self.side_to_move;
        let c_idx = mover.index();

        self.history.push(UnmakeInfo {
            mv: m,
            previous_hash: self.hash,
            previous_castling_rights: self.castling_rights,
            previous_en_passant_target: self.en_passant_target,
            previous_halfmove_clock: self.halfmove_clock,
            captured_piece: m.captured(),
        });

        let mut hash = self.hash;
        hash ^= ZOBRIST.black_to_move_key;
        if let Some(ep) = self.en_passant_target {
            hash ^= ZOBRIST.en_passant_keys[ep.file()];
        }

        // Remove the captured piece first so the target square is free
        if let Some(captured) = m.captured() {
            let victim_sq = if m.is_en_passant() {
                Self::en_passant_victim_square(mover, m.to())
            } else {
                m.to()
            };
            self.remove_piece(victim_sq, mover.opponent(), captured);
            hash ^= ZOBRIST.piece_keys[captured.index()][mover.opponent().index()]
                [victim_sq.index()];
        }

        // Move the piece; promotions place the promoted kind
        let moving = m.piece();
        self.remove_piece(m.from(), mover, moving);
        hash ^= ZOBRIST.piece_keys[moving.index()][c_idx][m.from().index()];
        let placed = m.promotion().unwrap_or(moving);
        self.set_piece(m.to(), mover, placed);
        hash ^= ZOBRIST.piece_keys[placed.index()][c_idx][m.to().index()];

        // Castling also moves the rook
        if m.is_castling() {
            let rank = m.from().rank();
            let (rook_from_file, rook_to_file) = if m.is_castle_kingside() { (7, 5) } else { (0, 3) };
            let rook_from = Square::new(rank, rook_from_file);
            let rook_to = Square::new(rank, rook_to_file);
            self.remove_piece(rook_from, mover, Piece::Rook);
            self.set_piece(rook_to, mover, Piece::Rook);
            hash ^= ZOBRIST.piece_keys[Piece::Rook.index()][c_idx][rook_from.index()]
                ^ ZOBRIST.piece_keys[Piece::Rook.index()][c_idx][rook_to.index()];
        }

        let old_rights = self.castling_rights;
        self.update_castling_rights(m, mover);
        if self.castling_rights != old_rights {
            hash ^= ZOBRIST.castling_keys[old_rights.as_u8() as usize]
                ^ ZOBRIST.castling_keys[self.castling_rights.as_u8() as usize];
        }

        // A double push sets the en passant target; everything else clears it
        self.en_passant_target = None;
        if m.is_double_push() {
            let ep = Square::new(
                (m.from().rank() + m.to().rank()) / 2,
                m.from().file(),
            );
            self.en_passant_target = Some(ep);
            hash ^= ZOBRIST.en_passant_keys[ep.file()];
        }

        if moving == Piece::Pawn || m.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if mover == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = mover.opponent();
        self.hash = hash;

        let king_sq = self
            .find_king(mover)
            .expect("make_move: side to move has no king");
        if self.is_attacked(king_sq, self.side_to_move) {
            self.undo_move();
            return false;
        }
        true
    }

    /// Retract the most recently made move.
    ///
    /// # Panics
    /// Panics if no move has been made; calling this with an empty
    /// history is a programmer error.
    pub fn undo_move(&mut self) {
        let info = self
            .history
            .pop()
            .expect("undo_move: no move to undo");
        let m = info.mv;

        self.side_to_move = self.side_to_move.opponent();
        let mover = self.side_to_move;

        self.hash = info.previous_hash;
        self.castling_rights = info.previous_castling_rights;
        self.en_passant_target = info.previous_en_passant_target;
        self.halfmove_clock = info.previous_halfmove_clock;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }

        // Return the mover to its origin; promotions revert to a pawn
        let placed = m.promotion().unwrap_or(m.piece());
        self.remove_piece(m.to(), mover, placed);
        self.set_piece(m.from(), mover, m.piece());

        if m.is_castling() {
            let rank = m.from().rank();
            let (rook_from_file, rook_to_file) = if m.is_castle_kingside() { (7, 5) } else { (0, 3) };
            self.remove_piece(Square::new(rank, rook_to_file), mover, Piece::Rook);
            self.set_piece(Square::new(rank, rook_from_file), mover, Piece::Rook);
        }

        // Restore the captured piece on the square it actually occupied
        if let Some(captured) = info.captured_piece {
            let victim_sq = if m.is_en_passant() {
                Self::en_passant_victim_square(mover, m.to())
            } else {
                m.to()
            };
            self.set_piece(victim_sq, mover.opponent(), captured);
        }
    }
}
