//! Legal move generation, attack queries and pin reasoning
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use crate::{Color, Piece, Rank, Square};
use crate::{CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN, CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN};
use crate::bitboard::{self, Bitboard};
use crate::moves::{Move, MoveKind, MoveList};
use crate::position::Board;

const PROMOTIONS: [MoveKind; 4] = [
    MoveKind::KnightPromo, MoveKind::BishopPromo, MoveKind::RookPromo, MoveKind::QueenPromo,
];
const PROMO_CAPTURES: [MoveKind; 4] = [
    MoveKind::KnightPromoCapture, MoveKind::BishopPromoCapture,
    MoveKind::RookPromoCapture, MoveKind::QueenPromoCapture,
];

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which class of moves to generate
///
/// When the side to move is in check, every mode generates the full set of evasions: nothing
/// else is legal. Promotions count as captures, so `Captures` followed by `Quiets` produces
/// exactly the moves `All` does.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GenMode {
    /// Every legal move
    All,
    /// Captures, en-passant captures and promotions
    Captures,
    /// Non-capturing, non-promoting moves, including castling
    Quiets,
    /// Check evasions; outside of check this is the same as `All`
    Evasions,
}

impl Board {
    /// Returns the pieces standing on `occ` which attack `sq`, for both colors
    pub fn attacks_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let both = |piece| (self.pieces(Color::White, piece)
            | self.pieces(Color::Black, piece)) & occ;

        let mut attacks = bitboard::pawn_attacks(Color::White, sq)
            & self.pieces(Color::Black, Piece::Pawn) & occ;
        attacks |= bitboard::pawn_attacks(Color::Black, sq)
            & self.pieces(Color::White, Piece::Pawn) & occ;
        attacks |= bitboard::knight_attacks(sq) & both(Piece::Knight);
        attacks |= bitboard::king_attacks(sq) & both(Piece::King);
        attacks |= bitboard::bishop_attacks(sq, occ)
            & (both(Piece::Bishop) | both(Piece::Queen));
        attacks |= bitboard::rook_attacks(sq, occ)
            & (both(Piece::Rook) | both(Piece::Queen));

        attacks
    }

    /// Returns `true` if any piece of color `by` attacks `sq`
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attacked_with(sq, by, self.occupied())
    }

    /// Attack test against an altered occupancy; pieces outside `occ` neither attack nor block
    fn attacked_with(&self, sq: Square, by: Color, occ: Bitboard) -> bool {
        // ordered so the most selective attack sets are tried first
        bitboard::pawn_attacks(!by, sq)
                .intersects(self.pieces(by, Piece::Pawn) & occ)
            || bitboard::knight_attacks(sq)
                .intersects(self.pieces(by, Piece::Knight) & occ)
            || bitboard::bishop_attacks(sq, occ)
                .intersects((self.pieces(by, Piece::Bishop) | self.pieces(by, Piece::Queen))
                    & occ)
            || bitboard::rook_attacks(sq, occ)
                .intersects((self.pieces(by, Piece::Rook) | self.pieces(by, Piece::Queen))
                    & occ)
            || bitboard::king_attacks(sq)
                .intersects(self.pieces(by, Piece::King) & occ)
    }

    /// Returns the enemy pieces giving check to the side to move
    pub fn checkers(&self) -> Bitboard {
        let us = self.turn();
        self.attacks_to(self.king_square(us), self.occupied()) & self.occupied_by(!us)
    }

    /// Returns `true` if the side to move is in check
    pub fn is_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    /// Returns `true` if the side to move is attacked by two pieces at once
    pub fn is_double_check(&self) -> bool {
        self.checkers().len() >= 2
    }

    /// Returns the side to move's pieces which are absolutely pinned to their king
    pub fn pinned(&self) -> Bitboard {
        let us = self.turn();
        let them = !us;
        let king = self.king_square(us);
        let occ = self.occupied();
        let mut pinned = Bitboard::new();

        // sliders aligned with the king, seen through our pieces but not theirs
        let rooks = self.pieces(them, Piece::Rook) | self.pieces(them, Piece::Queen);
        let bishops = self.pieces(them, Piece::Bishop) | self.pieces(them, Piece::Queen);
        let snipers = (bitboard::rook_attacks(king, self.occupied_by(them)) & rooks)
            | (bitboard::bishop_attacks(king, self.occupied_by(them)) & bishops);

        for sniper in snipers {
            let blockers = bitboard::between(king, sniper) & occ;
            if blockers.len() == 1 && blockers.intersects(self.occupied_by(us)) {
                pinned |= blockers;
            }
        }

        pinned
    }

    /// Generates every legal move in the current position
    pub fn legal_moves(&self, list: &mut MoveList) {
        self.generate(GenMode::All, list);
    }

    /// Generates the legal moves of the given class, appending them to `list`
    pub fn generate(&self, mode: GenMode, list: &mut MoveList) {
        let us = self.turn();
        let own = self.occupied_by(us);
        let enemy = self.occupied_by(!us);
        let empty = !self.occupied();
        let checkers = self.checkers();

        if !checkers.is_empty() {
            // in check only evasions are legal; with two checkers only the king can move
            self.generate_king_moves(!own, list);
            if checkers.len() == 1 {
                let checker = checkers.peek().expect("INFALLIBLE");
                let king = self.king_square(us);
                let block = bitboard::between(king, checker) & empty;

                self.generate_pawn_moves(checkers, block, list);
                self.generate_ep(list);
                self.generate_piece_moves(checkers | block, list);
            }
            return;
        }

        let promo_band = match us {
            Color::White => Bitboard::from(Rank::R8),
            Color::Black => Bitboard::from(Rank::R1),
        };

        match mode {
            GenMode::All | GenMode::Evasions => {
                self.generate_pawn_moves(enemy, empty, list);
                self.generate_ep(list);
                self.generate_piece_moves(!own, list);
                self.generate_king_moves(!own, list);
                self.generate_castling(list);
            }
            GenMode::Captures => {
                self.generate_pawn_moves(enemy, empty & promo_band, list);
                self.generate_ep(list);
                self.generate_piece_moves(enemy, list);
                self.generate_king_moves(enemy, list);
            }
            GenMode::Quiets => {
                self.generate_pawn_moves(Bitboard::new(), empty & !promo_band, list);
                self.generate_piece_moves(empty, list);
                self.generate_king_moves(empty, list);
                self.generate_castling(list);
            }
        }
    }

    /// Pawn captures landing in `capture_mask` and pushes landing in `push_mask`
    fn generate_pawn_moves(&self, capture_mask: Bitboard, push_mask: Bitboard,
            list: &mut MoveList) {
        let us = self.turn();
        let king = self.king_square(us);
        let pinned = self.pinned();
        let occ = self.occupied();
        let (up, start_rank, promo_rank) = match us {
            Color::White => (8i8, Rank::R2, Rank::R8),
            Color::Black => (-8i8, Rank::R7, Rank::R1),
        };

        for sq in self.pieces(us, Piece::Pawn) {
            let allowed = if pinned.contains(sq) {
                bitboard::line(king, sq)
            } else {
                !Bitboard::new()
            };

            for dest in bitboard::pawn_attacks(us, sq) & capture_mask & allowed {
                if dest.rank() == promo_rank {
                    for &kind in &PROMO_CAPTURES {
                        list.push(Move::new(sq, dest, kind));
                    }
                } else {
                    list.push(Move::new(sq, dest, MoveKind::Capture));
                }
            }

            let one = Square::try_from((sq as i8 + up) as usize).expect("INFALLIBLE");
            if !occ.contains(one) {
                if (push_mask & allowed).contains(one) {
                    if one.rank() == promo_rank {
                        for &kind in &PROMOTIONS {
                            list.push(Move::new(sq, one, kind));
                        }
                    } else {
                        list.push(Move::new(sq, one, MoveKind::Quiet));
                    }
                }
                if sq.rank() == start_rank {
                    let two = Square::try_from((sq as i8 + 2 * up) as usize)
                        .expect("INFALLIBLE");
                    if !occ.contains(two) && (push_mask & allowed).contains(two) {
                        list.push(Move::new(sq, two, MoveKind::DoublePush));
                    }
                }
            }
        }
    }

    /// En-passant captures, each verified by retesting king safety without both pawns
    ///
    /// The usual pin logic can't see the horizontal pin that opens up when the capturing and
    /// captured pawns leave the same rank together, so en passant gets the explicit test.
    fn generate_ep(&self, list: &mut MoveList) {
        let ep = match self.ep_square() {
            Some(ep) => ep,
            None => return,
        };
        let us = self.turn();
        let them = !us;
        let king = self.king_square(us);

        for orig in bitboard::pawn_attacks(them, ep) & self.pieces(us, Piece::Pawn) {
            let victim = Square::from_coord(ep.file(), orig.rank());
            let occ = (self.occupied() ^ Bitboard::from(orig) ^ victim.into())
                | ep.into();
            if !self.attacked_with(king, them, occ) {
                list.push(Move::new(orig, ep, MoveKind::EnPassant));
            }
        }
    }

    /// Knight, bishop, rook and queen moves landing in `targets`
    fn generate_piece_moves(&self, targets: Bitboard, list: &mut MoveList) {
        let us = self.turn();
        let king = self.king_square(us);
        let pinned = self.pinned();
        let occ = self.occupied();
        let enemy = self.occupied_by(!us);

        // a pinned knight can never move
        for sq in self.pieces(us, Piece::Knight) & !pinned {
            for dest in bitboard::knight_attacks(sq) & targets {
                list.push(self.quiet_or_capture(sq, dest, enemy));
            }
        }

        let sliders: [(Piece, fn(Square, Bitboard) -> Bitboard); 3] = [
            (Piece::Bishop, bitboard::bishop_attacks),
            (Piece::Rook, bitboard::rook_attacks),
            (Piece::Queen, bitboard::queen_attacks),
        ];
        for &(piece, attacks) in &sliders {
            for sq in self.pieces(us, piece) {
                let mut dests = attacks(sq, occ) & targets;
                if pinned.contains(sq) {
                    dests &= bitboard::line(king, sq);
                }
                for dest in dests {
                    list.push(self.quiet_or_capture(sq, dest, enemy));
                }
            }
        }
    }

    /// King steps landing in `targets`, tested with the king lifted off the board
    ///
    /// Lifting the king lets sliders attack through the square it vacates, so stepping away
    /// from a checking slider along its own ray is rejected.
    fn generate_king_moves(&self, targets: Bitboard, list: &mut MoveList) {
        let us = self.turn();
        let king = self.king_square(us);
        let occ = self.occupied() ^ king.into();
        let enemy = self.occupied_by(!us);

        for dest in bitboard::king_attacks(king) & targets & !self.occupied_by(us) {
            if !self.attacked_with(dest, !us, occ) {
                list.push(self.quiet_or_capture(king, dest, enemy));
            }
        }
    }

    /// Castling moves; only called when not in check
    fn generate_castling(&self, list: &mut MoveList) {
        let us = self.turn();
        let them = !us;
        let occ = self.occupied();
        let rights = self.castling_rights();

        let (ks_right, qs_right, e, f, g, d, c, b) = match us {
            Color::White => (CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN, Square::E1, Square::F1,
                Square::G1, Square::D1, Square::C1, Square::B1),
            Color::Black => (CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, Square::E8, Square::F8,
                Square::G8, Square::D8, Square::C8, Square::B8),
        };

        if rights & ks_right != 0
                && !occ.intersects(Bitboard::from(f) | g.into())
                && !self.is_attacked(f, them)
                && !self.is_attacked(g, them) {
            list.push(Move::new(e, g, MoveKind::KingCastle));
        }

        // the b-file square must be empty but the king never crosses it, so its safety
        // doesn't matter
        if rights & qs_right != 0
                && !occ.intersects(Bitboard::from(b) | c.into() | d.into())
                && !self.is_attacked(d, them)
                && !self.is_attacked(c, them) {
            list.push(Move::new(e, c, MoveKind::QueenCastle));
        }
    }

    fn quiet_or_capture(&self, orig: Square, dest: Square, enemy: Bitboard) -> Move {
        if enemy.contains(dest) {
            Move::new(orig, dest, MoveKind::Capture)
        } else {
            Move::new(orig, dest, MoveKind::Quiet)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    fn moves_of(fen: &str) -> MoveList {
        let board: Board = fen.parse().expect(fen);
        let mut list = MoveList::new();
        board.legal_moves(&mut list);
        list
    }

    fn contains(list: &MoveList, s: &str) -> bool {
        list.iter().any(|mv| mv.to_string() == s)
    }

    #[test]
    fn startpos_has_twenty_moves() {
        assert_eq!(moves_of(crate::position::STARTPOS).len(), 20);
    }

    #[test]
    fn attack_queries() {
        let board: Board = "4k3/8/8/8/8/5n2/8/4K2R w K - 0 1".parse().expect("valid fen");
        assert!(board.is_attacked(Square::E1, Color::Black));
        assert!(board.is_attacked(Square::H2, Color::White));
        assert!(!board.is_attacked(Square::A8, Color::White));
        assert!(board.is_check());
        assert!(!board.is_double_check());

        let attackers = board.attacks_to(Square::E1, board.occupied());
        assert!(attackers.contains(Square::F3));
        assert!(!attackers.contains(Square::H1));
    }

    #[test]
    fn pinned_pieces_stay_on_the_line() {
        // the d2 rook is pinned by the d8 rook, and may only slide on the d-file
        let list = moves_of("3r2k1/8/8/8/8/8/3R4/3K4 w - - 0 1");
        assert!(contains(&list, "d2d5"));
        assert!(contains(&list, "d2d8"));
        assert!(!contains(&list, "d2e2"));
        assert!(!contains(&list, "d2a2"));

        // a pinned knight can't move at all
        let list = moves_of("4r1k1/8/8/8/8/4N3/8/4K3 w - - 0 1");
        assert!(!list.iter().any(|mv| mv.origin() == Square::E3));

        // a bishop pinned on a diagonal still moves along it
        let list = moves_of("6k1/8/8/3b4/8/8/6B1/7K w - - 0 1");
        assert!(contains(&list, "g2f3"));
        assert!(contains(&list, "g2d5"));
        assert!(!contains(&list, "g2f1"));
        assert!(!contains(&list, "g2h3"));
    }

    #[test]
    fn single_check_allows_block_capture_or_flight() {
        // rook gives check along the e-file
        let list = moves_of("4r1k1/8/8/8/8/8/3B4/4K3 w - - 0 1");
        for mv in &list {
            let ok = mv.origin() == Square::E1
                || mv.target() == Square::E8
                || bitboard::between(Square::E1, Square::E8).contains(mv.target());
            assert!(ok, "{} is not an evasion", mv);
        }
        assert!(contains(&list, "d2e3"), "bishop can block");
        assert!(contains(&list, "e1d1"));
        assert!(!contains(&list, "e1e2"), "king can't stay on the checked file");
    }

    #[test]
    fn double_check_forces_the_king_to_move() {
        // knight on f3 and rook on e8 both give check
        let list = moves_of("4r1k1/8/8/8/8/5n2/3R4/4K3 w - - 0 1");
        assert!(!list.is_empty());
        for mv in &list {
            assert_eq!(mv.origin(), Square::E1, "{} is not a king move", mv);
        }
    }

    #[test]
    fn king_cannot_retreat_along_a_checking_ray() {
        let list = moves_of("3rk3/8/8/8/8/8/8/3K4 w - - 0 1");
        assert!(!contains(&list, "d1d2"), "still on the rook's file");
        assert!(contains(&list, "d1c1"));
        assert!(contains(&list, "d1e2"));
    }

    #[test]
    fn en_passant_respects_the_hidden_horizontal_pin() {
        // capturing en passant would empty the fifth rank between the white king and the
        // h5 rook, so the capture is illegal even though neither pawn is pinned
        let board: Board = "4k3/8/8/K2pP2r/8/8/8/8 w - d6 0 1".parse().expect("valid fen");
        let mut list = MoveList::new();
        board.legal_moves(&mut list);
        assert!(!contains(&list, "e5d6"), "en passant would expose the king");
        assert!(contains(&list, "e5e6"), "the plain push is still legal");

        // with the rook gone the same capture is legal
        let board: Board = "4k3/8/8/K2pP3/8/8/8/8 w - d6 0 1".parse().expect("valid fen");
        let mut list = MoveList::new();
        board.legal_moves(&mut list);
        assert!(contains(&list, "e5d6"));
    }

    #[test]
    fn en_passant_out_of_check() {
        // the double-pushed d-pawn gives check, and capturing it en passant evades
        let board: Board = "8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1".parse().expect("valid fen");
        assert!(board.is_check());
        let mut list = MoveList::new();
        board.legal_moves(&mut list);
        assert!(contains(&list, "e4d3"));
    }

    #[test]
    fn castling_legality() {
        // both sides clear and unattacked
        let list = moves_of("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(contains(&list, "e1g1"));
        assert!(contains(&list, "e1c1"));

        // f1 is attacked, so king-side castling is out
        let list = moves_of("4k3/8/8/8/8/8/5r2/R3K2R w KQ - 0 1");
        assert!(!contains(&list, "e1g1"));

        // b1 is attacked but not crossed by the king: queen-side castling stands
        let list = moves_of("4k3/8/8/8/8/8/1r6/R3K2R w KQ - 0 1");
        assert!(contains(&list, "e1c1"));

        // a piece on b1 blocks queen-side castling even though the king never crosses b1
        let list = moves_of("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
        assert!(!contains(&list, "e1c1"));
        assert!(contains(&list, "e1g1"));

        // no castling while in check
        let list = moves_of("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!contains(&list, "e1g1"));
        assert!(!contains(&list, "e1c1"));

        // no castling without the right
        let list = moves_of("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(!contains(&list, "e1g1"));
        assert!(!contains(&list, "e1c1"));
    }

    #[test]
    fn stalemate_has_no_moves() {
        let list = moves_of("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(list.is_empty());

        let board: Board = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().expect("valid fen");
        assert!(!board.is_check());
    }

    #[test]
    fn checkmate_has_no_moves_but_is_check() {
        // a back-rank mate
        let board: Board = "R5k1/5ppp/8/8/8/8/8/4K3 b - - 0 1".parse().expect("valid fen");
        let mut list = MoveList::new();
        board.legal_moves(&mut list);
        assert!(list.is_empty());
        assert!(board.is_check());
    }

    #[test]
    fn capture_generation_is_a_subset_of_all() {
        let board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse().expect("valid fen");

        let mut all = MoveList::new();
        board.generate(GenMode::All, &mut all);
        let mut captures = MoveList::new();
        board.generate(GenMode::Captures, &mut captures);
        let mut quiets = MoveList::new();
        board.generate(GenMode::Quiets, &mut quiets);

        assert_eq!(all.len(), captures.len() + quiets.len());
        for mv in &captures {
            assert!(mv.is_capture() || mv.is_promotion());
            assert!(all.iter().any(|m| m == mv));
        }
        for mv in &quiets {
            assert!(!mv.is_capture() && !mv.is_promotion());
        }
    }
}
