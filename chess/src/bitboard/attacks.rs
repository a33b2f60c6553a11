//! Functions to compute the moves and attacks available to a piece
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//  All tables are built exactly once, the first time they are touched, and are read-only
//  afterwards, so they are safe for unsynchronized concurrent reads.
////////////////////////////////////////////////////////////////////////////////////////////////////
use lazy_static::lazy_static;
use super::*;
use super::magics::{ROOK_TABLE, BISHOP_TABLE};

lazy_static! {
    static ref KING_ATTACKS: [Bitboard; 64] = direct_table(
        &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)]);

    static ref KNIGHT_ATTACKS: [Bitboard; 64] = direct_table(
        &[(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)]);

    // indexed by the color of the attacking pawn
    static ref PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
        direct_table(&[(-1, 1), (1, 1)]),
        direct_table(&[(-1, -1), (1, -1)]),
    ];

    // squares strictly between two aligned squares; empty if not aligned
    static ref BETWEEN: Box<[[Bitboard; 64]; 64]> = between_table();

    // the full rank, file or diagonal through two aligned squares; empty if not aligned
    static ref LINE: Box<[[Bitboard; 64]; 64]> = line_table();
}

/// Returns the squares attacked by a king on `sq`
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Returns the squares attacked by a knight on `sq`
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

/// Returns the squares attacked by a pawn of the given color on `sq`
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color as usize][sq as usize]
}

/// Returns the squares attacked by a rook on `sq`, given the occupancy of the board
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Bitboard::from(ROOK_TABLE.lookup(sq as usize, occ.into()))
}

/// Returns the squares attacked by a bishop on `sq`, given the occupancy of the board
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Bitboard::from(BISHOP_TABLE.lookup(sq as usize, occ.into()))
}

/// Returns the squares attacked by a queen on `sq`, given the occupancy of the board
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Returns the squares strictly between `a` and `b`
///
/// The result is empty if the two squares don't share a rank, file or diagonal, or are
/// adjacent.
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a as usize][b as usize]
}

/// Returns the full rank, file or diagonal through `a` and `b`, including both squares
///
/// The result is empty if the two squares don't share a rank, file or diagonal.
pub fn line(a: Square, b: Square) -> Bitboard {
    LINE[a as usize][b as usize]
}

/// Builds a 64-entry table from a fixed set of (file, rank) offsets
fn direct_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::new(); 64];

    for (sq, entry) in table.iter_mut().enumerate() {
        let file = sq as i8 & 7;
        let rank = sq as i8 >> 3;

        for &(dx, dy) in offsets {
            if (0..8).contains(&(file + dx)) && (0..8).contains(&(rank + dy)) {
                *entry |= Bitboard::from(1u64 << ((rank + dy) * 8 + file + dx));
            }
        }
    }

    table
}

/// Returns the unit step from `a` toward `b` if they share a rank, file or diagonal
fn alignment(a: usize, b: usize) -> Option<(i8, i8)> {
    let df = (b as i8 & 7) - (a as i8 & 7);
    let dr = (b as i8 >> 3) - (a as i8 >> 3);

    if a == b {
        None
    } else if df == 0 || dr == 0 || df.abs() == dr.abs() {
        Some((df.signum(), dr.signum()))
    } else {
        None
    }
}

fn between_table() -> Box<[[Bitboard; 64]; 64]> {
    let mut table = Box::new([[Bitboard::new(); 64]; 64]);

    for a in 0..64 {
        for b in 0..64 {
            if let Some((dx, dy)) = alignment(a, b) {
                let mut file = (a as i8 & 7) + dx;
                let mut rank = (a as i8 >> 3) + dy;

                while (rank * 8 + file) as usize != b {
                    table[a][b] |= Bitboard::from(1u64 << (rank * 8 + file));
                    file += dx;
                    rank += dy;
                }
            }
        }
    }

    table
}

fn line_table() -> Box<[[Bitboard; 64]; 64]> {
    let mut table = Box::new([[Bitboard::new(); 64]; 64]);

    for a in 0..64 {
        for b in 0..64 {
            if let Some(step) = alignment(a, b) {
                // walk to both ends of the ray
                for &(dx, dy) in &[step, (-step.0, -step.1)] {
                    let mut file = a as i8 & 7;
                    let mut rank = a as i8 >> 3;

                    while (0..8).contains(&file) && (0..8).contains(&rank) {
                        table[a][b] |= Bitboard::from(1u64 << (rank * 8 + file));
                        file += dx;
                        rank += dy;
                    }
                }
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn king_attack_counts() {
        assert_eq!(king_attacks(Square::A1).len(), 3);
        assert_eq!(king_attacks(Square::E1).len(), 5);
        assert_eq!(king_attacks(Square::E4).len(), 8);
        assert!(king_attacks(Square::E4).contains(Square::D3));
        assert!(!king_attacks(Square::E4).contains(Square::E4));
    }

    #[test]
    fn knight_attack_counts() {
        assert_eq!(knight_attacks(Square::A1).len(), 2);
        assert_eq!(knight_attacks(Square::B1).len(), 3);
        assert_eq!(knight_attacks(Square::E4).len(), 8);
        assert!(knight_attacks(Square::G1).contains(Square::F3));
        assert!(!knight_attacks(Square::A1).contains(Square::B2));
    }

    #[test]
    fn pawn_attacks_by_color() {
        assert_eq!(pawn_attacks(Color::White, Square::E4),
            Bitboard::from(Square::D5) | Square::F5.into());
        assert_eq!(pawn_attacks(Color::Black, Square::E4),
            Bitboard::from(Square::D3) | Square::F3.into());
        assert_eq!(pawn_attacks(Color::White, Square::A2), Bitboard::from(Square::B3));
        assert_eq!(pawn_attacks(Color::Black, Square::H7), Bitboard::from(Square::G6));
    }

    #[test]
    fn sliding_attacks_respect_blockers() {
        let occ = Bitboard::from(Square::E6) | Square::C4.into();
        let attacks = rook_attacks(Square::E4, occ);
        assert!(attacks.contains(Square::E5));
        assert!(attacks.contains(Square::E6));
        assert!(!attacks.contains(Square::E7));
        assert!(attacks.contains(Square::C4));
        assert!(!attacks.contains(Square::B4));
        assert!(attacks.contains(Square::H4));
        assert!(attacks.contains(Square::E1));

        let attacks = bishop_attacks(Square::C1, Bitboard::from(Square::E3));
        assert!(attacks.contains(Square::D2));
        assert!(attacks.contains(Square::E3));
        assert!(!attacks.contains(Square::F4));
        assert!(attacks.contains(Square::B2));
        assert!(attacks.contains(Square::A3));

        assert_eq!(queen_attacks(Square::E4, occ),
            rook_attacks(Square::E4, occ) | bishop_attacks(Square::E4, occ));
    }

    #[test]
    fn between_and_line() {
        assert_eq!(between(Square::A1, Square::A4),
            Bitboard::from(Square::A2) | Square::A3.into());
        assert_eq!(between(Square::A1, Square::A2), Bitboard::new());
        assert_eq!(between(Square::C1, Square::E3), Bitboard::from(Square::D2));
        assert_eq!(between(Square::A1, Square::B3), Bitboard::new());
        assert_eq!(between(Square::H8, Square::A1), between(Square::A1, Square::H8));

        assert_eq!(line(Square::A1, Square::C1), Bitboard::from(Rank::R1));
        assert_eq!(line(Square::B2, Square::C3), line(Square::A1, Square::H8));
        assert!(line(Square::A1, Square::H8).contains(Square::D4));
        assert_eq!(line(Square::A1, Square::B3), Bitboard::new());
    }
}
