//! Contains the structure and key material for Zobrist hash keys
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use crate::{Color, Piece, File, Square};

// fixed seed so every process computes identical keys
const KEY_SEED: u64 = 416_587;

lazy_static! {
    static ref KEYS: Keys = Keys::generate();
}

struct Keys {
    pieces: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    black_move: u64,
    // one key per castling-right bit, in mask order
    castling: [u64; 4],
    ep_file: [u64; File::COUNT],
}

impl Keys {
    fn generate() -> Keys {
        let mut rng = StdRng::seed_from_u64(KEY_SEED);
        let mut keys = Keys {
            pieces: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            black_move: 0,
            castling: [0; 4],
            ep_file: [0; File::COUNT],
        };

        for color in keys.pieces.iter_mut() {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        keys.black_move = rng.gen();
        for key in keys.castling.iter_mut() {
            *key = rng.gen();
        }
        for key in keys.ep_file.iter_mut() {
            *key = rng.gen();
        }

        keys
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key incrementally maintained alongside a position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new, zeroed key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles the placement of a piece
    pub fn toggle_piece(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= KEYS.pieces[c as usize][p as usize][sq as usize];
    }

    /// Toggles an en-passant target square (only its file matters)
    pub fn toggle_ep_square(&mut self, sq: Square) {
        self.0 ^= KEYS.ep_file[sq.file() as usize];
    }

    /// Toggles each castling right set in `rights`
    pub fn toggle_castling(&mut self, rights: u8) {
        for (bit, key) in KEYS.castling.iter().enumerate() {
            if rights & (1 << bit) != 0 {
                self.0 ^= key;
            }
        }
    }

    /// Toggles whose turn it is
    pub fn toggle_turn(&mut self) {
        self.0 ^= KEYS.black_move;
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::UpperHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::LowerHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to index a hash table
    fn from(key: Zobrist) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_are_involutions() {
        let mut key = Zobrist::new();
        key.toggle_piece(Color::White, Piece::Knight, Square::G1);
        assert_ne!(u64::from(key), 0);
        key.toggle_piece(Color::White, Piece::Knight, Square::G1);
        assert_eq!(u64::from(key), 0);

        key.toggle_turn();
        key.toggle_castling(0b1111);
        key.toggle_ep_square(Square::E3);
        key.toggle_ep_square(Square::E6);
        assert_ne!(u64::from(key), 0);
        key.toggle_ep_square(Square::E6);
        key.toggle_ep_square(Square::E3);
        key.toggle_castling(0b1111);
        key.toggle_turn();
        assert_eq!(u64::from(key), 0);
    }

    #[test]
    fn ep_keys_depend_only_on_file() {
        let mut a = Zobrist::new();
        let mut b = Zobrist::new();
        a.toggle_ep_square(Square::E3);
        b.toggle_ep_square(Square::E6);
        assert_eq!(a, b);
        b.toggle_ep_square(Square::D6);
        assert_ne!(a, b);
    }

    #[test]
    fn castling_mask_composes_per_bit() {
        let mut whole = Zobrist::new();
        whole.toggle_castling(0b0101);

        let mut parts = Zobrist::new();
        parts.toggle_castling(0b0001);
        parts.toggle_castling(0b0100);

        assert_eq!(whole, parts);
    }
}
