//! Provides a representation of the pieces on the board
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! # Moves and Attacks
//! Bitboards are useful for quickly computing the moves or attacks available to a piece based on
//! its location on the board. In addition to the [`Bitboard`](struct.Bitboard.html) type, the
//! `bitboard` module provides lookup functions for every piece type: direct per-square tables for
//! kings, knights and pawns, and occupancy-dependent magic-indexed tables for the sliding pieces.
//!
//! ## Direct attacks (Knights, Kings and Pawns)
//! Knights and kings move directly to their destinations without passing through any other
//! squares. For example, the squares attacked by a knight on h1 can be computed as follows:
//!
//! ```rust
//! use chess::Square;
//! use chess::bitboard::knight_attacks;
//!
//! let mut attacks = knight_attacks(Square::H1);
//! assert_eq!(attacks.pop(), Some(Square::F2));
//! assert_eq!(attacks.pop(), Some(Square::G3));
//! assert_eq!(attacks.pop(), None);
//! ```
//!
//! Pawn attacks additionally depend on the pawn's color:
//!
//! ```rust
//! use chess::{Color, Square};
//! use chess::bitboard::pawn_attacks;
//!
//! let mut attacks = pawn_attacks(Color::White, Square::B2);
//! assert_eq!(attacks.pop(), Some(Square::A3));
//! assert_eq!(attacks.pop(), Some(Square::C3));
//! assert_eq!(attacks.pop(), None);
//! ```
//!
//! ## Sliding Attacks (Bishops, Rooks and Queens)
//! Moves by sliding pieces can be blocked by pieces in the path. For this reason, the functions
//! for sliding attacks require an additional argument: a `Bitboard` of occupied squares. Here's
//! an example of rook attacks:
//!
//! ```rust
//! use chess::Square;
//! use chess::bitboard::{Bitboard, rook_attacks};
//!
//! let occ = Bitboard::from(Square::A3) | Square::C1.into();
//! let mut attacks = rook_attacks(Square::A1, occ);
//! assert_eq!(attacks.pop(), Some(Square::B1));
//! assert_eq!(attacks.pop(), Some(Square::C1));
//! assert_eq!(attacks.pop(), Some(Square::A2));
//! assert_eq!(attacks.pop(), Some(Square::A3));
//! assert_eq!(attacks.pop(), None);
//! ```
//!
//! Bishop and queen attacks can be computed in the same way.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::iter::FusedIterator;
use std::ops;
use std::fmt;
use super::*;

mod attacks;
pub use attacks::*;

mod magics;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A set of squares with each bit representing one square
///
/// A `Bitboard` is, essentially, a set of [`Square`](../enum.Square.html)s stored in a 64-bit
/// integer. Each bit corresponds to one `Square`. If the bit is set, that `Square` is present. If
/// it is clear, the `Square` is not present. Bits are assigned rank-major, so bit 0 is a1, bit 1
/// is b1, and bit 63 is h8:
///
/// ```text
///     a    b    c    d    e    f    g    h
///    ---------------------------------------
/// 8 | 56 | 57 | 58 | 59 | 60 | 61 | 62 | 63 | 8
///    ---------------------------------------
/// 7 | 48 | 49 | 50 | 51 | 52 | 53 | 54 | 55 | 7
///    ---------------------------------------
/// 6 | 40 | 41 | 42 | 43 | 44 | 45 | 46 | 47 | 6
///    ---------------------------------------
/// 5 | 32 | 33 | 34 | 35 | 36 | 37 | 38 | 39 | 5
///    ---------------------------------------
/// 4 | 24 | 25 | 26 | 27 | 28 | 29 | 30 | 31 | 4
///    ---------------------------------------
/// 3 | 16 | 17 | 18 | 19 | 20 | 21 | 22 | 23 | 3
///    ---------------------------------------
/// 2 | 08 | 09 | 10 | 11 | 12 | 13 | 14 | 15 | 2
///    ---------------------------------------
/// 1 | 00 | 01 | 02 | 03 | 04 | 05 | 06 | 07 | 1
///    ---------------------------------------
///     a    b    c    d    e    f    g    h
/// ```
///
/// `Bitboard` implements all the bit-wise logic operators: `|`, `&`, `^`, `!`, `|=`, `&=`, and
/// `^=`. It also has methods that are typical for sets and collections, such as `insert`,
/// `remove`, `len`, and `contains`. It implements `IntoIterator`. However, since it's only a
/// 64-bit value, it implements `Copy`, and there's no need for the borrowing iterator methods
/// `iter` and `iter_mut`.
///
/// The bit-shift operators are not implemented as they wouldn't be well-defined for a
/// 2-dimensional `Bitboard`. Instead, the methods `shift_x` and `shift_y` are provided; `shift_x`
/// masks off the files that would otherwise wrap around the edge of the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Bitboard(u64);

impl Bitboard {
    /// Creates a new, empty bitboard
    pub fn new() -> Bitboard {
        Default::default()
    }

    /// Returns the number of squares in the bitboard
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the bitboard is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the bitboard contains `sq`
    pub fn contains(self, sq: Square) -> bool {
        !(self & sq.into()).is_empty()
    }

    /// Returns `true` if `self` intersects `other`
    pub fn intersects(self, other: Bitboard) -> bool {
        !(self & other).is_empty()
    }

    /// Returns `true` if `self` does not intersect `other`
    pub fn is_disjoint(self, other: Bitboard) -> bool {
        (self & other).is_empty()
    }

    /// Adds a square to the bitboard if it is not already present
    pub fn insert(&mut self, sq: Square) {
        *self |= sq.into();
    }

    /// Removes a square from the bitboard if it is present
    pub fn remove(&mut self, sq: Square) {
        *self &= !Bitboard::from(sq);
    }

    /// Removes the lowest-numbered square from the bitboard and returns it
    pub fn pop(&mut self) -> Option<Square> {
        if self.0 > 0 {
            // get the least significant bit
            let sq: Square = (self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE");
            // clear the least significant bit
            self.0 &= self.0 - 1;

            Some(sq)
        } else {
            None
        }
    }

    /// Returns the square that would be removed by a pop command
    pub fn peek(self) -> Option<Square> {
        if self.0 > 0 {
            // get the least significant bit
            Some((self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Toggles a square in the bitboard
    pub fn toggle(&mut self, sq: Square) {
        *self ^= sq.into();
    }

    /// Returns a bitboard with all squares shifted by `x` files
    ///
    /// Squares that would wrap past the a- or h-file are dropped.
    pub fn shift_x(self, x: i8) -> Bitboard {
        if x >= 0 {
            let keep = 0x0101_0101_0101_0101u64.wrapping_mul((0xffu8 >> x) as u64);
            Bitboard((self.0 & keep) << x)
        } else {
            let keep = 0x0101_0101_0101_0101u64.wrapping_mul(((0xffu8 << -x) & 0xff) as u64);
            Bitboard((self.0 & keep) >> -x)
        }
    }

    /// Returns a bitboard with all squares shifted by `y` ranks
    ///
    /// Squares shifted past the first or eighth rank are dropped.
    pub fn shift_y(self, y: i8) -> Bitboard {
        if y >= 0 {
            Bitboard(self.0 << (8 * y))
        } else {
            Bitboard(self.0 >> (-8 * y))
        }
    }

    /// Returns a bitboard with all squares shifted by `x` files and `y` ranks.
    ///
    /// Overflow in either direction drops the square, as with
    /// [`shift_x`](#method.shift_x) and [`shift_y`](#method.shift_y).
    pub fn shift_xy(self, x: i8, y: i8) -> Bitboard {
        self.shift_x(x).shift_y(y)
    }
}

impl ops::Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl ops::BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl ops::BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl ops::BitXor for Bitboard {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl ops::BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::LowerHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Binary for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Bitboard {
    fn from(val: u64) -> Bitboard {
        Bitboard(val)
    }
}

impl From<Bitboard> for u64 {
    fn from(bd: Bitboard) -> u64 {
        bd.0
    }
}

impl From<Square> for Bitboard {
    fn from(sq: Square) -> Bitboard {
        Bitboard(1 << sq as u64)
    }
}

impl From<File> for Bitboard {
    fn from(f: File) -> Bitboard {
        Bitboard(0x0101_0101_0101_0101 << f as u64)
    }
}

impl From<Rank> for Bitboard {
    fn from(r: Rank) -> Bitboard {
        Bitboard(0x0000_0000_0000_00ff << (8 * r as u64))
    }
}

impl From<IntoIter> for Bitboard {
    fn from(iter: IntoIter) -> Bitboard {
        iter.0
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

/// Iterator over the squares of a `Bitboard`
#[derive(Debug, Copy, Clone)]
pub struct IntoIter(Bitboard);

impl Iterator for IntoIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }
}

impl ExactSizeIterator for IntoIter {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl FusedIterator for IntoIter { }
