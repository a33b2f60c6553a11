//! Contains the packed move representation and the fixed-capacity move list
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::str::FromStr;
use std::convert::TryFrom;
use crate::{Error, Result, Piece, Square};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The kind of a move, a 4-bit code packed into the high bits of [`Move`]
///
/// Bit 2 is set exactly on captures and bit 3 exactly on promotions, so both predicates are a
/// single mask test.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u16)]
pub enum MoveKind {
    /// A non-capturing, non-castling single-square move
    Quiet = 0,
    /// A two-square pawn advance
    DoublePush = 1,
    /// King-side castling
    KingCastle = 2,
    /// Queen-side castling
    QueenCastle = 3,
    /// An ordinary capture
    Capture = 4,
    /// An en-passant capture
    EnPassant = 5,
    /// A non-capturing promotion to a knight
    KnightPromo = 8,
    /// A non-capturing promotion to a bishop
    BishopPromo = 9,
    /// A non-capturing promotion to a rook
    RookPromo = 10,
    /// A non-capturing promotion to a queen
    QueenPromo = 11,
    /// A capturing promotion to a knight
    KnightPromoCapture = 12,
    /// A capturing promotion to a bishop
    BishopPromoCapture = 13,
    /// A capturing promotion to a rook
    RookPromoCapture = 14,
    /// A capturing promotion to a queen
    QueenPromoCapture = 15,
}

impl MoveKind {
    const CAPTURE_BIT: u16 = 0b0100;
    const PROMO_BIT: u16 = 0b1000;

    /// Returns the non-capturing promotion kind for `piece`
    ///
    /// # Panics
    /// Panics if `piece` is not a valid promotion target.
    pub fn promotion_to(piece: Piece) -> MoveKind {
        match piece {
            Piece::Knight => MoveKind::KnightPromo,
            Piece::Bishop => MoveKind::BishopPromo,
            Piece::Rook => MoveKind::RookPromo,
            Piece::Queen => MoveKind::QueenPromo,
            _ => panic!("invalid promotion piece: {:?}", piece),
        }
    }

    /// Returns the capturing variant of a promotion kind, or the kind itself otherwise
    pub fn with_capture(self) -> MoveKind {
        if self as u16 & Self::PROMO_BIT != 0 {
            MoveKind::from_code(self as u16 | Self::CAPTURE_BIT)
        } else {
            MoveKind::Capture
        }
    }

    fn from_code(code: u16) -> MoveKind {
        debug_assert!(code < 16 && code != 6 && code != 7);
        // code is one of the valid discriminants
        unsafe { std::mem::transmute::<u16, MoveKind>(code) }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move packed into sixteen bits
///
/// The low six bits hold the origin square, the next six the target square, and the high four the
/// [`MoveKind`] code.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Move(u16);

impl Move {
    /// Creates a move from its three components
    pub fn new(orig: Square, dest: Square, kind: MoveKind) -> Move {
        Move(orig as u16 | (dest as u16) << 6 | (kind as u16) << 12)
    }

    /// The square the piece moves from
    pub fn origin(self) -> Square {
        Square::try_from((self.0 & 0o77) as usize).expect("INFALLIBLE")
    }

    /// The square the piece moves to
    pub fn target(self) -> Square {
        Square::try_from((self.0 >> 6 & 0o77) as usize).expect("INFALLIBLE")
    }

    /// The kind of move
    pub fn kind(self) -> MoveKind {
        MoveKind::from_code(self.0 >> 12)
    }

    /// Returns `true` if the move captures a piece, including en passant
    pub fn is_capture(self) -> bool {
        self.0 >> 12 & MoveKind::CAPTURE_BIT != 0
    }

    /// Returns `true` if the move promotes a pawn
    pub fn is_promotion(self) -> bool {
        self.0 >> 12 & MoveKind::PROMO_BIT != 0
    }

    /// Returns `true` if the move is castling to either side
    pub fn is_castling(self) -> bool {
        self.kind() == MoveKind::KingCastle || self.kind() == MoveKind::QueenCastle
    }

    /// The piece a promotion delivers, if the move is a promotion
    pub fn promotion(self) -> Option<Piece> {
        if self.is_promotion() {
            match self.0 >> 12 & 0b0011 {
                0 => Some(Piece::Knight),
                1 => Some(Piece::Bishop),
                2 => Some(Piece::Rook),
                _ => Some(Piece::Queen),
            }
        } else {
            None
        }
    }
}

impl fmt::Display for Move {
    /// Formats the move in coordinate notation, such as `e2e4` or `e7e8q`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.target())?;
        match self.promotion() {
            Some(Piece::Knight) => write!(f, "n"),
            Some(Piece::Bishop) => write!(f, "b"),
            Some(Piece::Rook) => write!(f, "r"),
            Some(Piece::Queen) => write!(f, "q"),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {:?})", self, self.kind())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The origin, target and optional promotion piece of a move in coordinate notation
///
/// Coordinate notation doesn't carry enough information to build a [`Move`] on its own; the
/// position it applies to determines the kind. See
/// [`Board::coordinate_move`](crate::Board::coordinate_move).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CoordinateMove {
    /// The square the piece moves from
    pub orig: Square,
    /// The square the piece moves to
    pub dest: Square,
    /// The promotion piece, if any
    pub promotion: Option<Piece>,
}

impl FromStr for CoordinateMove {
    type Err = Error;

    fn from_str(s: &str) -> Result<CoordinateMove> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(Error::ParseError);
        }

        let orig = s[0..2].parse()?;
        let dest = s[2..4].parse()?;
        let promotion = match &s[4..] {
            "" => None,
            "n" => Some(Piece::Knight),
            "b" => Some(Piece::Bishop),
            "r" => Some(Piece::Rook),
            "q" => Some(Piece::Queen),
            _ => return Err(Error::ParseError),
        };

        Ok(CoordinateMove { orig, dest, promotion })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A fixed-capacity list of moves
///
/// 256 slots is enough for any reachable position, so generation never allocates.
#[derive(Copy, Clone)]
pub struct MoveList {
    moves: [Move; 256],
    len: usize,
}

impl MoveList {
    /// Creates an empty list
    pub fn new() -> MoveList {
        MoveList { moves: [Move(0); 256], len: 0 }
    }

    /// Appends a move
    ///
    /// # Panics
    /// Panics if the list is full.
    pub fn push(&mut self, mv: Move) {
        self.moves[self.len] = mv;
        self.len += 1;
    }

    /// Removes all moves from the list
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The number of moves in the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no moves
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The moves as a slice
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// The moves as a mutable slice, so callers can reorder them
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    /// Iterates over the moves in the list
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, i: usize) -> &Move {
        &self.as_slice()[i]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for mv in self {
            write!(f, "{}{}", sep, mv)?;
            sep = " ";
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_round_trip() {
        let mv = Move::new(Square::E2, Square::E4, MoveKind::DoublePush);
        assert_eq!(mv.origin(), Square::E2);
        assert_eq!(mv.target(), Square::E4);
        assert_eq!(mv.kind(), MoveKind::DoublePush);
        assert!(!mv.is_capture());
        assert!(!mv.is_promotion());
        assert_eq!(mv.promotion(), None);

        let mv = Move::new(Square::B7, Square::A8, MoveKind::QueenPromoCapture);
        assert_eq!(mv.origin(), Square::B7);
        assert_eq!(mv.target(), Square::A8);
        assert!(mv.is_capture());
        assert!(mv.is_promotion());
        assert_eq!(mv.promotion(), Some(Piece::Queen));
    }

    #[test]
    fn kind_predicates() {
        assert!(Move::new(Square::E5, Square::D6, MoveKind::EnPassant).is_capture());
        assert!(!Move::new(Square::E1, Square::G1, MoveKind::KingCastle).is_capture());
        assert!(Move::new(Square::E1, Square::G1, MoveKind::KingCastle).is_castling());
        assert!(Move::new(Square::E1, Square::C1, MoveKind::QueenCastle).is_castling());
        assert_eq!(Move::new(Square::A7, Square::A8, MoveKind::KnightPromo).promotion(),
            Some(Piece::Knight));
        assert_eq!(MoveKind::RookPromo.with_capture(), MoveKind::RookPromoCapture);
        assert_eq!(MoveKind::Quiet.with_capture(), MoveKind::Capture);
    }

    #[test]
    fn coordinate_notation() {
        assert_eq!(Move::new(Square::E2, Square::E4, MoveKind::DoublePush).to_string(), "e2e4");
        assert_eq!(Move::new(Square::E7, Square::E8, MoveKind::QueenPromo).to_string(), "e7e8q");
        assert_eq!(Move::new(Square::E1, Square::G1, MoveKind::KingCastle).to_string(), "e1g1");

        let parsed: CoordinateMove = "e7e8q".parse().expect("valid move string");
        assert_eq!(parsed,
            CoordinateMove { orig: Square::E7, dest: Square::E8, promotion: Some(Piece::Queen) });
        assert!("e9e8".parse::<CoordinateMove>().is_err());
        assert!("e7e8k".parse::<CoordinateMove>().is_err());
        assert!("e2".parse::<CoordinateMove>().is_err());
    }

    #[test]
    fn list_operations() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        list.push(Move::new(Square::G1, Square::F3, MoveKind::Quiet));
        list.push(Move::new(Square::E2, Square::E4, MoveKind::DoublePush));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].target(), Square::F3);
        assert_eq!(list.iter().count(), 2);
        assert_eq!(list.to_string(), "g1f3 e2e4");

        list.as_mut_slice().swap(0, 1);
        assert_eq!(list.to_string(), "e2e4 g1f3");

        list.clear();
        assert!(list.is_empty());
    }
}
