//! Contains the board representation and in-place move making
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::str::FromStr;
use std::convert::TryFrom;
use lazy_static::lazy_static;
use regex::Regex;
use crate::{Error, Result, Color, Piece, File, Rank, Square};
use crate::bitboard::{self, Bitboard};
use crate::moves::{Move, MoveKind, CoordinateMove};

pub mod zobrist;
use zobrist::Zobrist;

/// White's king-side castling right
pub const CASTLE_WHITE_KING: u8 = 0b0001;
/// White's queen-side castling right
pub const CASTLE_WHITE_QUEEN: u8 = 0b0010;
/// Black's king-side castling right
pub const CASTLE_BLACK_KING: u8 = 0b0100;
/// Black's queen-side castling right
pub const CASTLE_BLACK_QUEEN: u8 = 0b1000;

const ALL_CASTLING: u8 = 0b1111;

/// FEN for the standard starting position
pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Undo records reserved up front; games that run longer grow the history
const HISTORY_CAPACITY: usize = 256;

/// Returns the bitboard slot for a colored piece
fn slot(c: Color, p: Piece) -> usize {
    c as usize * Piece::COUNT + p as usize
}

/// Returns the castling rights which survive a piece moving from or to `sq`
fn castling_after_touching(sq: Square) -> u8 {
    match sq {
        Square::E1 => ALL_CASTLING & !(CASTLE_WHITE_KING | CASTLE_WHITE_QUEEN),
        Square::H1 => ALL_CASTLING & !CASTLE_WHITE_KING,
        Square::A1 => ALL_CASTLING & !CASTLE_WHITE_QUEEN,
        Square::E8 => ALL_CASTLING & !(CASTLE_BLACK_KING | CASTLE_BLACK_QUEEN),
        Square::H8 => ALL_CASTLING & !CASTLE_BLACK_KING,
        Square::A8 => ALL_CASTLING & !CASTLE_BLACK_QUEEN,
        _ => ALL_CASTLING,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The state needed to take back one move
#[derive(Debug, Copy, Clone)]
struct Undo {
    mv: Move,
    captured: Option<Piece>,
    castling: u8,
    ep_square: Option<Square>,
    halfmove_clock: u32,
    // the hash before the move, so unmaking restores it by assignment
    zobrist: Zobrist,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A chess position which moves are made on and taken back from in place
///
/// The placement of the pieces is stored as one bitboard per piece type and color, plus one
/// occupancy aggregate per color which is brought back in sync with the piece boards after every
/// mutation. A stack of undo records makes `make_move` followed by `unmake_move` restore the
/// position, including its hash, bit for bit; it holds one record per move made and not yet
/// taken back, however long the game runs.
#[derive(Debug, Clone)]
pub struct Board {
    pieces: [Bitboard; Color::COUNT * Piece::COUNT],
    occupancy: [Bitboard; Color::COUNT],
    turn: Color,
    castling: u8,
    ep_square: Option<Square>,
    halfmove_clock: u32,
    move_number: u32,
    zobrist: Zobrist,
    history: Vec<Undo>,
}

impl Board {
    /// Creates a board set up with the standard starting position
    pub fn new() -> Board {
        STARTPOS.parse().expect("INFALLIBLE")
    }

    /// The player whose turn it is
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// All occupied squares
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    /// The squares occupied by `color`'s pieces
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupancy[color as usize]
    }

    /// The squares holding a particular kind of piece
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[slot(color, piece)]
    }

    /// The piece standing on `sq`, if any
    pub fn piece_on(&self, sq: Square) -> Option<(Color, Piece)> {
        let color = if self.occupancy[0].contains(sq) {
            Color::White
        } else if self.occupancy[1].contains(sq) {
            Color::Black
        } else {
            return None;
        };

        for p in 0..Piece::COUNT {
            let piece = Piece::try_from(p).expect("INFALLIBLE");
            if self.pieces(color, piece).contains(sq) {
                return Some((color, piece));
            }
        }

        unreachable!("occupancy is out of sync with the piece boards");
    }

    /// The square of `color`'s king
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, Piece::King).peek().expect("INFALLIBLE")
    }

    /// The en-passant target square, if an en-passant capture is possible
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// The castling rights still available, as a mask of the `CASTLE_*` constants
    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    /// The number of half moves since the last capture or pawn move
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// The full-move number, starting from one
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// The number of moves made on this board and not yet taken back
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// The hash key of the current position
    pub fn zobrist(&self) -> Zobrist {
        self.zobrist
    }

    /// Returns `true` if a draw can be claimed under the fifty-move rule
    pub fn fifty_moves(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Returns `true` if the current position already occurred earlier on this board
    ///
    /// Only moves still on the undo stack are considered, and only back to the last capture or
    /// pawn move, beyond which no repetition is possible.
    pub fn is_repetition(&self) -> bool {
        let reach = self.halfmove_clock as usize;
        let mut back = 2;

        while back <= reach && back <= self.history.len() {
            if self.history[self.history.len() - back].zobrist == self.zobrist {
                return true;
            }
            back += 2;
        }

        false
    }

    /// Makes `mv` on the board, which must be legal in the current position
    ///
    /// # Panics
    /// Panics if the origin square of `mv` is empty. A move that doesn't belong to this position
    /// corrupts it silently, so callers must only pass moves generated from, or validated
    /// against, the current position.
    pub fn make_move(&mut self, mv: Move) {
        let orig = mv.origin();
        let dest = mv.target();
        let (color, piece) = match self.piece_on(orig) {
            Some(found) => found,
            None => panic!("make_move: no piece on {}", orig),
        };
        debug_assert_eq!(color, self.turn);

        let captured = match mv.kind() {
            MoveKind::EnPassant => Some(Piece::Pawn),
            _ if mv.is_capture() => self.piece_on(dest).map(|(_, p)| p),
            _ => None,
        };

        self.history.push(Undo {
            mv,
            captured,
            castling: self.castling,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            zobrist: self.zobrist,
        });

        // lift the moving piece and whatever it captures
        self.take(color, piece, orig);
        match mv.kind() {
            MoveKind::EnPassant => {
                let victim = Square::from_coord(dest.file(), orig.rank());
                self.take(!color, Piece::Pawn, victim);
            }
            _ if mv.is_capture() => {
                self.take(!color, captured.expect("INFALLIBLE"), dest);
            }
            _ => {}
        }

        // set it (or its promotion) back down
        match mv.promotion() {
            Some(promoted) => self.put(color, promoted, dest),
            None => self.put(color, piece, dest),
        }

        // castling also relocates the rook
        match mv.kind() {
            MoveKind::KingCastle | MoveKind::QueenCastle => {
                let (rook_orig, rook_dest) = match dest {
                    Square::G1 => (Square::H1, Square::F1),
                    Square::C1 => (Square::A1, Square::D1),
                    Square::G8 => (Square::H8, Square::F8),
                    Square::C8 => (Square::A8, Square::D8),
                    _ => unreachable!("castling to {}", dest),
                };
                self.take(color, Piece::Rook, rook_orig);
                self.put(color, Piece::Rook, rook_dest);
            }
            _ => {}
        }

        let castling = self.castling
            & castling_after_touching(orig)
            & castling_after_touching(dest);
        self.zobrist.toggle_castling(self.castling ^ castling);
        self.castling = castling;

        if let Some(ep) = self.ep_square {
            self.zobrist.toggle_ep_square(ep);
        }
        self.ep_square = if mv.kind() == MoveKind::DoublePush {
            let target = Square::try_from((orig as usize + dest as usize) / 2)
                .expect("INFALLIBLE");
            // only record the square when an enemy pawn can actually capture
            if self.ep_capturable(target, !color) {
                self.zobrist.toggle_ep_square(target);
                Some(target)
            } else {
                None
            }
        } else {
            None
        };

        if piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.move_number += 1;
        }

        self.turn = !self.turn;
        self.zobrist.toggle_turn();
        self.update_occupancy();
    }

    /// Takes back the most recent move still on the undo stack
    ///
    /// Taking back with nothing on the stack is a no-op.
    pub fn unmake_move(&mut self) {
        let undo = match self.history.pop() {
            Some(undo) => undo,
            None => return,
        };
        let mv = undo.mv;
        let orig = mv.origin();
        let dest = mv.target();
        let color = !self.turn;

        let piece = match mv.promotion() {
            Some(promoted) => {
                self.take_quiet(color, promoted, dest);
                Piece::Pawn
            }
            None => {
                let (_, piece) = self.piece_on(dest).expect("INFALLIBLE");
                self.take_quiet(color, piece, dest);
                piece
            }
        };
        self.put_quiet(color, piece, orig);

        match mv.kind() {
            MoveKind::EnPassant => {
                let victim = Square::from_coord(dest.file(), orig.rank());
                self.put_quiet(!color, Piece::Pawn, victim);
            }
            MoveKind::KingCastle | MoveKind::QueenCastle => {
                let (rook_orig, rook_dest) = match dest {
                    Square::G1 => (Square::H1, Square::F1),
                    Square::C1 => (Square::A1, Square::D1),
                    Square::G8 => (Square::H8, Square::F8),
                    Square::C8 => (Square::A8, Square::D8),
                    _ => unreachable!("castling to {}", dest),
                };
                self.take_quiet(color, Piece::Rook, rook_dest);
                self.put_quiet(color, Piece::Rook, rook_orig);
            }
            _ if mv.is_capture() => {
                self.put_quiet(!color, undo.captured.expect("INFALLIBLE"), dest);
            }
            _ => {}
        }

        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.zobrist = undo.zobrist;
        if color == Color::Black {
            self.move_number -= 1;
        }
        self.turn = color;
        self.update_occupancy();
    }

    /// Resolves a move given in coordinate notation against the current position
    ///
    /// Returns `Error::IllegalMove` if no legal move matches.
    pub fn coordinate_move(&self, cm: CoordinateMove) -> Result<Move> {
        let mut moves = crate::MoveList::new();
        self.legal_moves(&mut moves);

        for &mv in &moves {
            if mv.origin() == cm.orig && mv.target() == cm.dest && mv.promotion() == cm.promotion {
                return Ok(mv);
            }
        }

        Err(Error::IllegalMove)
    }

    /// Computes the hash of the current position from scratch
    ///
    /// `zobrist()` maintains the same value incrementally; this exists to validate it.
    pub fn calc_zobrist(&self) -> Zobrist {
        let mut key = Zobrist::new();

        for c in 0..Color::COUNT {
            let color = Color::try_from(c).expect("INFALLIBLE");
            for p in 0..Piece::COUNT {
                let piece = Piece::try_from(p).expect("INFALLIBLE");
                for sq in self.pieces(color, piece) {
                    key.toggle_piece(color, piece, sq);
                }
            }
        }
        if self.turn == Color::Black {
            key.toggle_turn();
        }
        key.toggle_castling(self.castling);
        if let Some(ep) = self.ep_square {
            key.toggle_ep_square(ep);
        }

        key
    }

    /// Returns `true` if a pawn of color `by` attacks `target`
    fn ep_capturable(&self, target: Square, by: Color) -> bool {
        bitboard::pawn_attacks(!by, target).intersects(self.pieces(by, Piece::Pawn))
    }

    fn update_occupancy(&mut self) {
        let mut white = Bitboard::new();
        let mut black = Bitboard::new();
        for p in 0..Piece::COUNT {
            white |= self.pieces[p];
            black |= self.pieces[Piece::COUNT + p];
        }
        self.occupancy = [white, black];
    }

    fn put(&mut self, c: Color, p: Piece, sq: Square) {
        self.pieces[slot(c, p)].insert(sq);
        self.zobrist.toggle_piece(c, p, sq);
    }

    fn take(&mut self, c: Color, p: Piece, sq: Square) {
        self.pieces[slot(c, p)].remove(sq);
        self.zobrist.toggle_piece(c, p, sq);
    }

    // placement without hash maintenance, for unmaking (the hash is restored by assignment)
    fn put_quiet(&mut self, c: Color, p: Piece, sq: Square) {
        self.pieces[slot(c, p)].insert(sq);
    }

    fn take_quiet(&mut self, c: Color, p: Piece, sq: Square) {
        self.pieces[slot(c, p)].remove(sq);
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl FromStr for Board {
    type Err = Error;

    /// Parses a position in Forsyth-Edwards Notation
    ///
    /// The string is fully validated before anything is constructed: a malformed FEN leaves no
    /// trace. An en-passant square that no enemy pawn can capture toward is normalized to no
    /// en-passant square, matching what `make_move` records.
    fn from_str(s: &str) -> Result<Board> {
        lazy_static! {
            static ref FEN_REGEX: Regex = Regex::new(
                r"(?x)^
                ([pnbrqkPNBRQK1-8]{1,8}(?:/[pnbrqkPNBRQK1-8]{1,8}){7})
                \x20(w|b)
                \x20(K?Q?k?q?|-)
                \x20([a-h][36]|-)
                \x20(\d{1,4})
                \x20(\d{1,4})
                $").expect("INFALLIBLE");
        }

        let caps = FEN_REGEX.captures(s).ok_or(Error::ParseError)?;

        // piece placement, from rank 8 down to rank 1
        let mut pieces = [Bitboard::new(); Color::COUNT * Piece::COUNT];
        for (row, rank_str) in caps[1].split('/').enumerate() {
            let rank = Rank::try_from(7 - row).expect("INFALLIBLE");
            let mut file = 0;

            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    if file >= File::COUNT {
                        return Err(Error::ParseError);
                    }
                    let color = if c.is_uppercase() { Color::White } else { Color::Black };
                    let piece: Piece = c.to_string().parse()?;
                    let sq = Square::from_coord(File::try_from(file)?, rank);
                    pieces[slot(color, piece)].insert(sq);
                    file += 1;
                }
            }
            if file != File::COUNT {
                return Err(Error::ParseError);
            }
        }

        let turn: Color = caps[2].parse()?;

        let mut castling = 0;
        for c in caps[3].chars() {
            castling |= match c {
                'K' => CASTLE_WHITE_KING,
                'Q' => CASTLE_WHITE_QUEEN,
                'k' => CASTLE_BLACK_KING,
                'q' => CASTLE_BLACK_QUEEN,
                _ => 0,
            };
        }

        let ep_square = match &caps[4] {
            "-" => None,
            sq => Some(sq.parse::<Square>()?),
        };

        let halfmove_clock = caps[5].parse().map_err(|_| Error::ParseError)?;
        let move_number: u32 = caps[6].parse().map_err(|_| Error::ParseError)?;
        if move_number == 0 {
            return Err(Error::ParseError);
        }

        // exactly one king per side
        for &color in &[Color::White, Color::Black] {
            if pieces[slot(color, Piece::King)].len() != 1 {
                return Err(Error::InvalidKingCount);
            }
        }

        // no pawns on the back ranks
        let back_ranks = Bitboard::from(Rank::R1) | Rank::R8.into();
        if (pieces[slot(Color::White, Piece::Pawn)] | pieces[slot(Color::Black, Piece::Pawn)])
                .intersects(back_ranks) {
            return Err(Error::InvalidPawnRank);
        }

        // each castling right requires its king and rook on their home squares
        let required: [(u8, Color, Piece, Square); 8] = [
            (CASTLE_WHITE_KING, Color::White, Piece::King, Square::E1),
            (CASTLE_WHITE_KING, Color::White, Piece::Rook, Square::H1),
            (CASTLE_WHITE_QUEEN, Color::White, Piece::King, Square::E1),
            (CASTLE_WHITE_QUEEN, Color::White, Piece::Rook, Square::A1),
            (CASTLE_BLACK_KING, Color::Black, Piece::King, Square::E8),
            (CASTLE_BLACK_KING, Color::Black, Piece::Rook, Square::H8),
            (CASTLE_BLACK_QUEEN, Color::Black, Piece::King, Square::E8),
            (CASTLE_BLACK_QUEEN, Color::Black, Piece::Rook, Square::A8),
        ];
        for &(right, color, piece, sq) in &required {
            if castling & right != 0 && !pieces[slot(color, piece)].contains(sq) {
                return Err(Error::InvalidCastlingFlags);
            }
        }

        let ep_square = match ep_square {
            Some(target) => {
                // the pawn that just double-pushed must be there
                let (pawn_rank, expected_turn) = match target.rank() {
                    Rank::R3 => (Rank::R4, Color::Black),
                    Rank::R6 => (Rank::R5, Color::White),
                    _ => unreachable!("regex only admits ranks 3 and 6"),
                };
                if turn != expected_turn {
                    return Err(Error::MissingEnPassantPawn);
                }
                let pawn_sq = Square::from_coord(target.file(), pawn_rank);
                if !pieces[slot(!turn, Piece::Pawn)].contains(pawn_sq) {
                    return Err(Error::MissingEnPassantPawn);
                }

                let capturers = bitboard::pawn_attacks(!turn, target)
                    & pieces[slot(turn, Piece::Pawn)];
                if capturers.is_empty() {
                    None
                } else {
                    Some(target)
                }
            }
            None => None,
        };

        let mut board = Board {
            pieces,
            occupancy: [Bitboard::new(); Color::COUNT],
            turn,
            castling,
            ep_square,
            halfmove_clock,
            move_number,
            zobrist: Zobrist::new(),
            history: Vec::with_capacity(HISTORY_CAPACITY),
        };
        board.update_occupancy();
        board.zobrist = board.calc_zobrist();

        Ok(board)
    }
}

impl fmt::Display for Board {
    /// Formats the position in Forsyth-Edwards Notation
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..Rank::COUNT {
            let rank = Rank::try_from(7 - row).expect("INFALLIBLE");
            let mut empty = 0;

            for file in 0..File::COUNT {
                let sq = Square::from_coord(
                    File::try_from(file).expect("INFALLIBLE"), rank);
                match self.piece_on(sq) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        match color {
                            Color::White => write!(f, "{}", piece)?,
                            Color::Black => write!(f, "{}", piece.to_string().to_lowercase())?,
                        }
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{}", empty)?;
            }
            if rank != Rank::R1 {
                write!(f, "/")?;
            }
        }

        write!(f, " {} ", self.turn)?;
        if self.castling == 0 {
            write!(f, "-")?;
        } else {
            for &(right, c) in &[(CASTLE_WHITE_KING, 'K'), (CASTLE_WHITE_QUEEN, 'Q'),
                    (CASTLE_BLACK_KING, 'k'), (CASTLE_BLACK_QUEEN, 'q')] {
                if self.castling & right != 0 {
                    write!(f, "{}", c)?;
                }
            }
        }
        match self.ep_square {
            Some(sq) => write!(f, " {}", sq)?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.move_number)
    }
}
