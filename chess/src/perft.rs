//! Move-path enumeration for validating the move generator
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! `perft(N)` counts the leaf nodes of the legal game tree to depth `N`. One wrong bit in move
//! generation or in make/unmake shows up as a count that disagrees with the published reference
//! tables, which makes perft the main correctness harness for the whole crate.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use crate::moves::{Move, MoveKind, MoveList};
use crate::position::Board;

/// Counts the leaf nodes of the legal move tree to the given depth
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    board.legal_moves(&mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in &moves {
        board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move();
    }

    nodes
}

/// Counts leaf nodes once per legal first move, for pinpointing a disagreement
///
/// `depth` must be at least one.
pub fn divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let mut moves = MoveList::new();
    board.legal_moves(&mut moves);

    let mut results = Vec::with_capacity(moves.len());
    for &mv in &moves {
        board.make_move(mv);
        results.push((mv, perft(board, depth - 1)));
        board.unmake_move();
    }

    results
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A classification of the leaf moves of a perft run
///
/// Every counter other than `nodes` tallies a feature of the moves reaching the leaves, which is
/// what the published reference tables break down.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PerftStats {
    /// Leaf nodes
    pub nodes: u64,
    /// Leaf moves which capture, including en passant
    pub captures: u64,
    /// Leaf moves which capture en passant
    pub ep_captures: u64,
    /// Leaf moves which castle
    pub castles: u64,
    /// Leaf moves which promote a pawn
    pub promotions: u64,
    /// Leaf moves which give check
    pub checks: u64,
    /// Leaf moves where the checker is not the piece that moved
    pub discovered_checks: u64,
    /// Leaf moves which give check from two directions at once
    pub double_checks: u64,
    /// Leaf moves which deliver checkmate
    pub checkmates: u64,
}

/// Classifies the leaf moves of the legal move tree to the given depth
pub fn perft_stats(board: &mut Board, depth: u32) -> PerftStats {
    let mut stats = PerftStats::default();
    if depth == 0 {
        stats.nodes = 1;
        return stats;
    }
    walk(board, depth, &mut stats);
    stats
}

fn walk(board: &mut Board, depth: u32, stats: &mut PerftStats) {
    let mut moves = MoveList::new();
    board.legal_moves(&mut moves);

    for &mv in &moves {
        if depth == 1 {
            stats.record(board, mv);
        } else {
            board.make_move(mv);
            walk(board, depth - 1, stats);
            board.unmake_move();
        }
    }
}

impl PerftStats {
    fn record(&mut self, board: &mut Board, mv: Move) {
        self.nodes += 1;
        if mv.is_capture() {
            self.captures += 1;
        }
        if mv.is_promotion() {
            self.promotions += 1;
        }
        match mv.kind() {
            MoveKind::EnPassant => self.ep_captures += 1,
            MoveKind::KingCastle | MoveKind::QueenCastle => self.castles += 1,
            _ => {}
        }

        board.make_move(mv);
        let checkers = board.checkers();
        if !checkers.is_empty() {
            self.checks += 1;
            if checkers.len() >= 2 {
                self.double_checks += 1;
            } else if !checkers.contains(mv.target()) {
                self.discovered_checks += 1;
            }

            let mut replies = MoveList::new();
            board.legal_moves(&mut replies);
            if replies.is_empty() {
                self.checkmates += 1;
            }
        }
        board.unmake_move();
    }
}

impl fmt::Display for PerftStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes:             {}", self.nodes)?;
        writeln!(f, "captures:          {}", self.captures)?;
        writeln!(f, "en passant:        {}", self.ep_captures)?;
        writeln!(f, "castles:           {}", self.castles)?;
        writeln!(f, "promotions:        {}", self.promotions)?;
        writeln!(f, "checks:            {}", self.checks)?;
        writeln!(f, "discovered checks: {}", self.discovered_checks)?;
        writeln!(f, "double checks:     {}", self.double_checks)?;
        write!(f, "checkmates:        {}", self.checkmates)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_shallow() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 0), 1);
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8902);

        let stats = perft_stats(&mut board, 3);
        assert_eq!(stats.nodes, 8902);
        assert_eq!(stats.captures, 34);
        assert_eq!(stats.ep_captures, 0);
        assert_eq!(stats.checks, 12);
        assert_eq!(stats.checkmates, 0);
    }

    #[test]
    fn stats_pick_up_every_feature() {
        // CPW position 3: en-passant captures, discovered checks and checkmates by depth 3
        let mut board: Board = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"
            .parse().expect("valid fen");

        let stats = perft_stats(&mut board, 3);
        assert_eq!(stats.nodes, 2812);
        assert_eq!(stats.captures, 209);
        assert_eq!(stats.ep_captures, 2);
        assert_eq!(stats.castles, 0);
        assert_eq!(stats.checks, 267);
        assert_eq!(stats.discovered_checks, 3);
        assert_eq!(stats.double_checks, 0);
        assert_eq!(stats.checkmates, 0);
    }

    #[test]
    fn kiwipete_counts_castles() {
        let mut board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse().expect("valid fen");

        let stats = perft_stats(&mut board, 2);
        assert_eq!(stats.nodes, 2039);
        assert_eq!(stats.captures, 351);
        assert_eq!(stats.ep_captures, 1);
        assert_eq!(stats.castles, 91);
        assert_eq!(stats.checks, 3);
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut board = Board::new();
        let parts = divide(&mut board, 3);
        assert_eq!(parts.len(), 20);
        assert_eq!(parts.iter().map(|&(_, n)| n).sum::<u64>(), 8902);
    }
}
