//! Magic-indexed attack tables for the sliding pieces
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Each square gets a "magic" multiplier which hashes the occupancy of that square's relevant
//! blocker squares into a dense table of precomputed attack sets. The multipliers are found once
//! at start-up by the usual trial-and-error search, seeded so every run finds the same set, and
//! the resulting tables are immutable for the life of the process.
////////////////////////////////////////////////////////////////////////////////////////////////////
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

const ROOK_DELTAS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

// seeds for the magic searches; any seed works, these are fixed for reproducibility
const ROOK_SEED: u64 = 0x19d6_94b4;
const BISHOP_SEED: u64 = 0x3b9d_21fc;

lazy_static! {
    pub(super) static ref ROOK_TABLE: SliderTable = SliderTable::build(&ROOK_DELTAS, ROOK_SEED);
    pub(super) static ref BISHOP_TABLE: SliderTable =
        SliderTable::build(&BISHOP_DELTAS, BISHOP_SEED);
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The magic parameters for one square
#[derive(Debug, Copy, Clone, Default)]
struct MagicEntry {
    mask: u64,
    factor: u64,
    shift: u32,
    offset: usize,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Occupancy-indexed attack sets for one sliding piece type, all 64 squares
#[derive(Debug)]
pub(super) struct SliderTable {
    entries: [MagicEntry; 64],
    attacks: Vec<u64>,
}

impl SliderTable {
    /// Returns the attack set for the piece on `sq` given the board occupancy
    pub fn lookup(&self, sq: usize, occ: u64) -> u64 {
        let entry = &self.entries[sq];
        let index = ((occ & entry.mask).wrapping_mul(entry.factor) >> entry.shift) as usize;
        self.attacks[entry.offset + index]
    }

    /// Builds the table for the piece moving along `deltas`
    fn build(deltas: &[(i8, i8); 4], seed: u64) -> SliderTable {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut entries = [MagicEntry::default(); 64];
        let mut attacks = Vec::new();

        for sq in 0..64 {
            let mask = relevant_mask(sq, deltas);
            let bits = mask.count_ones();
            let size = 1usize << bits;

            // enumerate every subset of the mask along with its attack set
            let mut occupancies = Vec::with_capacity(size);
            let mut occ = 0u64;
            loop {
                occupancies.push((occ, ray_attacks(sq, occ, deltas)));
                occ = occ.wrapping_sub(mask) & mask;
                if occ == 0 {
                    break;
                }
            }

            let shift = 64 - bits;
            let offset = attacks.len();
            attacks.resize(offset + size, 0);

            // trial and error: sparse random factors until the hash is collision-free
            'search: loop {
                let factor = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
                if (mask.wrapping_mul(factor) >> 56).count_ones() < 6 {
                    continue;
                }

                let table = &mut attacks[offset..offset + size];
                for slot in table.iter_mut() {
                    *slot = 0;
                }

                for &(occ, att) in &occupancies {
                    let index = (occ.wrapping_mul(factor) >> shift) as usize;
                    if table[index] == 0 {
                        table[index] = att;
                    } else if table[index] != att {
                        // destructive collision, try another factor
                        continue 'search;
                    }
                }

                entries[sq] = MagicEntry { mask, factor, shift, offset };
                break;
            }
        }

        SliderTable { entries, attacks }
    }
}

/// Returns the squares whose occupancy affects the piece's attacks from `sq`
///
/// The last square of each ray is excluded: whether it is occupied or not, the attack set is the
/// same.
fn relevant_mask(sq: usize, deltas: &[(i8, i8); 4]) -> u64 {
    let mut mask = 0u64;

    for &(dx, dy) in deltas {
        let mut file = (sq as i8 & 7) + dx;
        let mut rank = (sq as i8 >> 3) + dy;

        while (0..8).contains(&(file + dx)) && (0..8).contains(&(rank + dy)) {
            mask |= 1 << (rank * 8 + file);
            file += dx;
            rank += dy;
        }
    }

    mask
}

/// Walks each ray from `sq` until it hits a square in `occ` or the edge of the board
pub(super) fn ray_attacks(sq: usize, occ: u64, deltas: &[(i8, i8); 4]) -> u64 {
    let mut attacks = 0u64;

    for &(dx, dy) in deltas {
        let mut file = (sq as i8 & 7) + dx;
        let mut rank = (sq as i8 >> 3) + dy;

        while (0..8).contains(&file) && (0..8).contains(&rank) {
            let bit = 1 << (rank * 8 + file);
            attacks |= bit;
            if occ & bit != 0 {
                break;
            }
            file += dx;
            rank += dy;
        }
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    #[test]
    fn rook_lookup_matches_ray_walk() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let sq = rng.gen_range(0, 64);
            let occ = rng.gen::<u64>() & rng.gen::<u64>();
            assert_eq!(
                ROOK_TABLE.lookup(sq, occ),
                ray_attacks(sq, occ, &ROOK_DELTAS),
                "rook on square {} with occupancy {:#x}", sq, occ
            );
        }
    }

    #[test]
    fn bishop_lookup_matches_ray_walk() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2000 {
            let sq = rng.gen_range(0, 64);
            let occ = rng.gen::<u64>() & rng.gen::<u64>();
            assert_eq!(
                BISHOP_TABLE.lookup(sq, occ),
                ray_attacks(sq, occ, &BISHOP_DELTAS),
                "bishop on square {} with occupancy {:#x}", sq, occ
            );
        }
    }

    #[test]
    fn relevant_masks_exclude_edges() {
        // rook on a1: b1..g1 and a2..a7
        let mask = relevant_mask(0, &ROOK_DELTAS);
        assert_eq!(mask.count_ones(), 12);
        assert_eq!(mask & 0x80, 0, "h1 must not be in the mask");
        assert_eq!(mask & (1 << 56), 0, "a8 must not be in the mask");

        // bishop on e4 touches no edge squares
        let mask = relevant_mask(28, &BISHOP_DELTAS);
        assert_eq!(mask.count_ones(), 9);
    }
}
