//! Magic bitboards for sliding piece attacks.
//!
//! For each square a blocker mask selects the occupancy bits that can
//! shorten a rook's or bishop's travel (outer edge squares never can, so
//! they are excluded). Multiplying the masked occupancy by a per-square
//! magic number and shifting by `64 - popcount(mask)` yields a perfect
//! index into a precomputed attack array.
//!
//! The shipped magic constants were found by the random search in
//! [`find_magic`]; the tables are rebuilt and verified against the
//! classical ray tracer every startup.

use std::fmt;

use once_cell::sync::Lazy;
use rand::prelude::*;

/// Attack-array entries over all 64 squares: sum of 2^popcount(mask).
const ROOK_TABLE_ENTRIES: usize = 102_400;
const BISHOP_TABLE_ENTRIES: usize = 5_248;

/// Candidate budget for the magic-number search, per square.
const MAX_MAGIC_CANDIDATES: u32 = 1_000_000;

const ROOK_DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The magic-number search exhausted its candidate budget for a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicError {
    BootstrapFailed { square: usize, bishop: bool },
}

impl fmt::Display for MagicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MagicError::BootstrapFailed { square, bishop } => write!(
                f,
                "no {} magic number found for square {} within {} candidates",
                if *bishop { "bishop" } else { "rook" },
                square,
                MAX_MAGIC_CANDIDATES
            ),
        }
    }
}

impl std::error::Error for MagicError {}

/// Per-piece-type magic lookup data: one contiguous attack array
/// partitioned by per-square offsets.
pub(crate) struct MagicTable {
    masks: [u64; 64],
    magics: [u64; 64],
    shifts: [u32; 64],
    offsets: [usize; 64],
    attacks: Vec<u64>,
}

impl MagicTable {
    #[inline]
    pub(crate) fn lookup(&self, square: usize, occupancy: u64) -> u64 {
        let blockers = occupancy & self.masks[square];
        let index = (blockers.wrapping_mul(self.magics[square]) >> self.shifts[square]) as usize;
        self.attacks[self.offsets[square] + index]
    }

    /// Build the table for one piece type from a full set of magics.
    ///
    /// Every blocker subset of every square is hashed and checked against
    /// the classical ray attacks; a slot receiving two different attack
    /// sets means the magic constant is broken, which is a fatal error.
    fn build(
        magics: &[u64; 64],
        mask_for: fn(usize) -> u64,
        rays_for: fn(usize, u64) -> u64,
        total_entries: usize,
    ) -> MagicTable {
        let mut table = MagicTable {
            masks: [0; 64],
            magics: *magics,
            shifts: [0; 64],
            offsets: [0; 64],
            attacks: vec![0; total_entries],
        };

        let mut offset = 0;
        for sq in 0..64 {
            let mask = mask_for(sq);
            let bits = mask.count_ones();
            table.masks[sq] = mask;
            table.shifts[sq] = 64 - bits;
            table.offsets[sq] = offset;

            for index in 0..(1usize << bits) {
                let blockers = blocker_subset(index, mask);
                let attack = rays_for(sq, blockers);
                let key = (blockers.wrapping_mul(magics[sq]) >> table.shifts[sq]) as usize;
                let slot = &mut table.attacks[offset + key];
                if *slot == 0 {
                    *slot = attack;
                } else if *slot != attack {
                    panic!("magic constant for square {sq} maps two blocker sets to one slot");
                }
            }
            offset += 1 << bits;
        }
        debug_assert_eq!(offset, total_entries);
        table
    }
}

pub(crate) static ROOK_TABLE: Lazy<MagicTable> = Lazy::new(|| {
    let table = MagicTable::build(
        &ROOK_MAGICS,
        rook_blocker_mask,
        rook_ray_attacks,
        ROOK_TABLE_ENTRIES,
    );
    log::debug!("rook magic table built ({ROOK_TABLE_ENTRIES} entries)");
    table
});

pub(crate) static BISHOP_TABLE: Lazy<MagicTable> = Lazy::new(|| {
    let table = MagicTable::build(
        &BISHOP_MAGICS,
        bishop_blocker_mask,
        bishop_ray_attacks,
        BISHOP_TABLE_ENTRIES,
    );
    log::debug!("bishop magic table built ({BISHOP_TABLE_ENTRIES} entries)");
    table
});

/// Rook blocker mask: the four orthogonal rays from `sq`, excluding `sq`
/// itself and the outer edge square of each ray.
pub(crate) fn rook_blocker_mask(sq: usize) -> u64 {
    sliding_mask(sq, &ROOK_DIRECTIONS, true)
}

/// Bishop blocker mask: the four diagonal rays, edges excluded.
pub(crate) fn bishop_blocker_mask(sq: usize) -> u64 {
    sliding_mask(sq, &BISHOP_DIRECTIONS, false)
}

fn sliding_mask(sq: usize, directions: &[(isize, isize)], rook: bool) -> u64 {
    let rank = (sq / 8) as isize;
    let file = (sq % 8) as isize;
    let mut mask = 0u64;
    for &(dr, df) in directions {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            if rook {
                // A rook ray stops short of the edge in its travel direction only
                if (dr != 0 && (r == 0 || r == 7)) || (df != 0 && (f == 0 || f == 7)) {
                    break;
                }
            } else if r == 0 || r == 7 || f == 0 || f == 7 {
                break;
            }
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Classical ray-traced rook attacks; the reference for the magic tables.
pub(crate) fn rook_ray_attacks(sq: usize, occupancy: u64) -> u64 {
    ray_attacks(sq, occupancy, &ROOK_DIRECTIONS)
}

/// Classical ray-traced bishop attacks.
pub(crate) fn bishop_ray_attacks(sq: usize, occupancy: u64) -> u64 {
    ray_attacks(sq, occupancy, &BISHOP_DIRECTIONS)
}

fn ray_attacks(sq: usize, occupancy: u64, directions: &[(isize, isize)]) -> u64 {
    let rank = (sq / 8) as isize;
    let file = (sq % 8) as isize;
    let mut attacks = 0u64;
    for &(dr, df) in directions {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occupancy & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Build the blocker board selected by `index` out of the subsets of
/// `mask`, pairing bit `j` of the index with the j-th set bit of the mask.
pub(crate) fn blocker_subset(index: usize, mask: u64) -> u64 {
    let mut blockers = 0u64;
    let mut remaining = mask;
    let mut j = 0;
    while remaining != 0 {
        let bit = remaining & remaining.wrapping_neg();
        if index & (1 << j) != 0 {
            blockers |= bit;
        }
        remaining &= remaining - 1;
        j += 1;
    }
    blockers
}

/// Search for a magic number for `square` by trial and error.
///
/// Every blocker subset must map into the top `popcount(mask)` bits
/// injectively up to identical attack sets. Gives up after one million
/// candidates with `MagicError::BootstrapFailed`.
pub fn find_magic(square: usize, bishop: bool, rng: &mut impl Rng) -> Result<u64, MagicError> {
    let (mask, rays_for): (u64, fn(usize, u64) -> u64) = if bishop {
        (bishop_blocker_mask(square), bishop_ray_attacks)
    } else {
        (rook_blocker_mask(square), rook_ray_attacks)
    };
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let subsets = 1usize << bits;

    let mut blockers = vec![0u64; subsets];
    let mut attacks = vec![0u64; subsets];
    for index in 0..subsets {
        blockers[index] = blocker_subset(index, mask);
        attacks[index] = rays_for(square, blockers[index]);
    }

    let mut used = vec![0u64; subsets];
    for _ in 0..MAX_MAGIC_CANDIDATES {
        // Sparse candidates work far more often than uniform ones
        let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();

        used.iter_mut().for_each(|slot| *slot = 0);
        let mut valid = true;
        for index in 0..subsets {
            let key = (blockers[index].wrapping_mul(magic) >> shift) as usize;
            if used[key] == 0 {
                used[key] = attacks[index];
            } else if used[key] != attacks[index] {
                valid = false;
                break;
            }
        }

        if valid {
            return Ok(magic);
        }
    }

    Err(MagicError::BootstrapFailed { square, bishop })
}

/// Reference rook magics, one per square, generated by [`find_magic`].
const ROOK_MAGICS: [u64; 64] = [
    0x0480_0460_1082_4000,
    0x09c0_02e0_00b0_0440,
    0x4080_1000_0880_2004,
    0x0900_0c90_0009_0060,
    0x6a00_0814_2600_3020,
    0x0180_0400_0980_2a00,
    0x4200_08a4_0200_0128,
    0x2100_0140_3300_0382,
    0x1443_0021_0580_00c4,
    0x0880_4000_2010_004c,
    0x07b1_0010_6000_4703,
    0x7a16_0010_29a2_0240,
    0x0205_0038_0004_1100,
    0x040a_000c_0846_0070,
    0x2084_0044_2126_4810,
    0x1081_0009_0000_4082,
    0x0021_2080_0880_4008,
    0x2810_0440_05a0_0040,
    0x5802_0200_4380_1020,
    0x5004_5200_0a00_4020,
    0x0644_0080_04b8_0080,
    0x100b_0100_1400_2886,
    0x4200_0c00_0810_0221,
    0x1402_1200_0a81_4504,
    0x0802_4206_0021_0081,
    0x2204_6283_0040_0100,
    0x1076_0022_0011_4980,
    0x1081_00a5_0008_5001,
    0x0043_0033_0008_0014,
    0x006c_000c_0110_6008,
    0x2040_650c_0008_1006,
    0x0404_4082_0004_0341,
    0x30c2_4000_2880_0288,
    0x00a0_400b_0100_2481,
    0x408e_0182_2200_11c0,
    0x050a_00a8_4200_2010,
    0x4108_0091_0100_092c,
    0x4064_0010_0c01_2088,
    0x2011_4811_0c00_1230,
    0x0906_4080_4a00_0401,
    0x1080_02e0_0050_4008,
    0x4e90_1220_00c0_4000,
    0x2622_00f1_4182_0020,
    0x0543_0010_000b_0022,
    0x3102_2500_0801_0011,
    0x4042_0008_1102_0044,
    0x0240_0e05_1034_0018,
    0x2290_048c_0262_000b,
    0x1180_0125_4c81_0700,
    0x1001_4003_0081_3300,
    0x4659_0034_2009_4100,
    0x0441_6300_18f0_0100,
    0x2841_0056_0800_1100,
    0x0326_0010_3884_0200,
    0x07a5_2608_4350_0400,
    0x5484_6889_0844_0e00,
    0x01e5_4101_508a_0022,
    0x1108_2100_18c0_0081,
    0x1202_0080_1832_2042,
    0x0749_2459_0020_7001,
    0x4b46_0048_30a0_0412,
    0x0282_0090_0824_0b16,
    0x1400_5208_0093_1004,
    0x06a8_4184_0108_22c2,
];

/// Reference bishop magics, one per square.
const BISHOP_MAGICS: [u64; 64] = [
    0x04c0_0448_0200_4490,
    0x41b9_0204_2c04_2010,
    0x0e08_2801_1230_2118,
    0x0584_1502_080a_0124,
    0x214c_04a2_0864_0001,
    0x41a6_0210_2c6a_2459,
    0x4019_0110_0223_0408,
    0x43b2_018a_0832_0216,
    0x28c3_0861_0102_2201,
    0x18a9_2832_4b94_0101,
    0x0000_1802_0042_0442,
    0x0680_1c41_2190_04c0,
    0x0142_5202_1180_0404,
    0x4044_0208_12a8_0031,
    0x2408_6c0c_020e_1200,
    0x0802_6243_0498_20c9,
    0x3741_0420_4c2c_05a0,
    0x0d61_2c36_0202_0603,
    0x49c8_0090_0860_4050,
    0x028c_004a_0162_0000,
    0x458a_0064_0123_1028,
    0x1012_0112_2190_0840,
    0x2642_1041_0890_340b,
    0x090d_0008_6121_1019,
    0x1124_20b4_4202_040f,
    0x0618_20c2_188a_2180,
    0x0208_0801_0186_00c1,
    0x1b84_0040_0403_0002,
    0x0992_0090_0600_5001,
    0x2028_0e00_0041_0680,
    0x1245_2070_0cf8_0800,
    0x0704_0500_6680_5329,
    0x0d04_0640_0018_5123,
    0x2008_1432_6c6c_1801,
    0x2a44_00c8_1504_0860,
    0x4080_1808_0136_0a00,
    0x2044_0242_0024_0108,
    0x109a_060a_0008_4810,
    0x0890_311f_1402_4400,
    0x4672_4081_222a_0200,
    0x0184_0618_0c08_4018,
    0x40b1_0ac2_102c_2034,
    0x1602_0944_0208_1008,
    0x01c0_20f1_4400_4808,
    0x4b82_2802_2820_6401,
    0x4c82_5022_0060_0200,
    0x4412_1004_0101_23b0,
    0x4288_2818_4182_41c0,
    0x080c_1104_5220_0400,
    0x268e_0842_0a10_080b,
    0x0191_4844_0404_0021,
    0x0c18_101c_2198_0215,
    0x2108_7418_4304_0442,
    0x410e_640c_0802_1002,
    0x0840_484b_1b22_0414,
    0x0888_1234_040c_22c0,
    0x4085_0028_010c_1005,
    0x5a00_0e01_0508_4228,
    0x3211_120d_0045_1020,
    0x0128_500a_2894_0c05,
    0x3900_0404_040d_0400,
    0x1145_0a20_5410_0484,
    0x0910_2258_3029_0841,
    0x0020_2002_1200_23a2,
];
