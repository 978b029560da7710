//! Reproducible pairing and shuffling of review units.
//!
//! The review order must be identical every time a session is rebuilt from
//! the same collections, so both the base enumeration (item outer, label
//! inner) and the random stream are fixed:
//!
//! - [`Mt19937`] is the 32-bit Mersenne Twister, seeded from an integer by
//!   splitting it into 32-bit words and running `init_by_array`.
//! - [`shuffle_units_with`] is a Fisher–Yates walk from the last index down,
//!   drawing each swap index by bit-length rejection sampling.
//!
//! Together they reproduce the ordering of the original review tool for the
//! same seed, so blinded orderings stay comparable across versions.

use rand::RngCore;

use crate::review::unit::{CandidateLabel, ItemId, ReviewUnit};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 666;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// 32-bit Mersenne Twister (MT19937).
#[derive(Clone)]
pub struct Mt19937 {
    state: Box<[u32; N]>,
    index: usize,
}

impl Mt19937 {
    /// Seed from a single 32-bit value (`init_genrand`).
    #[must_use]
    pub fn new(seed: u32) -> Self {
        let mut state = Box::new([0u32; N]);
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self { state, index: N }
    }

    /// Seed from a key of 32-bit words (`init_by_array`).
    #[must_use]
    pub fn from_key(key: &[u32]) -> Self {
        let mut rng = Self::new(19_650_218);
        let mt = &mut rng.state;
        let key: &[u32] = if key.is_empty() { &[0] } else { key };

        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(key.len()) {
            let prev = mt[i - 1];
            mt[i] = (mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = mt[i - 1];
            mt[i] = (mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
        }
        mt[0] = UPPER_MASK;
        rng
    }

    /// Seed from an integer, least significant 32-bit word first.
    #[must_use]
    pub fn from_seed_u64(seed: u64) -> Self {
        let low = seed as u32;
        let high = (seed >> 32) as u32;
        if high == 0 {
            Self::from_key(&[low])
        } else {
            Self::from_key(&[low, high])
        }
    }

    fn twist(&mut self) {
        let mt = &mut self.state;
        for kk in 0..N {
            let y = (mt[kk] & UPPER_MASK) | (mt[(kk + 1) % N] & LOWER_MASK);
            let mag = if y & 1 == 0 { 0 } else { MATRIX_A };
            mt[kk] = mt[(kk + M) % N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }

    fn next_word(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }
}

impl std::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937").field("index", &self.index).finish_non_exhaustive()
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_word());
        let high = u64::from(self.next_word());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Draw the top `bits` bits of the random stream (`bits` in 1..=64).
///
/// Words are consumed least significant first.
fn random_bits<R: RngCore + ?Sized>(rng: &mut R, bits: u32) -> u64 {
    if bits <= 32 {
        u64::from(rng.next_u32() >> (32 - bits))
    } else {
        let low = u64::from(rng.next_u32());
        let high = u64::from(rng.next_u32() >> (64 - bits));
        (high << 32) | low
    }
}

/// Uniform draw in `0..bound` by rejection on the bit length of `bound`.
fn random_below<R: RngCore + ?Sized>(rng: &mut R, bound: u64) -> u64 {
    debug_assert!(bound > 0);
    let bits = u64::BITS - bound.leading_zeros();
    loop {
        let r = random_bits(rng, bits);
        if r < bound {
            return r;
        }
    }
}

/// Enumerate every (item, label) pair, item outer and label inner.
#[must_use]
pub fn pair_units(items: &[ItemId], labels: &[CandidateLabel]) -> Vec<ReviewUnit> {
    items
        .iter()
        .flat_map(|item| {
            labels.iter().map(move |label| ReviewUnit {
                item: item.clone(),
                label: label.clone(),
            })
        })
        .collect()
}

/// Shuffle `units` in place with the given generator.
pub fn shuffle_units_with<T, R: RngCore + ?Sized>(units: &mut [T], rng: &mut R) {
    for i in (1..units.len()).rev() {
        let j = random_below(rng, i as u64 + 1) as usize;
        units.swap(i, j);
    }
}

/// Build the review order: pair items with labels, then shuffle with an
/// MT19937 stream seeded by `seed`.
#[must_use]
pub fn shuffled_units(items: &[ItemId], labels: &[CandidateLabel], seed: u64) -> Vec<ReviewUnit> {
    let mut units = pair_units(items, labels);
    let mut rng = Mt19937::from_seed_u64(seed);
    shuffle_units_with(&mut units, &mut rng);
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ItemId> {
        names.iter().map(|n| ItemId::new(*n)).collect()
    }

    fn labels(names: &[&str]) -> Vec<CandidateLabel> {
        names.iter().map(|n| CandidateLabel::new(*n)).collect()
    }

    #[test]
    fn test_mt19937_reference_outputs() {
        let mut rng = Mt19937::from_seed_u64(666);
        assert_eq!(rng.next_u32(), 1959018967);
        assert_eq!(rng.next_u32(), 4216997439);
        assert_eq!(rng.next_u32(), 3879743412);
    }

    #[test]
    fn test_mt19937_init_genrand_reference() {
        // First output of the reference implementation seeded with 5489.
        let mut rng = Mt19937::new(5489);
        assert_eq!(rng.next_u32(), 3499211612);
    }

    #[test]
    fn test_shuffle_indices_reference_order() {
        let mut values: Vec<u32> = (0..10).collect();
        let mut rng = Mt19937::from_seed_u64(666);
        shuffle_units_with(&mut values, &mut rng);
        assert_eq!(values, vec![1, 3, 5, 9, 0, 4, 2, 8, 6, 7]);
    }

    #[test]
    fn test_pair_units_base_order() {
        let units = pair_units(&ids(&["a.png", "b.png"]), &labels(&["X", "Y"]));
        assert_eq!(
            units,
            vec![
                ReviewUnit::new("a.png", "X"),
                ReviewUnit::new("a.png", "Y"),
                ReviewUnit::new("b.png", "X"),
                ReviewUnit::new("b.png", "Y"),
            ]
        );
    }

    #[test]
    fn test_shuffled_units_reference_order() {
        let units = shuffled_units(&ids(&["a.png", "b.png"]), &labels(&["X", "Y"]), DEFAULT_SEED);
        assert_eq!(
            units,
            vec![
                ReviewUnit::new("a.png", "X"),
                ReviewUnit::new("b.png", "X"),
                ReviewUnit::new("a.png", "Y"),
                ReviewUnit::new("b.png", "Y"),
            ]
        );

        let units = shuffled_units(
            &ids(&["a.png", "b.png", "c.png"]),
            &labels(&["RealCD4", "OutputCD4"]),
            DEFAULT_SEED,
        );
        let order: Vec<(&str, &str)> = units
            .iter()
            .map(|u| (u.item.as_str(), u.label.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("b.png", "RealCD4"),
                ("a.png", "RealCD4"),
                ("a.png", "OutputCD4"),
                ("c.png", "RealCD4"),
                ("c.png", "OutputCD4"),
                ("b.png", "OutputCD4"),
            ]
        );
    }

    #[test]
    fn test_shuffled_units_deterministic_and_complete() {
        let items: Vec<ItemId> = (0..40).map(|i| ItemId::new(format!("img{i:03}.png"))).collect();
        let labels = labels(&["A", "B", "C"]);

        let first = shuffled_units(&items, &labels, 42);
        let second = shuffled_units(&items, &labels, 42);
        assert_eq!(first, second);
        assert_eq!(first.len(), items.len() * labels.len());

        let unique: std::collections::HashSet<&ReviewUnit> = first.iter().collect();
        assert_eq!(unique.len(), first.len());

        let other = shuffled_units(&items, &labels, 43);
        assert_ne!(first, other);
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        let mut rng = Mt19937::from_seed_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle_units_with(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec![7u8];
        shuffle_units_with(&mut one, &mut rng);
        assert_eq!(one, vec![7]);
    }

    #[test]
    fn test_random_below_stays_in_range() {
        let mut rng = Mt19937::from_seed_u64(9);
        for bound in [1u64, 2, 3, 7, 8, 1000, 1 << 33] {
            for _ in 0..50 {
                assert!(random_below(&mut rng, bound) < bound);
            }
        }
    }
}
