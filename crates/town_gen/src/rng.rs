//! Seeded, string-keyed random streams and stable identifiers.
//!
//! Every stage of the pipeline draws from a [`TownRng`]: a mulberry32 stream whose
//! state is derived from [`hash32`] of a seed string. Stages accept any
//! [`rand::RngCore`] and turn raw `u32` draws into floats with [`rand01`], so a
//! `TownRng` can be swapped for another generator in tests.
//!
//! Per-entity streams come from [`rng_for`], which rehashes `seed::entity::channel`
//! so that one entity's randomness does not depend on how many draws happened before it.
use rand::RngCore;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// 32-bit avalanche hash of a string, computed over its UTF-16 code units.
pub fn hash32(input: &str) -> u32 {
    let units: Vec<u16> = input.encode_utf16().collect();
    let mut h: u32 = 1_779_033_703 ^ units.len() as u32;
    for &unit in &units {
        h = (h ^ unit as u32).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// Hash a string into a float in `[0, 1)`.
pub fn hash_to_unit(input: &str) -> f64 {
    hash32(input) as f64 / TWO_POW_32
}

/// Deterministic mulberry32 stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TownRng {
    state: u32,
}

impl TownRng {
    /// Create a stream from a raw 32-bit state.
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Create a stream keyed by a seed string.
    pub fn from_seed_str(seed: &str) -> Self {
        Self::from_state(hash32(seed))
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next float in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / TWO_POW_32
    }

    pub fn range(&mut self, a: f64, b: f64) -> f64 {
        rand_range(self, a, b)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        chance(self, p)
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        rand_index(self, len)
    }
}

impl RngCore for TownRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Root stream for a generation run.
pub fn make_rng(seed: &str) -> TownRng {
    TownRng::from_seed_str(seed)
}

/// Independent stream for one entity and purpose.
pub fn rng_for(seed: &str, entity_id: &str, channel: &str) -> TownRng {
    make_rng(&format!("{seed}::{entity_id}::{channel}"))
}

/// Short deterministic id: `prefix` followed by the base-36 hash of `seed::signature`.
pub fn stable_id(prefix: &str, seed: &str, signature: &str) -> String {
    let h = hash32(&format!("{seed}::{signature}"));
    format!("{prefix}{}", to_base36(h))
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::with_capacity(7);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Generate a random float in the range [0, 1).
#[inline]
pub fn rand01(rng: &mut dyn RngCore) -> f64 {
    rng.next_u32() as f64 / TWO_POW_32
}

/// Uniform float between `a` and `b`.
#[inline]
pub fn rand_range(rng: &mut dyn RngCore, a: f64, b: f64) -> f64 {
    lerp(a, b, rand01(rng))
}

/// Centered jitter in `[-scale/2, scale/2)`.
#[inline]
pub fn rand_centered(rng: &mut dyn RngCore, scale: f64) -> f64 {
    (rand01(rng) - 0.5) * scale
}

/// `true` with probability `p`.
#[inline]
pub fn chance(rng: &mut dyn RngCore, p: f64) -> bool {
    rand01(rng) < p
}

/// Uniform index in `0..len`, or `0` when `len` is zero.
#[inline]
pub fn rand_index(rng: &mut dyn RngCore, len: usize) -> usize {
    ((rand01(rng) * len as f64) as usize).min(len.saturating_sub(1))
}

#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    #[test]
    fn hash32_is_stable_for_known_inputs() {
        assert_eq!(hash32("winack"), hash32("winack"));
        assert_ne!(hash32("winack"), hash32("winacl"));
        assert_ne!(hash32(""), hash32(" "));
    }

    #[test]
    fn hash32_counts_utf16_units() {
        // Same code units, different encoding length in UTF-8.
        assert_ne!(hash32("é"), hash32("e"));
        assert_eq!(hash32("é"), hash32("\u{e9}"));
    }

    #[test]
    fn hash_to_unit_stays_in_range() {
        for s in ["a", "b", "winack", "town::42::building"] {
            let v = hash_to_unit(s);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn streams_repeat_for_equal_seeds() {
        let mut a = make_rng("winack");
        let mut b = make_rng("winack");
        for _ in 0..64 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn floats_are_half_open_unit_interval() {
        let mut rng = make_rng("range");
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn clone_forks_an_identical_cursor() {
        let mut rng = make_rng("fork");
        rng.next_f64();
        let mut fork = rng.clone();
        assert_eq!(rng.next_f64(), fork.next_f64());
    }

    #[test]
    fn rand01_matches_inherent_float() {
        let mut a = make_rng("same");
        let mut b = make_rng("same");
        assert_eq!(a.next_f64(), rand01(&mut b));
    }

    #[test]
    fn rand01_handles_extremes() {
        assert_eq!(rand01(&mut FixedRng { value: 0 }), 0.0);
        let top = rand01(&mut FixedRng { value: u32::MAX });
        assert!(top < 1.0);
    }

    #[test]
    fn rng_for_is_independent_of_root_draws() {
        let mut root = make_rng("seed");
        for _ in 0..100 {
            root.next_f64();
        }
        let mut a = rng_for("seed", "parcel_x", "building");
        let mut b = rng_for("seed", "parcel_x", "building");
        assert_eq!(a.next_f64(), b.next_f64());

        let mut other = rng_for("seed", "parcel_x", "color");
        let mut a = rng_for("seed", "parcel_x", "building");
        assert_ne!(a.next_f64(), other.next_f64());
    }

    #[test]
    fn stable_id_uses_prefix_and_base36() {
        let id = stable_id("block_", "winack", "1:2:300");
        assert!(id.starts_with("block_"));
        let tail = &id["block_".len()..];
        assert!(!tail.is_empty());
        assert!(tail.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(id, stable_id("block_", "winack", "1:2:300"));
        assert_ne!(id, stable_id("block_", "other", "1:2:300"));
    }

    #[test]
    fn base36_encodes_boundaries() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }

    #[test]
    fn helpers_draw_one_value_each() {
        let mut rng = make_rng("helpers");
        let mut twin = rng.clone();
        let v = rng.range(10.0, 20.0);
        assert!((10.0..20.0).contains(&v));
        assert_eq!(v, 10.0 + 10.0 * twin.next_f64());
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
        for _ in 0..100 {
            assert!(rng.index(7) < 7);
        }
    }

    #[test]
    fn rand_index_handles_extremes() {
        assert_eq!(rand_index(&mut FixedRng { value: u32::MAX }, 7), 6);
        assert_eq!(rand_index(&mut FixedRng { value: 0 }, 7), 0);
        assert_eq!(rand_index(&mut FixedRng { value: u32::MAX }, 0), 0);
    }

    #[test]
    fn fill_bytes_handles_partial_chunks() {
        let mut rng = make_rng("bytes");
        let mut buf = [0u8; 7];
        rng.fill_bytes(&mut buf);
        let mut again = make_rng("bytes");
        let first = again.next_u32().to_le_bytes();
        assert_eq!(&buf[..4], &first);
    }
}
