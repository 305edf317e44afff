use rand::rngs::StdRng;
use rand::SeedableRng;

/// Derive a per-query sampling seed from stable inputs only.
///
/// Independent of scheduling order, so parallel and sequential runs draw
/// the same sample for the same query.
pub fn derive_seed(base_seed: u64, province: &str, normalized_name: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&base_seed.to_le_bytes());
    hasher.update(province.trim().to_uppercase().as_bytes());
    hasher.update(&[0]);
    hasher.update(normalized_name.as_bytes());
    let digest = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(seed)
}

/// Positions `0..len` to score, at most `cap` of them, ascending.
///
/// Returns every position when `len <= cap`; otherwise a uniform sample
/// without replacement drawn from `seed`.
pub fn sample_positions(len: usize, cap: usize, seed: u64) -> Vec<usize> {
    if len <= cap {
        return (0..len).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = rand::seq::index::sample(&mut rng, len, cap).into_vec();
    positions.sort_unstable();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_sets_are_taken_whole() {
        assert_eq!(sample_positions(4, 5000, 7), vec![0, 1, 2, 3]);
        assert_eq!(sample_positions(5000, 5000, 7).len(), 5000);
    }

    #[test]
    fn large_sets_are_capped_and_sorted() {
        let s = sample_positions(12_000, 5000, 42);
        assert_eq!(s.len(), 5000);
        assert!(s.windows(2).all(|w| w[0] < w[1]));
        assert!(*s.last().unwrap() < 12_000);
    }

    #[test]
    fn same_seed_same_sample() {
        assert_eq!(sample_positions(9000, 100, 99), sample_positions(9000, 100, 99));
    }

    #[test]
    fn seed_depends_on_query_and_province() {
        let a = derive_seed(42, "Kalimantan Timur", "KELADEN");
        assert_eq!(a, derive_seed(42, " kalimantan timur ", "KELADEN"));
        assert_ne!(a, derive_seed(42, "Kalimantan Timur", "KLADEN"));
        assert_ne!(a, derive_seed(42, "Kalimantan Barat", "KELADEN"));
        assert_ne!(a, derive_seed(43, "Kalimantan Timur", "KELADEN"));
    }
}
