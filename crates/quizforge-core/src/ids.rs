//! Opaque identifier generation for delivery-scoped ids.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

/// Characters used for generated ids. Omits `0 O 1 l I`.
pub const ID_ALPHABET: &[u8] = b"23456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Produces opaque identifiers of a requested length.
pub trait IdGenerator: Send + Sync {
    fn fresh_id(&self, length: usize) -> String;
}

/// Random ids drawn from [`ID_ALPHABET`] using the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn fresh_id(&self, length: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

/// Deterministic ids (`id1`, `id2`, ...) for reproducible output and tests.
///
/// The counter is zero-padded to the requested length when it fits.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn fresh_id(&self, length: usize) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let width = length.saturating_sub(2);
        format!("id{n:0width$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_use_unambiguous_alphabet() {
        let ids = RandomIds;
        for _ in 0..50 {
            let id = ids.fresh_id(16);
            assert_eq!(id.len(), 16);
            assert!(!id.contains(['0', 'O', '1', 'l', 'I']), "ambiguous char in {id}");
        }
        assert_ne!(ids.fresh_id(16), ids.fresh_id(16));
        assert_eq!(ids.fresh_id(0), "");
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new();
        assert_eq!(ids.fresh_id(6), "id0001");
        assert_eq!(ids.fresh_id(6), "id0002");
        assert_eq!(ids.fresh_id(0), "id3");
    }
}
