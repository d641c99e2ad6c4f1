//! Short random codes used for reservations, staff codes and passenger ids.
//!
//! The generator knows nothing about which codes are taken. Callers that
//! need uniqueness pass a predicate to [`CodeGenerator::generate_unique`],
//! which retries until the predicate accepts a code.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Symbols a code is drawn from.
pub const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every generated code.
pub const CODE_LEN: usize = 6;

/// Check that `code` is exactly [`CODE_LEN`] symbols from [`ALPHABET`].
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Random code source.
///
/// Holds one RNG seeded at construction and shared by every call, so codes
/// requested back to back never come from freshly re-seeded generators.
#[derive(Debug)]
pub struct CodeGenerator {
    rng: Mutex<StdRng>,
}

impl CodeGenerator {
    /// Create a generator seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a reproducible generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Produce one code, each symbol uniform over [`ALPHABET`].
    #[must_use]
    pub fn generate(&self) -> String {
        // A poisoned RNG is still a valid RNG.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..CODE_LEN)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect()
    }

    /// Generate codes until `is_taken` returns `false` for one.
    ///
    /// With about 31 bits per code this loops more than once only when the
    /// scope already holds many thousands of codes.
    pub fn generate_unique(&self, mut is_taken: impl FnMut(&str) -> bool) -> String {
        loop {
            let code = self.generate();
            if !is_taken(&code) {
                return code;
            }
            tracing::debug!(code = %code, "generated code collided, retrying");
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_format() {
        let generator = CodeGenerator::new();
        for _ in 0..100 {
            let code = generator.generate();
            assert_eq!(code.len(), CODE_LEN);
            assert!(is_valid_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_generate_mostly_distinct() {
        let generator = CodeGenerator::new();
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert!(codes.len() >= 990, "only {} distinct codes", codes.len());
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = CodeGenerator::seeded(7);
        let b = CodeGenerator::seeded(7);
        assert_eq!(a.generate(), b.generate());
        assert_eq!(a.generate(), b.generate());
    }

    #[test]
    fn test_generate_unique_skips_taken_codes() {
        let probe = CodeGenerator::seeded(42);
        let first = probe.generate();
        let second = probe.generate();

        let generator = CodeGenerator::seeded(42);
        let code = generator.generate_unique(|c| c == first);
        assert_eq!(code, second);
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("AB12CD"));
        assert!(is_valid_code("000000"));
        assert!(!is_valid_code("ab12cd"));
        assert!(!is_valid_code("AB12C"));
        assert!(!is_valid_code("AB12CDE"));
        assert!(!is_valid_code("AB-2CD"));
    }

    #[test]
    fn test_all_symbols_reachable() {
        let generator = CodeGenerator::seeded(1);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(generator.generate().bytes());
        }
        assert_eq!(seen.len(), ALPHABET.len());
    }
}
