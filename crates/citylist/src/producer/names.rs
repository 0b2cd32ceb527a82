use rand::{Rng, SeedableRng, rngs::StdRng};

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Length of every generated name.
pub const NAME_LEN: usize = 10;

/// Deterministic source of title-cased city names.
///
/// Each producer owns its own generator, so two producers built from the same
/// seed yield the same names in the same order regardless of what else runs
/// in the process.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    rng: StdRng,
}

impl NameGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns [`NAME_LEN`] random ASCII letters, the first one upper-cased.
    pub fn next_name(&mut self) -> String {
        let mut name = String::with_capacity(NAME_LEN);
        for i in 0..NAME_LEN {
            let letter = ALPHABET[self.rng.random_range(0..ALPHABET.len())] as char;
            if i == 0 {
                name.push(letter.to_ascii_uppercase());
            } else {
                name.push(letter);
            }
        }
        name
    }
}
