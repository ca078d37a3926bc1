use rand::Rng;
use rand::seq::IndexedRandom;

pub const DEFAULT_MAX_NUMBER: u32 = 75;

/// Holds the pool of numbers 1..=max and picks the next one to call.
///
/// The machine never remembers what it has drawn: the caller passes the
/// drawn numbers on every call and owns that state between calls.
#[derive(Debug, Clone)]
pub struct BingoMachine {
    numbers: Vec<u32>,
}

impl Default for BingoMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NUMBER)
    }
}

impl BingoMachine {
    pub fn new(max_number: u32) -> Self {
        Self { numbers: (1..=max_number).collect() }
    }

    pub fn max_number(&self) -> u32 {
        self.numbers.len() as u32
    }

    /// Returns `forced` when it is in range and not drawn yet, otherwise a
    /// uniformly random remaining number. `None` means the pool is exhausted.
    ///
    /// Callers pass `&mut rand::rng()` in normal use and a seeded RNG in tests.
    pub fn draw<R: Rng + ?Sized>(&self, drawn: &[u32], forced: Option<u32>, rng: &mut R) -> Option<u32> {
        if let Some(n) = forced {
            if self.is_valid_forced(drawn, n) {
                return Some(n);
            }
            tracing::debug!(forced = n, "forced number rejected, falling back to random draw");
        }

        let remaining = self.remaining(drawn);
        remaining.choose(rng).copied()
    }

    pub fn is_valid_forced(&self, drawn: &[u32], n: u32) -> bool {
        (1..=self.max_number()).contains(&n) && !drawn.contains(&n)
    }

    pub fn remaining(&self, drawn: &[u32]) -> Vec<u32> {
        self.numbers.iter().copied().filter(|n| !drawn.contains(n)).collect()
    }

    pub fn numbers(&self) -> Vec<u32> {
        self.numbers.clone()
    }
}
