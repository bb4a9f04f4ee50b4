use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of randomness for the whole kernel. Each phase draws from its own
/// named stream so adding draws in one phase does not shift the others.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self::from_master(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Unseeded source; runs are not reproducible.
    pub fn from_entropy() -> Self {
        Self::from_master(ChaCha8Rng::from_entropy())
    }

    fn from_master(master: ChaCha8Rng) -> Self {
        Self {
            master,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let master = &mut self.master;
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_u64 = [0u8; 8];
            master.fill_bytes(&mut seed_u64);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_u64))
        });
        SystemRng { inner: entry }
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::from_entropy()
    }
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
