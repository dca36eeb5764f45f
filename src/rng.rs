use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::spatial::{Coord, GridDims};

/// Hands out one deterministic ChaCha stream per system name, all derived from a master seed.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    /// Borrow the stream for `name`, seeding it from the master on first use.
    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let master = &mut self.master;
        let stream = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(master.next_u64()));
        SystemRng(stream)
    }
}

/// A system's view of its own stream for the current step.
pub struct SystemRng<'a>(&'a mut ChaCha8Rng);

impl SystemRng<'_> {
    /// Uniform cell of the grid: column first, then row.
    pub fn gen_cell(&mut self, dims: GridDims) -> Coord {
        let x = self.0.gen_range(0..dims.width);
        let y = self.0.gen_range(0..dims.height);
        Coord::new(x, y)
    }
}

impl RngCore for SystemRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
