use crate::error::Error;
use rand::{rngs::OsRng, Rng, RngCore};
use std::{
    collections::VecDeque,
    fmt::Debug,
    sync::{Mutex, PoisonError},
};

const ALPHANUMERIC: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of the random draws made while rendering a response.
pub trait RandomSource: Debug + Send + Sync {
    /// A uniform value in `[0, 1)`.
    fn next_unit(&self) -> f64;

    /// A uniform index in `[0, bound)`. `bound` is never zero.
    fn next_index(&self, bound: usize) -> usize;

    /// `len` characters drawn from `[0-9a-z]`.
    fn next_alphanumeric(&self, len: usize) -> String;

    /// Checked once before a destination starts serving.
    fn check(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Draws from the calling thread's generator, so concurrent requests never
/// share generator state.
#[derive(Debug, Clone, Copy)]
pub struct ThreadRandom {
    _private: (),
}

impl ThreadRandom {
    /// Fails with `Error::RandomSourceUnavailable` if the system's entropy
    /// source can't be read.
    pub fn new() -> Result<Self, Error> {
        let random = Self { _private: () };
        random.check()?;
        Ok(random)
    }
}

fn probe_entropy<R: RngCore>(entropy: &mut R) -> Result<(), Error> {
    let mut probe = [0u8; 16];
    entropy
        .try_fill_bytes(&mut probe)
        .map_err(|e| Error::RandomSourceUnavailable(e.to_string()))
}

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn next_index(&self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }

    fn next_alphanumeric(&self, len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
            .collect()
    }

    fn check(&self) -> Result<(), Error> {
        probe_entropy(&mut OsRng)
    }
}

/// Replays fixed draws, cycling once a sequence runs out.
///
/// Lets tests walk a fault destination through every branch and scenario in
/// a known order.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    units: Mutex<VecDeque<f64>>,
    indices: Mutex<VecDeque<usize>>,
    characters: Mutex<usize>,
}

impl ScriptedRandom {
    pub fn new<U: IntoIterator<Item = f64>, I: IntoIterator<Item = usize>>(
        units: U,
        indices: I,
    ) -> Self {
        Self {
            units: Mutex::new(units.into_iter().collect()),
            indices: Mutex::new(indices.into_iter().collect()),
            characters: Mutex::new(0),
        }
    }

    fn cycle<T: Copy>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
        let mut queue = queue.lock().unwrap_or_else(PoisonError::into_inner);
        let next = queue.pop_front()?;
        queue.push_back(next);
        Some(next)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        Self::cycle(&self.units).unwrap_or(0.0)
    }

    fn next_index(&self, bound: usize) -> usize {
        Self::cycle(&self.indices).unwrap_or(0) % bound
    }

    fn next_alphanumeric(&self, len: usize) -> String {
        let mut offset = self
            .characters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let start = *offset;
        *offset = (start + len) % ALPHANUMERIC.len();

        (start..start + len)
            .map(|i| ALPHANUMERIC[i % ALPHANUMERIC.len()] as char)
            .collect()
    }
}
