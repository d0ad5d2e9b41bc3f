//! # Samplers
//!
//! A [`Sampler`] hands out fixed-size slices of a corpus, one epoch at a time.

use crate::{NmtError, NmtResult, array, corpus::Sample, random::Random};

/// Epoch-based source of sample batches.
pub trait Sampler {
    /// Start a new epoch.
    fn rewind(&mut self);

    /// Are samples left in this epoch?
    fn has_samples(&self) -> bool;

    /// Take the next batch; the last batch of an epoch may be short.
    ///
    /// Returns an empty vector once the epoch is exhausted.
    fn next_samples(&mut self) -> Vec<Sample>;

    /// The number of samples per epoch.
    fn num_samples(&self) -> usize;
}

fn check_batch_size(batch_size: usize) -> NmtResult<()> {
    if batch_size == 0 {
        return Err(NmtError::config("sampler batch size must be > 0"));
    }
    Ok(())
}

/// Yields samples in corpus order.
#[derive(Debug, Clone)]
pub struct SequentialSampler {
    samples: Vec<Sample>,
    batch_size: usize,
    cursor: usize,
}

impl SequentialSampler {
    /// Create a sampler.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if `batch_size == 0`.
    pub fn new(
        samples: Vec<Sample>,
        batch_size: usize,
    ) -> NmtResult<Self> {
        check_batch_size(batch_size)?;
        Ok(Self {
            samples,
            batch_size,
            cursor: 0,
        })
    }
}

impl Sampler for SequentialSampler {
    fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn has_samples(&self) -> bool {
        self.cursor < self.samples.len()
    }

    fn next_samples(&mut self) -> Vec<Sample> {
        let end = (self.cursor + self.batch_size).min(self.samples.len());
        let batch = self.samples[self.cursor..end].to_vec();
        self.cursor = end;
        batch
    }

    fn num_samples(&self) -> usize {
        self.samples.len()
    }
}

/// Yields samples in a fresh random order every epoch.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    samples: Vec<Sample>,
    batch_size: usize,
    order: Vec<usize>,
    cursor: usize,
    rng: Random,
}

impl RandomSampler {
    /// Create a sampler; the first epoch is already shuffled.
    ///
    /// ## Arguments
    /// * `samples` - the corpus.
    /// * `batch_size` - samples per batch.
    /// * `seed` - the [`Random`] seed; `0` is non-deterministic.
    pub fn new(
        samples: Vec<Sample>,
        batch_size: usize,
        seed: u32,
    ) -> NmtResult<Self> {
        check_batch_size(batch_size)?;
        let order = (0..samples.len()).collect();
        let mut sampler = Self {
            samples,
            batch_size,
            order,
            cursor: 0,
            rng: Random::new(seed),
        };
        sampler.rewind();
        Ok(sampler)
    }
}

impl Sampler for RandomSampler {
    fn rewind(&mut self) {
        array::shuffle(&mut self.order, &mut self.rng);
        self.cursor = 0;
    }

    fn has_samples(&self) -> bool {
        self.cursor < self.order.len()
    }

    fn next_samples(&mut self) -> Vec<Sample> {
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.order[self.cursor..end]
            .iter()
            .map(|&i| self.samples[i].clone())
            .collect();
        self.cursor = end;
        batch
    }

    fn num_samples(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: u32) -> Vec<Sample> {
        (0..n).map(|i| Sample::new(vec![i], vec![i])).collect()
    }

    fn drain(sampler: &mut dyn Sampler) -> Vec<Vec<u32>> {
        let mut batches = Vec::new();
        while sampler.has_samples() {
            batches.push(
                sampler
                    .next_samples()
                    .into_iter()
                    .map(|s| s.source[0])
                    .collect(),
            );
        }
        batches
    }

    #[test]
    fn test_sequential() {
        let mut sampler = SequentialSampler::new(samples(5), 2).unwrap();
        assert_eq!(sampler.num_samples(), 5);
        assert_eq!(drain(&mut sampler), vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert!(sampler.next_samples().is_empty());

        sampler.rewind();
        assert_eq!(drain(&mut sampler).len(), 3);
    }

    #[test]
    fn test_random_epochs() {
        let mut sampler = RandomSampler::new(samples(10), 3, 1).unwrap();
        let first: Vec<u32> = drain(&mut sampler).concat();
        // Matches `shuffle` of 0..10 under seed 1.
        assert_eq!(first, vec![5, 6, 1, 2, 0, 8, 9, 3, 7, 4]);

        sampler.rewind();
        let mut second: Vec<u32> = drain(&mut sampler).concat();
        assert_ne!(second, first);
        second.sort();
        assert_eq!(second, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_reproducible() {
        let mut a = RandomSampler::new(samples(20), 4, 77).unwrap();
        let mut b = RandomSampler::new(samples(20), 4, 77).unwrap();
        assert_eq!(drain(&mut a), drain(&mut b));
    }

    #[test]
    fn test_zero_batch_size() {
        assert!(SequentialSampler::new(samples(3), 0).is_err());
        assert!(RandomSampler::new(samples(3), 0, 1).is_err());
    }
}
