//! Weighted random selection over integer weights

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::catalog::{ColorPalette, Variant};

pub trait Weighted {
    fn weight(&self) -> u32;
}

impl Weighted for Variant {
    fn weight(&self) -> u32 {
        self.weight
    }
}

impl Weighted for ColorPalette {
    fn weight(&self) -> u32 {
        self.weight
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> u32 {
        (**self).weight()
    }
}

/// Pick one candidate with probability `weight / sum(weights)`.
///
/// Returns `None` for an empty slice. When every weight is zero there is
/// no distribution to sample, so the first candidate is returned.
pub fn pick<'a, T, R>(candidates: &'a [T], rng: &mut R) -> Option<&'a T>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let first = candidates.first()?;
    // Summed in u64 so large catalog weights cannot overflow.
    match WeightedIndex::<u64>::new(candidates.iter().map(|c| u64::from(c.weight()))) {
        Ok(sampler) => Some(&candidates[sampler.sample(rng)]),
        Err(err) => {
            tracing::trace!(%err, "weighted pick fell back to first candidate");
            Some(first)
        }
    }
}
