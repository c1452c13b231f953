/// Weighted sampler — one value from a domain, skipping forbidden values.
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::schema::axis::Axis;

#[derive(Debug, Error, PartialEq)]
pub enum SamplerError {
    #[error("axis '{axis}' has no values left after excluding {forbidden:?}")]
    DomainExhausted {
        axis: String,
        forbidden: Vec<String>,
    },
}

/// Pick a value of `axis` that is not in `forbidden`.
///
/// The filtered domain keeps declaration order, and the draw lands on the
/// first value whose cumulative weight exceeds it, so equal weights break
/// ties by position.
pub fn choose<'a>(
    axis: &'a Axis,
    forbidden: &BTreeSet<String>,
    rng: &mut StdRng,
) -> Result<&'a str, SamplerError> {
    let candidates: Vec<_> = axis
        .domain()
        .iter()
        .filter(|option| !forbidden.contains(&option.value))
        .collect();

    let exhausted = || SamplerError::DomainExhausted {
        axis: axis.name().to_string(),
        forbidden: forbidden.iter().cloned().collect(),
    };

    if candidates.is_empty() {
        return Err(exhausted());
    }

    // Weights are validated positive on axis construction.
    let dist = WeightedIndex::new(candidates.iter().map(|option| option.weight))
        .map_err(|_| exhausted())?;
    let picked = candidates[dist.sample(rng)];
    tracing::trace!(axis = axis.name(), value = %picked.value, "sampled");
    Ok(&picked.value)
}
