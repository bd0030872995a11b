//! Weighted random action selection.
//!
//! Given the non-empty pool of candidate actions produced by all generators
//! in one cycle, pick exactly one. Each candidate's weight is treated as an
//! unnormalized probability mass: candidate `i` is drawn with probability
//! `w_i / Σ w_j`. Candidate order is irrelevant and duplicate weights are
//! fine.
//!
//! # Why not argmax
//!
//! Every node in the mesh evaluates the same policies over similar local
//! state. A deterministic "pick the heaviest" would have whole regions
//! enact the same structural change in the same cycle; sampling spreads
//! those decisions out while still favoring the desirable ones.
//!
//! # Degenerate weights
//!
//! An all-zero weight vector carries no preference at all, so selection
//! falls back to a uniform draw rather than failing — a cycle where every
//! candidate is merely "acceptable" should still pick one. Negative or
//! non-finite weights violate the generator contract and surface as
//! [`SelectionError::SamplingFailed`].
//!
//! Selection is a pure function of the candidate slice and the supplied
//! RNG; callers that need reproducibility pass a seeded [`rand::rngs::StdRng`].

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;

use crate::action::Weighted;
use crate::error::SelectionError;

/// Pick one candidate by weighted random sampling.
///
/// Fails with [`SelectionError::EmptyCandidates`] before any sampling if
/// the slice is empty.
pub fn select<'a, A, R>(candidates: &'a [A], rng: &mut R) -> Result<&'a A, SelectionError>
where
    A: Weighted,
    R: Rng + ?Sized,
{
    let index = pick_index(candidates, rng)?;
    Ok(&candidates[index])
}

/// Like [`select`], but consumes the pool and returns the chosen candidate
/// by value. The rest of the pool is dropped.
pub fn select_owned<A, R>(mut candidates: Vec<A>, rng: &mut R) -> Result<A, SelectionError>
where
    A: Weighted,
    R: Rng + ?Sized,
{
    let index = pick_index(&candidates, rng)?;
    Ok(candidates.swap_remove(index))
}

fn pick_index<A, R>(candidates: &[A], rng: &mut R) -> Result<usize, SelectionError>
where
    A: Weighted,
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(SelectionError::EmptyCandidates);
    }

    match WeightedIndex::new(candidates.iter().map(Weighted::weight)) {
        Ok(dist) => Ok(dist.sample(rng)),
        // No mass anywhere: nothing to bias the draw, go uniform.
        Err(WeightedError::AllWeightsZero) => Ok(rng.gen_range(0..candidates.len())),
        Err(err) => Err(SelectionError::SamplingFailed(err)),
    }
}
