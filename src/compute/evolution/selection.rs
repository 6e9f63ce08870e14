//! (μ,λ) survivor selection.

use super::fitness::sanitize_fitness;
use super::search::Candidate;

/// Rank `offspring` and return `mu` survivors, best first.
///
/// Parents never survive: only offspring compete. Non-finite fitness ranks as
/// the void sentinel. Offspring are ordered by ascending fitness with a stable
/// sort, so among equal scores the later-generated offspring ranks higher.
/// When `mu` exceeds the offspring count, survivor `k` is taken from
/// `sorted[len - 1 - (k % len)]`, wrapping back to the best.
pub fn select_survivors(mut offspring: Vec<Candidate>, mu: usize) -> Vec<Candidate> {
    if offspring.is_empty() {
        return Vec::new();
    }

    for candidate in &mut offspring {
        candidate.fitness = sanitize_fitness(candidate.fitness);
    }
    offspring.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

    let len = offspring.len();
    (0..mu)
        .map(|k| offspring[len - 1 - (k % len)].clone())
        .collect()
}
