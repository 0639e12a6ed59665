use rand::{seq::SliceRandom, Rng};

use crate::models::Candidate;

/// Sorts candidates by descending score, then ascending id
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
}

/// Draws `count` candidates uniformly from the `pool_size` best scorers
pub fn select_recommendations<R: Rng + ?Sized>(
    mut candidates: Vec<Candidate>,
    pool_size: usize,
    count: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    rank(&mut candidates);
    candidates.truncate(pool_size);
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}
