use futures::future::join_all;

use crate::{
    models::{
        Candidate, MovieCredits, MovieDetails, PreferenceMode, PreferenceProfile,
        MISSING_OVERVIEW, UNKNOWN_CREATOR,
    },
    services::{outcome::BestEffort, providers::CatalogProvider},
};

/// Bonus for a candidate directed by one of the user's top creators
pub const CREATOR_BONUS: f64 = 5.0;

/// Weight applied to the average rating
pub const RATING_WEIGHT: f64 = 1.5;

/// Ranking heuristic for one enriched candidate
///
/// `creator bonus + rating * 1.5`, minus the raw popularity in obscure mode.
pub fn score(candidate: &Candidate, profile: &PreferenceProfile, mode: PreferenceMode) -> f64 {
    let creator_score = if profile.contains(&candidate.creator) {
        CREATOR_BONUS
    } else {
        0.0
    };

    let rating_score = candidate.rating * RATING_WEIGHT;

    let popularity_penalty = match mode {
        PreferenceMode::Obscure => candidate.popularity,
        PreferenceMode::Popular => 0.0,
    };

    creator_score + rating_score - popularity_penalty
}

/// Fills in details, credits and score for every candidate
///
/// Each candidate's two lookups run concurrently, and all candidates are
/// processed concurrently. Failed lookups leave the documented defaults in
/// place; no candidate is dropped.
pub async fn enrich_candidates(
    catalog: &dyn CatalogProvider,
    candidates: Vec<Candidate>,
    profile: &PreferenceProfile,
    mode: PreferenceMode,
) -> Vec<Candidate> {
    let total = candidates.len();

    let enriched = join_all(
        candidates
            .into_iter()
            .map(|candidate| enrich_one(catalog, candidate, profile, mode)),
    )
    .await;

    let defaulted = enriched.iter().filter(|(_, partial)| *partial).count();
    tracing::info!(
        candidates = total,
        defaulted,
        "Candidate enrichment completed"
    );

    enriched.into_iter().map(|(candidate, _)| candidate).collect()
}

/// Returns the scored candidate and whether any lookup fell back to defaults
async fn enrich_one(
    catalog: &dyn CatalogProvider,
    mut candidate: Candidate,
    profile: &PreferenceProfile,
    mode: PreferenceMode,
) -> (Candidate, bool) {
    let (details, credits) = tokio::join!(
        catalog.movie_details(candidate.id),
        catalog.movie_credits(candidate.id)
    );

    let details: BestEffort<MovieDetails> = BestEffort::or_default(details, "movie details");
    let credits: BestEffort<MovieCredits> = BestEffort::or_default(credits, "movie credits");
    let partial = details.is_defaulted() || credits.is_defaulted();

    apply_details(&mut candidate, details.into_value());
    candidate.creator = credits
        .value()
        .director()
        .unwrap_or(UNKNOWN_CREATOR)
        .to_string();
    candidate.score = score(&candidate, profile, mode);

    (candidate, partial)
}

/// Copies detail fields, treating zero and empty values as missing
fn apply_details(candidate: &mut Candidate, details: MovieDetails) {
    candidate.rating = details.vote_average.filter(|v| v.is_finite()).unwrap_or(0.0);
    candidate.popularity = details.popularity.filter(|p| p.is_finite()).unwrap_or(0.0);
    candidate.poster_path = details.poster_path.filter(|p| !p.is_empty());
    candidate.overview = details
        .overview
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| MISSING_OVERVIEW.to_string());
}
