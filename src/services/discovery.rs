use std::collections::HashSet;

use futures::future::join_all;

use crate::{
    models::{Candidate, DiscoverQuery, MovieId},
    services::{outcome::BestEffort, providers::CatalogProvider},
};

/// Collects unseen candidates from the first `pages` discovery pages
///
/// Pages are requested concurrently with the same filter. A page that fails
/// contributes nothing; the rest still count. Results keep page order, drop
/// anything in `excluded`, and keep only the first occurrence of each id.
pub async fn discover_candidates(
    catalog: &dyn CatalogProvider,
    query: &DiscoverQuery,
    excluded: &HashSet<MovieId>,
    pages: u32,
) -> Vec<Candidate> {
    let fetches = (1..=pages).map(|page| async move {
        BestEffort::or_default(
            catalog.discover_movies(query, page).await,
            &format!("discover page {}", page),
        )
    });

    let outcomes = join_all(fetches).await;
    let failed_pages = outcomes.iter().filter(|o| o.is_defaulted()).count();

    let mut seen = HashSet::new();
    let candidates: Vec<Candidate> = outcomes
        .into_iter()
        .flat_map(BestEffort::into_value)
        .filter(|movie| !excluded.contains(&movie.id))
        .filter(|movie| seen.insert(movie.id))
        .map(Candidate::from)
        .collect();

    tracing::info!(
        genre = %query.genre,
        mode = ?query.mode,
        pages,
        failed_pages,
        excluded = excluded.len(),
        candidates = candidates.len(),
        "Candidate discovery completed"
    );

    candidates
}
