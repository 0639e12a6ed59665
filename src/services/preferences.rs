use std::collections::{HashMap, HashSet};

use futures::future::join_all;

use crate::{
    models::{CatalogMovie, MovieCredits, MovieId, PreferenceProfile},
    services::{outcome::BestEffort, providers::CatalogProvider},
};

/// Resolves watched titles to their first catalog search hit
///
/// Every title is searched exactly once, concurrently. Titles without a hit,
/// or whose search fails, are skipped. The result keeps history order.
pub async fn resolve_titles(catalog: &dyn CatalogProvider, titles: &[String]) -> Vec<CatalogMovie> {
    let resolved: Vec<CatalogMovie> =
        join_all(titles.iter().map(|title| resolve_title(catalog, title)))
            .await
            .into_iter()
            .flatten()
            .collect();

    tracing::debug!(
        titles = titles.len(),
        resolved = resolved.len(),
        "Watched titles resolved"
    );

    resolved
}

/// Catalog ids of the watched movies, so they are never recommended back
pub fn watched_ids(watched: &[CatalogMovie]) -> HashSet<MovieId> {
    watched.iter().map(|movie| movie.id).collect()
}

/// Infers the user's favourite directors from resolved watched movies
///
/// Credits are fetched concurrently; a movie whose credits cannot be fetched,
/// or that has no director, simply does not contribute. Directors are ranked
/// by how many watched movies they directed, ties going to the one that
/// appears first in `watched`.
pub async fn infer_preferences(
    catalog: &dyn CatalogProvider,
    watched: &[CatalogMovie],
    top_n: usize,
) -> PreferenceProfile {
    let directors = join_all(watched.iter().map(|movie| director_for(catalog, movie.id))).await;

    let profile = rank_creators(directors.into_iter().flatten(), top_n);

    tracing::info!(
        watched = watched.len(),
        top_creators = ?profile.top_creators,
        "Preference profile inferred"
    );

    profile
}

/// First search hit for a title
async fn resolve_title(catalog: &dyn CatalogProvider, title: &str) -> Option<CatalogMovie> {
    BestEffort::or_default(catalog.search_movies(title).await, "title search")
        .into_value()
        .into_iter()
        .next()
}

async fn director_for(catalog: &dyn CatalogProvider, id: MovieId) -> Option<String> {
    let credits: MovieCredits =
        BestEffort::or_default(catalog.movie_credits(id).await, "credits").into_value();

    credits.director().map(str::to_string)
}

/// Ranks names by frequency, keeping first-seen order among equal counts
pub fn rank_creators(creators: impl IntoIterator<Item = String>, top_n: usize) -> PreferenceProfile {
    let mut tally: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for creator in creators {
        match positions.get(&creator) {
            Some(&pos) => tally[pos].1 += 1,
            None => {
                positions.insert(creator.clone(), tally.len());
                tally.push((creator, 1));
            }
        }
    }

    // Stable sort keeps insertion order for ties.
    tally.sort_by(|a, b| b.1.cmp(&a.1));

    PreferenceProfile::new(
        tally
            .into_iter()
            .take(top_n)
            .map(|(creator, _)| creator)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::CrewMember;
    use crate::services::providers::MockCatalogProvider;

    fn movie(id: u64) -> CatalogMovie {
        CatalogMovie {
            id: MovieId(id),
            title: None,
            release_date: None,
        }
    }

    fn directed_by(name: &str) -> MovieCredits {
        MovieCredits {
            crew: vec![CrewMember {
                name: name.to_string(),
                job: "Director".to_string(),
            }],
        }
    }

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Catalog where each title "Film N" resolves to id N, directed per `directors`
    fn catalog_with(directors: &'static [(u64, &'static str)]) -> MockCatalogProvider {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_search_movies().returning(|query| {
            match query.strip_prefix("Film ").and_then(|n| n.parse::<u64>().ok()) {
                Some(id) => Ok(vec![movie(id), movie(id + 1000)]),
                None => Ok(vec![]),
            }
        });
        catalog.expect_movie_credits().returning(move |id| {
            directors
                .iter()
                .find(|(movie_id, _)| MovieId(*movie_id) == id)
                .map(|(_, name)| directed_by(name))
                .ok_or_else(|| AppError::ExternalApi("credits unavailable".to_string()))
        });
        catalog
    }

    #[test]
    fn test_rank_creators_by_count() {
        let creators = titles(&["Varda", "Mann", "Mann", "Ozu", "Mann", "Ozu"]);
        let profile = rank_creators(creators, 5);
        assert_eq!(profile.top_creators, titles(&["Mann", "Ozu", "Varda"]));
    }

    #[test]
    fn test_rank_creators_ties_keep_first_seen_order() {
        let creators = titles(&["Varda", "Mann", "Ozu", "Mann", "Varda", "Ozu"]);
        let profile = rank_creators(creators, 5);
        assert_eq!(profile.top_creators, titles(&["Varda", "Mann", "Ozu"]));
    }

    #[test]
    fn test_rank_creators_truncates() {
        let creators = titles(&["A", "B", "C", "D", "E", "F", "G"]);
        let profile = rank_creators(creators, 5);
        assert_eq!(profile.top_creators, titles(&["A", "B", "C", "D", "E"]));
    }

    #[tokio::test]
    async fn test_infer_preferences_counts_first_result_directors() {
        static DIRECTORS: &[(u64, &str)] = &[(1, "Mann"), (2, "Ozu"), (3, "Mann")];
        let catalog = catalog_with(DIRECTORS);

        let watched = resolve_titles(&catalog, &titles(&["Film 1", "Film 2", "Film 3"])).await;
        let profile = infer_preferences(&catalog, &watched, 5).await;

        assert_eq!(profile.top_creators, titles(&["Mann", "Ozu"]));
    }

    #[tokio::test]
    async fn test_unresolved_titles_are_skipped() {
        static DIRECTORS: &[(u64, &str)] = &[(2, "Ozu")];
        let catalog = catalog_with(DIRECTORS);

        // "Unknown Film" has no search hit, Film 1 has no credits.
        let watched =
            resolve_titles(&catalog, &titles(&["Unknown Film", "Film 1", "Film 2"])).await;
        assert_eq!(watched, vec![movie(1), movie(2)]);

        let profile = infer_preferences(&catalog, &watched, 5).await;
        assert_eq!(profile.top_creators, titles(&["Ozu"]));
    }

    #[tokio::test]
    async fn test_search_failure_yields_empty_profile() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_search_movies()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));
        catalog.expect_movie_credits().never();

        let watched = resolve_titles(&catalog, &titles(&["Film 1", "Film 2"])).await;
        let profile = infer_preferences(&catalog, &watched, 5).await;

        assert!(watched.is_empty());
        assert!(profile.is_empty());
    }

    #[tokio::test]
    async fn test_each_title_is_searched_once() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_search_movies()
            .times(3)
            .returning(|query| {
                let id = query.trim_start_matches("Film ").parse::<u64>().unwrap_or(0);
                Ok(vec![movie(id)])
            });
        catalog
            .expect_movie_credits()
            .times(3)
            .returning(|_| Ok(directed_by("Varda")));

        let watched = resolve_titles(&catalog, &titles(&["Film 4", "Film 9", "Film 4"])).await;
        let ids = watched_ids(&watched);
        let profile = infer_preferences(&catalog, &watched, 5).await;

        assert_eq!(ids, HashSet::from([MovieId(4), MovieId(9)]));
        assert_eq!(profile.top_creators, titles(&["Varda"]));
    }

    #[tokio::test]
    async fn test_watched_ids_use_first_hit() {
        static DIRECTORS: &[(u64, &str)] = &[];
        let catalog = catalog_with(DIRECTORS);

        let watched = resolve_titles(&catalog, &titles(&["Film 4", "Film 9", "Nothing"])).await;

        assert_eq!(watched_ids(&watched), HashSet::from([MovieId(4), MovieId(9)]));
    }
}
