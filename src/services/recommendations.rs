use std::sync::Arc;

use crate::{
    config::PipelineSettings,
    error::AppResult,
    models::{MovieId, RecommendationItem, RecommendationRequest},
    services::{
        discovery, enrichment, history, preferences,
        providers::{CatalogProvider, HistoryProvider},
        selection,
    },
    store::ExclusionStore,
};

/// Generates watch recommendations from a user's history
///
/// Runs the pipeline stage by stage, each stage fully joined before the next:
/// 1. Fetch the user's recent watched titles (aborts if there are none)
/// 2. Resolve watched titles in the catalog while loading shown ids
/// 3. Infer top directors from the resolved movies
/// 4. Discover unseen candidates across several catalog pages
/// 5. Enrich and score every candidate
/// 6. Draw the final set from the best scorers and remember it for the user
pub struct Recommender {
    history: Arc<dyn HistoryProvider>,
    catalog: Arc<dyn CatalogProvider>,
    exclusions: Arc<dyn ExclusionStore>,
    settings: PipelineSettings,
    image_base_url: String,
}

impl Recommender {
    pub fn new(
        history: Arc<dyn HistoryProvider>,
        catalog: Arc<dyn CatalogProvider>,
        exclusions: Arc<dyn ExclusionStore>,
        settings: PipelineSettings,
        image_base_url: String,
    ) -> Self {
        Self {
            history,
            catalog,
            exclusions,
            settings,
            image_base_url,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(username = %request.username, genre = %request.genre, mode = ?request.mode)
    )]
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> AppResult<Vec<RecommendationItem>> {
        let titles = history::fetch_watched_titles(
            self.history.as_ref(),
            &request.username,
            self.settings.history_sample_size,
        )
        .await?;

        let catalog = self.catalog.as_ref();
        let (watched, shown_ids) = tokio::join!(
            preferences::resolve_titles(catalog, &titles),
            self.exclusions.excluded(&request.username),
        );

        let mut excluded = shown_ids?;
        excluded.extend(preferences::watched_ids(&watched));

        let profile =
            preferences::infer_preferences(catalog, &watched, self.settings.top_creator_count)
                .await;

        let candidates = discovery::discover_candidates(
            catalog,
            &request.discover_query(),
            &excluded,
            self.settings.discovery_pages,
        )
        .await;

        if candidates.is_empty() {
            tracing::info!("No candidates left after discovery");
            return Ok(Vec::new());
        }

        let scored =
            enrichment::enrich_candidates(catalog, candidates, &profile, request.mode).await;

        let picked = selection::select_recommendations(
            scored,
            self.settings.selection_pool_size,
            self.settings.result_count,
            &mut rand::rng(),
        );

        let picked_ids: Vec<MovieId> = picked.iter().map(|c| c.id).collect();
        self.exclusions
            .record(&request.username, &picked_ids)
            .await?;

        tracing::info!(results = picked.len(), ids = ?picked_ids, "Recommendations selected");

        Ok(picked
            .into_iter()
            .map(|candidate| candidate.into_item(&self.image_base_url))
            .collect())
    }

    /// Forgets everything previously recommended to `username`
    pub async fn reset(&self, username: &str) -> AppResult<()> {
        self.exclusions.reset(username).await
    }
}
