use crate::{
    error::{AppError, AppResult},
    services::providers::HistoryProvider,
};

/// Fetches the user's most recent watched titles
///
/// Any feed failure, and a feed with no entries, is reported as
/// [`AppError::AccountNotFound`]: without history there is nothing to infer
/// from, so the pipeline must stop here rather than continue with an empty
/// profile. At most `sample_size` titles are returned, newest first.
pub async fn fetch_watched_titles(
    history: &dyn HistoryProvider,
    username: &str,
    sample_size: usize,
) -> AppResult<Vec<String>> {
    let mut titles = match history.watched_titles(username).await {
        Ok(titles) => titles,
        Err(e) => {
            tracing::warn!(
                username = %username,
                provider = history.name(),
                error = %e,
                "Watch history unavailable"
            );
            return Err(AppError::AccountNotFound);
        }
    };

    if titles.is_empty() {
        tracing::info!(username = %username, "Watch history is empty");
        return Err(AppError::AccountNotFound);
    }

    titles.truncate(sample_size);
    Ok(titles)
}
