use serde::{Deserialize, Serialize};

use super::{CatalogMovie, MovieId};

pub const UNKNOWN_CREATOR: &str = "Unknown";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_YEAR: &str = "Unknown";
pub const MISSING_OVERVIEW: &str = "No description available.";
pub const PLACEHOLDER_POSTER: &str = "placeholder.jpg";

/// Discovery and scoring strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceMode {
    /// Low vote count, sorted by rating, penalized by popularity
    Obscure,
    /// High vote count, sorted by popularity
    Popular,
}

impl PreferenceMode {
    /// Interprets the `preference` query value.
    ///
    /// An absent or empty value means `Obscure`; any value other than
    /// `obscure` means `Popular`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => PreferenceMode::Obscure,
            Some(v) if v.eq_ignore_ascii_case("obscure") => PreferenceMode::Obscure,
            Some(_) => PreferenceMode::Popular,
        }
    }
}

/// Top creators inferred from a user's history, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceProfile {
    pub top_creators: Vec<String>,
}

impl PreferenceProfile {
    pub fn new(top_creators: Vec<String>) -> Self {
        Self { top_creators }
    }

    pub fn contains(&self, creator: &str) -> bool {
        self.top_creators.iter().any(|c| c == creator)
    }

    pub fn is_empty(&self) -> bool {
        self.top_creators.is_empty()
    }
}

/// A catalog item under consideration for recommendation
///
/// Created from a discovery result with only identity, title and release
/// date; enrichment fills in the remaining fields and the score.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: MovieId,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub creator: String,
    pub rating: f64,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub overview: String,
    pub score: f64,
}

impl From<CatalogMovie> for Candidate {
    fn from(movie: CatalogMovie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            release_date: movie.release_date,
            creator: UNKNOWN_CREATOR.to_string(),
            rating: 0.0,
            popularity: 0.0,
            poster_path: None,
            overview: MISSING_OVERVIEW.to_string(),
            score: 0.0,
        }
    }
}

impl Candidate {
    /// Leading four digits of the release date
    pub fn release_year(&self) -> Option<&str> {
        let date = self.release_date.as_deref()?;
        let year = date.get(..4)?;
        year.chars().all(|c| c.is_ascii_digit()).then_some(year)
    }

    /// Builds the response item, resolving poster paths against `image_base_url`
    pub fn into_item(self, image_base_url: &str) -> RecommendationItem {
        let year = self
            .release_year()
            .unwrap_or(UNKNOWN_YEAR)
            .to_string();

        let poster = match self.poster_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{}{}", image_base_url, path),
            _ => PLACEHOLDER_POSTER.to_string(),
        };

        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        RecommendationItem {
            id: self.id,
            title,
            poster,
            director: self.creator,
            year,
            overview: self.overview,
        }
    }
}

/// A single recommendation returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: MovieId,
    pub title: String,
    pub poster: String,
    pub director: String,
    pub year: String,
    pub overview: String,
}

/// Validated input for one recommendation run
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub username: String,
    pub genre: String,
    pub start_year: u16,
    pub end_year: u16,
    pub mode: PreferenceMode,
}

impl RecommendationRequest {
    pub fn discover_query(&self) -> DiscoverQuery {
        DiscoverQuery {
            genre: self.genre.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
            mode: self.mode,
        }
    }
}

/// Filter shared by every page of one discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub genre: String,
    /// Inclusive
    pub start_year: u16,
    /// Inclusive
    pub end_year: u16,
    pub mode: PreferenceMode,
}
