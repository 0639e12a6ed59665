pub mod movie;
pub mod recommendation;

pub use movie::{CatalogMovie, CrewMember, MovieCredits, MovieDetails, MovieId, MoviePage};
pub use recommendation::{
    Candidate, DiscoverQuery, PreferenceMode, PreferenceProfile, RecommendationItem,
    RecommendationRequest, MISSING_OVERVIEW, PLACEHOLDER_POSTER, UNKNOWN_CREATOR, UNKNOWN_TITLE,
    UNKNOWN_YEAR,
};
