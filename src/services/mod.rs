pub mod discovery;
pub mod enrichment;
pub mod history;
pub mod outcome;
pub mod preferences;
pub mod providers;
pub mod recommendations;
pub mod selection;

pub use recommendations::Recommender;
