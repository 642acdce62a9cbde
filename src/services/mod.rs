pub mod catalog;
pub mod preferences;
pub mod recommendations;

pub use preferences::PreferenceStore;
pub use recommendations::RecommendationEngine;
