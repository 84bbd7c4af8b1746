pub mod placement;
pub mod recency;
pub mod scoring;

pub use placement::{assign_random_factors, Ranker, RankingError};
pub use recency::RecencyCache;
pub use scoring::{ScoreWeights, Scorer};
