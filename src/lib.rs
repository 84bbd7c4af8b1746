pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{ConfigError, RankingConfig};
pub use models::{
    EngagementSignals, ExposureSignals, NoveltySignals, Post, SafetySignals, TrustSignals,
};
pub use services::{assign_random_factors, Ranker, RankingError, RecencyCache, ScoreWeights, Scorer};
