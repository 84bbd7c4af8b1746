use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw engagement counters plus media flags for one post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementSignals {
    pub like_count: u32,
    pub repost_count: u32,
    pub reply_count: u32,
    pub quote_count: u32,
    #[serde(default)]
    pub has_media: bool,
    #[serde(default)]
    pub is_video: bool,
}

impl EngagementSignals {
    /// Total interactions across all engagement types.
    pub fn total(&self) -> u64 {
        self.like_count as u64
            + self.repost_count as u64
            + self.reply_count as u64
            + self.quote_count as u64
    }

    /// Number of distinct engagement types present.
    pub fn distinct_types(&self) -> u32 {
        [
            self.like_count,
            self.repost_count,
            self.reply_count,
            self.quote_count,
        ]
        .iter()
        .filter(|&&c| c > 0)
        .count() as u32
    }
}

/// How often this post (and its author/content) was already surfaced.
///
/// `hours_since_seen` is `None` when the viewer has never been shown the
/// post. Upstream feeds that encode "never seen" as a negative sentinel
/// must map it to `None` before decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExposureSignals {
    pub seen_count: u32,
    #[serde(default)]
    pub hours_since_seen: Option<f64>,
    pub author_repeats: u32,
    pub content_repeats: u32,
    #[serde(default)]
    pub all_seen: bool,
}

/// Diversity boost and the caller-supplied tie-break factor.
///
/// `random_factor` is an input, not generated here, so scoring stays
/// reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoveltySignals {
    pub novelty_factor: f64,
    pub random_factor: f64,
}

impl Default for NoveltySignals {
    fn default() -> Self {
        Self {
            novelty_factor: 1.0,
            random_factor: 0.0,
        }
    }
}

/// Author trust and authority attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustSignals {
    pub verified: bool,
    pub gold: bool,
    pub follower_count: u32,
    #[serde(default)]
    pub has_community_note: bool,
    pub super_poster_boost: f64,
    pub account_age_days: f64,
}

/// Spam and abuse signals, computed upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetySignals {
    pub spam_score: f64,
    pub blocked_by_count: u32,
    pub muted_by_count: u32,
    #[serde(default)]
    pub url_count: u32,
    #[serde(default)]
    pub suspicious_url_count: u32,
    #[serde(default)]
    pub hashtag_count: u32,
    #[serde(default)]
    pub mention_count: u32,
    #[serde(default)]
    pub emoji_density: f64,
    #[serde(default)]
    pub spam_keyword_score: f64,
}

/// One candidate feed item.
///
/// Constructed by the timeline adapter from decoded input; the ranker fills
/// `score` and reorders the batch in place. `id` must be non-empty and
/// unique within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Author key used for batch-local repeat counting.
    #[serde(default)]
    pub author: Option<String>,
    /// Post text, used only for content-repeat fingerprinting.
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub engagement: EngagementSignals,
    #[serde(default)]
    pub exposure: ExposureSignals,
    #[serde(default)]
    pub novelty: NoveltySignals,
    #[serde(default)]
    pub trust: TrustSignals,
    #[serde(default)]
    pub safety: SafetySignals,
    /// Output of the ranker; zero until scored.
    #[serde(default)]
    pub score: f64,
}

impl Post {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            author: None,
            content: String::new(),
            created_at,
            engagement: EngagementSignals::default(),
            exposure: ExposureSignals::default(),
            novelty: NoveltySignals::default(),
            trust: TrustSignals::default(),
            safety: SafetySignals::default(),
            score: 0.0,
        }
    }

    /// Hours elapsed since creation, never negative.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        ((now - self.created_at).num_seconds() as f64 / 3600.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_totals() {
        let engagement = EngagementSignals {
            like_count: 10,
            repost_count: 3,
            reply_count: 0,
            quote_count: 1,
            has_media: false,
            is_video: false,
        };

        assert_eq!(engagement.total(), 14);
        assert_eq!(engagement.distinct_types(), 3);
    }

    #[test]
    fn test_age_hours_clamps_future_timestamps() {
        let now = Utc::now();
        let post = Post::new("p1", now + chrono::Duration::hours(2));
        assert_eq!(post.age_hours(now), 0.0);
    }

    #[test]
    fn test_post_decodes_with_sparse_input() {
        // The adapter may omit everything except identity and timestamp.
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "created_at": "2026-08-25T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(post.id, "p1");
        assert_eq!(post.engagement.like_count, 0);
        assert_eq!(post.exposure.hours_since_seen, None);
        assert_eq!(post.novelty.novelty_factor, 1.0);
        assert_eq!(post.score, 0.0);
    }
}
