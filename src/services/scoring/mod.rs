//! Candidate Scoring Module
//!
//! Maps one post's signals plus the feed position it would occupy to a
//! single comparable score. Pure and total: `now` and the tie-break factor
//! are inputs, nothing is read from the clock or a RNG, so identical inputs
//! always produce identical scores.
//!
//! The score is a multiplicative composition of sub-scores (so strong
//! negative signals can dominate) with a small additive random component at
//! the end. Coefficients are a tuning surface; the monotonicity directions
//! of each sub-score are the contract.

use chrono::{DateTime, Utc};

use crate::models::{EngagementSignals, ExposureSignals, Post, SafetySignals, TrustSignals};
use crate::utils::{clamp01, exponential_decay, hyperbolic_penalty, log_compress, saturating_boost};

/// Posts older than this with almost no engagement are near-eliminated.
const MAX_AGE_HOURS: f64 = 72.0;
const FRESH_POST_HOURS: f64 = 12.0;

/// Tuning surface for the scoring formula.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub like_weight: f64,
    pub repost_weight: f64,
    pub reply_weight: f64,
    pub quote_weight: f64,
    pub media_boost: f64,
    pub video_boost: f64,
    /// Multiplier on the core score once per unit of position decay.
    pub position_decay_rate: f64,
    /// Applied to the whole score when the batch was already seen in full.
    pub all_seen_penalty: f64,
    /// Applied to stale posts that never picked up engagement.
    pub stale_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            like_weight: 2.0,
            repost_weight: 3.0,
            reply_weight: 1.5,
            quote_weight: 2.5,
            media_boost: 1.15,
            video_boost: 1.05,
            position_decay_rate: 0.05,
            all_seen_penalty: 0.05,
            stale_penalty: 0.05,
        }
    }
}

/// Heuristic scorer over the post signal sub-records.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score one candidate at the position it would occupy.
    ///
    /// `batch_all_seen` is the batch-wide condition computed by the ranker;
    /// it is OR-ed with the post's own `all_seen` flag. The result is
    /// always finite and non-negative.
    pub fn score_post(
        &self,
        post: &Post,
        position_in_feed: usize,
        now: DateTime<Utc>,
        batch_all_seen: bool,
    ) -> f64 {
        let age_hours = post.age_hours(now);
        let engagement = &post.engagement;
        let exposure = &post.exposure;

        let never_seen = exposure.hours_since_seen.is_none();
        let all_seen = exposure.all_seen || batch_all_seen;

        let (random_component, random_multiplier) =
            random_perturbation(post.novelty.random_factor, all_seen);

        let mut core = self.engagement_base(engagement)
            * quality_multiplier(engagement)
            * virality_multiplier(engagement, age_hours)
            * diversity_bonus(engagement)
            * self.media_multiplier(engagement)
            * age_decay(age_hours)
            * seen_suppression(exposure.hours_since_seen)
            * repeat_suppression(exposure)
            * novelty_boost(post.novelty.novelty_factor, never_seen)
            * trust_multiplier(&post.trust)
            * account_age_factor(post.trust.account_age_days)
            * safety_penalty(&post.safety)
            * random_multiplier;

        // Stale posts that never picked up engagement are demoted hard but
        // stay orderable.
        if age_hours > MAX_AGE_HOURS && engagement.total() < 5 {
            core *= self.weights.stale_penalty;
        }

        // Attention decays down the feed. Only the multiplicative core is
        // position-scaled; the additive perturbation is not, so relative
        // order can genuinely shift between slots.
        core /= 1.0 + self.weights.position_decay_rate * position_in_feed as f64;

        let mut score = core + random_component;
        if all_seen {
            score *= self.weights.all_seen_penalty;
        }

        if score.is_finite() && score > 0.0 {
            score
        } else {
            0.0
        }
    }

    /// Log-compressed weighted engagement base.
    fn engagement_base(&self, e: &EngagementSignals) -> f64 {
        log_compress(e.like_count) * self.weights.like_weight
            + log_compress(e.repost_count) * self.weights.repost_weight
            + log_compress(e.reply_count) * self.weights.reply_weight
            + log_compress(e.quote_count) * self.weights.quote_weight
    }

    fn media_multiplier(&self, e: &EngagementSignals) -> f64 {
        let mut multiplier = 1.0;
        if e.has_media {
            multiplier = self.weights.media_boost;
            if e.quote_count > 0 {
                multiplier *= 1.1;
            }
        }
        if e.is_video {
            multiplier *= self.weights.video_boost;
        }
        multiplier
    }
}

/// Reward reposts, replies and quotes beyond the raw base. Saturating in
/// each count so the boost never decreases when any counter grows.
fn quality_multiplier(e: &EngagementSignals) -> f64 {
    (1.0 + 0.4 * saturating_boost(e.repost_count, 5.0))
        * (1.0 + 0.3 * saturating_boost(e.reply_count, 5.0))
        * (1.0 + 0.2 * saturating_boost(e.quote_count, 5.0))
}

/// Compressed boost from total actions and actions-per-hour velocity.
fn virality_multiplier(e: &EngagementSignals, age_hours: f64) -> f64 {
    let actions = e.like_count as f64 + 2.0 * e.repost_count as f64;
    let velocity = actions / age_hours.max(0.1);

    (1.0 + 0.5 * (1.0 + actions / 50.0).ln()) * (1.0 + 0.2 * (1.0 + velocity / 10.0).ln())
}

/// Bonus for engagement spread across multiple interaction types.
fn diversity_bonus(e: &EngagementSignals) -> f64 {
    1.0 + (e.distinct_types() as f64 - 1.0) * 0.15
}

/// Piecewise post-age decay: fresh boost, gradual day-scale decline, then
/// an exponential tail floored above zero so old posts stay orderable.
fn age_decay(age_hours: f64) -> f64 {
    if age_hours < FRESH_POST_HOURS {
        1.0 + ((FRESH_POST_HOURS - age_hours) / FRESH_POST_HOURS) * 0.8
    } else if age_hours < 24.0 {
        1.0 - ((age_hours - FRESH_POST_HOURS) / (24.0 - FRESH_POST_HOURS)) * 0.3
    } else if age_hours < MAX_AGE_HOURS {
        0.7 - ((age_hours - 24.0) / (MAX_AGE_HOURS - 24.0)) * 0.5
    } else {
        (0.2 * (-(age_hours - MAX_AGE_HOURS) / 24.0).exp()).max(0.02)
    }
}

/// Suppression for posts the viewer was already shown. Strictly decreasing
/// in `hours_since_seen`, asymptoting toward a positive floor; never-seen
/// posts are untouched.
fn seen_suppression(hours_since_seen: Option<f64>) -> f64 {
    match hours_since_seen {
        Some(hours) => 0.10 + 0.08 * exponential_decay(hours.max(0.0), 24.0),
        None => 1.0,
    }
}

/// Author/content repeat penalties plus the exposure-count penalty.
fn repeat_suppression(exposure: &ExposureSignals) -> f64 {
    hyperbolic_penalty(exposure.author_repeats, 0.45, 0.38)
        * hyperbolic_penalty(exposure.content_repeats, 0.6, 0.28)
        * (1.0 / (1.0 + 0.15 * exposure.seen_count as f64))
}

/// Novelty boost clamped to [0.75, 1.5], with a bump for never-seen posts.
fn novelty_boost(novelty_factor: f64, never_seen: bool) -> f64 {
    let mut boost = if novelty_factor.is_finite() && novelty_factor > 0.0 {
        novelty_factor
    } else {
        1.0
    };
    if never_seen {
        boost += 0.12;
    }
    boost.clamp(0.75, 1.5)
}

/// Bounded authority boost; a community correction note flips it into a
/// penalty because it signals contested accuracy.
fn trust_multiplier(trust: &TrustSignals) -> f64 {
    let mut multiplier = 1.0;
    if trust.verified {
        multiplier *= 1.08;
    }
    if trust.gold {
        multiplier *= 1.12;
    }
    multiplier *= 1.0 + ((trust.follower_count as f64 + 1.0).log10() * 0.03).min(0.3);
    multiplier *= 1.0 + clamp01(trust.super_poster_boost) * 0.15;
    if trust.has_community_note {
        multiplier *= 0.8;
    } else {
        multiplier *= 1.02;
    }
    multiplier
}

/// Mild saturating boost with account age; brand-new accounts are only
/// slightly discounted, never excluded.
fn account_age_factor(account_age_days: f64) -> f64 {
    1.0 + 0.05 * (1.0 - exponential_decay(account_age_days.max(0.0), 90.0))
}

/// Spam and abuse suppression. Strictly decreasing in `spam_score`,
/// `blocked_by_count` and `muted_by_count`; the content-shape terms
/// (URLs, hashtags, mentions, emoji, keywords) add weaker penalties.
fn safety_penalty(safety: &SafetySignals) -> f64 {
    let spam = clamp01(safety.spam_score);
    let spam_term = (1.0 - 0.95 * spam).powi(2);

    let social_term = 1.0
        / (1.0 + 0.12 * safety.blocked_by_count as f64 + 0.08 * safety.muted_by_count as f64);

    let shape_term = 1.0
        / (1.0
            + 0.25 * safety.suspicious_url_count as f64
            + 0.05 * safety.url_count.saturating_sub(2) as f64
            + 0.03 * safety.hashtag_count.saturating_sub(4) as f64
            + 0.02 * safety.mention_count.saturating_sub(4) as f64);

    let keyword_term = 1.0 - 0.6 * clamp01(safety.spam_keyword_score);
    let emoji_term = 1.0 - 0.25 * clamp01(safety.emoji_density);

    spam_term * social_term * shape_term * keyword_term * emoji_term
}

/// Additive component plus multiplier derived from the caller-supplied
/// random factor. The span widens when everything was already seen, so an
/// exhausted feed still reshuffles between refreshes.
fn random_perturbation(random_factor: f64, all_seen: bool) -> (f64, f64) {
    let bounded = clamp01(random_factor);
    let (span, offset) = if all_seen { (0.55, 0.25) } else { (0.1, 0.04) };
    let component = offset + bounded * span;
    (component, 1.0 + component * 0.08)
}
