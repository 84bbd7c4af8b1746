//! Sequential Placement Module
//!
//! Orders a batch of candidate posts by greedy slot-by-slot selection.
//! Because a post's score depends on the position it would occupy, a single
//! comparator-based sort cannot produce the right order: each slot is
//! filled by rescoring every remaining candidate at that slot and taking
//! the maximum.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::config::RankingConfig;
use crate::models::Post;
use crate::services::recency::RecencyCache;
use crate::services::scoring::{ScoreWeights, Scorer};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("post at index {index} has an empty id")]
    EmptyPostId { index: usize },
}

pub type Result<T> = std::result::Result<T, RankingError>;

/// Batch ranker: scoring plus recent-top bookkeeping.
///
/// Holds a shared [`RecencyCache`] and records ids placed within the top
/// window back into it, so repeated exposure is suppressed across calls.
pub struct Ranker {
    scorer: Scorer,
    cache: Arc<RecencyCache>,
    /// Leading slots whose posts are recorded as "recently shown at top".
    top_window: usize,
}

impl Ranker {
    pub fn new(cache: Arc<RecencyCache>) -> Self {
        Self {
            scorer: Scorer::default(),
            cache,
            top_window: 3,
        }
    }

    pub fn with_weights(cache: Arc<RecencyCache>, weights: ScoreWeights) -> Self {
        Self {
            scorer: Scorer::new(weights),
            cache,
            top_window: 3,
        }
    }

    pub fn with_top_window(mut self, top_window: usize) -> Self {
        self.top_window = top_window;
        self
    }

    pub fn from_config(config: &RankingConfig, cache: Arc<RecencyCache>) -> Self {
        Self::new(cache).with_top_window(config.top_window)
    }

    pub fn cache(&self) -> &Arc<RecencyCache> {
        &self.cache
    }

    /// Rank the batch in place into descending-score order.
    ///
    /// An empty batch is a no-op. A post with an empty id fails the whole
    /// batch before any scoring; no partial order is ever produced.
    pub fn rank(&self, posts: &mut Vec<Post>) -> Result<()> {
        self.rank_at(Utc::now(), posts)
    }

    /// [`rank`](Self::rank) with an injected clock. Identical inputs,
    /// identical cache state and identical `now` give identical output.
    pub fn rank_at(&self, now: DateTime<Utc>, posts: &mut Vec<Post>) -> Result<()> {
        if posts.is_empty() {
            return Ok(());
        }

        for (index, post) in posts.iter().enumerate() {
            if post.id.is_empty() {
                return Err(RankingError::EmptyPostId { index });
            }
        }

        debug!(candidate_count = posts.len(), "Ranking batch");

        self.prepare_exposure(now, posts);
        let batch_all_seen = posts
            .iter()
            .all(|p| p.exposure.all_seen || p.exposure.hours_since_seen.is_some());

        let mut pool = std::mem::take(posts);
        let mut placed: Vec<Post> = Vec::with_capacity(pool.len());

        for position in 0.. {
            if pool.is_empty() {
                break;
            }

            let mut best_idx = 0;
            let mut best_score =
                self.scorer
                    .score_post(&pool[0], position, now, batch_all_seen);

            for (i, candidate) in pool.iter().enumerate().skip(1) {
                let score = self
                    .scorer
                    .score_post(candidate, position, now, batch_all_seen);
                if wins_slot(score, candidate, best_score, &pool[best_idx]) {
                    best_idx = i;
                    best_score = score;
                }
            }

            let mut selected = pool.remove(best_idx);
            selected.score = best_score;

            if position < self.top_window {
                self.cache.record_at(&selected.id, now);
            }
            placed.push(selected);
        }

        *posts = placed;

        debug!(
            ranked_count = posts.len(),
            top_score = posts.first().map(|p| p.score),
            batch_all_seen,
            "Ranking complete"
        );

        Ok(())
    }

    /// Batch-local preprocessing before placement:
    /// - fill author/content repeat counters from this batch;
    /// - fold the recency cache into exposure: an id recorded as recently
    ///   shown but arriving as never-seen takes the cache's seen-history
    ///   timestamp (repeat suppression, never hard exclusion).
    fn prepare_exposure(&self, now: DateTime<Utc>, posts: &mut [Post]) {
        let mut author_counts: HashMap<&str, u32> = HashMap::new();
        let mut content_counts: HashMap<String, u32> = HashMap::new();

        for post in posts.iter() {
            if let Some(author) = post.author.as_deref() {
                *author_counts.entry(author).or_default() += 1;
            }
            let fingerprint = normalize_content(&post.content);
            if !fingerprint.is_empty() {
                *content_counts.entry(fingerprint).or_default() += 1;
            }
        }

        let author_repeats: Vec<u32> = posts
            .iter()
            .map(|post| {
                post.author
                    .as_deref()
                    .and_then(|a| author_counts.get(a))
                    .map(|&c| c.saturating_sub(1))
                    .unwrap_or(0)
            })
            .collect();
        let content_repeats: Vec<u32> = posts
            .iter()
            .map(|post| {
                let fingerprint = normalize_content(&post.content);
                content_counts
                    .get(&fingerprint)
                    .map(|&c| c.saturating_sub(1))
                    .unwrap_or(0)
            })
            .collect();

        for (i, post) in posts.iter_mut().enumerate() {
            // Upstream counters may already cover a wider window than this
            // batch; keep whichever is larger.
            post.exposure.author_repeats = post.exposure.author_repeats.max(author_repeats[i]);
            post.exposure.content_repeats = post.exposure.content_repeats.max(content_repeats[i]);

            if post.exposure.hours_since_seen.is_none() && self.cache.contains(&post.id) {
                let hours = self.cache.hours_since_seen(&post.id, now).unwrap_or(0.0);
                post.exposure.hours_since_seen = Some(hours);
            }
        }
    }
}

/// Slot comparison: higher score wins; ties break by higher random factor,
/// then lexicographically smaller id, so placement is fully deterministic.
fn wins_slot(score: f64, candidate: &Post, best_score: f64, best: &Post) -> bool {
    match score.partial_cmp(&best_score) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Less) => false,
        _ => match candidate
            .novelty
            .random_factor
            .partial_cmp(&best.novelty.random_factor)
        {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => candidate.id < best.id,
        },
    }
}

/// Content fingerprint for repeat detection: lowercase, URLs stripped,
/// whitespace collapsed.
fn normalize_content(content: &str) -> String {
    content
        .to_lowercase()
        .split_whitespace()
        .filter(|token| !token.starts_with("http://") && !token.starts_with("https://"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill every post's tie-break factor from the given RNG. Kept outside the
/// scorer so ranking itself stays reproducible; callers that need
/// deterministic output simply skip this (or use a seeded RNG).
pub fn assign_random_factors<R: Rng + ?Sized>(posts: &mut [Post], rng: &mut R) {
    for post in posts {
        post.novelty.random_factor = rng.gen();
    }
}
