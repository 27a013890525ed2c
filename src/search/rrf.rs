//! Reciprocal Rank Fusion (RRF).
//!
//! Merges several ranked lists into one ranking:
//! `score(d) = Σ 1 / (k + rank(d))`, with 1-based ranks. Cormack, Clarke
//! and Buettcher (2009) recommend `k = 60`.

use std::collections::HashMap;

/// Default RRF `k`.
pub const DEFAULT_RRF_K: u32 = 60;

/// Configuration for RRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrfConfig {
    /// Damping constant; larger values flatten the gap between ranks.
    pub k: u32,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}

impl RrfConfig {
    /// Creates a config with the given `k`.
    #[must_use]
    pub const fn new(k: u32) -> Self {
        Self { k }
    }
}

/// Fuses ranked lists of item IDs, best first.
///
/// Returns `(item_id, score)` sorted by score descending. Equal scores keep
/// the order in which items were first seen across the lists.
///
/// # Examples
///
/// ```
/// use nyaya_rag::search::{RrfConfig, reciprocal_rank_fusion};
///
/// let semantic = vec![4, 7, 1];
/// let lexical = vec![7, 2];
/// let fused = reciprocal_rank_fusion(&[&semantic, &lexical], &RrfConfig::default());
/// assert_eq!(fused[0].0, 7);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn reciprocal_rank_fusion(ranked_lists: &[&[i64]], config: &RrfConfig) -> Vec<(i64, f64)> {
    let mut scores: HashMap<i64, (usize, f64)> = HashMap::new();

    for list in ranked_lists {
        for (rank, &item_id) in list.iter().enumerate() {
            let contribution = 1.0 / f64::from(config.k + (rank as u32) + 1);
            let next = scores.len();
            scores.entry(item_id).or_insert((next, 0.0)).1 += contribution;
        }
    }

    let mut fused: Vec<(i64, usize, f64)> = scores
        .into_iter()
        .map(|(id, (seen, score))| (id, seen, score))
        .collect();
    fused.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.1.cmp(&b.1)));

    fused.into_iter().map(|(id, _, score)| (id, score)).collect()
}
