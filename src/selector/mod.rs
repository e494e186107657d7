//! Picks one candidate out of a search result list.
//!
//! Strategies:
//! - `first`: the backend's own top result.
//! - `highest_score`: linear scan, first occurrence wins ties.
//! - `temperature_softmax`: samples from `softmax(score / T)` over the best `top_k`.
//!   Output is non-deterministic; use `highest_score` when reproducibility matters.
//!
//! An empty candidate list always yields `None`.

mod error;

#[cfg(test)]
mod tests;

pub use error::{SelectorError, SelectorResult};

use rand::Rng;
use tracing::warn;

use crate::constants::{PAYLOAD_SCORE, PAYLOAD_SCORE_FALLBACK};
use crate::vectordb::SearchMatch;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SOFTMAX_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionStrategy {
    First,
    #[default]
    HighestScore,
    TemperatureSoftmax { temperature: f32, top_k: usize },
}

impl SelectionStrategy {
    /// Resolves a configured strategy name.
    ///
    /// An empty name means `highest_score`; an unknown name falls back to `first`.
    /// A non-positive temperature or `top_k` is replaced by its default.
    pub fn from_name(name: &str, temperature: f32, top_k: usize) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "highest_score" => SelectionStrategy::HighestScore,
            "first" => SelectionStrategy::First,
            "temperature_softmax" | "softmax" => SelectionStrategy::TemperatureSoftmax {
                temperature: if temperature > 0.0 {
                    temperature
                } else {
                    DEFAULT_TEMPERATURE
                },
                top_k: if top_k > 0 {
                    top_k
                } else {
                    DEFAULT_SOFTMAX_TOP_K
                },
            },
            other => {
                warn!(strategy = other, "unknown selection strategy, using 'first'");
                SelectionStrategy::First
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionStrategy::First => "first",
            SelectionStrategy::HighestScore => "highest_score",
            SelectionStrategy::TemperatureSoftmax { .. } => "temperature_softmax",
        }
    }

    pub fn validate(&self) -> SelectorResult<()> {
        if let SelectionStrategy::TemperatureSoftmax { temperature, top_k } = *self {
            // Written as a negation so NaN is rejected too.
            if !(temperature > 0.0) {
                return Err(SelectorError::InvalidTemperature { value: temperature });
            }
            if top_k == 0 {
                return Err(SelectorError::InvalidTopK);
            }
        }
        Ok(())
    }
}

/// Similarity of a candidate as recorded in its payload: `score`, then `_score`,
/// then `0`.
pub fn candidate_score(candidate: &SearchMatch) -> f32 {
    candidate
        .payload
        .get(PAYLOAD_SCORE)
        .and_then(|v| v.as_f64())
        .or_else(|| {
            candidate
                .payload
                .get(PAYLOAD_SCORE_FALLBACK)
                .and_then(|v| v.as_f64())
        })
        .unwrap_or(0.0) as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResultSelector {
    strategy: SelectionStrategy,
}

impl ResultSelector {
    pub fn new(strategy: SelectionStrategy) -> SelectorResult<Self> {
        strategy.validate()?;
        Ok(Self { strategy })
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Selects using the thread-local RNG.
    pub fn select<'a>(&self, candidates: &'a [SearchMatch]) -> Option<&'a SearchMatch> {
        self.select_with_rng(candidates, &mut rand::thread_rng())
    }

    pub fn select_with_rng<'a, R: Rng + ?Sized>(
        &self,
        candidates: &'a [SearchMatch],
        rng: &mut R,
    ) -> Option<&'a SearchMatch> {
        if candidates.is_empty() {
            return None;
        }

        match self.strategy {
            SelectionStrategy::First => candidates.first(),
            SelectionStrategy::HighestScore => select_highest(candidates),
            SelectionStrategy::TemperatureSoftmax { temperature, top_k } => {
                select_softmax(candidates, temperature, top_k, rng)
            }
        }
    }
}

fn select_highest(candidates: &[SearchMatch]) -> Option<&SearchMatch> {
    let mut best: Option<(&SearchMatch, f32)> = None;
    for candidate in candidates {
        let score = candidate_score(candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(c, _)| c)
}

fn select_softmax<'a, R: Rng + ?Sized>(
    candidates: &'a [SearchMatch],
    temperature: f32,
    top_k: usize,
    rng: &mut R,
) -> Option<&'a SearchMatch> {
    let mut ranked: Vec<(&SearchMatch, f64)> = candidates
        .iter()
        .map(|c| (c, candidate_score(c) as f64))
        .collect();
    // Stable: equal scores keep backend order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_k.max(1));

    if ranked.len() == 1 {
        return ranked.first().map(|(c, _)| *c);
    }

    let t = temperature as f64;
    let max = ranked
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = ranked.iter().map(|(_, s)| ((s - max) / t).exp()).collect();
    let total: f64 = weights.iter().sum();

    let r: f64 = rng.r#gen();
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w / total;
        if r <= cumulative {
            return Some(ranked[i].0);
        }
    }

    // Rounding left the cumulative sum just short of 1.0.
    ranked.last().map(|(c, _)| *c)
}
