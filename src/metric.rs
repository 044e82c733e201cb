// Window metric — weighted feature differences mapped to similarity.
//
// A window is `window_size_in_phonemes` consecutive phonemes, laid out as
// `window_features` raw symbols. Two aligned windows are compared position
// by position: each mismatch adds that position's channel weight to a
// difference sum, and the sum indexes a precomputed similarity table:
//
//   table[d] = (1 - d / window_features) ^ weighting_power
//
// The table covers every reachable difference sum (the tiled weights bound
// it), with the base clamped at zero so weighted mismatch totals past a
// full window floor at similarity 0 instead of going negative. The tiled
// weight total is capped at `config::MAX_WINDOW_DIFFERENCE`, which keeps
// the table length and every difference sum inside `u32`.

use anyhow::Result;

use crate::config::{ChannelWeights, MAX_WINDOW_DIFFERENCE};
use crate::corpus::record::CHANNEL_COUNT;
use crate::corpus::Symbol;

/// Precomputed per-position weights plus the difference-to-similarity table.
#[derive(Debug, Clone)]
pub struct WindowMetric {
    window_phonemes: usize,
    window_features: usize,
    position_weights: Vec<u32>,
    similarity: Vec<f64>,
}

impl WindowMetric {
    /// Build the metric for a window size and weighting power.
    ///
    /// Fails on a zero window size, a negative weighting power, or weights
    /// whose tiled sum exceeds [`MAX_WINDOW_DIFFERENCE`]; the documented
    /// power domain (0-100) is enforced up front by
    /// `EngineConfig::validate`.
    pub fn build(
        weights: &ChannelWeights,
        window_size_in_phonemes: usize,
        weighting_power: f64,
    ) -> Result<Self> {
        if window_size_in_phonemes == 0 {
            anyhow::bail!("window size must be at least 1 phoneme");
        }
        if weighting_power < 0.0 {
            anyhow::bail!("weighting_power must not be negative, got {weighting_power}");
        }

        let window_features = window_size_in_phonemes * CHANNEL_COUNT;
        let channel_weights = weights.as_array();
        let position_weights: Vec<u32> = (0..window_features)
            .map(|i| channel_weights[i % CHANNEL_COUNT])
            .collect();

        let tiled_total: u64 = position_weights.iter().map(|&w| u64::from(w)).sum();
        if tiled_total > MAX_WINDOW_DIFFERENCE {
            anyhow::bail!(
                "channel weights spanning {tiled_total} per window exceed the \
                 supported range {MAX_WINDOW_DIFFERENCE}"
            );
        }

        let max_difference = tiled_total as u32;
        let similarity = (0..=max_difference)
            .map(|d| {
                let base = 1.0 - d as f64 / window_features as f64;
                base.max(0.0).powf(weighting_power)
            })
            .collect();

        Ok(Self {
            window_phonemes: window_size_in_phonemes,
            window_features,
            position_weights,
            similarity,
        })
    }

    /// Window length in phonemes.
    pub fn window_phonemes(&self) -> usize {
        self.window_phonemes
    }

    /// Window length in raw symbols.
    pub fn window_features(&self) -> usize {
        self.window_features
    }

    /// Largest difference sum two windows can produce under these weights.
    pub fn max_difference(&self) -> u32 {
        (self.similarity.len() - 1) as u32
    }

    /// Weighted count of mismatched positions between two aligned windows.
    pub fn window_difference(&self, seed: &[Symbol], candidate: &[Symbol]) -> u32 {
        let mut sum = 0;
        for ((a, b), weight) in seed.iter().zip(candidate).zip(&self.position_weights) {
            if a != b {
                sum += weight;
            }
        }
        sum
    }

    /// Similarity of two aligned windows; identical content scores exactly 1.0.
    pub fn window_similarity(&self, seed: &[Symbol], candidate: &[Symbol]) -> f64 {
        self.similarity[self.window_difference(seed, candidate) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_weights(value: u32) -> ChannelWeights {
        ChannelWeights {
            part_of_speech: value,
            accent: value,
            stress: value,
            tone: value,
            phrase_id: value,
            break_index: value,
            phoneme: value,
        }
    }

    #[test]
    fn test_self_comparison_scores_exactly_one() {
        let metric = WindowMetric::build(&ChannelWeights::default(), 4, 32.0).unwrap();
        let window: Vec<Symbol> = (0..metric.window_features() as Symbol).collect();
        assert_eq!(metric.window_difference(&window, &window), 0);
        assert_eq!(metric.window_similarity(&window, &window), 1.0);
    }

    #[test]
    fn test_zero_weight_channel_is_invisible() {
        // Default weights ignore phoneme identity (channel index 6).
        let metric = WindowMetric::build(&ChannelWeights::default(), 2, 32.0).unwrap();
        let seed = vec![0; metric.window_features()];
        let mut candidate = seed.clone();
        candidate[6] = 9;
        candidate[13] = 9;
        assert_eq!(metric.window_difference(&seed, &candidate), 0);
        assert_eq!(metric.window_similarity(&seed, &candidate), 1.0);
    }

    #[test]
    fn test_more_mismatches_never_raise_similarity() {
        let metric = WindowMetric::build(&uniform_weights(1), 2, 32.0).unwrap();
        let seed = vec![0; metric.window_features()];
        let mut previous = f64::INFINITY;
        for mismatches in 0..=metric.window_features() {
            let mut candidate = seed.clone();
            for slot in candidate.iter_mut().take(mismatches) {
                *slot = 1;
            }
            let similarity = metric.window_similarity(&seed, &candidate);
            assert!(
                similarity <= previous,
                "similarity rose from {previous} to {similarity} at {mismatches} mismatches"
            );
            previous = similarity;
        }
    }

    #[test]
    fn test_total_mismatch_with_uniform_weights_scores_zero() {
        let metric = WindowMetric::build(&uniform_weights(1), 2, 32.0).unwrap();
        let seed = vec![0; metric.window_features()];
        let candidate = vec![1; metric.window_features()];
        assert_eq!(metric.window_similarity(&seed, &candidate), 0.0);
    }

    #[test]
    fn test_heavy_weights_stay_inside_the_table() {
        // With weights above 1 the difference sum can exceed the feature
        // count; those entries clamp to 0 rather than indexing past the end.
        let metric = WindowMetric::build(&uniform_weights(3), 2, 32.0).unwrap();
        let seed = vec![0; metric.window_features()];
        let candidate = vec![1; metric.window_features()];
        assert_eq!(
            metric.window_difference(&seed, &candidate),
            metric.max_difference()
        );
        assert_eq!(metric.window_similarity(&seed, &candidate), 0.0);
    }

    #[test]
    fn test_weighted_mismatch_equals_equivalent_unit_mismatches() {
        // One mismatch under weight 2 lands on the same table entry as two
        // mismatches under weight 1.
        let mut weights = uniform_weights(1);
        weights.accent = 2;
        let metric = WindowMetric::build(&weights, 2, 32.0).unwrap();

        let seed = vec![0; metric.window_features()];
        let mut accent_mismatch = seed.clone();
        accent_mismatch[1] = 9;
        let mut two_unit_mismatches = seed.clone();
        two_unit_mismatches[0] = 9;
        two_unit_mismatches[2] = 9;

        assert_eq!(metric.window_difference(&seed, &accent_mismatch), 2);
        assert_eq!(
            metric.window_similarity(&seed, &accent_mismatch),
            metric.window_similarity(&seed, &two_unit_mismatches)
        );
    }

    #[test]
    fn test_power_zero_flattens_the_curve() {
        let metric = WindowMetric::build(&uniform_weights(1), 2, 0.0).unwrap();
        let seed = vec![0; metric.window_features()];
        let candidate = vec![1; metric.window_features()];
        assert_eq!(metric.window_similarity(&seed, &candidate), 1.0);
    }

    #[test]
    fn test_table_matches_the_documented_formula() {
        let metric = WindowMetric::build(&uniform_weights(1), 8, 32.0).unwrap();
        let seed = vec![0; metric.window_features()];
        let mut candidate = seed.clone();
        for slot in candidate.iter_mut().take(6) {
            *slot = 1;
        }
        let expected = (1.0 - 6.0 / 56.0f64).powf(32.0);
        let got = metric.window_similarity(&seed, &candidate);
        assert!(
            (got - expected).abs() < 1e-12,
            "expected {expected}, got {got}"
        );
    }

    #[test]
    fn test_zero_window_size_rejected() {
        assert!(WindowMetric::build(&ChannelWeights::default(), 0, 32.0).is_err());
    }

    #[test]
    fn test_overweight_window_rejected() {
        // Summed naively in u32, weights this size would wrap and leave the
        // table shorter than the reachable difference range.
        let err = WindowMetric::build(&uniform_weights(u32::MAX), 8, 32.0).unwrap_err();
        assert!(
            err.to_string().contains("exceed the supported range"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn test_negative_power_rejected() {
        assert!(WindowMetric::build(&ChannelWeights::default(), 4, -0.1).is_err());
    }
}
