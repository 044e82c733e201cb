// Engine configuration — the knobs for one similarity run.
//
// All values have working defaults; hosts override only what they need.
// Validation happens once, in `SimilarityPipeline::new`, before any volume
// is accepted, so a bad configuration never touches corpus state.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::corpus::record::CHANNEL_COUNT;

/// Upper bound on the weighted difference range one window can span
/// (`window_size_in_phonemes * sum of channel weights`). Keeps the
/// similarity table allocation bounded and every difference sum inside
/// `u32`.
pub const MAX_WINDOW_DIFFERENCE: u64 = 1 << 24;

/// Per-channel mismatch weights for the window metric.
///
/// A mismatch in a channel adds that channel's weight to a window pair's
/// difference sum; a weight of zero makes the channel invisible to the
/// metric. The defaults weigh the six prosodic channels equally and ignore
/// phoneme identity, so two stretches can score as similar prosody even
/// when the segments themselves differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelWeights {
    pub part_of_speech: u32,
    pub accent: u32,
    pub stress: u32,
    pub tone: u32,
    pub phrase_id: u32,
    pub break_index: u32,
    pub phoneme: u32,
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            part_of_speech: 1,
            accent: 1,
            stress: 1,
            tone: 1,
            phrase_id: 1,
            break_index: 1,
            phoneme: 0,
        }
    }
}

impl ChannelWeights {
    /// The weights in encoding channel order — the order feature values
    /// are laid out within each phoneme's run of symbols.
    pub fn as_array(&self) -> [u32; CHANNEL_COUNT] {
        [
            self.part_of_speech,
            self.accent,
            self.stress,
            self.tone,
            self.phrase_id,
            self.break_index,
            self.phoneme,
        ]
    }

    /// Sum of all channel weights — the difference range one fully
    /// mismatched phoneme contributes.
    pub fn total(&self) -> u64 {
        self.as_array().iter().map(|&w| u64::from(w)).sum()
    }
}

/// Central configuration for one similarity run.
///
/// Supplied once, before any volume arrives. Higher `weighting_power`
/// values sharpen the similarity curve so only near-identical windows
/// score noticeably above zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on how many of a volume's phoneme positions may seed comparison
    /// windows (None = unbounded). Bounds the work a single very large
    /// volume can generate.
    pub max_phonemes_per_volume: Option<usize>,
    /// Worker threads for the solve phase (default 16).
    pub num_threads: usize,
    /// Sampling rounds; only consulted when `use_sampling` is set (default 1).
    pub num_rounds: usize,
    /// Draw one random window per seed volume per round instead of
    /// enumerating every window (default false).
    pub use_sampling: bool,
    /// Exponent applied to the normalized window agreement (default 32.0,
    /// documented domain 0-100).
    pub weighting_power: f64,
    /// Window length in phonemes (default 8).
    pub window_size_in_phonemes: usize,
    /// Per-channel mismatch weights.
    pub weights: ChannelWeights,
    /// Restrict seeding to these volume indices (default: every volume
    /// seeds). Indices are range-checked once the corpus is frozen.
    pub focus_volumes: Option<Vec<usize>>,
    /// Seed for sampling and tie-break randomness. None draws a fresh seed
    /// at finish time; the seed actually used is logged and reported
    /// either way.
    pub random_seed: Option<u64>,
    /// Draw a progress bar while solving (default false).
    pub show_progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_phonemes_per_volume: None,
            num_threads: 16,
            num_rounds: 1,
            use_sampling: false,
            weighting_power: 32.0,
            window_size_in_phonemes: 8,
            weights: ChannelWeights::default(),
            focus_volumes: None,
            random_seed: None,
            show_progress: false,
        }
    }
}

impl EngineConfig {
    /// Check the configuration before any corpus state exists.
    ///
    /// Focus indices can only be range-checked against a frozen corpus,
    /// so those are validated at problem generation instead.
    pub fn validate(&self) -> Result<()> {
        if self.window_size_in_phonemes == 0 {
            anyhow::bail!("window_size_in_phonemes must be at least 1");
        }
        if !(0.0..=100.0).contains(&self.weighting_power) {
            anyhow::bail!(
                "weighting_power must be within 0-100, got {}",
                self.weighting_power
            );
        }
        let difference_range = (self.window_size_in_phonemes as u64)
            .checked_mul(self.weights.total())
            .unwrap_or(u64::MAX);
        if difference_range > MAX_WINDOW_DIFFERENCE {
            anyhow::bail!(
                "channel weights spanning {difference_range} per window exceed the \
                 supported range {MAX_WINDOW_DIFFERENCE}; lower the weights or the \
                 window size"
            );
        }
        if self.num_threads == 0 {
            anyhow::bail!("num_threads must be at least 1");
        }
        if self.use_sampling && self.num_rounds == 0 {
            anyhow::bail!("num_rounds must be at least 1 when sampling is enabled");
        }
        Ok(())
    }
}
