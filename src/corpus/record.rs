// Phoneme records — the typed input tuple and the fixed channel set.
//
// Each phoneme arrives annotated with seven categorical features. The
// channel order here is load-bearing: it is the order feature values are
// laid out in the encoded symbol array and the order channel weights are
// applied by the metric.

use serde::{Deserialize, Serialize};

/// Number of encoded feature channels per phoneme.
pub const CHANNEL_COUNT: usize = 7;

/// One phoneme's annotations as supplied by the host.
///
/// `doc_name`, `tei_section_id`, and `sentence_id` are carried through to
/// the output unchanged; the remaining seven fields are encoded as feature
/// channels. The first record's `doc_name` names the volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeRecord {
    pub doc_name: String,
    pub tei_section_id: String,
    pub sentence_id: String,
    pub phrase_id: String,
    pub part_of_speech: String,
    pub accent: String,
    pub stress: String,
    pub tone: String,
    pub break_index: String,
    pub phoneme: String,
}

/// The seven categorical feature channels, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureChannel {
    PartOfSpeech,
    Accent,
    Stress,
    Tone,
    PhraseId,
    BreakIndex,
    Phoneme,
}

impl FeatureChannel {
    /// Every channel, in encoding order.
    pub const ALL: [FeatureChannel; CHANNEL_COUNT] = [
        FeatureChannel::PartOfSpeech,
        FeatureChannel::Accent,
        FeatureChannel::Stress,
        FeatureChannel::Tone,
        FeatureChannel::PhraseId,
        FeatureChannel::BreakIndex,
        FeatureChannel::Phoneme,
    ];

    /// Extract this channel's feature value from a record.
    pub fn value<'a>(&self, record: &'a PhonemeRecord) -> &'a str {
        match self {
            FeatureChannel::PartOfSpeech => &record.part_of_speech,
            FeatureChannel::Accent => &record.accent,
            FeatureChannel::Stress => &record.stress,
            FeatureChannel::Tone => &record.tone,
            FeatureChannel::PhraseId => &record.phrase_id,
            FeatureChannel::BreakIndex => &record.break_index,
            FeatureChannel::Phoneme => &record.phoneme,
        }
    }

    /// The channel's name as it appears on the input record; used as the
    /// key when logging per-channel diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureChannel::PartOfSpeech => "part_of_speech",
            FeatureChannel::Accent => "accent",
            FeatureChannel::Stress => "stress",
            FeatureChannel::Tone => "tone",
            FeatureChannel::PhraseId => "phrase_id",
            FeatureChannel::BreakIndex => "break_index",
            FeatureChannel::Phoneme => "phoneme",
        }
    }
}
