// Result assembly — merging solved scores back onto the record stream.
//
// Each solved problem carries the per-candidate mean similarities for one
// seed window. A window's scores are attributed to the phoneme position at
// which the window completes, so the first `window - 1` positions of every
// volume have no row. Those positions keep an internal "not computed"
// marker and are rendered as "0" only at emission time, which keeps the
// text output shape while letting callers of `assemble_rows` tell the two
// apart.

use serde::Serialize;

use crate::corpus::builder::Corpus;
use crate::corpus::record::{PhonemeRecord, CHANNEL_COUNT};
use crate::solver::problems::ComparisonProblem;

/// Per-phoneme-position score rows for every volume.
///
/// `rows[volume][position]` stays None until a solved window lands on the
/// position; sampled runs leave most positions unset.
pub type ScoreRows = Vec<Vec<Option<Box<[f64]>>>>;

/// One candidate volume's similarity at a phoneme position, rendered as
/// decimal text for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityEntry {
    /// Name of the candidate volume.
    pub volume: String,
    /// Mean window similarity as decimal text; "0" when no full window
    /// has elapsed at this position.
    pub score: String,
}

/// An input record re-emitted with its similarity vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    pub record: PhonemeRecord,
    /// One entry per other volume, in volume order (self omitted).
    pub similarities: Vec<SimilarityEntry>,
}

/// Attribute each solved problem's scores to a phoneme position.
///
/// The window starting at phoneme position `k` covers `[k, k + window)`
/// and lands on position `k + window - 1`, the position at which a full
/// window has first elapsed.
pub fn assemble_rows(
    problems: &[ComparisonProblem],
    scores: Vec<Box<[f64]>>,
    corpus: &Corpus,
    window_phonemes: usize,
) -> ScoreRows {
    let mut rows: ScoreRows = (0..corpus.volume_count())
        .map(|volume| vec![None; corpus.phoneme_count(volume)])
        .collect();

    for (problem, slot) in problems.iter().zip(scores) {
        let region_start = corpus.volume_range(problem.seed_volume).start;
        let window_index = (problem.window_start - region_start) / CHANNEL_COUNT;
        let position = window_index + window_phonemes - 1;
        rows[problem.seed_volume][position] = Some(slot);
    }

    rows
}

/// Merge score rows back onto the retained per-volume records.
///
/// Every record gains one entry per other volume, in volume order.
/// Positions without a row (not yet covered by a full window, volumes
/// outside the focus list, volumes shorter than one window) emit "0".
pub fn annotate_volumes(
    volumes: Vec<Vec<PhonemeRecord>>,
    rows: ScoreRows,
    corpus: &Corpus,
) -> Vec<Vec<AnnotatedRecord>> {
    let volume_count = corpus.volume_count();
    volumes
        .into_iter()
        .zip(rows)
        .enumerate()
        .map(|(volume, (records, row))| {
            records
                .into_iter()
                .enumerate()
                .map(|(position, record)| {
                    let similarities = (0..volume_count)
                        .filter(|&candidate| candidate != volume)
                        .map(|candidate| SimilarityEntry {
                            volume: corpus.volume_name(candidate).to_string(),
                            score: match &row[position] {
                                Some(slot) => slot[candidate].to_string(),
                                None => "0".to_string(),
                            },
                        })
                        .collect();
                    AnnotatedRecord {
                        record,
                        similarities,
                    }
                })
                .collect()
        })
        .collect()
}
