// Comparison problem generation — which seed windows get solved.
//
// Exhaustive mode enumerates every valid window of every focus volume (one
// window per phoneme position), clipped by the per-volume phoneme cap.
// Sampled mode draws one uniformly random window per focus volume per
// round, which approximates the exhaustive answer on corpora too large to
// compare fully.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

use crate::corpus::builder::Corpus;
use crate::corpus::record::CHANNEL_COUNT;
use crate::corpus::VolumeIndex;

/// How seed windows are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Every valid window of every focus volume.
    Exhaustive,
    /// One random window per focus volume per round.
    Sampled { rounds: usize },
}

/// One seed window to score against every candidate volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonProblem {
    /// Global sequential id, assigned in generation order starting at 0.
    pub id: usize,
    /// Volume the seed window belongs to.
    pub seed_volume: VolumeIndex,
    /// Offset of the window's first symbol in the flat symbol array.
    pub window_start: usize,
}

/// Enumerate the comparison problems for a frozen corpus.
///
/// `focus` narrows the seed set to the given volumes (all volumes when
/// None); an out-of-range index is a configuration error. Volumes shorter
/// than one window contribute no problems. `max_windows_per_volume`
/// truncates each volume's eligible windows to the first N in volume
/// order, bounding the work one very large volume can generate; the same
/// cap bounds the region sampled windows are drawn from.
pub fn generate_problems(
    corpus: &Corpus,
    window_phonemes: usize,
    focus: Option<&[VolumeIndex]>,
    mode: GenerationMode,
    max_windows_per_volume: Option<usize>,
    rng: &mut StdRng,
) -> Result<Vec<ComparisonProblem>> {
    if let Some(focus) = focus {
        for &volume in focus {
            if volume >= corpus.volume_count() {
                anyhow::bail!(
                    "focus volume index {volume} is out of range ({} volumes in corpus)",
                    corpus.volume_count()
                );
            }
        }
    }

    let seeds: Vec<VolumeIndex> = match focus {
        Some(focus) => focus.to_vec(),
        None => (0..corpus.volume_count()).collect(),
    };

    let mut problems = Vec::new();
    match mode {
        GenerationMode::Exhaustive => {
            for &seed in &seeds {
                let eligible =
                    eligible_windows(corpus, seed, window_phonemes, max_windows_per_volume);
                for start in corpus.window_starts(seed, window_phonemes).take(eligible) {
                    problems.push(ComparisonProblem {
                        id: problems.len(),
                        seed_volume: seed,
                        window_start: start,
                    });
                }
            }
        }
        GenerationMode::Sampled { rounds } => {
            for _ in 0..rounds {
                for &seed in &seeds {
                    let eligible =
                        eligible_windows(corpus, seed, window_phonemes, max_windows_per_volume);
                    if eligible == 0 {
                        continue;
                    }
                    let window = rng.random_range(0..eligible);
                    problems.push(ComparisonProblem {
                        id: problems.len(),
                        seed_volume: seed,
                        window_start: corpus.volume_range(seed).start + window * CHANNEL_COUNT,
                    });
                }
            }
        }
    }

    Ok(problems)
}

fn eligible_windows(
    corpus: &Corpus,
    volume: VolumeIndex,
    window_phonemes: usize,
    max_windows_per_volume: Option<usize>,
) -> usize {
    let count = corpus.window_count(volume, window_phonemes);
    match max_windows_per_volume {
        Some(cap) => count.min(cap),
        None => count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::builder::CorpusBuilder;
    use crate::corpus::record::PhonemeRecord;
    use rand::SeedableRng;

    fn volume(doc: &str, phonemes: usize) -> Vec<PhonemeRecord> {
        (0..phonemes)
            .map(|i| PhonemeRecord {
                doc_name: doc.to_string(),
                tei_section_id: "s1".to_string(),
                sentence_id: "1".to_string(),
                phrase_id: "p1".to_string(),
                part_of_speech: "N".to_string(),
                accent: "H".to_string(),
                stress: "0".to_string(),
                tone: "L".to_string(),
                break_index: "1".to_string(),
                phoneme: format!("{doc}-{i}"),
            })
            .collect()
    }

    fn corpus(sizes: &[usize]) -> Corpus {
        let mut builder = CorpusBuilder::new();
        for (i, &size) in sizes.iter().enumerate() {
            builder.add_volume(&volume(&format!("vol-{i}"), size)).unwrap();
        }
        builder.finish()
    }

    #[test]
    fn test_exhaustive_ids_are_sequential() {
        let corpus = corpus(&[10, 6]);
        let mut rng = StdRng::seed_from_u64(0);
        let problems =
            generate_problems(&corpus, 4, None, GenerationMode::Exhaustive, None, &mut rng)
                .unwrap();
        // 7 windows for 10 phonemes, 3 for 6.
        assert_eq!(problems.len(), 10);
        for (i, problem) in problems.iter().enumerate() {
            assert_eq!(problem.id, i);
        }
    }

    #[test]
    fn test_window_cap_takes_the_first_windows() {
        let corpus = corpus(&[10]);
        let mut rng = StdRng::seed_from_u64(0);
        let problems = generate_problems(
            &corpus,
            4,
            None,
            GenerationMode::Exhaustive,
            Some(3),
            &mut rng,
        )
        .unwrap();
        assert_eq!(problems.len(), 3);
        let starts: Vec<usize> = problems.iter().map(|p| p.window_start).collect();
        assert_eq!(starts, [0, CHANNEL_COUNT, 2 * CHANNEL_COUNT]);
    }

    #[test]
    fn test_out_of_range_focus_is_rejected() {
        let corpus = corpus(&[10, 10]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = generate_problems(
            &corpus,
            4,
            Some(&[0, 2]),
            GenerationMode::Exhaustive,
            None,
            &mut rng,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sampled_skips_windowless_volumes() {
        let corpus = corpus(&[10, 2]);
        let mut rng = StdRng::seed_from_u64(7);
        let problems = generate_problems(
            &corpus,
            4,
            None,
            GenerationMode::Sampled { rounds: 2 },
            None,
            &mut rng,
        )
        .unwrap();
        assert_eq!(problems.len(), 2, "only the long volume can seed");
        assert!(problems.iter().all(|p| p.seed_volume == 0));
    }

    #[test]
    fn test_sampled_draws_land_on_phoneme_positions() {
        let corpus = corpus(&[12, 12]);
        let mut rng = StdRng::seed_from_u64(42);
        let problems = generate_problems(
            &corpus,
            4,
            None,
            GenerationMode::Sampled { rounds: 5 },
            None,
            &mut rng,
        )
        .unwrap();
        for problem in &problems {
            let range = corpus.volume_range(problem.seed_volume);
            assert!(range.contains(&problem.window_start));
            assert_eq!((problem.window_start - range.start) % CHANNEL_COUNT, 0);
            let window = (problem.window_start - range.start) / CHANNEL_COUNT;
            assert!(window < corpus.window_count(problem.seed_volume, 4));
        }
    }
}
