// Parallel solve — a fixed worker pool over a shared problem cursor.
//
// Workers claim problem indices from an atomic counter, score every
// candidate volume for the claimed seed window, and send the finished
// score slot back over a channel. The orchestrating thread drains the
// channel while the workers run, filling per-problem slots and counting
// votes sequentially, so no increment is lost and the hot loop takes no
// locks. A panicking worker trips an abort flag checked between claims;
// the first panic message surfaces after the pool joins and no partial
// result escapes.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};
use std::thread;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::corpus::builder::Corpus;
use crate::corpus::VolumeIndex;
use crate::metric::WindowMetric;
use crate::solver::problems::ComparisonProblem;
use crate::solver::votes::VoteMatrix;

/// Mixes the problem id into the run seed for per-problem tie-breaks.
const TIE_BREAK_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Knobs for one solve run.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Worker threads to spawn (capped at the problem count).
    pub num_threads: usize,
    /// Run seed. Tie-breaks are derived from it and the problem id, so a
    /// fixed seed reproduces the same votes under any scheduling.
    pub run_seed: u64,
    /// Draw a progress bar while solving.
    pub show_progress: bool,
}

/// Everything a solve produces: per-problem score slots plus the votes.
#[derive(Debug)]
pub struct SolveOutcome {
    /// Per-candidate mean similarities, indexed by problem id.
    pub scores: Vec<Box<[f64]>>,
    pub votes: VoteMatrix,
}

/// One finished problem, sent from a worker to the orchestrator.
struct SolvedProblem {
    id: usize,
    seed_volume: VolumeIndex,
    scores: Box<[f64]>,
    winner: VolumeIndex,
}

/// Solve every problem against the frozen corpus.
///
/// Score slots are identical for any thread count; only scheduling varies.
/// Fails with the first panic message if any worker dies, returning no
/// partial votes.
pub fn solve(
    problems: &[ComparisonProblem],
    corpus: &Corpus,
    metric: &WindowMetric,
    options: &SolveOptions,
) -> Result<SolveOutcome> {
    let mut votes = VoteMatrix::new(corpus.volume_count());
    if problems.is_empty() {
        return Ok(SolveOutcome {
            scores: Vec::new(),
            votes,
        });
    }

    let threads = options.num_threads.min(problems.len()).max(1);
    let cursor = AtomicUsize::new(0);
    let abort = AtomicBool::new(false);
    let first_panic: Mutex<Option<String>> = Mutex::new(None);
    let (tx, rx) = mpsc::channel::<SolvedProblem>();

    let mut scores: Vec<Box<[f64]>> = vec![Vec::new().into_boxed_slice(); problems.len()];

    thread::scope(|scope| {
        for _ in 0..threads {
            let tx = tx.clone();
            let cursor = &cursor;
            let abort = &abort;
            let first_panic = &first_panic;
            scope.spawn(move || loop {
                if abort.load(Ordering::Relaxed) {
                    break;
                }
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                if index >= problems.len() {
                    break;
                }
                let solved = catch_unwind(AssertUnwindSafe(|| {
                    solve_one(&problems[index], corpus, metric, options.run_seed)
                }));
                match solved {
                    Ok(solved) => {
                        // A dropped receiver means the run is unwinding.
                        if tx.send(solved).is_err() {
                            break;
                        }
                    }
                    Err(payload) => {
                        let mut slot = first_panic.lock().unwrap_or_else(|e| e.into_inner());
                        if slot.is_none() {
                            *slot = Some(panic_message(payload));
                        }
                        abort.store(true, Ordering::Relaxed);
                        break;
                    }
                }
            });
        }
        drop(tx);

        let progress = if options.show_progress {
            let pb = ProgressBar::new(problems.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Solving [{bar:30}] {pos}/{len} ({eta})")
                    .unwrap(),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for solved in rx {
            votes.record_vote(solved.seed_volume, solved.winner);
            scores[solved.id] = solved.scores;
            progress.inc(1);
        }
        progress.finish_and_clear();
    });

    let first_panic = first_panic.into_inner().unwrap_or_else(|e| e.into_inner());
    if let Some(message) = first_panic {
        anyhow::bail!("similarity worker panicked: {message}");
    }

    debug!(
        problems = problems.len(),
        threads, "All comparison problems solved"
    );

    Ok(SolveOutcome { scores, votes })
}

/// Score one seed window against every candidate volume.
///
/// A candidate's score is the mean similarity of the seed window across
/// all of the candidate's windows; a candidate too short for a single
/// window scores 0.0. The best-scoring candidate wins the vote, with
/// exact ties broken uniformly at random.
fn solve_one(
    problem: &ComparisonProblem,
    corpus: &Corpus,
    metric: &WindowMetric,
    run_seed: u64,
) -> SolvedProblem {
    let symbols = corpus.symbols();
    let seed_window =
        &symbols[problem.window_start..problem.window_start + metric.window_features()];

    let volume_count = corpus.volume_count();
    let mut scores = Vec::with_capacity(volume_count);
    let mut best = f64::NEG_INFINITY;
    let mut tied: Vec<VolumeIndex> = Vec::new();

    for candidate in 0..volume_count {
        let mut total = 0.0;
        let mut windows = 0usize;
        for start in corpus.window_starts(candidate, metric.window_phonemes()) {
            let candidate_window = &symbols[start..start + metric.window_features()];
            total += metric.window_similarity(seed_window, candidate_window);
            windows += 1;
        }
        let mean = if windows == 0 { 0.0 } else { total / windows as f64 };
        scores.push(mean);

        if mean > best {
            best = mean;
            tied.clear();
            tied.push(candidate);
        } else if mean == best {
            tied.push(candidate);
        }
    }

    let winner = if tied.len() == 1 {
        tied[0]
    } else {
        // Derived from the run seed and the problem id, not worker state,
        // so the same seed picks the same winners under any scheduling.
        let mut rng = StdRng::seed_from_u64(
            run_seed ^ (problem.id as u64).wrapping_mul(TIE_BREAK_SEED_MIX),
        );
        tied[rng.random_range(0..tied.len())]
    };

    SolvedProblem {
        id: problem.id,
        seed_volume: problem.seed_volume,
        scores: scores.into_boxed_slice(),
        winner,
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
