// Similarity pipeline — the host-facing surface.
//
// Hosts feed one `add_volume` call per document and one `finish` call at
// end-of-stream. `finish` freezes the corpus, builds the metric, generates
// the comparison problems, runs the parallel solve, and merges scores back
// onto the retained records.

use std::time::Instant;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assemble;
use crate::assemble::AnnotatedRecord;
use crate::config::EngineConfig;
use crate::corpus::builder::CorpusBuilder;
use crate::corpus::record::{FeatureChannel, PhonemeRecord};
use crate::corpus::VolumeIndex;
use crate::metric::WindowMetric;
use crate::solver::pool;
use crate::solver::pool::SolveOptions;
use crate::solver::problems;
use crate::solver::problems::GenerationMode;
use crate::solver::votes::VoteMatrix;

/// Final output for one run: annotated volumes plus the vote matrix.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Volumes in insertion order, each record annotated with its
    /// similarity vector.
    pub volumes: Vec<Vec<AnnotatedRecord>>,
    /// Volume names in insertion order.
    pub volume_names: Vec<String>,
    pub votes: VoteMatrix,
    /// The seed the run actually used (configured or freshly drawn).
    pub run_seed: u64,
}

/// Stateful pipeline: volumes stream in, one report comes out.
#[derive(Debug)]
pub struct SimilarityPipeline {
    config: EngineConfig,
    builder: CorpusBuilder,
    volumes: Vec<Vec<PhonemeRecord>>,
}

impl SimilarityPipeline {
    /// Validate the configuration and set up an empty pipeline.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            builder: CorpusBuilder::new(),
            volumes: Vec::new(),
        })
    }

    /// Encode one volume and retain its records for the output stream.
    pub fn add_volume(&mut self, records: Vec<PhonemeRecord>) -> Result<VolumeIndex> {
        let volume = self.builder.add_volume(&records)?;
        debug!(volume, phonemes = records.len(), "Volume encoded");
        self.volumes.push(records);
        Ok(volume)
    }

    /// Number of volumes accepted so far.
    pub fn volume_count(&self) -> usize {
        self.builder.volume_count()
    }

    /// End of stream: run the whole similarity computation.
    pub fn finish(self) -> Result<AnalysisReport> {
        let Self {
            config,
            builder,
            volumes,
        } = self;

        let corpus = builder.finish();
        info!(
            volumes = corpus.volume_count(),
            phonemes = corpus.total_phonemes(),
            "Corpus frozen"
        );
        for channel in FeatureChannel::ALL {
            debug!(
                channel = channel.as_str(),
                distinct = corpus.symbol_count(channel),
                "Channel vocabulary"
            );
        }
        if corpus.volume_count() == 0 {
            warn!("No volumes were added; emitting an empty report");
        }

        let metric = WindowMetric::build(
            &config.weights,
            config.window_size_in_phonemes,
            config.weighting_power,
        )?;

        let run_seed = config.random_seed.unwrap_or_else(|| rand::rng().random());
        info!(seed = run_seed, "Run seed resolved");

        let mode = if config.use_sampling {
            GenerationMode::Sampled {
                rounds: config.num_rounds,
            }
        } else {
            GenerationMode::Exhaustive
        };
        let mut rng = StdRng::seed_from_u64(run_seed);
        let problems = problems::generate_problems(
            &corpus,
            config.window_size_in_phonemes,
            config.focus_volumes.as_deref(),
            mode,
            config.max_phonemes_per_volume,
            &mut rng,
        )?;
        info!(
            problems = problems.len(),
            sampling = config.use_sampling,
            "Comparison problems generated"
        );
        if problems.is_empty() && corpus.volume_count() > 0 {
            warn!("No comparison problems generated; every similarity will be a placeholder");
        }

        let started = Instant::now();
        let outcome = pool::solve(
            &problems,
            &corpus,
            &metric,
            &SolveOptions {
                num_threads: config.num_threads,
                run_seed,
                show_progress: config.show_progress,
            },
        )?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            threads = config.num_threads,
            "Similarity solve complete"
        );

        let rows = assemble::assemble_rows(
            &problems,
            outcome.scores,
            &corpus,
            config.window_size_in_phonemes,
        );
        let annotated = assemble::annotate_volumes(volumes, rows, &corpus);
        let volume_names = (0..corpus.volume_count())
            .map(|volume| corpus.volume_name(volume).to_string())
            .collect();

        Ok(AnalysisReport {
            volumes: annotated,
            volume_names,
            votes: outcome.votes,
            run_seed,
        })
    }
}
