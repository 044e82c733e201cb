// Cadence: prosodic similarity for annotated phoneme corpora.
//
// This is the library root. Each module corresponds to a stage of the
// similarity pipeline: corpus encoding, the window metric, comparison
// problem generation and solving, and result assembly.

pub mod assemble;
pub mod config;
pub mod corpus;
pub mod metric;
pub mod pipeline;
pub mod solver;
