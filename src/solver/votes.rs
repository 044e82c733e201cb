// Vote matrix — which candidate each seed window chose.

use serde::Serialize;

use crate::corpus::VolumeIndex;

/// Square winner-count matrix, seed-major.
///
/// `votes(seed, candidate)` counts how many of the seed volume's windows
/// chose the candidate as their best match. One vote lands per solved
/// problem, so a seed's row totals the number of problems generated for
/// that seed.
#[derive(Debug, Clone, Serialize)]
pub struct VoteMatrix {
    volumes: usize,
    counts: Vec<u64>,
}

impl VoteMatrix {
    pub fn new(volumes: usize) -> Self {
        Self {
            volumes,
            counts: vec![0; volumes * volumes],
        }
    }

    pub fn record_vote(&mut self, seed: VolumeIndex, winner: VolumeIndex) {
        self.counts[seed * self.volumes + winner] += 1;
    }

    pub fn votes(&self, seed: VolumeIndex, candidate: VolumeIndex) -> u64 {
        self.counts[seed * self.volumes + candidate]
    }

    /// One seed volume's winner counts, indexed by candidate.
    pub fn row(&self, seed: VolumeIndex) -> &[u64] {
        &self.counts[seed * self.volumes..(seed + 1) * self.volumes]
    }

    /// Total votes recorded for a seed volume's windows.
    pub fn seed_total(&self, seed: VolumeIndex) -> u64 {
        self.row(seed).iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_is_all_zero() {
        let votes = VoteMatrix::new(3);
        for seed in 0..3 {
            for candidate in 0..3 {
                assert_eq!(votes.votes(seed, candidate), 0);
            }
        }
    }

    #[test]
    fn test_votes_accumulate_per_cell() {
        let mut votes = VoteMatrix::new(2);
        votes.record_vote(0, 1);
        votes.record_vote(0, 1);
        votes.record_vote(1, 0);
        assert_eq!(votes.votes(0, 1), 2);
        assert_eq!(votes.votes(0, 0), 0);
        assert_eq!(votes.votes(1, 0), 1);
    }

    #[test]
    fn test_seed_total_sums_the_row() {
        let mut votes = VoteMatrix::new(3);
        votes.record_vote(1, 0);
        votes.record_vote(1, 1);
        votes.record_vote(1, 2);
        votes.record_vote(1, 2);
        assert_eq!(votes.seed_total(1), 4);
        assert_eq!(votes.row(1), &[1, 1, 2]);
        assert_eq!(votes.seed_total(0), 0);
    }
}
