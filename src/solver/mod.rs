// Comparison solving — problem enumeration, the worker pool, and votes.

pub mod pool;
pub mod problems;
pub mod votes;
