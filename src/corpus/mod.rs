// Corpus encoding — per-channel symbol interning and the flat feature array.
//
// Volumes stream in as per-phoneme records, get interned channel by channel
// into dense ids, and end up as one flat symbol array plus a boundary table
// giving each volume's region. Everything downstream (metric, solver,
// assembler) reads that frozen view.

pub mod builder;
pub mod record;
pub mod symbols;

/// Dense integer id assigned to one observed value within one feature channel.
pub type Symbol = u32;

/// Zero-based volume index in corpus insertion order.
pub type VolumeIndex = usize;
