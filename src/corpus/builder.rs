// Corpus encoding — append volumes, then freeze.
//
// The builder owns the flat symbol array and the volume boundary table
// while volumes stream in. `finish` trims the buffers and hands back an
// immutable `Corpus` that can be shared freely across solver threads.
//
// The boundary table stores each volume's exclusive end offset in symbol
// units, so volume i occupies [ends[i-1], ends[i]) with an implicit 0
// before the first entry. Keeping end offsets strictly increasing is what
// makes every downstream range computation valid.

use std::ops::Range;

use anyhow::Result;

use crate::corpus::record::{FeatureChannel, PhonemeRecord, CHANNEL_COUNT};
use crate::corpus::symbols::SymbolTable;
use crate::corpus::{Symbol, VolumeIndex};

/// Incremental corpus encoder.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    tables: [SymbolTable; CHANNEL_COUNT],
    symbols: Vec<Symbol>,
    volume_ends: Vec<usize>,
    volume_names: Vec<String>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one volume's records and append them to the corpus.
    ///
    /// Returns the zero-based index assigned to the volume (insertion
    /// order). The call is atomic: an empty volume is rejected before any
    /// state changes, so the boundary table stays strictly increasing.
    pub fn add_volume(&mut self, records: &[PhonemeRecord]) -> Result<VolumeIndex> {
        if records.is_empty() {
            anyhow::bail!(
                "volume {} contains no phoneme records; every volume needs at least one",
                self.volume_ends.len()
            );
        }

        self.symbols.reserve(records.len() * CHANNEL_COUNT);
        for record in records {
            for channel in FeatureChannel::ALL {
                let id = self.tables[channel as usize].intern(channel.value(record));
                self.symbols.push(id);
            }
        }
        self.volume_ends.push(self.symbols.len());
        self.volume_names.push(records[0].doc_name.clone());

        Ok(self.volume_ends.len() - 1)
    }

    /// Number of volumes encoded so far.
    pub fn volume_count(&self) -> usize {
        self.volume_ends.len()
    }

    /// Freeze the corpus: trim the buffers to size and hand back the
    /// immutable view.
    pub fn finish(mut self) -> Corpus {
        self.symbols.shrink_to_fit();
        self.volume_ends.shrink_to_fit();
        self.volume_names.shrink_to_fit();
        Corpus {
            tables: self.tables,
            symbols: self.symbols,
            volume_ends: self.volume_ends,
            volume_names: self.volume_names,
        }
    }
}

/// Frozen, read-only corpus shared across solver threads.
#[derive(Debug)]
pub struct Corpus {
    tables: [SymbolTable; CHANNEL_COUNT],
    symbols: Vec<Symbol>,
    volume_ends: Vec<usize>,
    volume_names: Vec<String>,
}

impl Corpus {
    pub fn volume_count(&self) -> usize {
        self.volume_ends.len()
    }

    /// The volume's name, taken from its first record's `doc_name`.
    pub fn volume_name(&self, volume: VolumeIndex) -> &str {
        &self.volume_names[volume]
    }

    /// The volume's region within the flat symbol array.
    pub fn volume_range(&self, volume: VolumeIndex) -> Range<usize> {
        let start = if volume == 0 {
            0
        } else {
            self.volume_ends[volume - 1]
        };
        start..self.volume_ends[volume]
    }

    pub fn phoneme_count(&self, volume: VolumeIndex) -> usize {
        self.volume_range(volume).len() / CHANNEL_COUNT
    }

    pub fn total_phonemes(&self) -> usize {
        self.symbols.len() / CHANNEL_COUNT
    }

    /// How many full windows of `window_phonemes` fit in the volume.
    pub fn window_count(&self, volume: VolumeIndex, window_phonemes: usize) -> usize {
        let phonemes = self.phoneme_count(volume);
        if phonemes < window_phonemes {
            0
        } else {
            phonemes - window_phonemes + 1
        }
    }

    /// Symbol-array offsets of every valid window start in the volume,
    /// one per phoneme position.
    pub fn window_starts(
        &self,
        volume: VolumeIndex,
        window_phonemes: usize,
    ) -> impl Iterator<Item = usize> {
        let start = self.volume_range(volume).start;
        (0..self.window_count(volume, window_phonemes)).map(move |k| start + k * CHANNEL_COUNT)
    }

    /// The flat symbol array.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Distinct values seen in one channel's symbol table.
    pub fn symbol_count(&self, channel: FeatureChannel) -> usize {
        self.tables[channel as usize].len()
    }
}
