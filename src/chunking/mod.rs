//! Splitting enriched course text into overlapping, bounded chunks.
//!
//! Chunks are exact substrings of their record. Consecutive chunks of a record
//! share exactly `overlap` characters, so dropping the first `overlap`
//! characters of every chunk but the first and concatenating reproduces the
//! record. Cut points prefer a paragraph break, then a line break, then the end
//! of a sentence, then whitespace, and only then a hard cut at the size limit.
//! All lengths are counted in characters, not bytes.

use crate::catalog::EnrichedRecord;
use crate::config::ChunkingSettings;
use crate::error::{RagError, Result};
use serde::Serialize;
use tracing::debug;

/// A contiguous slice of an enriched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Index of the source record (and course) in catalog order.
    pub record_index: usize,
    /// Order of this chunk within its record.
    pub index: usize,
    /// Character offset of the chunk in the record text.
    pub start: usize,
    /// Chunk text.
    pub text: String,
}

/// Where a chunk may end, from most to least preferred.
#[derive(Debug, Clone, Copy)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

impl Boundary {
    const PREFERENCE: [Boundary; 4] = [
        Boundary::Paragraph,
        Boundary::Line,
        Boundary::Sentence,
        Boundary::Word,
    ];

    /// Whether a chunk ending right before `chars[end]` ends on this boundary.
    fn ends_at(self, chars: &[char], end: usize) -> bool {
        let last = chars[end - 1];
        match self {
            Boundary::Paragraph => end >= 2 && last == '\n' && chars[end - 2] == '\n',
            Boundary::Line => last == '\n',
            Boundary::Sentence => {
                end >= 2 && last.is_whitespace() && matches!(chars[end - 2], '.' | '!' | '?')
            }
            Boundary::Word => last.is_whitespace(),
        }
    }
}

/// Fixed-size chunker with overlap.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker. `overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "invalid chunking parameters: size {} with overlap {}",
                chunk_size, overlap
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk every record, preserving record order.
    pub fn chunk(&self, records: &[EnrichedRecord]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = records
            .iter()
            .enumerate()
            .flat_map(|(record_index, record)| {
                self.split(&record.text)
                    .into_iter()
                    .enumerate()
                    .map(move |(index, (start, text))| Chunk {
                        record_index,
                        index,
                        start,
                        text,
                    })
            })
            .collect();

        debug!("Split {} records into {} chunks", records.len(), chunks.len());
        chunks
    }

    /// Split one text into `(char_offset, text)` pieces.
    pub fn split(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        if len == 0 {
            return Vec::new();
        }
        if len <= self.chunk_size {
            return vec![(0, text.to_string())];
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        loop {
            let hard_end = start + self.chunk_size;
            if hard_end >= len {
                pieces.push((start, chars[start..].iter().collect()));
                break;
            }

            // Ending past start + overlap guarantees the next chunk starts later.
            let min_end = start + self.overlap + 1;
            let end = Self::find_cut(&chars, min_end, hard_end).unwrap_or(hard_end);

            pieces.push((start, chars[start..end].iter().collect()));
            start = end - self.overlap;
        }

        pieces
    }

    fn find_cut(chars: &[char], min_end: usize, max_end: usize) -> Option<usize> {
        Boundary::PREFERENCE.iter().find_map(|boundary| {
            (min_end..=max_end)
                .rev()
                .find(|&end| boundary.ends_at(chars, end))
        })
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}
