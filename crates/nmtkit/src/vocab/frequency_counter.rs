//! # Frequency Counter
//!
//! Corpus frequency scans shared by the vocabulary builders.

use compact_str::CompactString;

use crate::types::{NmtHashMap, hash_map_with_capacity};

/// Counts symbol frequencies over a line-oriented corpus.
///
/// The same counter serves word-level and letter-level scans;
/// the line, token, and separator totals feed the reserved-ID frequencies.
#[derive(Debug, Clone)]
pub struct FrequencyCounter {
    /// ``{ symbol -> count }``.
    pub counts: NmtHashMap<CompactString, u64>,

    /// The number of lines scanned.
    pub num_lines: u64,

    /// The number of symbols counted.
    pub num_symbols: u64,

    /// The number of token boundaries seen (tokens per line, minus one).
    pub num_separators: u64,
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self {
            counts: hash_map_with_capacity(1024),
            num_lines: 0,
            num_symbols: 0,
            num_separators: 0,
        }
    }
}

impl FrequencyCounter {
    /// Count the whitespace-separated tokens of each sample line.
    pub fn count_words<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for sample in samples {
            self.num_lines += 1;
            let mut num_tokens = 0;
            for token in sample.as_ref().split_whitespace() {
                *self.counts.entry(token.into()).or_default() += 1;
                num_tokens += 1;
            }
            self.num_symbols += num_tokens;
            self.num_separators += num_tokens.saturating_sub(1);
        }
    }

    /// Count the letters (Unicode scalar values) of each whitespace token of each line.
    pub fn count_letters<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut buf = [0u8; 4];
        for sample in samples {
            self.num_lines += 1;
            let mut num_tokens: u64 = 0;
            for token in sample.as_ref().split_whitespace() {
                num_tokens += 1;
                for letter in token.chars() {
                    let letter: &str = letter.encode_utf8(&mut buf);
                    *self.counts.entry(letter.into()).or_default() += 1;
                    self.num_symbols += 1;
                }
            }
            self.num_separators += num_tokens.saturating_sub(1);
        }
    }

    /// Return the `limit` most frequent symbols.
    ///
    /// Ordered by descending count; ties are broken by ascending
    /// lexicographic order so the ranking is deterministic.
    pub fn ranked(
        &self,
        limit: usize,
    ) -> Vec<(CompactString, u64)> {
        let mut entries: Vec<(CompactString, u64)> = self
            .counts
            .iter()
            .map(|(symbol, &count)| (symbol.clone(), count))
            .collect();
        entries.sort_by(|(a, ac), (b, bc)| bc.cmp(ac).then_with(|| a.cmp(b)));
        entries.truncate(limit);
        entries
    }
}
