//! # Word Vocabulary

use serde::{Deserialize, Serialize};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    vocab::{
        FrequencyCounter,
        SymbolTable,
        Vocabulary,
        reserved::{self, BOS_ID, EOS_ID, UNK_ID},
    },
};

/// Whitespace-token vocabulary.
///
/// ## Layout
/// * `0` - `<unk>`
/// * `1` - `<s>`
/// * `2` - `</s>`
/// * `3..` - the most frequent tokens, by descending frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WordVocabularyRecord")]
pub struct WordVocabulary {
    table: SymbolTable,
}

/// The serialized form of a [`WordVocabulary`], checked on load.
#[derive(Deserialize)]
struct WordVocabularyRecord {
    table: SymbolTable,
}

impl TryFrom<WordVocabularyRecord> for WordVocabulary {
    type Error = NmtError;

    fn try_from(record: WordVocabularyRecord) -> NmtResult<Self> {
        record.table.check_reserved(&Self::RESERVED)?;
        Ok(Self {
            table: record.table,
        })
    }
}

impl WordVocabulary {
    /// The number of reserved IDs.
    pub const NUM_RESERVED: usize = 3;

    /// The reserved surfaces, in ID order.
    pub const RESERVED: [&'static str; 3] = [reserved::UNK, reserved::BOS, reserved::EOS];

    /// Build a vocabulary from sample lines.
    ///
    /// ## Arguments
    /// * `samples` - the corpus lines.
    /// * `size` - the maximum vocabulary size, including reserved IDs.
    pub fn from_samples<I>(
        samples: I,
        size: usize,
    ) -> NmtResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut counter = FrequencyCounter::default();
        counter.count_words(samples);
        Self::from_counter(&counter, size)
    }

    /// Build a vocabulary from a word-level [`FrequencyCounter`].
    ///
    /// ## Arguments
    /// * `counter` - word counts over the corpus.
    /// * `size` - the maximum vocabulary size, including reserved IDs.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(counter)))]
    pub fn from_counter(
        counter: &FrequencyCounter,
        size: usize,
    ) -> NmtResult<Self> {
        if size < Self::NUM_RESERVED {
            return Err(NmtError::config(format!(
                "word vocabulary size ({size}) must be >= {}",
                Self::NUM_RESERVED
            )));
        }

        let mut table = SymbolTable::with_reserved(&Self::RESERVED);

        let mut assigned = 0;
        for (word, count) in counter.ranked(size - Self::NUM_RESERVED) {
            assigned += count;
            table.push(word, count);
        }

        table.set_frequency(UNK_ID, counter.num_symbols - assigned);
        table.set_frequency(BOS_ID, counter.num_lines);
        table.set_frequency(EOS_ID, counter.num_lines);

        log::info!(
            "Built word vocabulary: {} entries from {} distinct tokens",
            table.len(),
            counter.counts.len()
        );

        Ok(Self { table })
    }
}

impl Vocabulary for WordVocabulary {
    fn size(&self) -> usize {
        self.table.len()
    }

    fn get_id(
        &self,
        surface: &str,
    ) -> WordId {
        self.table.id(surface).unwrap_or(UNK_ID)
    }

    fn get_word(
        &self,
        id: WordId,
    ) -> &str {
        self.table.surface(id).unwrap_or(reserved::UNK)
    }

    fn get_frequency(
        &self,
        id: WordId,
    ) -> u64 {
        self.table.frequency(id)
    }

    fn convert_to_ids(
        &self,
        sentence: &str,
    ) -> Vec<WordId> {
        sentence
            .split_whitespace()
            .map(|token| self.get_id(token))
            .collect()
    }

    fn convert_to_sentence(
        &self,
        ids: &[WordId],
    ) -> String {
        ids.iter()
            .map(|&id| self.get_word(id))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
