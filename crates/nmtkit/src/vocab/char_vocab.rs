//! # Character Vocabulary
//!
//! Letters are Unicode scalar values; the explicit `<sp>` symbol
//! separates the tokens of a sentence.

use serde::{Deserialize, Serialize};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    vocab::{
        FrequencyCounter,
        SymbolTable,
        Vocabulary,
        reserved::{self, BOS_ID, EOS_ID, SEPARATOR_ID, UNK_ID},
    },
};

/// Letter-level vocabulary.
///
/// ## Layout
/// * `0` - `<unk>`
/// * `1` - `<s>`
/// * `2` - `</s>`
/// * `3` - `<sp>`, the token separator
/// * `4..` - the most frequent letters, by descending frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CharVocabularyRecord")]
pub struct CharVocabulary {
    table: SymbolTable,
}

#[derive(Deserialize)]
struct CharVocabularyRecord {
    table: SymbolTable,
}

impl TryFrom<CharVocabularyRecord> for CharVocabulary {
    type Error = NmtError;

    fn try_from(record: CharVocabularyRecord) -> NmtResult<Self> {
        record.table.check_reserved(&Self::RESERVED)?;
        Ok(Self {
            table: record.table,
        })
    }
}

impl CharVocabulary {
    /// The number of reserved IDs.
    pub const NUM_RESERVED: usize = 4;

    /// The reserved surfaces, in ID order.
    pub const RESERVED: [&'static str; 4] =
        [reserved::UNK, reserved::BOS, reserved::EOS, reserved::SPACE];

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
        counter.count_letters(samples);
        Self::from_counter(&counter, size)
    }

    /// Build a vocabulary from a letter-level [`FrequencyCounter`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(counter)))]
    pub fn from_counter(
        counter: &FrequencyCounter,
        size: usize,
    ) -> NmtResult<Self> {
        if size < Self::NUM_RESERVED {
            return Err(NmtError::config(format!(
                "character vocabulary size ({size}) must be >= {}",
                Self::NUM_RESERVED
            )));
        }

        let mut table = SymbolTable::with_reserved(&Self::RESERVED);

        let mut assigned = 0;
        for (letter, count) in counter.ranked(size - Self::NUM_RESERVED) {
            assigned += count;
            table.push(letter, count);
        }

        table.set_frequency(UNK_ID, counter.num_symbols - assigned);
        table.set_frequency(BOS_ID, counter.num_lines);
        table.set_frequency(EOS_ID, counter.num_lines);
        table.set_frequency(SEPARATOR_ID, counter.num_separators);

        log::info!(
            "Built character vocabulary: {} entries from {} distinct letters",
            table.len(),
            counter.counts.len()
        );

        Ok(Self { table })
    }

    fn letter_id(
        &self,
        letter: char,
    ) -> WordId {
        let mut buf = [0u8; 4];
        self.get_id(letter.encode_utf8(&mut buf))
    }
}

impl Vocabulary for CharVocabulary {
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

    /// Encode each token's letters, with `<sp>` between tokens.
    fn convert_to_ids(
        &self,
        sentence: &str,
    ) -> Vec<WordId> {
        let mut ids = Vec::with_capacity(sentence.len());
        for (i, token) in sentence.split_whitespace().enumerate() {
            if i > 0 {
                ids.push(SEPARATOR_ID);
            }
            ids.extend(token.chars().map(|letter| self.letter_id(letter)));
        }
        ids
    }

    /// Split on `<sp>` and re-merge letters into tokens.
    ///
    /// Each maximal run of unknown IDs collapses into a single `<unk>`,
    /// so the round trip is lossy for unknown letters.
    fn convert_to_sentence(
        &self,
        ids: &[WordId],
    ) -> String {
        let mut tokens: Vec<String> = Vec::new();
        for group in ids.split(|&id| id == SEPARATOR_ID) {
            let mut token = String::new();
            let mut in_unknown_run = false;
            for &id in group {
                let known = id != UNK_ID && (id as usize) < self.size();
                if known {
                    token.push_str(self.get_word(id));
                    in_unknown_run = false;
                } else if !in_unknown_run {
                    token.push_str(reserved::UNK);
                    in_unknown_run = true;
                }
            }
            if !token.is_empty() {
                tokens.push(token);
            }
        }
        tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_order() {
        let vocab = CharVocabulary::from_samples(["abc ab", "a"], 100).unwrap();
        let letters: Vec<&str> = (0..vocab.size() as WordId)
            .map(|id| vocab.get_word(id))
            .collect();
        assert_eq!(letters, vec!["<unk>", "<s>", "</s>", "<sp>", "a", "b", "c"]);

        assert_eq!(vocab.get_frequency(4), 3);
        assert_eq!(vocab.get_frequency(5), 2);
        assert_eq!(vocab.get_frequency(6), 1);
        assert_eq!(vocab.get_frequency(UNK_ID), 0);
        assert_eq!(vocab.get_frequency(BOS_ID), 2);
        assert_eq!(vocab.get_frequency(EOS_ID), 2);
        assert_eq!(vocab.get_frequency(SEPARATOR_ID), 1);
    }

    #[test]
    fn test_truncation_accounts_unknowns() {
        let vocab = CharVocabulary::from_samples(["abc ab", "a"], 5).unwrap();
        assert_eq!(vocab.size(), 5);
        assert_eq!(vocab.get_word(4), "a");
        // b:2 + c:1 dropped.
        assert_eq!(vocab.get_frequency(UNK_ID), 3);
    }

    #[test]
    fn test_convert_round_trip() {
        let vocab = CharVocabulary::from_samples(["hello world"], 100).unwrap();
        let ids = vocab.convert_to_ids("hold  low");
        assert_eq!(ids.len(), 4 + 1 + 3);
        assert_eq!(ids[4], SEPARATOR_ID);
        assert_eq!(vocab.convert_to_sentence(&ids), "hold low");
    }

    #[test]
    fn test_unknown_runs_collapse() {
        let vocab = CharVocabulary::from_samples(["ab"], 100).unwrap();
        let ids = vocab.convert_to_ids("axyb zz a");
        let a = vocab.get_id("a");
        let b = vocab.get_id("b");
        assert_eq!(
            ids,
            vec![
                a,
                UNK_ID,
                UNK_ID,
                b,
                SEPARATOR_ID,
                UNK_ID,
                UNK_ID,
                SEPARATOR_ID,
                a
            ]
        );
        assert_eq!(vocab.convert_to_sentence(&ids), "a<unk>b <unk> a");
    }

    #[test]
    fn test_invalid_size() {
        assert!(CharVocabulary::from_samples(["a"], 3).is_err());
    }

    #[test]
    fn test_load_checks_separator() {
        // A word vocabulary's table lacks `<sp>` at ID 3.
        let json = r#"{"table":[{"surface":"<unk>","frequency":0},{"surface":"<s>","frequency":1},{"surface":"</s>","frequency":1},{"surface":"a","frequency":1}]}"#;
        let err = serde_json::from_str::<CharVocabulary>(json).unwrap_err();
        assert!(err.to_string().contains("reserved ID 3"), "{err}");
    }
}
