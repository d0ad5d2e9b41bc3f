//! # BPE Vocabulary

use compact_str::CompactString;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    types::NmtHashMap,
    vocab::{
        SymbolTable,
        Vocabulary,
        bpe::{MergeTable, SymbolSpan},
        reserved::{self, BOS_ID, EOS_ID, SEPARATOR_ID, UNK_ID},
    },
};

/// Byte-pair-encoding subword vocabulary.
///
/// ## Layout
/// * `0` - `<unk>`
/// * `1` - `<s>`
/// * `2` - `</s>`
/// * `3` - `</w>`, the end-of-word marker
/// * `4..` - base letters, then merged symbols in merge order.
///
/// Every encoded word ends with a symbol whose surface ends in `</w>`.
/// Word segmentations are memoized per surface.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "BpeVocabularyRecord")]
pub struct BpeVocabulary {
    table: SymbolTable,
    merges: MergeTable,

    #[serde(skip)]
    cache: RwLock<NmtHashMap<CompactString, Vec<WordId>>>,
}

/// The serialized form of a [`BpeVocabulary`], checked on load.
#[derive(Deserialize)]
struct BpeVocabularyRecord {
    table: SymbolTable,
    merges: MergeTable,
}

impl TryFrom<BpeVocabularyRecord> for BpeVocabulary {
    type Error = NmtError;

    fn try_from(record: BpeVocabularyRecord) -> NmtResult<Self> {
        record.table.check_reserved(&Self::RESERVED)?;
        record.merges.check_symbols(record.table.len())?;
        Ok(Self::new(record.table, record.merges))
    }
}

impl Clone for BpeVocabulary {
    fn clone(&self) -> Self {
        Self::new(self.table.clone(), self.merges.clone())
    }
}

impl PartialEq for BpeVocabulary {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.table == other.table && self.merges == other.merges
    }
}

impl BpeVocabulary {
    /// The number of reserved IDs.
    pub const NUM_RESERVED: usize = 4;

    /// The reserved surfaces, in ID order.
    pub const RESERVED: [&'static str; 4] = [
        reserved::UNK,
        reserved::BOS,
        reserved::EOS,
        reserved::END_OF_WORD,
    ];

    /// Assemble a vocabulary from trained parts.
    pub fn new(
        table: SymbolTable,
        merges: MergeTable,
    ) -> Self {
        Self {
            table,
            merges,
            cache: Default::default(),
        }
    }

    /// The learned merges.
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Split a word into its initial letter symbols, plus `</w>`.
    ///
    /// Letters outside the vocabulary become `<unk>`.
    pub fn initial_span(
        &self,
        word: &str,
    ) -> SymbolSpan {
        let mut buf = [0u8; 4];
        let mut symbols: Vec<WordId> = word
            .chars()
            .map(|letter| self.get_id(letter.encode_utf8(&mut buf)))
            .collect();
        symbols.push(SEPARATOR_ID);
        symbols.into()
    }

    /// Encode a single word.
    pub fn encode_word(
        &self,
        word: &str,
    ) -> Vec<WordId> {
        if let Some(ids) = self.cache.read().get(word) {
            return ids.clone();
        }

        let mut span = self.initial_span(word);
        self.merges.apply(&mut span);
        let ids = span.into_symbols();

        self.cache.write().insert(word.into(), ids.clone());
        ids
    }

    /// Segment a word into subword surfaces.
    pub fn segment(
        &self,
        word: &str,
    ) -> Vec<&str> {
        self.encode_word(word)
            .into_iter()
            .map(|id| self.get_word(id))
            .collect()
    }
}

impl Vocabulary for BpeVocabulary {
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
        let mut ids = Vec::with_capacity(sentence.len());
        for word in sentence.split_whitespace() {
            ids.extend(self.encode_word(word));
        }
        ids
    }

    /// Concatenate subwords, closing a word at each `</w>` suffix.
    ///
    /// `<s>` and `</s>` stand alone; runs of `<unk>` collapse into one.
    fn convert_to_sentence(
        &self,
        ids: &[WordId],
    ) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut word = String::new();
        let mut in_unknown_run = false;

        for &id in ids {
            if id == BOS_ID || id == EOS_ID {
                if !word.is_empty() {
                    words.push(core::mem::take(&mut word));
                }
                words.push(self.get_word(id).to_string());
                in_unknown_run = false;
                continue;
            }

            let known = id != UNK_ID && (id as usize) < self.size();
            if !known {
                if !in_unknown_run {
                    word.push_str(reserved::UNK);
                    in_unknown_run = true;
                }
                continue;
            }
            in_unknown_run = false;

            let surface = self.get_word(id);
            match surface.strip_suffix(reserved::END_OF_WORD) {
                Some(stem) => {
                    word.push_str(stem);
                    words.push(core::mem::take(&mut word));
                }
                None => word.push_str(surface),
            }
        }
        if !word.is_empty() {
            words.push(word);
        }
        words.join(" ")
    }
}
