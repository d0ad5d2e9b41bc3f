//! # Byte-Pair Encoding
//!
//! [`BpeTrainer`] learns a [`MergeTable`] from word counts;
//! [`BpeVocabulary`] replays it to segment new words.

pub mod bpe_trainer;
pub mod bpe_vocab;
pub mod merge_table;
pub mod symbol_span;

#[doc(inline)]
pub use bpe_trainer::{BpeTrainResults, BpeTrainer, BpeTrainerOptions, MergeJob};
#[doc(inline)]
pub use bpe_vocab::BpeVocabulary;
#[doc(inline)]
pub use merge_table::{Merge, MergeTable};
#[doc(inline)]
pub use symbol_span::SymbolSpan;
