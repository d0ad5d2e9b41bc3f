//! # Vocabulary
//!
//! Bidirectional ``surface <-> ID`` codecs built from a frequency scan.
//!
//! ## Text Vocabularies
//! * [`WordVocabulary`] - one ID per whitespace token.
//! * [`CharVocabulary`] - one ID per Unicode letter, with an explicit `<sp>`.
//! * [`bpe::BpeVocabulary`] - byte-pair-encoded subwords ending in `</w>`.
//!
//! All three share the [`reserved`] IDs, implement [`Vocabulary`],
//! and persist through [`AnyVocabulary`] and the [`io`] functions.
pub mod any_vocab;
pub mod bpe;
pub mod char_vocab;
pub mod frequency_counter;
pub mod io;
pub mod symbol_table;
pub mod vocabulary;
pub mod word_vocab;

#[doc(inline)]
pub use any_vocab::AnyVocabulary;
#[doc(inline)]
pub use char_vocab::CharVocabulary;
#[doc(inline)]
pub use frequency_counter::FrequencyCounter;
#[doc(inline)]
pub use symbol_table::SymbolTable;
#[doc(inline)]
pub use vocabulary::{Vocabulary, reserved};
#[doc(inline)]
pub use word_vocab::WordVocabulary;
