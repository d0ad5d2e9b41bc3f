//! # Vocabulary Trait

use crate::{WordId, corpus::Sentence};

/// Reserved IDs and surfaces shared by every vocabulary.
pub mod reserved {
    use crate::WordId;

    /// The unknown-symbol ID.
    pub const UNK_ID: WordId = 0;

    /// The begin-of-sentence ID.
    pub const BOS_ID: WordId = 1;

    /// The end-of-sentence ID.
    pub const EOS_ID: WordId = 2;

    /// The fourth reserved ID of the character and BPE vocabularies.
    ///
    /// This is `<sp>` (the token separator) in a character vocabulary,
    /// and `</w>` (the end-of-word marker) in a BPE vocabulary.
    pub const SEPARATOR_ID: WordId = 3;

    /// Surface of [`UNK_ID`].
    pub const UNK: &str = "<unk>";

    /// Surface of [`BOS_ID`].
    pub const BOS: &str = "<s>";

    /// Surface of [`EOS_ID`].
    pub const EOS: &str = "</s>";

    /// Surface of the character vocabulary's [`SEPARATOR_ID`].
    pub const SPACE: &str = "<sp>";

    /// Surface of the BPE vocabulary's [`SEPARATOR_ID`].
    pub const END_OF_WORD: &str = "</w>";
}

/// Common interface of the vocabulary codecs.
///
/// A vocabulary is a bidirectional ``surface <-> ID`` mapping whose IDs
/// densely occupy ``[0, size())``, with [`reserved`] IDs at the front.
///
/// ## Lookup Policy
/// * Unknown surfaces map to [`reserved::UNK_ID`]; this is not an error.
/// * Out-of-range IDs map to the [`reserved::UNK`] surface and frequency 0.
pub trait Vocabulary: Send + Sync {
    /// The number of IDs in the vocabulary.
    fn size(&self) -> usize;

    /// Look up the ID of a surface symbol; unknown symbols map to `<unk>`.
    fn get_id(
        &self,
        surface: &str,
    ) -> WordId;

    /// Look up the surface of an ID; out-of-range IDs map to `<unk>`.
    fn get_word(
        &self,
        id: WordId,
    ) -> &str;

    /// The corpus frequency recorded for an ID at construction time.
    fn get_frequency(
        &self,
        id: WordId,
    ) -> u64;

    /// Encode a whitespace-tokenized sentence into IDs.
    fn convert_to_ids(
        &self,
        sentence: &str,
    ) -> Vec<WordId>;

    /// Decode an ID sequence back into a space-joined sentence.
    fn convert_to_sentence(
        &self,
        ids: &[WordId],
    ) -> String;

    /// Is `surface` an explicitly assigned symbol?
    fn contains(
        &self,
        surface: &str,
    ) -> bool {
        surface == reserved::UNK || self.get_id(surface) != reserved::UNK_ID
    }

    /// Encode a [`Sentence`] by its token surfaces.
    fn convert_sentence_to_ids(
        &self,
        sentence: &Sentence,
    ) -> Vec<WordId> {
        self.convert_to_ids(&sentence.surface())
    }
}
