//! # Tagged Vocabulary

use serde::{Deserialize, Serialize};

use crate::{
    WordId,
    vocab::{CharVocabulary, Vocabulary, WordVocabulary, bpe::BpeVocabulary},
};

/// Any of the text vocabularies, tagged by codec.
///
/// Serialized as an object with a `"kind"` field of `"word"`, `"char"`,
/// or `"bpe"`, so a saved vocabulary remembers how to decode itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyVocabulary {
    /// A [`WordVocabulary`].
    Word(WordVocabulary),

    /// A [`CharVocabulary`].
    Char(CharVocabulary),

    /// A [`BpeVocabulary`].
    Bpe(BpeVocabulary),
}

impl AnyVocabulary {
    /// The codec name, as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Word(_) => "word",
            Self::Char(_) => "char",
            Self::Bpe(_) => "bpe",
        }
    }

    /// View as a trait object.
    pub fn as_vocabulary(&self) -> &dyn Vocabulary {
        match self {
            Self::Word(v) => v,
            Self::Char(v) => v,
            Self::Bpe(v) => v,
        }
    }
}

impl From<WordVocabulary> for AnyVocabulary {
    fn from(vocab: WordVocabulary) -> Self {
        Self::Word(vocab)
    }
}

impl From<CharVocabulary> for AnyVocabulary {
    fn from(vocab: CharVocabulary) -> Self {
        Self::Char(vocab)
    }
}

impl From<BpeVocabulary> for AnyVocabulary {
    fn from(vocab: BpeVocabulary) -> Self {
        Self::Bpe(vocab)
    }
}

impl Vocabulary for AnyVocabulary {
    fn size(&self) -> usize {
        self.as_vocabulary().size()
    }

    fn get_id(
        &self,
        surface: &str,
    ) -> WordId {
        self.as_vocabulary().get_id(surface)
    }

    fn get_word(
        &self,
        id: WordId,
    ) -> &str {
        self.as_vocabulary().get_word(id)
    }

    fn get_frequency(
        &self,
        id: WordId,
    ) -> u64 {
        self.as_vocabulary().get_frequency(id)
    }

    fn convert_to_ids(
        &self,
        sentence: &str,
    ) -> Vec<WordId> {
        self.as_vocabulary().convert_to_ids(sentence)
    }

    fn convert_to_sentence(
        &self,
        ids: &[WordId],
    ) -> String {
        self.as_vocabulary().convert_to_sentence(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json() {
        let vocab: AnyVocabulary = WordVocabulary::from_samples(["a b a"], 4).unwrap().into();
        assert_eq!(vocab.kind(), "word");

        let value = serde_json::to_value(&vocab).unwrap();
        assert_eq!(value["kind"], "word");

        let loaded: AnyVocabulary = serde_json::from_value(value).unwrap();
        assert_eq!(loaded, vocab);
        assert_eq!(loaded.get_id("a"), 3);
        assert_eq!(loaded.convert_to_sentence(&[3, 0]), "a <unk>");
    }

    #[test]
    fn test_dispatch() {
        let vocab: AnyVocabulary = CharVocabulary::from_samples(["ab ba"], 6).unwrap().into();
        assert_eq!(vocab.kind(), "char");
        assert_eq!(vocab.size(), 6);
        assert_eq!(vocab.get_word(3), "<sp>");
        assert_eq!(vocab.convert_to_sentence(&vocab.convert_to_ids("ab ba")), "ab ba");
    }
}
