//! # Tokens and Sentences

use std::collections::BTreeMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A string-keyed feature map.
pub type Features = BTreeMap<String, String>;

/// One surface token plus its features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The surface string.
    pub surface: CompactString,

    /// Open feature map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: Features,
}

impl Token {
    /// Create a token with no features.
    pub fn new(surface: impl Into<CompactString>) -> Self {
        Self {
            surface: surface.into(),
            features: Features::new(),
        }
    }

    /// Add a feature.
    pub fn with_feature(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.features.insert(key.into(), value.into());
        self
    }
}

/// An ordered sequence of tokens plus sentence-level features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// The tokens, in order.
    pub tokens: Vec<Token>,

    /// Open feature map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: Features,
}

impl Sentence {
    /// Create a sentence from tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            features: Features::new(),
        }
    }

    /// Split a line on whitespace.
    pub fn parse(line: &str) -> Self {
        Self::new(line.split_whitespace().map(Token::new).collect())
    }

    /// Add a feature.
    pub fn with_feature(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.features.insert(key.into(), value.into());
        self
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the sentence empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The token surfaces, joined by single spaces.
    pub fn surface(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let sentence = Sentence::parse("  the  cat\tsat \n");
        assert_eq!(sentence.len(), 3);
        assert_eq!(sentence.tokens[1].surface, "cat");
        assert_eq!(sentence.surface(), "the cat sat");

        assert!(Sentence::parse("   ").is_empty());
        assert_eq!(Sentence::parse("").surface(), "");
    }

    #[test]
    fn test_features() {
        let sentence = Sentence::new(vec![
            Token::new("Dogs").with_feature("pos", "NNS"),
            Token::new("bark"),
        ])
        .with_feature("id", "7");

        assert_eq!(sentence.tokens[0].features["pos"], "NNS");
        assert!(sentence.tokens[1].features.is_empty());
        assert_eq!(sentence.features["id"], "7");

        let json = serde_json::to_string(&sentence).unwrap();
        assert_eq!(
            json,
            r#"{"tokens":[{"surface":"Dogs","features":{"pos":"NNS"}},{"surface":"bark"}],"features":{"id":"7"}}"#
        );
        let loaded: Sentence = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, sentence);
    }
}
