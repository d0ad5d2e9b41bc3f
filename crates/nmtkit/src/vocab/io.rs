//! # Vocabulary IO
//!
//! Vocabularies are stored as JSON documents of an [`AnyVocabulary`].
//!
//! ```rust,no_run
//! use nmtkit::vocab::{AnyVocabulary, Vocabulary, io::load_vocabulary_path};
//!
//! fn example() -> nmtkit::NmtResult<()> {
//!     let vocab: AnyVocabulary = load_vocabulary_path("model/source.vocab")?;
//!     let ids = vocab.convert_to_ids("hello world");
//!     println!("{ids:?}");
//!     Ok(())
//! }
//! ```

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{NmtResult, vocab::AnyVocabulary};

/// Read an [`AnyVocabulary`] from a JSON reader.
pub fn read_vocabulary<R: Read>(reader: R) -> NmtResult<AnyVocabulary> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load an [`AnyVocabulary`] from a JSON file.
///
/// ## Arguments
/// * `path` - the path to the vocabulary file.
pub fn load_vocabulary_path<P: AsRef<Path>>(path: P) -> NmtResult<AnyVocabulary> {
    let reader = BufReader::new(File::open(path)?);
    read_vocabulary(reader)
}

/// Write an [`AnyVocabulary`] as JSON.
///
/// ## Arguments
/// * `vocab` - the vocabulary to write.
/// * `writer` - the writer to target.
/// * `pretty` - indent the document.
pub fn write_vocabulary<W: Write>(
    vocab: &AnyVocabulary,
    writer: &mut W,
    pretty: bool,
) -> NmtResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, vocab)?;
    } else {
        serde_json::to_writer(&mut *writer, vocab)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Save an [`AnyVocabulary`] to a JSON file.
///
/// ## Arguments
/// * `vocab` - the vocabulary to save.
/// * `path` - the path to save the vocabulary to.
/// * `pretty` - indent the document.
pub fn save_vocabulary_path<P: AsRef<Path>>(
    vocab: &AnyVocabulary,
    path: P,
    pretty: bool,
) -> NmtResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_vocabulary(vocab, &mut writer, pretty)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        NmtError,
        vocab::{CharVocabulary, Vocabulary, WordVocabulary, bpe::BpeTrainerOptions},
    };

    const CORPUS: &[&str] = &["the cat sat on the mat", "the dog sat", "a cat and a dog"];

    fn check_round_trip(
        vocab: AnyVocabulary,
        pretty: bool,
    ) {
        tempdir::TempDir::new("vocab_test")
            .and_then(|dir| {
                let path = dir.path().join("vocab.json");

                save_vocabulary_path(&vocab, &path, pretty).expect("Failed to save vocab");
                let loaded = load_vocabulary_path(&path).expect("Failed to load vocab");

                assert_eq!(&loaded, &vocab);
                assert_eq!(loaded.kind(), vocab.kind());
                for id in 0..vocab.size() as u32 {
                    assert_eq!(loaded.get_word(id), vocab.get_word(id));
                    assert_eq!(loaded.get_frequency(id), vocab.get_frequency(id));
                }
                for line in CORPUS {
                    assert_eq!(loaded.convert_to_ids(line), vocab.convert_to_ids(line));
                }

                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_save_load_word() {
        check_round_trip(WordVocabulary::from_samples(CORPUS, 7).unwrap().into(), true);
    }

    #[test]
    fn test_save_load_char() {
        check_round_trip(CharVocabulary::from_samples(CORPUS, 12).unwrap().into(), false);
    }

    #[test]
    fn test_save_load_bpe() {
        let mut trainer = BpeTrainerOptions::new(30).init();
        trainer.update_from_samples(CORPUS);
        check_round_trip(trainer.train().unwrap().into(), true);
    }

    #[test]
    fn test_compact_is_one_line() {
        let vocab: AnyVocabulary = WordVocabulary::from_samples(CORPUS, 5).unwrap().into();
        let mut buf = Vec::new();
        write_vocabulary(&vocab, &mut buf, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with(r#"{"kind":"word""#));
    }

    #[test]
    fn test_read_garbage() {
        let err = read_vocabulary("{\"kind\": \"tree\"}".as_bytes()).unwrap_err();
        assert!(matches!(err, NmtError::Serialization(_)));
    }

    #[test]
    fn test_read_rejects_corrupt_tables() {
        let repeated = r#"{"kind":"word","table":[
            {"surface":"<unk>","frequency":0},{"surface":"<s>","frequency":1},
            {"surface":"</s>","frequency":1},{"surface":"a","frequency":2},
            {"surface":"a","frequency":1},{"surface":"b","frequency":1}]}"#;
        let unreserved = r#"{"kind":"word","table":[{"surface":"x","frequency":1}]}"#;
        let bad_merge = r#"{"kind":"bpe","table":[
            {"surface":"<unk>","frequency":0},{"surface":"<s>","frequency":1},
            {"surface":"</s>","frequency":1},{"surface":"</w>","frequency":1},
            {"surface":"a","frequency":1}],
            "merges":[{"left":4,"right":3,"result":99}]}"#;

        for json in [repeated, unreserved, bad_merge] {
            let err = read_vocabulary(json.as_bytes()).unwrap_err();
            assert!(matches!(err, NmtError::Serialization(_)), "{err}");
        }
    }
}
