//! # Corpus Readers
//!
//! Line-oriented corpora: one whitespace-tokenized sentence per line.
//! Each loader comes as a `read_*` function over a [`BufRead`] and a
//! `load_*_path` wrapper over a file.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    corpus::{Sample, Sentence},
    vocab::Vocabulary,
};

/// Filters applied while loading a parallel corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusOptions {
    /// Pairs with either side longer than this (in IDs) are skipped.
    pub max_length: usize,

    /// Pairs whose longer side exceeds this multiple of the shorter are skipped.
    pub max_length_ratio: f64,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            max_length: usize::MAX,
            max_length_ratio: f64::INFINITY,
        }
    }
}

impl CorpusOptions {
    /// Sets the max length.
    pub fn with_max_length(
        self,
        max_length: usize,
    ) -> Self {
        Self { max_length, ..self }
    }

    /// Sets the max length ratio.
    pub fn with_max_length_ratio(
        self,
        max_length_ratio: f64,
    ) -> Self {
        Self {
            max_length_ratio,
            ..self
        }
    }

    /// Does a ``(source_len, target_len)`` pair pass the filters?
    ///
    /// Pairs with an empty side never pass.
    pub fn accepts(
        &self,
        source_len: usize,
        target_len: usize,
    ) -> bool {
        if source_len == 0 || target_len == 0 {
            return false;
        }
        if source_len > self.max_length || target_len > self.max_length {
            return false;
        }
        let (long, short) = if source_len > target_len {
            (source_len, target_len)
        } else {
            (target_len, source_len)
        };
        long as f64 <= self.max_length_ratio * short as f64
    }
}

/// A loaded parallel corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelCorpus {
    /// The accepted samples, in corpus order.
    pub samples: Vec<Sample>,

    /// The number of line pairs read.
    pub num_lines: usize,

    /// The number of line pairs rejected by [`CorpusOptions`].
    pub num_skipped: usize,
}

/// Read one [`Sentence`] per line.
pub fn read_sentences<R: BufRead>(reader: R) -> NmtResult<Vec<Sentence>> {
    reader
        .lines()
        .map(|line| -> NmtResult<Sentence> { Ok(Sentence::parse(&line?)) })
        .collect()
}

/// Load one [`Sentence`] per line of a file.
pub fn load_sentences_path<P: AsRef<Path>>(path: P) -> NmtResult<Vec<Sentence>> {
    read_sentences(BufReader::new(File::open(path)?))
}

/// Read one ID sequence per line, encoded through `vocab`.
pub fn read_ids<R: BufRead>(
    reader: R,
    vocab: &dyn Vocabulary,
) -> NmtResult<Vec<Vec<WordId>>> {
    reader
        .lines()
        .map(|line| -> NmtResult<Vec<WordId>> { Ok(vocab.convert_to_ids(&line?)) })
        .collect()
}

/// Load one ID sequence per line of a file, encoded through `vocab`.
pub fn load_ids_path<P: AsRef<Path>>(
    path: P,
    vocab: &dyn Vocabulary,
) -> NmtResult<Vec<Vec<WordId>>> {
    read_ids(BufReader::new(File::open(path)?), vocab)
}

/// Read a line-aligned parallel corpus.
///
/// ## Errors
/// [`NmtError::Config`] if the two sides have different line counts.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip(source, target, source_vocab, target_vocab))
)]
pub fn read_parallel_samples<S, T>(
    source: S,
    target: T,
    source_vocab: &dyn Vocabulary,
    target_vocab: &dyn Vocabulary,
    options: CorpusOptions,
) -> NmtResult<ParallelCorpus>
where
    S: BufRead,
    T: BufRead,
{
    let mut corpus = ParallelCorpus::default();
    let mut source_lines = source.lines();
    let mut target_lines = target.lines();

    loop {
        let (source_line, target_line) = match (source_lines.next(), target_lines.next()) {
            (None, None) => break,
            (Some(s), Some(t)) => (s?, t?),
            _ => {
                return Err(NmtError::config(format!(
                    "parallel corpus line counts differ after line {}",
                    corpus.num_lines
                )));
            }
        };
        corpus.num_lines += 1;

        let sample = Sample::new(
            source_vocab.convert_to_ids(&source_line),
            target_vocab.convert_to_ids(&target_line),
        );
        if options.accepts(sample.source.len(), sample.target.len()) {
            corpus.samples.push(sample);
        } else {
            corpus.num_skipped += 1;
        }
    }

    log::info!(
        "Loaded parallel corpus: {} samples from {} lines ({} skipped)",
        corpus.samples.len(),
        corpus.num_lines,
        corpus.num_skipped
    );
    Ok(corpus)
}

/// Load a line-aligned parallel corpus from two files.
///
/// ## Arguments
/// * `source_path` - the source-side file.
/// * `target_path` - the target-side file.
/// * `source_vocab` - the source encoder.
/// * `target_vocab` - the target encoder.
/// * `options` - length filters.
pub fn load_parallel_samples_path<P, Q>(
    source_path: P,
    target_path: Q,
    source_vocab: &dyn Vocabulary,
    target_vocab: &dyn Vocabulary,
    options: CorpusOptions,
) -> NmtResult<ParallelCorpus>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    read_parallel_samples(
        BufReader::new(File::open(source_path)?),
        BufReader::new(File::open(target_path)?),
        source_vocab,
        target_vocab,
        options,
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::vocab::WordVocabulary;

    fn vocab() -> WordVocabulary {
        WordVocabulary::from_samples(["a b c d", "a b c", "a b", "a"], 7).unwrap()
    }

    #[test]
    fn test_options() {
        let options = CorpusOptions::default();
        assert!(options.accepts(1, 1000));
        assert!(!options.accepts(0, 3));

        let options = options.with_max_length(4).with_max_length_ratio(2.0);
        assert!(options.accepts(2, 4));
        assert!(!options.accepts(1, 3));
        assert!(!options.accepts(5, 4));
        assert!(options.accepts(4, 4));
    }

    #[test]
    fn test_read_sentences() {
        let sentences = read_sentences("a b\n\n c  d e \n".as_bytes()).unwrap();
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].surface(), "a b");
        assert!(sentences[1].is_empty());
        assert_eq!(sentences[2].surface(), "c d e");
    }

    #[test]
    fn test_read_ids() {
        let vocab = vocab();
        let ids = read_ids("a b\nd x\n".as_bytes(), &vocab).unwrap();
        assert_eq!(ids, vec![vec![3, 4], vec![6, 0]]);
    }

    #[test]
    fn test_read_parallel() {
        let vocab = vocab();
        let corpus = read_parallel_samples(
            "a\na b c d\na b\n\n".as_bytes(),
            "b\na\nc d\nd\n".as_bytes(),
            &vocab,
            &vocab,
            CorpusOptions::default()
                .with_max_length(3)
                .with_max_length_ratio(2.0),
        )
        .unwrap();

        assert_eq!(corpus.num_lines, 4);
        assert_eq!(corpus.num_skipped, 2);
        assert_eq!(
            corpus.samples,
            vec![Sample::new(vec![3], vec![4]), Sample::new(vec![3, 4], vec![5, 6])]
        );
    }

    #[test]
    fn test_mismatched_lines() {
        let vocab = vocab();
        let err = read_parallel_samples(
            "a\nb\n".as_bytes(),
            "a\n".as_bytes(),
            &vocab,
            &vocab,
            CorpusOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NmtError::Config(_)));
    }

    #[test]
    fn test_load_paths() {
        let vocab = vocab();
        tempdir::TempDir::new("corpus_test")
            .and_then(|dir| {
                let source = dir.path().join("train.src");
                let target = dir.path().join("train.trg");
                File::create(&source)?.write_all(b"a b\nc\n")?;
                File::create(&target)?.write_all(b"b a\nd\n")?;

                let sentences = load_sentences_path(&source).expect("Failed to load sentences");
                assert_eq!(sentences.len(), 2);

                let ids = load_ids_path(&target, &vocab).expect("Failed to load ids");
                assert_eq!(ids, vec![vec![4, 3], vec![6]]);

                let corpus = load_parallel_samples_path(
                    &source,
                    &target,
                    &vocab,
                    &vocab,
                    CorpusOptions::default(),
                )
                .expect("Failed to load corpus");
                assert_eq!(corpus.samples.len(), 2);

                Ok(())
            })
            .unwrap();

        let err = load_sentences_path("/nonexistent/corpus.txt").unwrap_err();
        assert!(matches!(err, NmtError::Io(_)));
    }
}
