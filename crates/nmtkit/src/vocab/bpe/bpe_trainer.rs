//! # BPE Trainer

use core::cmp::{Ordering, Reverse};

use compact_str::CompactString;
use dary_heap::OctonaryHeap;

use crate::{
    NmtError,
    NmtResult,
    WordId,
    types::{NmtHashMap, NmtHashSet, Pair, hash_map_with_capacity},
    vocab::{
        FrequencyCounter,
        SymbolTable,
        Vocabulary,
        bpe::{BpeVocabulary, MergeTable, SymbolSpan},
        reserved::{BOS_ID, EOS_ID, SEPARATOR_ID, UNK_ID},
    },
};

/// Options for [`BpeTrainer`].
#[derive(Debug, Clone, PartialEq)]
pub struct BpeTrainerOptions {
    /// The target vocabulary size, including the reserved IDs.
    pub vocab_size: usize,

    /// Merging stops once the most frequent pair occurs fewer times than this.
    pub min_pair_frequency: u64,
}

impl BpeTrainerOptions {
    /// Create new options.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            min_pair_frequency: 1,
        }
    }

    /// Sets the vocab size.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the minimum pair frequency for a merge.
    pub fn with_min_pair_frequency(
        self,
        min_pair_frequency: u64,
    ) -> Self {
        Self {
            min_pair_frequency,
            ..self
        }
    }

    /// Initializes a [`BpeTrainer`] from these options.
    pub fn init(self) -> BpeTrainer {
        BpeTrainer::new(self)
    }
}

/// Info about a [`Pair`] that could be merged.
#[derive(Debug, Eq)]
pub struct MergeJob {
    /// The number of instances of this pair in the corpus.
    pub count: u64,

    /// The pair to merge.
    pub pair: Pair<WordId>,
}

impl MergeJob {
    /// The job key.
    ///
    /// Max-heap by count; ties go to the lowest pair of IDs.
    pub fn heap_key(&self) -> (u64, Reverse<Pair<WordId>>) {
        (self.count, Reverse(self.pair))
    }
}

impl PartialEq for MergeJob {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl PartialOrd for MergeJob {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeJob {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// The results of a training run.
#[derive(Debug, Clone)]
pub struct BpeTrainResults {
    /// The trained vocabulary.
    pub vocab: BpeVocabulary,

    /// The final training segmentation of each distinct corpus word.
    pub segmentations: Vec<(CompactString, Vec<WordId>)>,
}

/// Trainer for BPE subword vocabularies.
///
/// Counts words with [`BpeTrainer::update_from_samples`], then
/// learns merges with [`BpeTrainer::train`].
#[derive(Debug, Clone)]
pub struct BpeTrainer {
    /// Trainer options.
    pub options: BpeTrainerOptions,

    /// The word counter.
    pub counter: FrequencyCounter,
}

/// Pairs touching `<unk>` never merge.
fn is_mergeable(pair: Pair<WordId>) -> bool {
    pair.0 != UNK_ID && pair.1 != UNK_ID
}

impl BpeTrainer {
    /// Initializes a [`BpeTrainer`].
    pub fn new(options: BpeTrainerOptions) -> Self {
        Self {
            options,
            counter: FrequencyCounter::default(),
        }
    }

    /// Update word counts inplace from a sample iterator.
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.counter.count_words(samples);
    }

    /// Trains a [`BpeVocabulary`].
    pub fn train(self) -> NmtResult<BpeVocabulary> {
        Ok(self.train_results()?.vocab)
    }

    /// Trains a [`BpeVocabulary`], also returning the training segmentations.
    ///
    /// 1. The base symbols are the reserved IDs plus the most frequent letters.
    /// 2. Each word starts as its letters followed by `</w>`.
    /// 3. The most frequent adjacent pair (ties to the lowest pair of IDs) is
    ///    merged everywhere, pair counts are updated incrementally around each
    ///    merge site, and the loop repeats until the vocabulary is full.
    ///
    /// A merge whose concatenated surface already names a symbol is skipped,
    /// so every surface keeps exactly one ID.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn train_results(self) -> NmtResult<BpeTrainResults> {
        let vocab_size = self.options.vocab_size;
        if vocab_size < BpeVocabulary::NUM_RESERVED {
            return Err(NmtError::config(format!(
                "BPE vocabulary size ({vocab_size}) must be >= {}",
                BpeVocabulary::NUM_RESERVED
            )));
        }

        // Words, in a deterministic order.
        let mut word_counts: Vec<(CompactString, u64)> = self
            .counter
            .counts
            .iter()
            .map(|(w, &c)| (w.clone(), c))
            .collect();
        word_counts.sort();

        // ---- Base letters ----
        let mut letters = FrequencyCounter::default();
        for (word, count) in &word_counts {
            let mut buf = [0u8; 4];
            for letter in word.chars() {
                let letter: &str = letter.encode_utf8(&mut buf);
                *letters.counts.entry(letter.into()).or_default() += count;
            }
        }

        let mut table = SymbolTable::with_reserved(&BpeVocabulary::RESERVED);
        for (letter, _) in letters.ranked(vocab_size - BpeVocabulary::NUM_RESERVED) {
            table.push(letter, 0);
        }

        let mut words: Vec<SymbolSpan> = word_counts
            .iter()
            .map(|(word, _)| {
                let mut buf = [0u8; 4];
                let mut symbols: Vec<WordId> = word
                    .chars()
                    .map(|letter| table.id(letter.encode_utf8(&mut buf)).unwrap_or(UNK_ID))
                    .collect();
                symbols.push(SEPARATOR_ID);
                symbols.into()
            })
            .collect();

        // ---- Pair index ----
        let mut pair_counts: NmtHashMap<Pair<WordId>, u64> = hash_map_with_capacity(words.len());
        let mut pair_index: NmtHashMap<Pair<WordId>, NmtHashSet<usize>> =
            hash_map_with_capacity(words.len());
        for (idx, span) in words.iter().enumerate() {
            let count = word_counts[idx].1;
            for pair in span.pairs().filter(|&p| is_mergeable(p)) {
                *pair_counts.entry(pair).or_default() += count;
                pair_index.entry(pair).or_default().insert(idx);
            }
        }

        log::info!(
            "Starting BPE training: {} words, {} base symbols, {} unique pairs",
            words.len(),
            table.len(),
            pair_counts.len()
        );

        let mut heap = OctonaryHeap::with_capacity(pair_counts.len());
        for (&pair, &count) in pair_counts.iter() {
            heap.push(MergeJob { count, pair });
        }

        // ---- Merge loop ----
        let target_merges = vocab_size.saturating_sub(table.len());
        let mut merges = MergeTable::with_capacity(target_merges);
        let mut skipped: NmtHashSet<Pair<WordId>> = Default::default();
        let mut last_log_percent = 0;

        while table.len() < vocab_size {
            let Some(mut job) = heap.pop() else {
                break;
            };

            {
                // Lazy refresh the job count.
                let current = pair_counts.get(&job.pair).copied().unwrap_or(0);
                if job.count != current {
                    job.count = current;
                    if job.count > 0 {
                        heap.push(job);
                    }
                    continue;
                }
            }

            if job.count == 0 || skipped.contains(&job.pair) {
                continue;
            }
            if job.count < self.options.min_pair_frequency {
                break;
            }

            let (left, right) = job.pair;
            let mut surface = CompactString::from(table.surface(left).unwrap_or_default());
            surface.push_str(table.surface(right).unwrap_or_default());
            if table.id(&surface).is_some() {
                log::debug!("Skipping merge {:?}: {surface:?} already exists", job.pair);
                skipped.insert(job.pair);
                continue;
            }

            let new_id = table.push(surface, 0);
            merges.push(job.pair, new_id);

            let mut touched: NmtHashSet<Pair<WordId>> = Default::default();
            for word_idx in pair_index.remove(&job.pair).unwrap_or_default() {
                let count = word_counts[word_idx].1;
                words[word_idx].merge_tallied(job.pair, new_id, &mut |pair, change| {
                    if !is_mergeable(pair) {
                        return;
                    }
                    let weight = count * change.unsigned_abs();
                    let entry = pair_counts.entry(pair).or_default();
                    if change < 0 {
                        *entry -= weight;
                    } else {
                        *entry += weight;
                        pair_index.entry(pair).or_default().insert(word_idx);
                        touched.insert(pair);
                    }
                });
            }

            // Every added pair contains `new_id`, so none is in the heap yet.
            for pair in touched {
                let count = pair_counts.get(&pair).copied().unwrap_or(0);
                if count > 0 {
                    heap.push(MergeJob { count, pair });
                }
            }

            if target_merges > 0 {
                let current_percent = (merges.len() * 100) / target_merges;
                if current_percent >= last_log_percent + 10 {
                    log::info!(
                        "Progress: {}% ({}/{} merges) - Last merge: {:?} -> {} (frequency: {})",
                        current_percent,
                        merges.len(),
                        target_merges,
                        job.pair,
                        new_id,
                        job.count
                    );
                    last_log_percent = current_percent;
                }
            }
        }

        // ---- Frequencies ----
        let mut frequencies = vec![0u64; table.len()];
        for (span, (_, count)) in words.iter().zip(&word_counts) {
            for &id in span.symbols() {
                frequencies[id as usize] += count;
            }
        }
        frequencies[BOS_ID as usize] = self.counter.num_lines;
        frequencies[EOS_ID as usize] = self.counter.num_lines;
        for (id, &frequency) in frequencies.iter().enumerate() {
            table.set_frequency(id as WordId, frequency);
        }

        log::info!(
            "Finished BPE training: {} merges, {} symbols",
            merges.len(),
            table.len()
        );

        let vocab = BpeVocabulary::new(table, merges);
        let segmentations = word_counts
            .into_iter()
            .zip(words)
            .map(|((word, _), span)| (word, span.into_symbols()))
            .collect();

        debug_assert!(vocab.size() <= vocab_size);
        Ok(BpeTrainResults {
            vocab,
            segmentations,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const CORPUS: &[&str] = &["low lower lowest", "newer newest low", "wider widest new"];

    fn train_corpus(vocab_size: usize) -> BpeTrainResults {
        let mut trainer = BpeTrainerOptions::new(vocab_size).init();
        trainer.update_from_samples(CORPUS);
        trainer.train_results().unwrap()
    }

    #[test]
    fn test_trainer_options() {
        let options = BpeTrainerOptions::new(1000);
        assert_eq!(options.vocab_size, 1000);
        assert_eq!(options.min_pair_frequency, 1);

        let options = options.with_vocab_size(2000).with_min_pair_frequency(3);
        assert_eq!(options.vocab_size, 2000);
        assert_eq!(options.min_pair_frequency, 3);
    }

    #[test]
    fn test_train_merge_order() {
        let BpeTrainResults { vocab, .. } = train_corpus(20);
        assert_eq!(vocab.size(), 20);

        let surfaces: Vec<&str> = (0..20).map(|id| vocab.get_word(id)).collect();
        assert_eq!(
            surfaces,
            vec![
                "<unk>", "<s>", "</s>", "</w>", "e", "w", "l", "o", "n", "r", "s", "t", "d", "i",
                "we", "lo", "w</w>", "ne", "r</w>", "st",
            ]
        );

        let merges: Vec<(Pair<WordId>, WordId)> = vocab
            .merges()
            .merges()
            .iter()
            .map(|m| ((m.left, m.right), m.result))
            .collect();
        assert_eq!(
            merges,
            vec![
                ((5, 4), 14),
                ((6, 7), 15),
                ((5, 3), 16),
                ((8, 4), 17),
                ((9, 3), 18),
                ((10, 11), 19),
            ]
        );
    }

    #[test]
    fn test_train_frequencies() {
        let BpeTrainResults { vocab, .. } = train_corpus(20);
        let frequencies: Vec<u64> = (0..20).map(|id| vocab.get_frequency(id)).collect();
        assert_eq!(
            frequencies,
            vec![0, 3, 3, 3, 2, 2, 0, 0, 0, 0, 0, 0, 2, 2, 4, 4, 3, 3, 3, 3]
        );
    }

    #[test]
    fn test_encode_replays_training() {
        let BpeTrainResults {
            vocab,
            segmentations,
        } = train_corpus(20);
        for (word, symbols) in &segmentations {
            assert_eq!(&vocab.encode_word(word), symbols, "{word}");
        }
        assert_eq!(vocab.segment("lowest"), vec!["lo", "we", "st", "</w>"]);
        assert_eq!(vocab.segment("wider"), vec!["w", "i", "d", "e", "r</w>"]);
    }

    #[test]
    fn test_stops_when_no_pairs_remain() {
        let mut trainer = BpeTrainerOptions::new(1000).init();
        trainer.update_from_samples(["ab ab"]);
        let vocab = trainer.train().unwrap();

        // a, b; then (a,b) -> ab, (ab,</w>) -> ab</w>.
        assert_eq!(vocab.size(), 4 + 2 + 2);
        assert_eq!(vocab.segment("ab"), vec!["ab</w>"]);
    }

    #[test]
    fn test_min_pair_frequency() {
        let mut trainer = BpeTrainerOptions::new(1000)
            .with_min_pair_frequency(3)
            .init();
        trainer.update_from_samples(CORPUS);
        let limited = trainer.train().unwrap();

        let unlimited = train_corpus(1000).vocab;

        let n = limited.merges().len();
        assert!(n > 0);
        assert!(n < unlimited.merges().len());
        assert_eq!(limited.merges().merges(), &unlimited.merges().merges()[..n]);
    }

    #[test]
    fn test_invalid_size() {
        let err = BpeTrainerOptions::new(3).init().train().unwrap_err();
        assert!(matches!(err, NmtError::Config(_)));
    }

    #[test]
    fn test_merge_job_heap_key() {
        let job1 = MergeJob {
            pair: (1, 2),
            count: 2,
        };
        let job2 = MergeJob {
            pair: (2, 1),
            count: 1,
        };
        let job3 = MergeJob {
            pair: (2, 2),
            count: 1,
        };

        assert_eq!(&job1, &job1);
        assert_ne!(&job1, &job2);

        assert_eq!(job1.cmp(&job2), Ordering::Greater);
        // Equal counts: the lower pair ranks higher.
        assert_eq!(job2.cmp(&job3), Ordering::Greater);
        assert_eq!(job3.cmp(&job2), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_encode_replays_training(
            lines in proptest::collection::vec("[abc]{1,6}( [abc]{1,6}){0,4}", 1..8),
            vocab_size in 4usize..40,
        ) {
            let mut trainer = BpeTrainerOptions::new(vocab_size).init();
            trainer.update_from_samples(&lines);
            let BpeTrainResults { vocab, segmentations } = trainer.train_results().unwrap();

            prop_assert!(vocab.size() <= vocab_size);
            for id in 0..vocab.size() as WordId {
                prop_assert_eq!(vocab.get_id(vocab.get_word(id)), id);
            }
            for (word, symbols) in &segmentations {
                prop_assert_eq!(&vocab.encode_word(word), symbols);
            }
            for line in &lines {
                let ids = vocab.convert_to_ids(line);
                let expected = line.split_whitespace().map(|w| {
                    if w.chars().all(|c| vocab.contains(&c.to_string())) {
                        w.to_string()
                    } else {
                        "?".to_string()
                    }
                }).collect::<Vec<_>>();
                if !expected.iter().any(|w| w == "?") {
                    prop_assert_eq!(vocab.convert_to_sentence(&ids), expected.join(" "));
                }
            }
        }
    }
}
