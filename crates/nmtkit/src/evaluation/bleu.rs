//! # BLEU
//!
//! Corpus-level BLEU with up to 4-gram precisions and a brevity penalty.

use core::hash::Hash;

use crate::{
    NmtError,
    NmtResult,
    WordId,
    evaluation::Evaluator,
    inference::{BeamSearchOptions, DecoderOracle, Predictor},
    types::{NmtHashMap, hash_map_new},
    vocab::reserved::{BOS_ID, EOS_ID},
};

/// The largest n-gram order.
pub const MAX_NGRAM: usize = 4;

/// Sufficient statistics for corpus BLEU.
///
/// Accumulate sentence pairs with [`BleuStatistics::add`], combine
/// partial results with [`BleuStatistics::merge`], then take the
/// [`BleuStatistics::score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BleuStatistics {
    /// Clipped n-gram matches, by order.
    pub matches: [u64; MAX_NGRAM],

    /// Hypothesis n-gram counts, by order.
    pub totals: [u64; MAX_NGRAM],

    /// Total hypothesis length.
    pub hypothesis_len: u64,

    /// Total reference length.
    pub reference_len: u64,
}

fn ngram_counts<T: Eq + Hash>(
    tokens: &[T],
    n: usize,
) -> NmtHashMap<&[T], u64> {
    let mut counts: NmtHashMap<&[T], u64> = hash_map_new();
    for window in tokens.windows(n) {
        *counts.entry(window).or_default() += 1;
    }
    counts
}

impl BleuStatistics {
    /// Add one ``(hypothesis, reference)`` pair.
    pub fn add<T: Eq + Hash>(
        &mut self,
        hypothesis: &[T],
        reference: &[T],
    ) {
        self.hypothesis_len += hypothesis.len() as u64;
        self.reference_len += reference.len() as u64;

        for n in 1..=MAX_NGRAM {
            let hyp_counts = ngram_counts(hypothesis, n);
            let ref_counts = ngram_counts(reference, n);
            for (gram, &count) in &hyp_counts {
                let available = ref_counts.get(gram).copied().unwrap_or(0);
                self.matches[n - 1] += count.min(available);
            }
            self.totals[n - 1] += hypothesis.len().saturating_sub(n - 1) as u64;
        }
    }

    /// Fold another set of statistics into this one.
    pub fn merge(
        &mut self,
        other: &Self,
    ) {
        for n in 0..MAX_NGRAM {
            self.matches[n] += other.matches[n];
            self.totals[n] += other.totals[n];
        }
        self.hypothesis_len += other.hypothesis_len;
        self.reference_len += other.reference_len;
    }

    /// The brevity penalty.
    pub fn brevity_penalty(&self) -> f64 {
        if self.hypothesis_len == 0 {
            0.0
        } else if self.hypothesis_len < self.reference_len {
            (1.0 - self.reference_len as f64 / self.hypothesis_len as f64).exp()
        } else {
            1.0
        }
    }

    /// Corpus BLEU in ``[0, 1]``; zero if any n-gram precision is zero.
    pub fn score(&self) -> f64 {
        if self.matches.contains(&0) {
            return 0.0;
        }
        let log_precision: f64 = self
            .matches
            .iter()
            .zip(&self.totals)
            .map(|(&m, &t)| (m as f64 / t as f64).ln())
            .sum::<f64>()
            / MAX_NGRAM as f64;
        self.brevity_penalty() * log_precision.exp()
    }
}

/// Options for [`BleuEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleuOptions {
    /// The target `<s>` ID.
    pub bos_id: WordId,

    /// The target `</s>` ID.
    pub eos_id: WordId,

    /// The decoding length limit.
    pub max_length: usize,
}

impl Default for BleuOptions {
    fn default() -> Self {
        Self {
            bos_id: BOS_ID,
            eos_id: EOS_ID,
            max_length: 100,
        }
    }
}

impl BleuOptions {
    /// Sets the `<s>` and `</s>` IDs.
    pub fn with_markers(
        self,
        bos_id: WordId,
        eos_id: WordId,
    ) -> Self {
        Self {
            bos_id,
            eos_id,
            ..self
        }
    }

    /// Sets the max length.
    pub fn with_max_length(
        self,
        max_length: usize,
    ) -> Self {
        Self { max_length, ..self }
    }
}

/// Greedy-decodes held-out sources and scores them against references.
///
/// Decoding uses beam width 1 and no word penalty.
#[derive(Debug, Clone)]
pub struct BleuEvaluator {
    sources: Vec<Vec<WordId>>,
    references: Vec<Vec<WordId>>,
    options: BleuOptions,
}

impl BleuEvaluator {
    /// Create an evaluator.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if the sides differ in length.
    pub fn new(
        sources: Vec<Vec<WordId>>,
        references: Vec<Vec<WordId>>,
        options: BleuOptions,
    ) -> NmtResult<Self> {
        if sources.len() != references.len() {
            return Err(NmtError::config(format!(
                "{} sources for {} references",
                sources.len(),
                references.len()
            )));
        }
        Ok(Self {
            sources,
            references,
            options,
        })
    }

    fn decode_options(&self) -> BeamSearchOptions {
        BeamSearchOptions::default()
            .with_markers(self.options.bos_id, self.options.eos_id)
            .with_max_length(self.options.max_length)
            .with_beam_width(1)
            .with_word_penalty(0.0)
    }

    /// Decode one source to its one-best IDs, without `<s>`/`</s>`.
    pub fn translate<M>(
        &self,
        model: &M,
        source: &[WordId],
    ) -> NmtResult<Vec<WordId>>
    where
        M: DecoderOracle + Predictor<M::Features>,
    {
        let decoder = self.decode_options().init()?;
        let graph = decoder.decode(model, model, source)?;
        graph.find_one_best_words(self.options.bos_id, self.options.eos_id)
    }

    /// Accumulate statistics over the corpus, one sentence at a time.
    pub fn statistics<M>(
        &self,
        model: &M,
    ) -> NmtResult<BleuStatistics>
    where
        M: DecoderOracle + Predictor<M::Features>,
    {
        let mut stats = BleuStatistics::default();
        for (source, reference) in self.sources.iter().zip(&self.references) {
            stats.add(&self.translate(model, source)?, reference);
        }
        Ok(stats)
    }

    /// Accumulate statistics with one rayon task per sentence.
    ///
    /// Every decode owns its graph and states; only `model` is shared.
    #[cfg(feature = "rayon")]
    pub fn statistics_parallel<M>(
        &self,
        model: &M,
    ) -> NmtResult<BleuStatistics>
    where
        M: DecoderOracle + Predictor<M::Features> + Sync,
    {
        use rayon::prelude::*;

        self.sources
            .par_iter()
            .zip(self.references.par_iter())
            .map(|(source, reference)| -> NmtResult<BleuStatistics> {
                let mut stats = BleuStatistics::default();
                stats.add(&self.translate(model, source)?, reference);
                Ok(stats)
            })
            .try_reduce(BleuStatistics::default, |mut a, b| {
                a.merge(&b);
                Ok(a)
            })
    }
}

impl<M> Evaluator<M> for BleuEvaluator
where
    M: DecoderOracle + Predictor<M::Features>,
{
    fn name(&self) -> &str {
        "bleu"
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, model)))]
    fn evaluate(
        &self,
        model: &M,
    ) -> NmtResult<f64> {
        let stats = self.statistics(model)?;
        log::info!(
            "BLEU over {} sentences: {:.4} (BP {:.4})",
            self.sources.len(),
            stats.score(),
            stats.brevity_penalty()
        );
        Ok(stats.score())
    }
}
