//! # Scoring Oracles
//!
//! The neural network is external: the decoder sees it only through
//! [`DecoderOracle`] (state transitions) and [`Predictor`] (word scores).

use crate::{NmtResult, WordId};

/// One scored word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// The word.
    pub word_id: WordId,

    /// Its log-probability.
    pub log_prob: f64,
}

impl Prediction {
    /// Create a prediction.
    pub fn new(
        word_id: WordId,
        log_prob: f64,
    ) -> Self {
        Self { word_id, log_prob }
    }
}

/// The result of advancing one hypothesis by one word.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput<S, F> {
    /// The next decoder state.
    pub state: S,

    /// Attention over source positions.
    pub attention_probs: Vec<f64>,

    /// Features for the [`Predictor`].
    pub features: F,
}

/// Encoder-decoder state transitions.
pub trait DecoderOracle {
    /// Per-hypothesis decoder state.
    type State: Clone;

    /// Per-step output features.
    type Features;

    /// Encode a source sentence into the initial decoder state.
    fn prepare(
        &self,
        source_ids: &[WordId],
    ) -> NmtResult<Self::State>;

    /// Advance a batch of hypotheses by one input word each.
    ///
    /// Must return exactly one output per input, in order.
    fn one_step(
        &self,
        states: &[&Self::State],
        inputs: &[WordId],
    ) -> NmtResult<Vec<StepOutput<Self::State, Self::Features>>>;
}

/// Word scoring over decoder features.
pub trait Predictor<F> {
    /// The `k` best words, by descending log-probability.
    fn predict_k_best(
        &self,
        features: &F,
        k: usize,
    ) -> NmtResult<Vec<Prediction>>;

    /// The log-probabilities of `ids`, in the same order.
    fn predict_by_ids(
        &self,
        features: &F,
        ids: &[WordId],
    ) -> NmtResult<Vec<Prediction>>;
}
