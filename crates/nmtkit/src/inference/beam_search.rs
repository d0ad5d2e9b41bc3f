//! # Beam Search
//!
//! [`BeamSearchDecoder::decode`] drives a [`DecoderOracle`] one step at a
//! time and records every hypothesis it explores in an [`InferenceGraph`].
//!
//! ## Step
//! 1. Each hypothesis of the current beam becomes a graph node linked to
//!    its parent. `</s>` hypotheses are complete and only update the best
//!    complete score.
//! 2. All live hypotheses advance in one batched `one_step` call.
//! 3. Each proposes its `beam_width` best next words (only `</s>` once
//!    `max_length` is reached); the word penalty is added to every word.
//! 4. The best `beam_width` candidates by accumulated log-probability form
//!    the next beam, unless the best of them already scores below the best
//!    complete hypothesis.

use crate::{
    NmtError,
    NmtResult,
    WordId,
    array,
    inference::{DecoderOracle, InferenceGraph, Label, NodeId, Prediction, Predictor},
    vocab::reserved::{BOS_ID, EOS_ID},
};

/// Options for [`BeamSearchDecoder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSearchOptions {
    /// The `<s>` ID of the target vocabulary.
    pub bos_id: WordId,

    /// The `</s>` ID of the target vocabulary.
    pub eos_id: WordId,

    /// The step at which `</s>` is forced.
    pub max_length: usize,

    /// The number of hypotheses kept per step.
    pub beam_width: usize,

    /// Added to every word's log-probability.
    ///
    /// Early stopping assumes this is `<= 0`.
    pub word_penalty: f64,
}

impl Default for BeamSearchOptions {
    fn default() -> Self {
        Self {
            bos_id: BOS_ID,
            eos_id: EOS_ID,
            max_length: 100,
            beam_width: 5,
            word_penalty: 0.0,
        }
    }
}

impl BeamSearchOptions {
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

    /// Sets the beam width.
    pub fn with_beam_width(
        self,
        beam_width: usize,
    ) -> Self {
        Self { beam_width, ..self }
    }

    /// Sets the word penalty.
    pub fn with_word_penalty(
        self,
        word_penalty: f64,
    ) -> Self {
        Self {
            word_penalty,
            ..self
        }
    }

    /// Validates and builds a [`BeamSearchDecoder`].
    pub fn init(self) -> NmtResult<BeamSearchDecoder> {
        BeamSearchDecoder::new(self)
    }
}

/// A live or complete hypothesis, before it is committed to the graph.
struct Hypothesis<S> {
    label: Label,
    parent: Option<NodeId>,
    state: S,
}

/// Beam search and force decoding over an oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSearchDecoder {
    options: BeamSearchOptions,
}

fn checked_log_prob(prediction: &Prediction) -> NmtResult<f64> {
    if prediction.log_prob.is_nan() {
        return Err(NmtError::invariant(format!(
            "NaN log-probability for word {}",
            prediction.word_id
        )));
    }
    Ok(prediction.log_prob)
}

fn check_outputs(
    outputs: usize,
    inputs: usize,
) -> NmtResult<()> {
    if outputs != inputs {
        return Err(NmtError::External(format!(
            "oracle returned {outputs} outputs for {inputs} inputs"
        )));
    }
    Ok(())
}

impl BeamSearchDecoder {
    /// Create a decoder.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if `beam_width` or `max_length` is zero, or the
    /// word penalty is not finite.
    pub fn new(options: BeamSearchOptions) -> NmtResult<Self> {
        if options.beam_width == 0 {
            return Err(NmtError::config("beam width must be > 0"));
        }
        if options.max_length == 0 {
            return Err(NmtError::config("max length must be > 0"));
        }
        if !options.word_penalty.is_finite() {
            return Err(NmtError::config(format!(
                "word penalty must be finite, got {}",
                options.word_penalty
            )));
        }
        if options.word_penalty > 0.0 {
            log::warn!(
                "Positive word penalty ({}): early stopping may cut off the best path",
                options.word_penalty
            );
        }
        Ok(Self { options })
    }

    /// The decoder options.
    pub fn options(&self) -> &BeamSearchOptions {
        &self.options
    }

    /// Beam-search a source sentence.
    ///
    /// Returns the graph of every explored hypothesis; use
    /// [`InferenceGraph::find_one_best_path`] for the result. Equal-scoring
    /// candidates at the beam boundary are chosen by [`array::kbest`] heap
    /// order.
    ///
    /// ## Errors
    /// * Oracle and predictor errors propagate.
    /// * [`NmtError::InvariantViolation`] on a NaN log-probability, or when
    ///   live hypotheses propose no candidates.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, oracle, predictor, source_ids))
    )]
    pub fn decode<O, P>(
        &self,
        oracle: &O,
        predictor: &P,
        source_ids: &[WordId],
    ) -> NmtResult<InferenceGraph>
    where
        O: DecoderOracle,
        P: Predictor<O::Features>,
    {
        let BeamSearchOptions {
            bos_id,
            eos_id,
            max_length,
            beam_width,
            word_penalty,
        } = self.options;

        let mut graph = InferenceGraph::new();
        let mut beam = vec![Hypothesis {
            label: Label::new(bos_id, 0.0, 0.0),
            parent: None,
            state: oracle.prepare(source_ids)?,
        }];
        let mut best_complete = f64::NEG_INFINITY;

        for length in 1.. {
            let mut live: Vec<(NodeId, Hypothesis<O::State>)> = Vec::with_capacity(beam.len());
            for hyp in beam {
                let accumulated = hyp.label.accumulated_log_prob;
                let is_eos = hyp.label.word_id == eos_id;
                let node = graph.add_node(hyp.label.clone());
                if let Some(parent) = hyp.parent {
                    graph.connect(parent, node)?;
                }
                if is_eos {
                    best_complete = best_complete.max(accumulated);
                } else {
                    live.push((node, hyp));
                }
            }
            if live.is_empty() {
                break;
            }

            let states: Vec<&O::State> = live.iter().map(|(_, hyp)| &hyp.state).collect();
            let inputs: Vec<WordId> = live.iter().map(|(_, hyp)| hyp.label.word_id).collect();
            let outputs = oracle.one_step(&states, &inputs)?;
            check_outputs(outputs.len(), inputs.len())?;

            let mut pool: Vec<Hypothesis<O::State>> = Vec::with_capacity(live.len() * beam_width);
            for ((node, hyp), output) in live.iter().zip(outputs) {
                let predictions = if length < max_length {
                    predictor.predict_k_best(&output.features, beam_width)?
                } else {
                    predictor.predict_by_ids(&output.features, &[eos_id])?
                };
                for prediction in &predictions {
                    let word_log_prob = checked_log_prob(prediction)? + word_penalty;
                    pool.push(Hypothesis {
                        label: Label::new(
                            prediction.word_id,
                            word_log_prob,
                            hyp.label.accumulated_log_prob + word_log_prob,
                        )
                        .with_attention(output.attention_probs.clone()),
                        parent: Some(*node),
                        state: output.state.clone(),
                    });
                }
            }
            if pool.is_empty() {
                return Err(NmtError::invariant(format!(
                    "no candidates from {} live hypotheses at step {length}",
                    live.len()
                )));
            }

            let selected = array::kbest(&pool, beam_width.min(pool.len()), |a, b| {
                a.label.accumulated_log_prob > b.label.accumulated_log_prob
            })?;
            let best = pool[selected[0]].label.accumulated_log_prob;
            log::debug!(
                "Step {length}: {} live, {} candidates, best {best:.4}, best complete {best_complete:.4}",
                live.len(),
                pool.len()
            );
            if best < best_complete {
                break;
            }

            let mut pool: Vec<Option<Hypothesis<O::State>>> = pool.into_iter().map(Some).collect();
            beam = selected
                .into_iter()
                .filter_map(|i| pool[i].take())
                .collect();
        }

        Ok(graph)
    }

    /// Score a known target by feeding it to the oracle word by word.
    ///
    /// Produces a single chain ``<s> t1 .. tn </s>`` whose labels carry the
    /// predictor's log-probability of each forced word. The word penalty is
    /// not applied.
    ///
    /// ## Errors
    /// Oracle and predictor errors propagate; a NaN log-probability is an
    /// [`NmtError::InvariantViolation`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, oracle, predictor, source_ids, target_ids))
    )]
    pub fn force_decode<O, P>(
        &self,
        oracle: &O,
        predictor: &P,
        source_ids: &[WordId],
        target_ids: &[WordId],
    ) -> NmtResult<InferenceGraph>
    where
        O: DecoderOracle,
        P: Predictor<O::Features>,
    {
        let BeamSearchOptions { bos_id, eos_id, .. } = self.options;

        let mut graph = InferenceGraph::new();
        let mut state = oracle.prepare(source_ids)?;
        let mut node = graph.add_node(Label::new(bos_id, 0.0, 0.0));
        let mut input = bos_id;
        let mut accumulated = 0.0;

        for &word_id in target_ids.iter().chain([&eos_id]) {
            let output = oracle
                .one_step(&[&state], &[input])?
                .into_iter()
                .next()
                .ok_or_else(|| NmtError::External("oracle returned no output".to_string()))?;

            let predictions = predictor.predict_by_ids(&output.features, &[word_id])?;
            let [prediction] = predictions[..] else {
                return Err(NmtError::External(format!(
                    "predictor returned {} scores for one ID",
                    predictions.len()
                )));
            };
            let log_prob = checked_log_prob(&prediction)?;
            accumulated += log_prob;

            let next = graph.add_node(
                Label::new(word_id, log_prob, accumulated).with_attention(output.attention_probs),
            );
            graph.connect(node, next)?;

            node = next;
            state = output.state;
            input = word_id;
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::TableModel;

    fn model() -> TableModel {
        TableModel::new(&[(2, 0.5), (3, 0.25), (4, 0.25)])
            .with_entry(&[], &[(3, 0.5), (4, 0.4), (2, 0.1)])
            .with_entry(&[3], &[(5, 0.4), (4, 0.35), (2, 0.25)])
            .with_entry(&[3, 5], &[(2, 0.6), (3, 0.3), (4, 0.1)])
            .with_entry(&[4], &[(2, 0.9), (3, 0.05), (5, 0.05)])
    }

    fn best_path(
        options: BeamSearchOptions,
        model: &TableModel,
    ) -> (Vec<WordId>, f64, usize) {
        let graph = options.init().unwrap().decode(model, model, &[7, 8, 9]).unwrap();
        let path = graph.find_one_best_path(BOS_ID, EOS_ID).unwrap();
        let labels = graph.path_labels(&path);
        let score = labels.last().unwrap().accumulated_log_prob;
        (graph.path_words(&path), score, graph.len())
    }

    fn close(
        a: f64,
        b: f64,
    ) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_options() {
        let options = BeamSearchOptions::default()
            .with_beam_width(3)
            .with_max_length(7)
            .with_word_penalty(-0.5)
            .with_markers(10, 11);
        assert_eq!(options.beam_width, 3);
        assert_eq!(options.max_length, 7);
        assert_eq!(options.word_penalty, -0.5);
        assert_eq!((options.bos_id, options.eos_id), (10, 11));
    }

    #[test]
    fn test_invalid_options() {
        let zero_beam = BeamSearchOptions::default().with_beam_width(0).init();
        assert!(matches!(zero_beam, Err(NmtError::Config(_))));

        let zero_length = BeamSearchOptions::default().with_max_length(0).init();
        assert!(matches!(zero_length, Err(NmtError::Config(_))));

        let nan_penalty = BeamSearchOptions::default()
            .with_word_penalty(f64::NAN)
            .init();
        assert!(matches!(nan_penalty, Err(NmtError::Config(_))));

        assert!(BeamSearchOptions::default().with_word_penalty(0.5).init().is_ok());
    }

    #[test]
    fn test_greedy() {
        let model = model();
        let (words, score, nodes) = best_path(BeamSearchOptions::default().with_beam_width(1), &model);
        assert_eq!(words, vec![1, 3, 5, 2]);
        assert!(close(score, (0.5f64 * 0.4 * 0.6).ln()));
        assert_eq!(nodes, 4);
        // One batched call per expanding step.
        assert_eq!(model.num_calls(), 3);
    }

    #[test]
    fn test_wider_beam_finds_better_path() {
        let model = model();
        let (words, score, nodes) = best_path(BeamSearchOptions::default().with_beam_width(2), &model);
        assert_eq!(words, vec![1, 4, 2]);
        assert!(close(score, (0.4f64 * 0.9).ln()));
        // BOS, 3, 4, 4-EOS, 3-5; stops early once 3-5's candidates fall below 4-EOS.
        assert_eq!(nodes, 5);

        let mut previous = f64::NEG_INFINITY;
        for (width, expected_nodes) in [(1, 4), (2, 5), (3, 7), (4, 8)] {
            let (_, score, nodes) =
                best_path(BeamSearchOptions::default().with_beam_width(width), &model);
            assert!(score >= previous, "width {width}");
            assert_eq!(nodes, expected_nodes, "width {width}");
            previous = score;
        }
    }

    #[test]
    fn test_word_penalty() {
        let model = model();
        let options = BeamSearchOptions::default().with_word_penalty(-1.0);

        let (words, score, _) = best_path(options.with_beam_width(1), &model);
        assert_eq!(words, vec![1, 3, 5, 2]);
        assert!(close(score, (0.5f64 * 0.4 * 0.6).ln() - 3.0));

        let (words, score, _) = best_path(options.with_beam_width(2), &model);
        assert_eq!(words, vec![1, 4, 2]);
        assert!(close(score, (0.4f64 * 0.9).ln() - 2.0));
    }

    #[test]
    fn test_forced_eos_at_max_length() {
        let model = model();
        let (words, score, _) = best_path(
            BeamSearchOptions::default()
                .with_beam_width(1)
                .with_max_length(2),
            &model,
        );
        assert_eq!(words, vec![1, 3, 2]);
        assert!(close(score, (0.5f64 * 0.25).ln()));

        let (words, score, nodes) = best_path(
            BeamSearchOptions::default()
                .with_beam_width(3)
                .with_max_length(1),
            &model,
        );
        assert_eq!(words, vec![1, 2]);
        assert!(close(score, 0.1f64.ln()));
        assert_eq!(nodes, 2);
    }

    #[test]
    fn test_labels_carry_attention() {
        let model = model();
        let decoder = BeamSearchOptions::default().with_beam_width(1).init().unwrap();
        let graph = decoder.decode(&model, &model, &[7, 8]).unwrap();
        let path = graph.find_one_best_path(BOS_ID, EOS_ID).unwrap();
        let labels = graph.path_labels(&path);
        assert!(labels[0].attention_probs.is_empty());
        for label in &labels[1..] {
            assert_eq!(label.attention_probs, vec![0.5, 0.5]);
        }
        assert!(close(labels[1].word_log_prob, 0.5f64.ln()));
    }

    #[test]
    fn test_force_decode() {
        let model = model();
        let decoder = BeamSearchOptions::default().init().unwrap();
        let graph = decoder.force_decode(&model, &model, &[7], &[4, 3]).unwrap();

        assert_eq!(graph.len(), 4);
        for node in graph.nodes() {
            assert!(node.next().len() <= 1);
        }
        let path = graph.find_one_best_path(BOS_ID, EOS_ID).unwrap();
        assert_eq!(graph.path_words(&path), vec![1, 4, 3, 2]);

        let labels = graph.path_labels(&path);
        assert!(close(labels[1].word_log_prob, 0.4f64.ln()));
        assert!(close(labels[2].word_log_prob, 0.05f64.ln()));
        // Prefix [4, 3] falls back to the default distribution.
        assert!(close(labels[3].word_log_prob, 0.5f64.ln()));
        assert!(close(
            labels[3].accumulated_log_prob,
            (0.4f64 * 0.05 * 0.5).ln()
        ));
    }

    struct NanPredictor;

    impl Predictor<Vec<WordId>> for NanPredictor {
        fn predict_k_best(
            &self,
            _features: &Vec<WordId>,
            _k: usize,
        ) -> NmtResult<Vec<Prediction>> {
            Ok(vec![Prediction::new(3, f64::NAN)])
        }

        fn predict_by_ids(
            &self,
            _features: &Vec<WordId>,
            ids: &[WordId],
        ) -> NmtResult<Vec<Prediction>> {
            Ok(ids.iter().map(|&id| Prediction::new(id, f64::NAN)).collect())
        }
    }

    struct EmptyPredictor;

    impl Predictor<Vec<WordId>> for EmptyPredictor {
        fn predict_k_best(
            &self,
            _features: &Vec<WordId>,
            _k: usize,
        ) -> NmtResult<Vec<Prediction>> {
            Ok(vec![])
        }

        fn predict_by_ids(
            &self,
            _features: &Vec<WordId>,
            _ids: &[WordId],
        ) -> NmtResult<Vec<Prediction>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_nan_is_rejected() {
        let model = model();
        let decoder = BeamSearchOptions::default().init().unwrap();
        assert!(
            decoder
                .decode(&model, &NanPredictor, &[7])
                .unwrap_err()
                .is_invariant_violation()
        );
        assert!(
            decoder
                .force_decode(&model, &NanPredictor, &[7], &[3])
                .unwrap_err()
                .is_invariant_violation()
        );
    }

    #[test]
    fn test_no_candidates() {
        let model = model();
        let decoder = BeamSearchOptions::default().init().unwrap();
        assert!(
            decoder
                .decode(&model, &EmptyPredictor, &[7])
                .unwrap_err()
                .is_invariant_violation()
        );
        assert!(matches!(
            decoder.force_decode(&model, &EmptyPredictor, &[7], &[3]),
            Err(NmtError::External(_))
        ));
    }
}
