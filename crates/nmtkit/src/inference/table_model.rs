//! # Lookup-Table Model
//!
//! A deterministic oracle and predictor over a ``prefix -> distribution``
//! table, for exercising the decoders without a network.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    inference::{DecoderOracle, Prediction, Predictor, StepOutput},
    types::{NmtHashMap, hash_map_new},
};

/// A word-prefix lookup model.
///
/// The state is the sequence of inputs fed so far, starting with `<s>`.
/// The features are that sequence without its first element, which is
/// the key into the table; unlisted prefixes use the fallback distribution.
/// Attention is uniform over the source.
#[derive(Debug)]
pub struct TableModel {
    table: NmtHashMap<Vec<WordId>, Vec<Prediction>>,
    fallback: Vec<Prediction>,
    num_calls: AtomicUsize,
}

/// Decoder state of a [`TableModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    history: Vec<WordId>,
    source_len: usize,
}

fn to_predictions(probs: &[(WordId, f64)]) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = probs
        .iter()
        .map(|&(word_id, p)| Prediction::new(word_id, p.ln()))
        .collect();
    predictions.sort_by(|a, b| b.log_prob.total_cmp(&a.log_prob));
    predictions
}

impl TableModel {
    /// Create a model with a fallback distribution of ``(word, probability)``.
    pub fn new(fallback: &[(WordId, f64)]) -> Self {
        Self {
            table: hash_map_new(),
            fallback: to_predictions(fallback),
            num_calls: AtomicUsize::new(0),
        }
    }

    /// Add the distribution after `prefix`.
    pub fn with_entry(
        mut self,
        prefix: &[WordId],
        probs: &[(WordId, f64)],
    ) -> Self {
        self.table.insert(prefix.to_vec(), to_predictions(probs));
        self
    }

    /// The number of batched `one_step` calls served.
    pub fn num_calls(&self) -> usize {
        self.num_calls.load(Ordering::Relaxed)
    }

    fn distribution(
        &self,
        prefix: &[WordId],
    ) -> &[Prediction] {
        self.table.get(prefix).unwrap_or(&self.fallback)
    }
}

impl DecoderOracle for TableModel {
    type State = TableState;
    type Features = Vec<WordId>;

    fn prepare(
        &self,
        source_ids: &[WordId],
    ) -> NmtResult<TableState> {
        Ok(TableState {
            history: Vec::new(),
            source_len: source_ids.len(),
        })
    }

    fn one_step(
        &self,
        states: &[&TableState],
        inputs: &[WordId],
    ) -> NmtResult<Vec<StepOutput<TableState, Vec<WordId>>>> {
        if states.len() != inputs.len() {
            return Err(NmtError::External(format!(
                "{} states for {} inputs",
                states.len(),
                inputs.len()
            )));
        }
        self.num_calls.fetch_add(1, Ordering::Relaxed);

        Ok(states
            .iter()
            .zip(inputs)
            .map(|(state, &input)| {
                let mut history = state.history.clone();
                history.push(input);
                let features = history[1..].to_vec();
                let n = state.source_len;
                StepOutput {
                    state: TableState {
                        history,
                        source_len: n,
                    },
                    attention_probs: vec![1.0 / n.max(1) as f64; n],
                    features,
                }
            })
            .collect())
    }
}

impl Predictor<Vec<WordId>> for TableModel {
    fn predict_k_best(
        &self,
        features: &Vec<WordId>,
        k: usize,
    ) -> NmtResult<Vec<Prediction>> {
        let dist = self.distribution(features);
        Ok(dist[..k.min(dist.len())].to_vec())
    }

    fn predict_by_ids(
        &self,
        features: &Vec<WordId>,
        ids: &[WordId],
    ) -> NmtResult<Vec<Prediction>> {
        let dist = self.distribution(features);
        Ok(ids
            .iter()
            .map(|&id| {
                let log_prob = dist
                    .iter()
                    .find(|p| p.word_id == id)
                    .map_or(f64::NEG_INFINITY, |p| p.log_prob);
                Prediction::new(id, log_prob)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let model = TableModel::new(&[(2, 0.5), (3, 0.5)]).with_entry(&[], &[(4, 0.2), (5, 0.8)]);

        let state = model.prepare(&[10, 11]).unwrap();
        let out = model.one_step(&[&state], &[1]).unwrap();
        assert_eq!(model.num_calls(), 1);
        assert_eq!(out[0].features, Vec::<WordId>::new());
        assert_eq!(out[0].attention_probs, vec![0.5, 0.5]);

        let best = model.predict_k_best(&out[0].features, 5).unwrap();
        assert_eq!(best.iter().map(|p| p.word_id).collect::<Vec<_>>(), vec![5, 4]);
        assert!((best[0].log_prob - 0.8f64.ln()).abs() < 1e-12);

        let by_ids = model.predict_by_ids(&out[0].features, &[4, 9]).unwrap();
        assert_eq!(by_ids[0].word_id, 4);
        assert_eq!(by_ids[1].log_prob, f64::NEG_INFINITY);

        let out = model.one_step(&[&out[0].state], &[5]).unwrap();
        assert_eq!(out[0].features, vec![5]);
        let best = model.predict_k_best(&out[0].features, 1).unwrap();
        assert_eq!(best.len(), 1);
    }

    #[test]
    fn test_batch_mismatch() {
        let model = TableModel::new(&[(2, 1.0)]);
        let state = model.prepare(&[]).unwrap();
        assert!(matches!(
            model.one_step(&[&state], &[1, 1]),
            Err(NmtError::External(_))
        ));
    }
}
