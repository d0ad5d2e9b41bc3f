//! # Held-Out Loss

use crate::{
    NmtError,
    NmtResult,
    WordId,
    corpus::{Batch, BatchConverter, Sample, Sampler, SequentialSampler},
    evaluation::Evaluator,
    inference::{BeamSearchOptions, DecoderOracle, Predictor},
};

/// Summed loss over the target tokens of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchLoss {
    /// The summed loss.
    pub total: f64,

    /// The number of scored target tokens.
    pub num_tokens: usize,
}

/// The training-loss computation, as seen by [`LossEvaluator`].
pub trait LossModel {
    /// Compute the loss of one batch without updating the model.
    fn batch_loss(
        &self,
        batch: &Batch,
    ) -> NmtResult<BatchLoss>;
}

/// Mean per-token loss over a held-out corpus.
#[derive(Debug, Clone)]
pub struct LossEvaluator {
    samples: Vec<Sample>,
    batch_size: usize,
    converter: BatchConverter,
}

impl LossEvaluator {
    /// Create an evaluator.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if `batch_size == 0`.
    pub fn new(
        samples: Vec<Sample>,
        batch_size: usize,
        converter: BatchConverter,
    ) -> NmtResult<Self> {
        if batch_size == 0 {
            return Err(NmtError::config("loss batch size must be > 0"));
        }
        Ok(Self {
            samples,
            batch_size,
            converter,
        })
    }
}

impl<M: LossModel + ?Sized> Evaluator<M> for LossEvaluator {
    fn name(&self) -> &str {
        "loss"
    }

    /// ## Errors
    /// [`NmtError::Config`] if the corpus has no target tokens.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, model)))]
    fn evaluate(
        &self,
        model: &M,
    ) -> NmtResult<f64> {
        let mut sampler = SequentialSampler::new(self.samples.clone(), self.batch_size)?;
        let mut sum = BatchLoss::default();
        while sampler.has_samples() {
            let batch = self.converter.convert(&sampler.next_samples())?;
            let loss = model.batch_loss(&batch)?;
            sum.total += loss.total;
            sum.num_tokens += loss.num_tokens;
        }
        if sum.num_tokens == 0 {
            return Err(NmtError::config("loss corpus has no target tokens"));
        }

        let mean = sum.total / sum.num_tokens as f64;
        log::info!(
            "Loss over {} samples: {mean:.4} ({} tokens)",
            self.samples.len(),
            sum.num_tokens
        );
        Ok(mean)
    }
}

/// Negative log-likelihood of each reference, through force decoding.
///
/// Each batch column is unpacked to its true length (up to the first
/// `</s>` after `<s>`); every target word and the final `</s>` count as
/// one token each.
#[derive(Debug)]
pub struct ForceDecodingLoss<'a, M> {
    model: &'a M,
    converter: BatchConverter,
}

impl<'a, M> ForceDecodingLoss<'a, M>
where
    M: DecoderOracle + Predictor<M::Features>,
{
    /// Wrap a model; `converter` names the batch markers.
    pub fn new(
        model: &'a M,
        converter: BatchConverter,
    ) -> Self {
        Self { model, converter }
    }
}

/// Column `i` of `matrix`, between row 0 and the first `eos_id`.
fn unpack(
    matrix: &[Vec<WordId>],
    i: usize,
    eos_id: WordId,
) -> Vec<WordId> {
    matrix
        .iter()
        .skip(1)
        .map(|row| row[i])
        .take_while(|&id| id != eos_id)
        .collect()
}

impl<M> LossModel for ForceDecodingLoss<'_, M>
where
    M: DecoderOracle + Predictor<M::Features>,
{
    fn batch_loss(
        &self,
        batch: &Batch,
    ) -> NmtResult<BatchLoss> {
        let c = self.converter;
        let decoder = BeamSearchOptions::default()
            .with_markers(c.target_bos_id, c.target_eos_id)
            .init()?;

        let mut loss = BatchLoss::default();
        for i in 0..batch.batch_size() {
            let source = unpack(&batch.source_ids, i, c.source_eos_id);
            let target = unpack(&batch.target_ids, i, c.target_eos_id);

            let graph = decoder.force_decode(self.model, self.model, &source, &target)?;
            let log_likelihood = graph
                .nodes()
                .last()
                .map_or(0.0, |node| node.label().accumulated_log_prob);

            loss.total -= log_likelihood;
            loss.num_tokens += target.len() + 1;
        }
        Ok(loss)
    }
}
