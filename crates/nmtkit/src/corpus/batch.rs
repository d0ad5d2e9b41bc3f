//! # Samples and Batches
//!
//! [`BatchConverter::convert`] packs variable-length samples into two
//! time-major matrices: row `0` is `<s>` in every column, the last row is
//! `</s>`, and each column is padded with `</s>` past its true length.

use serde::{Deserialize, Serialize};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    vocab::reserved::{BOS_ID, EOS_ID},
};

/// One parallel training or evaluation instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Source IDs, without `<s>`/`</s>`.
    pub source: Vec<WordId>,

    /// Target IDs, without `<s>`/`</s>`.
    pub target: Vec<WordId>,
}

impl Sample {
    /// Create a sample.
    pub fn new(
        source: Vec<WordId>,
        target: Vec<WordId>,
    ) -> Self {
        Self { source, target }
    }
}

/// A time-major ``rows x batch_size`` ID matrix.
pub type IdMatrix = Vec<Vec<WordId>>;

/// Rectangular source and target matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Source IDs, shaped ``(max_source_len + 2) x batch_size``.
    pub source_ids: IdMatrix,

    /// Target IDs, shaped ``(max_target_len + 2) x batch_size``.
    pub target_ids: IdMatrix,
}

impl Batch {
    /// The number of columns.
    pub fn batch_size(&self) -> usize {
        self.source_ids.first().map_or(0, Vec::len)
    }
}

/// Packs [`Sample`]s into [`Batch`]es.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConverter {
    /// Source `<s>`.
    pub source_bos_id: WordId,

    /// Source `</s>`.
    pub source_eos_id: WordId,

    /// Target `<s>`.
    pub target_bos_id: WordId,

    /// Target `</s>`.
    pub target_eos_id: WordId,
}

impl Default for BatchConverter {
    fn default() -> Self {
        Self {
            source_bos_id: BOS_ID,
            source_eos_id: EOS_ID,
            target_bos_id: BOS_ID,
            target_eos_id: EOS_ID,
        }
    }
}

fn pack<'a>(
    rows: impl Iterator<Item = &'a [WordId]> + Clone,
    batch_size: usize,
    bos_id: WordId,
    eos_id: WordId,
) -> IdMatrix {
    let max_len = rows.clone().map(<[WordId]>::len).max().unwrap_or(0);

    let mut matrix = vec![vec![eos_id; batch_size]; max_len + 2];
    matrix[0].fill(bos_id);
    for (i, ids) in rows.enumerate() {
        for (j, &id) in ids.iter().enumerate() {
            matrix[j + 1][i] = id;
        }
    }
    matrix
}

impl BatchConverter {
    /// Create a converter using the same markers on both sides.
    pub fn new(
        bos_id: WordId,
        eos_id: WordId,
    ) -> Self {
        Self {
            source_bos_id: bos_id,
            source_eos_id: eos_id,
            target_bos_id: bos_id,
            target_eos_id: eos_id,
        }
    }

    /// Pack samples into a [`Batch`].
    ///
    /// ## Errors
    /// [`NmtError::Config`] if `samples` is empty.
    pub fn convert(
        &self,
        samples: &[Sample],
    ) -> NmtResult<Batch> {
        if samples.is_empty() {
            return Err(NmtError::config("cannot convert an empty batch"));
        }
        let batch_size = samples.len();

        Ok(Batch {
            source_ids: pack(
                samples.iter().map(|s| s.source.as_slice()),
                batch_size,
                self.source_bos_id,
                self.source_eos_id,
            ),
            target_ids: pack(
                samples.iter().map(|s| s.target.as_slice()),
                batch_size,
                self.target_bos_id,
                self.target_eos_id,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_convert() {
        let converter = BatchConverter::default();
        let batch = converter
            .convert(&[
                Sample::new(vec![10, 11, 12], vec![20]),
                Sample::new(vec![13], vec![21, 22]),
            ])
            .unwrap();

        assert_eq!(batch.batch_size(), 2);
        assert_eq!(
            batch.source_ids,
            vec![vec![1, 1], vec![10, 13], vec![11, 2], vec![12, 2], vec![2, 2]]
        );
        assert_eq!(
            batch.target_ids,
            vec![vec![1, 1], vec![20, 21], vec![2, 22], vec![2, 2]]
        );
    }

    #[test]
    fn test_distinct_markers() {
        let converter = BatchConverter {
            source_bos_id: 5,
            source_eos_id: 6,
            target_bos_id: 7,
            target_eos_id: 8,
        };
        let batch = converter.convert(&[Sample::new(vec![], vec![9])]).unwrap();
        assert_eq!(batch.source_ids, vec![vec![5], vec![6]]);
        assert_eq!(batch.target_ids, vec![vec![7], vec![9], vec![8]]);
    }

    #[test]
    fn test_empty() {
        let err = BatchConverter::new(1, 2).convert(&[]).unwrap_err();
        assert!(matches!(err, NmtError::Config(_)));
    }

    proptest! {
        #[test]
        fn prop_batch_shape(
            samples in proptest::collection::vec(
                (
                    proptest::collection::vec(3u32..100, 0..12),
                    proptest::collection::vec(3u32..100, 0..12),
                ),
                1..10,
            )
        ) {
            let samples: Vec<Sample> = samples
                .into_iter()
                .map(|(s, t)| Sample::new(s, t))
                .collect();
            let batch = BatchConverter::default().convert(&samples).unwrap();

            let max_source = samples.iter().map(|s| s.source.len()).max().unwrap();
            prop_assert_eq!(batch.source_ids.len(), max_source + 2);
            for (i, sample) in samples.iter().enumerate() {
                prop_assert_eq!(batch.source_ids[0][i], BOS_ID);
                prop_assert_eq!(batch.source_ids[max_source + 1][i], EOS_ID);
                prop_assert_eq!(batch.target_ids[0][i], BOS_ID);
                prop_assert_eq!(*batch.target_ids.last().unwrap().get(i).unwrap(), EOS_ID);
                for (j, &id) in sample.source.iter().enumerate() {
                    prop_assert_eq!(batch.source_ids[j + 1][i], id);
                }
                for row in &batch.source_ids[sample.source.len() + 1..] {
                    prop_assert_eq!(row[i], EOS_ID);
                }
            }
        }
    }
}
