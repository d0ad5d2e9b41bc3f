//! # Plain-Text Formatter

use std::io::Write;

use crate::{
    NmtResult,
    WordId,
    formatter::{FormatRecord, Formatter},
    vocab::reserved::{BOS_ID, EOS_ID},
};

/// Writes the one-best translation, one line per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormatter {
    bos_id: WordId,
    eos_id: WordId,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(BOS_ID, EOS_ID)
    }
}

impl TextFormatter {
    /// Create a formatter for the given target markers.
    pub fn new(
        bos_id: WordId,
        eos_id: WordId,
    ) -> Self {
        Self { bos_id, eos_id }
    }
}

impl Formatter for TextFormatter {
    fn initialize(
        &mut self,
        _out: &mut dyn Write,
    ) -> NmtResult<()> {
        Ok(())
    }

    fn write(
        &mut self,
        record: &FormatRecord<'_>,
        out: &mut dyn Write,
    ) -> NmtResult<()> {
        let words = record
            .graph
            .find_one_best_words(self.bos_id, self.eos_id)?;
        writeln!(out, "{}", record.target_vocab.convert_to_sentence(&words))?;
        Ok(())
    }

    fn finalize(
        &mut self,
        out: &mut dyn Write,
    ) -> NmtResult<()> {
        out.flush()?;
        Ok(())
    }
}
