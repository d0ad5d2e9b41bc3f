use std::io::{BufRead, Write};

use nmtkit::{NmtError, NmtResult, WordId, vocab::Vocabulary};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
    vocab_selector::VocabSelectorArgs,
};

/// Args for the decode-ids command.
#[derive(clap::Args, Debug)]
pub struct DecodeIdsArgs {
    #[command(flatten)]
    vocab: VocabSelectorArgs,

    #[clap(flatten)]
    logging: LogArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl DecodeIdsArgs {
    /// Run the decode-ids command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        let vocab = self.vocab.load_vocab()?;
        let reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        for (idx, line) in reader.lines().enumerate() {
            let ids = parse_ids(&line?).map_err(|e| format!("line {}: {e}", idx + 1))?;
            writeln!(writer, "{}", vocab.convert_to_sentence(&ids))?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// Parse a whitespace-separated ID line.
fn parse_ids(line: &str) -> NmtResult<Vec<WordId>> {
    line.split_whitespace()
        .map(|s| {
            s.parse::<WordId>()
                .map_err(|e| NmtError::Parse(format!("{s:?}: {e}")))
        })
        .collect()
}
