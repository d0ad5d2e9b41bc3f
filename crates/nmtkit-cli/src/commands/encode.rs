use std::io::{BufRead, Write};

use nmtkit::vocab::{
    Vocabulary,
    reserved::{BOS_ID, EOS_ID},
};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
    vocab_selector::VocabSelectorArgs,
};

/// Args for the encode command.
#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    vocab: VocabSelectorArgs,

    #[clap(flatten)]
    logging: LogArgs,

    /// Wrap every line in `<s>` ... `</s>`.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    markers: bool,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl EncodeArgs {
    /// Run the encode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        let vocab = self.vocab.load_vocab()?;
        let reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        for line in reader.lines() {
            let mut ids = vocab.convert_to_ids(&line?);
            if self.markers {
                ids.insert(0, BOS_ID);
                ids.push(EOS_ID);
            }

            for (idx, id) in ids.iter().enumerate() {
                write!(writer, "{}{}", if idx == 0 { "" } else { " " }, id)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;

        Ok(())
    }
}
