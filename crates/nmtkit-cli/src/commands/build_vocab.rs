use std::io::{BufRead, BufReader, Write};

use nmtkit::vocab::{
    AnyVocabulary,
    CharVocabulary,
    Vocabulary,
    WordVocabulary,
    bpe::BpeTrainerOptions,
    io::write_vocabulary,
};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
};

/// Vocabulary kinds.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum VocabKind {
    /// Whitespace tokens.
    Word,

    /// Unicode letters.
    Char,

    /// Byte-pair-encoding subwords.
    Bpe,
}

/// Args for the build-vocab command.
#[derive(clap::Args, Debug)]
pub struct BuildVocabArgs {
    /// Corpus files; reads `--input` when empty.
    files: Vec<String>,

    #[clap(flatten)]
    logging: LogArgs,

    /// Vocabulary kind.
    #[arg(long, default_value = "word")]
    kind: VocabKind,

    /// Max vocab size, including reserved IDs.
    #[arg(long, default_value = "8000")]
    size: usize,

    /// Stop BPE training once the best pair is rarer than this.
    #[arg(long, default_value = "1")]
    min_pair_frequency: u64,

    /// Pretty-print the JSON output.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pretty: bool,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl BuildVocabArgs {
    /// Run the build-vocab command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let lines = self.read_lines()?;
        log::info!("Read {} lines", lines.len());

        let vocab: AnyVocabulary = match self.kind {
            VocabKind::Word => WordVocabulary::from_samples(&lines, self.size)?.into(),
            VocabKind::Char => CharVocabulary::from_samples(&lines, self.size)?.into(),
            VocabKind::Bpe => {
                let mut trainer = BpeTrainerOptions::new(self.size)
                    .with_min_pair_frequency(self.min_pair_frequency)
                    .init();
                trainer.update_from_samples(&lines);
                trainer.train()?.into()
            }
        };
        log::info!("Vocabulary Size: {}", vocab.size());

        if let Some(path) = &self.output.output {
            log::info!("output: {}", path);
        }
        let mut writer = self.output.open_writer()?;
        write_vocabulary(&vocab, &mut writer, self.pretty)?;
        writer.flush()?;

        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let mut lines = Vec::new();
        if self.files.is_empty() {
            for line in self.input.open_reader()?.lines() {
                lines.push(line?);
            }
            return Ok(lines);
        }

        log::info!("Reading files:");
        for (idx, path) in self.files.iter().enumerate() {
            log::info!("{idx}: {path}");
            let reader = BufReader::new(std::fs::File::open(path)?);
            for line in reader.lines() {
                lines.push(line?);
            }
        }
        Ok(lines)
    }
}
