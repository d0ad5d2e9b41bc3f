#![allow(missing_docs)]

use std::sync::LazyLock;

use divan::{Bencher, black_box};
use nmtkit::{
    Random,
    WordId,
    array,
    inference::{BeamSearchOptions, TableModel},
    vocab::{
        Vocabulary,
        bpe::{BpeTrainerOptions, BpeVocabulary},
        reserved::EOS_ID,
    },
};

fn main() {
    divan::main();
}

static CORPUS: &str = "the quick brown fox jumps over the lazy dog
a stitch in time saves nine
anything that can go wrong will go wrong
the early bird catches the worm
all that glitters is not gold";

/// Fifty words with geometric probabilities; `</s>` is never likely.
static MODEL: LazyLock<TableModel> = LazyLock::new(|| {
    let mut probs: Vec<(WordId, f64)> = (3..53).map(|id| (id, 0.5f64.powi(id as i32 - 2))).collect();
    probs.push((EOS_ID, 1e-4));
    TableModel::new(&probs)
});

static BPE: LazyLock<BpeVocabulary> = LazyLock::new(|| {
    let mut trainer = BpeTrainerOptions::new(200).init();
    trainer.update_from_samples(CORPUS.lines());
    trainer.train().unwrap()
});

#[divan::bench(args = [16, 256, 4096])]
fn kbest(
    bencher: Bencher,
    len: usize,
) {
    let mut rng = Random::new(17);
    let items: Vec<f64> = (0..len).map(|_| rng.funiform(-10.0, 0.0)).collect();
    bencher.bench(|| array::kbest(black_box(&items), 8.min(len), |a, b| a > b).unwrap());
}

#[divan::bench(args = [1, 5, 10])]
fn beam_search(
    bencher: Bencher,
    beam_width: usize,
) {
    let decoder = BeamSearchOptions::default()
        .with_beam_width(beam_width)
        .with_max_length(20)
        .init()
        .unwrap();
    let source: Vec<WordId> = (3..13).collect();

    bencher.bench(|| {
        decoder
            .decode(&*MODEL, &*MODEL, black_box(&source))
            .unwrap()
    });
}

#[divan::bench]
fn bpe_convert_to_ids(bencher: Bencher) {
    let vocab = &*BPE;
    bencher.bench(|| vocab.convert_to_ids(black_box(CORPUS)));
}
