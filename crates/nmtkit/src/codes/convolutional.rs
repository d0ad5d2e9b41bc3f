//! # Convolutional Code
//!
//! Rate-1/2 feed-forward convolutional encoder with Viterbi soft decoding.
//!
//! ## Register Word
//! Each step forms ``reg = (input << R) | state``, where bit `R - 1` of the
//! state is the most recent input and bit `0` the oldest. Output `k` is the
//! parity of ``reg & POLY[k]``, and the next state is ``reg >> 1``.
//!
//! ## Termination
//! `R` zero bits are appended to flush the registers, so an `n`-bit message
//! encodes to ``2 * (n + R)`` bits and every path ends in state `0`.

use crate::{NmtError, NmtResult, codes::ErrorCorrectingCode};

/// Generator polynomials (octal) for 2 through 6 registers.
const GENERATORS: [[u32; 2]; 5] = [
    [0o5, 0o7],
    [0o15, 0o17],
    [0o23, 0o35],
    [0o53, 0o75],
    [0o133, 0o171],
];

/// Probabilities are clamped into ``[EPSILON, 1 - EPSILON]`` before `ln`.
const EPSILON: f64 = 1e-10;

/// Rate-1/2 convolutional code with `2..=6` registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvolutionalEcc {
    num_registers: usize,
    generators: [u32; 2],
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    prev: usize,
    bit: bool,
}

impl ConvolutionalEcc {
    /// The smallest supported register count.
    pub const MIN_REGISTERS: usize = 2;

    /// The largest supported register count.
    pub const MAX_REGISTERS: usize = 6;

    /// Create a code.
    ///
    /// ## Errors
    /// [`NmtError::Config`] if `num_registers` is outside `2..=6`.
    pub fn new(num_registers: usize) -> NmtResult<Self> {
        if !(Self::MIN_REGISTERS..=Self::MAX_REGISTERS).contains(&num_registers) {
            return Err(NmtError::config(format!(
                "convolutional code supports {}..={} registers, got {num_registers}",
                Self::MIN_REGISTERS,
                Self::MAX_REGISTERS
            )));
        }
        Ok(Self {
            num_registers,
            generators: GENERATORS[num_registers - Self::MIN_REGISTERS],
        })
    }

    /// The register count.
    pub fn num_registers(&self) -> usize {
        self.num_registers
    }

    /// The number of trellis states, `2^R`.
    pub fn num_states(&self) -> usize {
        1 << self.num_registers
    }

    /// One encoder step: ``(outputs, next_state)``.
    #[inline(always)]
    fn step(
        &self,
        state: usize,
        bit: bool,
    ) -> ([bool; 2], usize) {
        let reg = ((bit as u32) << self.num_registers) | state as u32;
        let out = self.generators.map(|g| (reg & g).count_ones() & 1 == 1);
        (out, (reg >> 1) as usize)
    }
}

/// Log-likelihood of observing `bit` under probability `p` of a `1`.
#[inline(always)]
fn log_likelihood(
    p: f64,
    bit: bool,
) -> f64 {
    let p = p.clamp(EPSILON, 1.0 - EPSILON);
    if bit { p.ln() } else { (1.0 - p).ln() }
}

impl ErrorCorrectingCode for ConvolutionalEcc {
    fn encoded_len(
        &self,
        n: usize,
    ) -> usize {
        2 * (n + self.num_registers)
    }

    fn encode(
        &self,
        bits: &[bool],
    ) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.encoded_len(bits.len()));
        let mut state = 0;
        let flush = core::iter::repeat_n(false, self.num_registers);
        for bit in bits.iter().copied().chain(flush) {
            let (pair, next) = self.step(state, bit);
            out.extend(pair);
            state = next;
        }
        out
    }

    /// Viterbi search over the terminated trellis.
    ///
    /// Starts and ends in state `0`; flush steps only admit `0` inputs.
    /// Among equal-scoring arrivals, the lower predecessor state wins.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, probs)))]
    fn decode(
        &self,
        probs: &[f64],
    ) -> NmtResult<Vec<bool>> {
        let min_len = self.encoded_len(0);
        if probs.len() % 2 != 0 || probs.len() < min_len {
            return Err(NmtError::config(format!(
                "convolutional decode expects an even length >= {min_len}, got {}",
                probs.len()
            )));
        }
        if let Some(p) = probs.iter().find(|p| p.is_nan()) {
            return Err(NmtError::config(format!("invalid bit probability: {p}")));
        }

        let num_steps = probs.len() / 2;
        let num_bits = num_steps - self.num_registers;
        let num_states = self.num_states();

        let mut scores = vec![f64::NEG_INFINITY; num_states];
        scores[0] = 0.0;
        let mut trellis: Vec<Vec<Option<Transition>>> = Vec::with_capacity(num_steps);

        for (t, observed) in probs.chunks_exact(2).enumerate() {
            let inputs: &[bool] = if t < num_bits {
                &[false, true]
            } else {
                &[false]
            };

            let mut next_scores = vec![f64::NEG_INFINITY; num_states];
            let mut column = vec![None; num_states];
            for (state, &score) in scores.iter().enumerate() {
                if score == f64::NEG_INFINITY {
                    continue;
                }
                for &bit in inputs {
                    let (out, next) = self.step(state, bit);
                    let candidate = score
                        + log_likelihood(observed[0], out[0])
                        + log_likelihood(observed[1], out[1]);
                    if candidate > next_scores[next] {
                        next_scores[next] = candidate;
                        column[next] = Some(Transition { prev: state, bit });
                    }
                }
            }
            scores = next_scores;
            trellis.push(column);
        }

        let mut bits = Vec::with_capacity(num_steps);
        let mut state = 0;
        for column in trellis.iter().rev() {
            let Some(Transition { prev, bit }) = column[state] else {
                return Err(NmtError::invariant("Viterbi backtrace left the trellis"));
            };
            bits.push(bit);
            state = prev;
        }
        bits.reverse();
        bits.truncate(num_bits);
        Ok(bits)
    }
}
