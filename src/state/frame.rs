//!
//! Frame emission: a hidden codon observed through indel/substitution errors
//!
//! # Model
//!
//! Given the hidden codon `z = z1 z2 z3` and the error rate `e`, the observed
//! window `x` (length `L` in `1..=5`) is generated as
//!
//! ```text
//! P(L=3) = (1-e)^2 + e^2/2
//! P(L=2) = P(L=4) = e (1-e)
//! P(L=1) = P(L=5) = e^2 / 4
//!
//! sub(x | b) = (1-e) [x == b] + e base(x)     (aligned codon base b)
//! ins(x)     = base(x)                        (inserted base)
//!
//! L=3  sub(x1|z1) sub(x2|z2) sub(x3|z3)
//! L=2  one of the 3 codon bases is deleted (uniformly)
//! L=1  one of the 3 codon bases is kept (uniformly)
//! L=4  one of the 4 observed bases is inserted (uniformly)
//! L=5  two of the 5 observed bases are inserted (uniformly over 10 pairs)
//! ```
//!
//! and `P(x) = sum_z P(z) P(L) P(x | z, L)`. For a fixed `z` the emission sums
//! to one over every window of length 1 to 5. With `e = 0` it is an exact
//! codon lookup.
//!
use super::base::{BaseTable, N_BASES};
use super::codon::{Codon, CodonTable};
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::prob::Prob;

/// Shortest window a frame state emits
pub const FRAME_MIN_SEQ: usize = 1;
/// Longest window a frame state emits
pub const FRAME_MAX_SEQ: usize = 5;

/// codon positions kept in a window of length 2
const KEEP_TWO: [[usize; 2]; 3] = [[1, 2], [0, 2], [0, 1]];
/// (inserted, aligned) window positions in a window of length 4
const INSERT_ONE: [(usize, [usize; 3]); 4] = [
    (0, [1, 2, 3]),
    (1, [0, 2, 3]),
    (2, [0, 1, 3]),
    (3, [0, 1, 2]),
];
/// (inserted, aligned) window positions in a window of length 5
const INSERT_TWO: [([usize; 2], [usize; 3]); 10] = [
    ([0, 1], [2, 3, 4]),
    ([0, 2], [1, 3, 4]),
    ([0, 3], [1, 2, 4]),
    ([0, 4], [1, 2, 3]),
    ([1, 2], [0, 3, 4]),
    ([1, 3], [0, 2, 4]),
    ([1, 4], [0, 2, 3]),
    ([2, 3], [0, 1, 4]),
    ([2, 4], [0, 1, 3]),
    ([3, 4], [0, 1, 2]),
];

/// base indices of a window; `None` stands for the any symbol
type Window = [Option<usize>; FRAME_MAX_SEQ];

#[derive(Debug, Clone, PartialEq)]
pub struct FrameEmission {
    base: BaseTable,
    codon: CodonTable,
    epsilon: f64,
    /// `base` as probabilities
    base_values: [f64; N_BASES],
    /// `P(L)` for `L = 0..=5`
    length_lprobs: [Prob; FRAME_MAX_SEQ + 1],
}

impl FrameEmission {
    ///
    /// `base` and `codon` must share the same nucleotide alphabet,
    /// and `epsilon` must be in `[0, 1]`.
    ///
    pub fn new(base: BaseTable, codon: CodonTable, epsilon: f64) -> Result<FrameEmission> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::InvalidParameter(format!(
                "epsilon must be in [0, 1], got {}",
                epsilon
            )));
        }
        if base.alphabet() != codon.alphabet() {
            return Err(Error::InvalidAlphabet(format!(
                "base table over `{}` but codon table over `{}`",
                base.alphabet(),
                codon.alphabet()
            )));
        }
        let e = epsilon;
        let length_values = [
            0.0,
            e * e / 4.0,
            e * (1.0 - e),
            (1.0 - e) * (1.0 - e) + e * e / 2.0,
            e * (1.0 - e),
            e * e / 4.0,
        ];
        let mut length_lprobs = [Prob::zero(); FRAME_MAX_SEQ + 1];
        for (lp, &v) in length_lprobs.iter_mut().zip(length_values.iter()) {
            *lp = Prob::from_prob(v);
        }
        Ok(FrameEmission {
            base_values: base.to_values(),
            base,
            codon,
            epsilon,
            length_lprobs,
        })
    }
    pub fn alphabet(&self) -> &Alphabet {
        self.base.alphabet()
    }
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
    pub fn base_table(&self) -> &BaseTable {
        &self.base
    }
    pub fn codon_table(&self) -> &CodonTable {
        &self.codon
    }
    ///
    /// Base indices of the window, `None` for the any symbol.
    /// `None` if the window is too long or a byte is not a nucleotide symbol.
    ///
    fn to_indices(&self, window: &[u8]) -> Option<Window> {
        if window.len() > FRAME_MAX_SEQ {
            return None;
        }
        let abc = self.base.alphabet();
        let mut x: Window = [None; FRAME_MAX_SEQ];
        for (xi, &symbol) in x.iter_mut().zip(window.iter()) {
            *xi = match abc.symbol_index(symbol) {
                Some(i) => Some(i),
                None if abc.is_any(symbol) => None,
                None => return None,
            };
        }
        Some(x)
    }
    #[inline]
    fn sub(&self, x: Option<usize>, b: usize) -> f64 {
        match x {
            None => 1.0,
            Some(x) => {
                let hit = if x == b { 1.0 - self.epsilon } else { 0.0 };
                hit + self.epsilon * self.base_values[x]
            }
        }
    }
    #[inline]
    fn ins(&self, x: Option<usize>) -> f64 {
        match x {
            None => 1.0,
            Some(x) => self.base_values[x],
        }
    }
    ///
    /// `P(x | z, L)` in probability space (without `P(L)`), for the first
    /// `n` positions of `x`
    ///
    fn given_codon(&self, x: &Window, n: usize, z: &[usize; 3]) -> f64 {
        match n {
            1 => z.iter().map(|&b| self.sub(x[0], b)).sum::<f64>() / 3.0,
            2 => {
                KEEP_TWO
                    .iter()
                    .map(|[i, j]| self.sub(x[0], z[*i]) * self.sub(x[1], z[*j]))
                    .sum::<f64>()
                    / 3.0
            }
            3 => self.aligned(x, &[0, 1, 2], z),
            4 => {
                INSERT_ONE
                    .iter()
                    .map(|(i, rest)| self.ins(x[*i]) * self.aligned(x, rest, z))
                    .sum::<f64>()
                    / INSERT_ONE.len() as f64
            }
            5 => {
                INSERT_TWO
                    .iter()
                    .map(|([i, j], rest)| {
                        self.ins(x[*i]) * self.ins(x[*j]) * self.aligned(x, rest, z)
                    })
                    .sum::<f64>()
                    / INSERT_TWO.len() as f64
            }
            _ => 0.0,
        }
    }
    #[inline]
    fn aligned(&self, x: &Window, at: &[usize; 3], z: &[usize; 3]) -> f64 {
        self.sub(x[at[0]], z[0]) * self.sub(x[at[1]], z[1]) * self.sub(x[at[2]], z[2])
    }
    ///
    /// Log-probability of emitting `window`
    ///
    pub fn lprob(&self, window: &[u8]) -> Prob {
        let n = window.len();
        if n < FRAME_MIN_SEQ || n > FRAME_MAX_SEQ || self.length_lprobs[n].is_zero() {
            return Prob::zero();
        }
        let x = match self.to_indices(window) {
            Some(x) => x,
            None => return Prob::zero(),
        };
        let total: Prob = self
            .codon
            .support()
            .iter()
            .map(|(z, lp)| *lp * Prob::from_prob(self.given_codon(&x, n, z)))
            .sum();
        total * self.length_lprobs[n]
    }
    ///
    /// Most probable hidden codon for `window` and the joint
    /// log-probability `P(z) P(window | z)`.
    /// `None` if no codon explains the window.
    ///
    pub fn decode(&self, window: &[u8]) -> Option<(Codon, Prob)> {
        let n = window.len();
        if n < FRAME_MIN_SEQ || n > FRAME_MAX_SEQ || self.length_lprobs[n].is_zero() {
            return None;
        }
        let x = self.to_indices(window)?;
        let abc = self.base.alphabet();
        let mut best: Option<([usize; 3], Prob)> = None;
        for (z, lp) in self.codon.support() {
            let joint = *lp * Prob::from_prob(self.given_codon(&x, n, z)) * self.length_lprobs[n];
            if joint.is_zero() {
                continue;
            }
            match best {
                Some((_, b)) if b >= joint => {}
                _ => best = Some((*z, joint)),
            }
        }
        let (z, joint) = best?;
        let codon = Codon::new(
            abc.symbol_at_index(z[0])?,
            abc.symbol_at_index(z[1])?,
            abc.symbol_at_index(z[2])?,
        );
        Some((codon, joint))
    }
    ///
    /// Normalize the base and codon tables
    ///
    pub fn normalize(&mut self) -> Result<()> {
        let mut base = self.base.clone();
        let mut codon = self.codon.clone();
        base.normalize()?;
        codon.normalize()?;
        *self = FrameEmission::new(base, codon, self.epsilon)?;
        Ok(())
    }
}
