//!
//! Base composition of a nucleotide alphabet
//!
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::prob::{normalize, Prob};
use std::sync::Arc;

/// Number of bases in a nucleotide alphabet
pub const N_BASES: usize = 4;

///
/// log-probability of each of the 4 bases of a nucleotide alphabet
///
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTable {
    alphabet: Arc<Alphabet>,
    lprobs: [Prob; N_BASES],
}

impl BaseTable {
    ///
    /// `lprobs[i]` is the probability of `alphabet.symbol_at_index(i)`.
    ///
    pub fn new(alphabet: Arc<Alphabet>, lprobs: [Prob; N_BASES]) -> Result<BaseTable> {
        if alphabet.len() != N_BASES {
            return Err(Error::InvalidAlphabet(format!(
                "base table needs {} symbols but `{}` has {}",
                N_BASES,
                alphabet,
                alphabet.len()
            )));
        }
        if lprobs.iter().any(|p| !p.is_valid()) {
            return Err(Error::InvalidProbability("base table".to_string()));
        }
        Ok(BaseTable { alphabet, lprobs })
    }
    /// Equal probability for each base
    pub fn uniform(alphabet: Arc<Alphabet>) -> Result<BaseTable> {
        BaseTable::new(alphabet, [Prob::from_prob(0.25); N_BASES])
    }
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
    ///
    /// Probability of a base symbol.
    /// The any symbol gets the total mass, other bytes zero.
    ///
    pub fn lprob(&self, symbol: u8) -> Prob {
        match self.alphabet.symbol_index(symbol) {
            Some(i) => self.lprobs[i],
            None if self.alphabet.is_any(symbol) => self.lprobs.iter().sum(),
            None => Prob::zero(),
        }
    }
    pub fn lprobs(&self) -> &[Prob; N_BASES] {
        &self.lprobs
    }
    /// Probabilities (not log) in alphabet order
    pub fn to_values(&self) -> [f64; N_BASES] {
        let mut v = [0.0; N_BASES];
        for (x, p) in v.iter_mut().zip(self.lprobs.iter()) {
            *x = p.to_value();
        }
        v
    }
    pub fn normalize(&mut self) -> Result<()> {
        normalize(&mut self.lprobs, "base table")
    }
}
