//!
//! Normal emission: one log-probability per alphabet symbol
//!
use crate::alphabet::Alphabet;
use crate::prob::{normalize, Prob};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalEmission {
    /// indexed by `Alphabet::symbol_index`
    lprobs: Vec<Prob>,
}

impl NormalEmission {
    /// `lprobs.len()` is checked against the alphabet by `State::normal`
    pub(crate) fn new(lprobs: Vec<Prob>) -> NormalEmission {
        NormalEmission { lprobs }
    }
    pub fn lprobs(&self) -> &[Prob] {
        &self.lprobs
    }
    ///
    /// Defined for windows of one symbol.
    /// The any symbol emits with the total mass of the state.
    ///
    pub fn lprob(&self, alphabet: &Alphabet, window: &[u8]) -> Prob {
        match window {
            [symbol] => match alphabet.symbol_index(*symbol) {
                Some(i) => self.lprobs[i],
                None if alphabet.is_any(*symbol) => self.lprobs.iter().sum(),
                None => Prob::zero(),
            },
            _ => Prob::zero(),
        }
    }
    pub fn normalize(&mut self, name: &str) -> Result<()> {
        normalize(&mut self.lprobs, name)
    }
}
