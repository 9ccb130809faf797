//!
//! Likelihood of an explicit path
//!
use super::common::Hmm;
use super::path::Path;
use crate::error::{Error, Result};
use crate::prob::Prob;
use crate::seq::Symbols;

impl Hmm {
    ///
    /// `P(seq, path)`: start probability of the first state times every
    /// emission and transition along `path`.
    ///
    /// `Prob::zero()` is a legitimate answer (impossible path). Fails if the
    /// path does not emit exactly `seq`, refers to a missing state, or a
    /// term is NaN.
    ///
    pub fn likelihood(&self, seq: &Symbols, path: &Path) -> Result<Prob> {
        let path_len = path.seq_len();
        if path_len != seq.len() {
            return Err(Error::SequenceLengthMismatch {
                path_len,
                seq_len: seq.len(),
            });
        }
        if path.is_empty() {
            return Ok(Prob::zero());
        }

        let mut lprob = self.start(path[0].state)?;
        let mut offset = 0;
        let mut prev = None;
        for step in path.iter() {
            let state = self.state(step.state)?;
            if let Some(prev) = prev {
                lprob *= self.transition(prev, step.state)?;
            }
            let window = &seq[offset..offset + step.seq_len];
            lprob *= state.lprob(window);
            if !lprob.is_valid() {
                return Err(Error::InvalidProbability(format!(
                    "likelihood at state `{}` offset {}",
                    state.name(),
                    offset
                )));
            }
            offset += step.seq_len;
            prev = Some(step.state);
        }
        Ok(lprob)
    }
}
