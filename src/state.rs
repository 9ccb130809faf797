//!
//! HMM states and their emissions
//!
//! A `State` is a named emission model over an `Alphabet`. The set of
//! emission kinds is closed:
//!
//! * `Mute`: emits the empty window only
//! * `Normal`: one symbol, one log-probability per alphabet symbol
//! * `Table`: explicit map from symbol strings to log-probabilities
//! * `Frame`: window of 1 to 5 nucleotides explained by a hidden codon
//!
//! `lprob` returns `Prob::zero()` for windows the state cannot emit.
//!
pub mod base;
pub mod codon;
pub mod frame;
pub mod normal;
pub mod table;

pub use base::BaseTable;
pub use codon::{Codon, CodonProb, CodonTable};
pub use frame::FrameEmission;
pub use normal::NormalEmission;
pub use table::TableEmission;

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::prob::Prob;
use std::sync::Arc;

///
/// Emission kind of a state
///
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Mute,
    Normal(NormalEmission),
    Table(TableEmission),
    Frame(FrameEmission),
}

///
/// Named state of an HMM
///
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    name: String,
    alphabet: Arc<Alphabet>,
    emission: Emission,
}

/// Constructors
impl State {
    ///
    /// State emitting the empty window with probability 1
    ///
    pub fn mute(name: &str, alphabet: Arc<Alphabet>) -> State {
        State {
            name: name.to_string(),
            alphabet,
            emission: Emission::Mute,
        }
    }
    ///
    /// `lprobs[i]` is the emission of `alphabet.symbol_at_index(i)`
    ///
    pub fn normal(name: &str, alphabet: Arc<Alphabet>, lprobs: Vec<Prob>) -> Result<State> {
        if lprobs.len() != alphabet.len() {
            return Err(Error::InvalidEmission {
                state: name.to_string(),
                msg: format!(
                    "{} probabilities for an alphabet of {} symbols",
                    lprobs.len(),
                    alphabet.len()
                ),
            });
        }
        if lprobs.iter().any(|p| !p.is_valid()) {
            return Err(Error::InvalidProbability(format!("emission of `{}`", name)));
        }
        Ok(State {
            name: name.to_string(),
            alphabet,
            emission: Emission::Normal(NormalEmission::new(lprobs)),
        })
    }
    ///
    /// Normal state from `(symbol, lprob)` pairs; unspecified symbols are
    /// zero.
    ///
    pub fn normal_from_pairs(
        name: &str,
        alphabet: Arc<Alphabet>,
        pairs: &[(u8, Prob)],
    ) -> Result<State> {
        let mut lprobs = vec![Prob::zero(); alphabet.len()];
        for &(symbol, lprob) in pairs {
            let i = alphabet
                .symbol_index(symbol)
                .ok_or_else(|| Error::InvalidEmission {
                    state: name.to_string(),
                    msg: format!("`{}` is not in `{}`", symbol as char, alphabet),
                })?;
            lprobs[i] = lprob;
        }
        State::normal(name, alphabet, lprobs)
    }
    ///
    /// State emitting exactly the listed windows. Keys are made of alphabet
    /// symbols (or the any symbol) and may have different lengths.
    ///
    pub fn table<I>(name: &str, alphabet: Arc<Alphabet>, entries: I) -> Result<State>
    where
        I: IntoIterator<Item = (Vec<u8>, Prob)>,
    {
        let entries = table::collect_entries(name, entries)?;
        if entries.is_empty() {
            return Err(Error::InvalidEmission {
                state: name.to_string(),
                msg: "empty table".to_string(),
            });
        }
        for (key, lprob) in entries.iter() {
            if key.iter().any(|&s| !alphabet.is_valid(s)) {
                return Err(Error::InvalidEmission {
                    state: name.to_string(),
                    msg: format!("key `{}` is not over `{}`", String::from_utf8_lossy(key), alphabet),
                });
            }
            if !lprob.is_valid() {
                return Err(Error::InvalidProbability(format!("emission of `{}`", name)));
            }
        }
        Ok(State {
            name: name.to_string(),
            alphabet,
            emission: Emission::Table(TableEmission::new(entries)),
        })
    }
    ///
    /// Frame state over the nucleotide alphabet of `base`
    ///
    pub fn frame(name: &str, base: BaseTable, codon: CodonTable, epsilon: f64) -> Result<State> {
        let alphabet = base.alphabet().clone();
        Ok(State {
            name: name.to_string(),
            alphabet,
            emission: Emission::Frame(FrameEmission::new(base, codon, epsilon)?),
        })
    }
    ///
    /// Copy of this state (same emission) under another name
    ///
    pub fn renamed(&self, name: &str) -> State {
        State {
            name: name.to_string(),
            alphabet: self.alphabet.clone(),
            emission: self.emission.clone(),
        }
    }
}

/// Accessors and emission
impl State {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
    pub fn emission(&self) -> &Emission {
        &self.emission
    }
    pub fn is_mute(&self) -> bool {
        matches!(self.emission, Emission::Mute)
    }
    ///
    /// Log-probability of emitting exactly `window`
    ///
    pub fn lprob(&self, window: &[u8]) -> Prob {
        match &self.emission {
            Emission::Mute => {
                if window.is_empty() {
                    Prob::one()
                } else {
                    Prob::zero()
                }
            }
            Emission::Normal(e) => e.lprob(&self.alphabet, window),
            Emission::Table(e) => e.lprob(window),
            Emission::Frame(e) => e.lprob(window),
        }
    }
    /// Shortest window this state can emit
    pub fn min_seq(&self) -> usize {
        match &self.emission {
            Emission::Mute => 0,
            Emission::Normal(_) => 1,
            Emission::Table(e) => e.min_len(),
            Emission::Frame(_) => frame::FRAME_MIN_SEQ,
        }
    }
    /// Longest window this state can emit
    pub fn max_seq(&self) -> usize {
        match &self.emission {
            Emission::Mute => 0,
            Emission::Normal(_) => 1,
            Emission::Table(e) => e.max_len(),
            Emission::Frame(_) => frame::FRAME_MAX_SEQ,
        }
    }
    ///
    /// Rescale the emission so that it sums to 1. No-op for mute states.
    ///
    pub fn normalize(&mut self) -> Result<()> {
        let name = self.name.clone();
        match &mut self.emission {
            Emission::Mute => Ok(()),
            Emission::Normal(e) => e.normalize(&name),
            Emission::Table(e) => e.normalize(&name),
            Emission::Frame(e) => e.normalize(),
        }
    }
    ///
    /// Most probable codon behind `window` (frame states only)
    ///
    pub fn decode(&self, window: &[u8]) -> Option<(Codon, Prob)> {
        match &self.emission {
            Emission::Frame(e) => e.decode(window),
            _ => None,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let kind = match &self.emission {
            Emission::Mute => "mute",
            Emission::Normal(_) => "normal",
            Emission::Table(_) => "table",
            Emission::Frame(_) => "frame",
        };
        write!(f, "{}({})", self.name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prob::p;

    fn rna() -> Arc<Alphabet> {
        Alphabet::rna()
    }

    #[test]
    fn mute_state() {
        let s = State::mute("S", rna());
        assert_eq!(s.lprob(b""), Prob::one());
        assert!(s.lprob(b"A").is_zero());
        assert_eq!((s.min_seq(), s.max_seq()), (0, 0));
        assert!(s.is_mute());
    }
    #[test]
    fn normal_state() {
        let mut s = State::normal_from_pairs(
            "M2",
            rna(),
            &[(b'A', p(0.4)), (b'C', p(0.6)), (b'U', p(0.6))],
        )
        .unwrap();
        assert_eq!(s.lprob(b"A"), p(0.4));
        assert!(s.lprob(b"G").is_zero());
        assert!(s.lprob(b"AC").is_zero());
        assert!(s.lprob(b"").is_zero());
        assert!(s.lprob(b"T").is_zero());
        s.normalize().unwrap();
        assert_abs_diff_eq!(s.lprob(b"A"), p(0.25), epsilon = 1e-12);
        assert_abs_diff_eq!(s.lprob(b"C"), p(0.375), epsilon = 1e-12);
        assert_abs_diff_eq!(s.lprob(b"N"), p(1.0), epsilon = 1e-12);
        let once = s.clone();
        s.normalize().unwrap();
        for c in b"ACU" {
            assert_abs_diff_eq!(s.lprob(&[*c]), once.lprob(&[*c]), epsilon = 1e-12);
        }
        assert_eq!((s.min_seq(), s.max_seq()), (1, 1));
    }
    #[test]
    fn normal_state_invalid() {
        assert!(matches!(
            State::normal("X", rna(), vec![p(0.5); 3]),
            Err(Error::InvalidEmission { .. })
        ));
        assert!(matches!(
            State::normal("X", rna(), vec![p(0.5), p(0.5), p(0.0), Prob::invalid()]),
            Err(Error::InvalidProbability(_))
        ));
        assert!(State::normal_from_pairs("X", rna(), &[(b'T', p(0.5))]).is_err());
        let mut zero = State::normal("Z", rna(), vec![Prob::zero(); 4]).unwrap();
        assert!(matches!(zero.normalize(), Err(Error::ZeroMass(_))));
    }
    #[test]
    fn table_state() {
        let mut s = State::table(
            "T",
            rna(),
            vec![
                (b"A".to_vec(), p(0.2)),
                (b"AU".to_vec(), p(0.2)),
                (b"GGU".to_vec(), p(0.4)),
            ],
        )
        .unwrap();
        assert_eq!((s.min_seq(), s.max_seq()), (1, 3));
        assert_eq!(s.lprob(b"AU"), p(0.2));
        assert!(s.lprob(b"UA").is_zero());
        assert!(s.lprob(b"").is_zero());
        s.normalize().unwrap();
        assert_abs_diff_eq!(s.lprob(b"GGU"), p(0.5), epsilon = 1e-12);
        let once = s.clone();
        s.normalize().unwrap();
        assert_abs_diff_eq!(s.lprob(b"A"), once.lprob(b"A"), epsilon = 1e-12);
        assert_abs_diff_eq!(s.lprob(b"GGU"), once.lprob(b"GGU"), epsilon = 1e-12);
    }
    #[test]
    fn table_state_invalid() {
        assert!(State::table("T", rna(), vec![]).is_err());
        assert!(State::table("T", rna(), vec![(b"AT".to_vec(), p(0.2))]).is_err());
        assert!(State::table(
            "T",
            rna(),
            vec![(b"A".to_vec(), p(0.2)), (b"A".to_vec(), p(0.3))]
        )
        .is_err());
    }
    #[test]
    fn table_state_with_empty_key() {
        let s = State::table(
            "T",
            rna(),
            vec![(b"".to_vec(), p(0.5)), (b"GG".to_vec(), p(0.5))],
        )
        .unwrap();
        assert_eq!((s.min_seq(), s.max_seq()), (0, 2));
        assert_eq!(s.lprob(b""), p(0.5));
    }
    #[test]
    fn renamed_state_keeps_emission() {
        let s = State::normal("N", rna(), vec![p(0.25); 4]).unwrap();
        let j = s.renamed("J");
        assert_eq!(j.name(), "J");
        assert_eq!(j.emission(), s.emission());
        assert_eq!(j.to_string(), "J(normal)");
    }
}
