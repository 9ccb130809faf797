//!
//! Codons and codon probability tables
//!
//! ## Tables
//!
//! * `CodonProb`: sparse assignment `codon -> log p`, editable
//! * `CodonTable`: read-only table used by `FrameState`, built from a
//!   `CodonProb`. It keeps the list of codons with non-zero probability so
//!   that the frame emission sums only over them.
//!
use super::base::N_BASES;
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::prob::{normalize, Prob};
use std::sync::Arc;

/// Number of distinct codons (`4^3`)
pub const N_CODONS: usize = N_BASES * N_BASES * N_BASES;

///
/// Triplet of nucleotide symbols
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codon([u8; 3]);

impl Codon {
    pub fn new(a: u8, b: u8, c: u8) -> Codon {
        Codon([a, b, c])
    }
    /// `None` unless `bytes` has exactly 3 symbols
    pub fn from_bytes(bytes: &[u8]) -> Option<Codon> {
        match bytes {
            [a, b, c] => Some(Codon::new(*a, *b, *c)),
            _ => None,
        }
    }
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
    ///
    /// `16 a + 4 b + c` with base indices of `alphabet`.
    /// `None` if a base is not a symbol of `alphabet` (including the any symbol).
    ///
    pub fn index(&self, alphabet: &Alphabet) -> Option<usize> {
        let a = alphabet.symbol_index(self.0[0])?;
        let b = alphabet.symbol_index(self.0[1])?;
        let c = alphabet.symbol_index(self.0[2])?;
        Some(a * N_BASES * N_BASES + b * N_BASES + c)
    }
    /// Inverse of `Codon::index`
    pub fn from_index(alphabet: &Alphabet, index: usize) -> Option<Codon> {
        if index >= N_CODONS || alphabet.len() != N_BASES {
            return None;
        }
        let [a, b, c] = split_index(index);
        Some(Codon::new(
            alphabet.symbol_at_index(a)?,
            alphabet.symbol_at_index(b)?,
            alphabet.symbol_at_index(c)?,
        ))
    }
}

impl std::fmt::Display for Codon {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// codon index into its three base indices
pub fn split_index(index: usize) -> [usize; 3] {
    [
        index / (N_BASES * N_BASES),
        (index / N_BASES) % N_BASES,
        index % N_BASES,
    ]
}

fn check_nucleotide(alphabet: &Alphabet) -> Result<()> {
    if alphabet.len() != N_BASES {
        Err(Error::InvalidAlphabet(format!(
            "codons need {} bases but `{}` has {}",
            N_BASES,
            alphabet,
            alphabet.len()
        )))
    } else {
        Ok(())
    }
}

//
// CodonProb
//

///
/// Assignment of log-probabilities to codons; unset codons are zero.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CodonProb {
    alphabet: Arc<Alphabet>,
    lprobs: Vec<Prob>,
}

impl CodonProb {
    pub fn new(alphabet: Arc<Alphabet>) -> Result<CodonProb> {
        check_nucleotide(&alphabet)?;
        Ok(CodonProb {
            alphabet,
            lprobs: vec![Prob::zero(); N_CODONS],
        })
    }
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
    pub fn set(&mut self, codon: &Codon, lprob: Prob) -> Result<()> {
        let index = codon.index(&self.alphabet).ok_or_else(|| {
            Error::InvalidParameter(format!("codon `{}` is not over `{}`", codon, self.alphabet))
        })?;
        if !lprob.is_valid() {
            return Err(Error::InvalidProbability(format!("codon {}", codon)));
        }
        self.lprobs[index] = lprob;
        Ok(())
    }
    /// Probability of `codon`, zero for codons not over the alphabet
    pub fn get(&self, codon: &Codon) -> Prob {
        match codon.index(&self.alphabet) {
            Some(i) => self.lprobs[i],
            None => Prob::zero(),
        }
    }
    pub fn normalize(&mut self) -> Result<()> {
        normalize(&mut self.lprobs, "codon probabilities")
    }
    /// `(codon, lprob)` of every codon with non-zero probability
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (Codon, Prob)> + '_ {
        self.lprobs
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_zero())
            .filter_map(move |(i, &p)| Codon::from_index(&self.alphabet, i).map(|c| (c, p)))
    }
}

//
// CodonTable
//

///
/// Immutable codon table with the support (non-zero codons) precomputed
///
#[derive(Debug, Clone, PartialEq)]
pub struct CodonTable {
    alphabet: Arc<Alphabet>,
    lprobs: Vec<Prob>,
    /// `(base indices, lprob)` of the non-zero codons
    support: Vec<([usize; 3], Prob)>,
}

impl CodonTable {
    ///
    /// Build from a codon assignment. Fails if every codon has zero
    /// probability.
    ///
    pub fn new(codonp: &CodonProb) -> Result<CodonTable> {
        let mut table = CodonTable {
            alphabet: codonp.alphabet.clone(),
            lprobs: codonp.lprobs.clone(),
            support: Vec::new(),
        };
        table.refresh_support()?;
        Ok(table)
    }
    fn refresh_support(&mut self) -> Result<()> {
        if self.lprobs.iter().any(|p| !p.is_valid()) {
            return Err(Error::InvalidProbability("codon table".to_string()));
        }
        self.support = self
            .lprobs
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_zero())
            .map(|(i, &p)| (split_index(i), p))
            .collect();
        if self.support.is_empty() {
            return Err(Error::ZeroMass("codon table".to_string()));
        }
        Ok(())
    }
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
    ///
    /// Probability of `codon`. Bases equal to the any symbol are
    /// marginalized.
    ///
    pub fn lprob(&self, codon: &Codon) -> Prob {
        let choices = |symbol: u8| -> Vec<usize> {
            match self.alphabet.symbol_index(symbol) {
                Some(i) => vec![i],
                None if self.alphabet.is_any(symbol) => (0..N_BASES).collect(),
                None => vec![],
            }
        };
        let [a, b, c] = *codon.as_bytes();
        let (xs, ys, zs) = (choices(a), choices(b), choices(c));
        itertools::iproduct!(xs.iter(), ys.iter(), zs.iter())
            .map(|(x, y, z)| self.lprobs[x * N_BASES * N_BASES + y * N_BASES + z])
            .sum()
    }
    /// Codons with non-zero probability as base indices
    pub fn support(&self) -> &[([usize; 3], Prob)] {
        &self.support
    }
    pub fn normalize(&mut self) -> Result<()> {
        normalize(&mut self.lprobs, "codon table")?;
        self.refresh_support()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prob::p;

    #[test]
    fn codon_index_round_trip() {
        let abc = Alphabet::dna();
        for i in 0..N_CODONS {
            let codon = Codon::from_index(&abc, i).unwrap();
            assert_eq!(codon.index(&abc), Some(i));
        }
        assert_eq!(Codon::new(b'A', b'C', b'G').index(&abc), Some(6));
        assert_eq!(Codon::new(b'A', b'N', b'G').index(&abc), None);
        assert_eq!(Codon::from_bytes(b"TTA").unwrap().to_string(), "TTA");
        assert!(Codon::from_bytes(b"TT").is_none());
    }
    #[test]
    fn codon_prob_normalize() {
        let mut cp = CodonProb::new(Alphabet::dna()).unwrap();
        cp.set(&Codon::new(b'A', b'T', b'G'), p(0.8)).unwrap();
        cp.set(&Codon::new(b'A', b'T', b'T'), p(0.1)).unwrap();
        cp.set(&Codon::new(b'G', b'T', b'C'), p(0.4)).unwrap();
        assert!(cp.set(&Codon::new(b'A', b'U', b'G'), p(0.1)).is_err());
        cp.normalize().unwrap();
        let once = cp.clone();
        cp.normalize().unwrap();
        assert_abs_diff_eq!(cp.get(&Codon::new(b'A', b'T', b'G')), p(0.8 / 1.3), epsilon = 1e-12);
        for (codon, lprob) in once.iter_nonzero() {
            assert_abs_diff_eq!(cp.get(&codon), lprob, epsilon = 1e-12);
        }
        assert_eq!(cp.iter_nonzero().count(), 3);
    }
    #[test]
    fn codon_table_lookup() {
        let mut cp = CodonProb::new(Alphabet::dna()).unwrap();
        assert!(matches!(CodonTable::new(&cp), Err(Error::ZeroMass(_))));
        cp.set(&Codon::new(b'A', b'T', b'G'), p(0.75)).unwrap();
        cp.set(&Codon::new(b'A', b'T', b'T'), p(0.25)).unwrap();
        let table = CodonTable::new(&cp).unwrap();
        assert_eq!(table.support().len(), 2);
        assert_eq!(table.lprob(&Codon::new(b'A', b'T', b'G')), p(0.75));
        assert_abs_diff_eq!(table.lprob(&Codon::new(b'A', b'T', b'N')), p(1.0), epsilon = 1e-12);
        assert!(table.lprob(&Codon::new(b'C', b'T', b'G')).is_zero());
    }
}
