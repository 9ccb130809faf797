//!
//! Alphabet: finite ordered set of one-byte symbols
//!
//! Symbols keep their creation order, which is the index used by the
//! emission vectors of `NormalState`. An optional "any" symbol (e.g. `N`
//! for nucleotides, `X` for amino acids) is accepted in sequences and
//! matches every symbol.
//!
use crate::error::{Error, Result};
use std::sync::Arc;

/// Sentinel of `Alphabet::index` for bytes outside the alphabet
const NOT_A_SYMBOL: u8 = u8::MAX;

#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    any_symbol: Option<u8>,
    /// byte -> position in `symbols`
    index: [u8; 256],
}

/// nucleotides in the order used by `BaseTable` and HMMER3 files
pub const DNA_SYMBOLS: &[u8] = b"ACGT";
pub const RNA_SYMBOLS: &[u8] = b"ACGU";
/// 20 standard residues in HMMER3 order
pub const AMINO_SYMBOLS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

impl Alphabet {
    ///
    /// Create an alphabet from `symbols` and an optional `any` wildcard.
    ///
    /// Fails if `symbols` is empty, has duplicates, has more than 255 entries
    /// or contains the any symbol.
    ///
    pub fn new(symbols: &[u8], any_symbol: Option<u8>) -> Result<Alphabet> {
        if symbols.is_empty() {
            return Err(Error::InvalidAlphabet("no symbols".to_string()));
        }
        if symbols.len() >= NOT_A_SYMBOL as usize {
            return Err(Error::InvalidAlphabet(format!(
                "too many symbols ({})",
                symbols.len()
            )));
        }
        let mut index = [NOT_A_SYMBOL; 256];
        for (i, &symbol) in symbols.iter().enumerate() {
            if index[symbol as usize] != NOT_A_SYMBOL {
                return Err(Error::InvalidAlphabet(format!(
                    "duplicated symbol `{}`",
                    symbol as char
                )));
            }
            index[symbol as usize] = i as u8;
        }
        if let Some(any) = any_symbol {
            if index[any as usize] != NOT_A_SYMBOL {
                return Err(Error::InvalidAlphabet(format!(
                    "any symbol `{}` is also a regular symbol",
                    any as char
                )));
            }
        }
        Ok(Alphabet {
            symbols: symbols.to_vec(),
            any_symbol,
            index,
        })
    }
    /// built-in alphabets, known to be valid
    fn builtin(symbols: &[u8], any_symbol: u8) -> Arc<Alphabet> {
        let mut index = [NOT_A_SYMBOL; 256];
        for (i, &symbol) in symbols.iter().enumerate() {
            index[symbol as usize] = i as u8;
        }
        Arc::new(Alphabet {
            symbols: symbols.to_vec(),
            any_symbol: Some(any_symbol),
            index,
        })
    }
    /// `ACGT` with any symbol `N`
    pub fn dna() -> Arc<Alphabet> {
        Alphabet::builtin(DNA_SYMBOLS, b'N')
    }
    /// `ACGU` with any symbol `N`
    pub fn rna() -> Arc<Alphabet> {
        Alphabet::builtin(RNA_SYMBOLS, b'N')
    }
    /// 20 amino acids with any symbol `X`
    pub fn amino() -> Arc<Alphabet> {
        Alphabet::builtin(AMINO_SYMBOLS, b'X')
    }
    /// Number of symbols (the any symbol is not counted)
    pub fn len(&self) -> usize {
        self.symbols.len()
    }
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
    pub fn any_symbol(&self) -> Option<u8> {
        self.any_symbol
    }
    pub fn has_symbol(&self, symbol: u8) -> bool {
        self.index[symbol as usize] != NOT_A_SYMBOL
    }
    pub fn is_any(&self, symbol: u8) -> bool {
        self.any_symbol == Some(symbol)
    }
    /// Symbol or the any symbol
    pub fn is_valid(&self, symbol: u8) -> bool {
        self.has_symbol(symbol) || self.is_any(symbol)
    }
    ///
    /// Position of `symbol` in creation order.
    /// `None` for the any symbol and for bytes outside the alphabet.
    ///
    pub fn symbol_index(&self, symbol: u8) -> Option<usize> {
        match self.index[symbol as usize] {
            NOT_A_SYMBOL => None,
            i => Some(i as usize),
        }
    }
    ///
    /// Inverse of `symbol_index`
    ///
    pub fn symbol_at_index(&self, index: usize) -> Option<u8> {
        self.symbols.get(index).copied()
    }
    /// Is this one of the nucleotide alphabets (4 symbols)?
    pub fn is_nucleotide(&self) -> bool {
        self.symbols == DNA_SYMBOLS || self.symbols == RNA_SYMBOLS
    }
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Alphabet({})", self)
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.symbols))?;
        if let Some(any) = self.any_symbol {
            write!(f, "+{}", any as char)?;
        }
        Ok(())
    }
}
