//!
//! Sequence over an `Alphabet`
//!
//! ## Single Sequence
//!
//! * `Sequence`: owned symbols checked against the alphabet
//! * `SubSequence`: borrowed `(offset, length)` view of a `Sequence`
//!
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use std::ops::Deref;
use std::sync::Arc;

/// Type of raw symbols as array
///
/// It is used in `AsRef<Symbols>` or `&Symbols`
pub type Symbols = [u8];

///
/// Immutable array of symbols drawn from an alphabet
///
#[derive(Clone, PartialEq, Eq)]
pub struct Sequence {
    symbols: Vec<u8>,
    alphabet: Arc<Alphabet>,
}

impl Sequence {
    ///
    /// Create a sequence. Every symbol must be in `alphabet` or be its any
    /// symbol.
    ///
    pub fn new<T: AsRef<Symbols>>(symbols: T, alphabet: Arc<Alphabet>) -> Result<Sequence> {
        let symbols = symbols.as_ref();
        if let Some(position) = symbols.iter().position(|&s| !alphabet.is_valid(s)) {
            return Err(Error::InvalidSymbol {
                symbol: symbols[position],
                position,
            });
        }
        Ok(Sequence {
            symbols: symbols.to_vec(),
            alphabet,
        })
    }
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
    pub fn len(&self) -> usize {
        self.symbols.len()
    }
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
    pub fn as_bytes(&self) -> &Symbols {
        &self.symbols
    }
    ///
    /// View of `symbols[offset..offset+length]` without copying.
    ///
    pub fn subseq(&self, offset: usize, length: usize) -> Result<SubSequence<'_>> {
        let end = offset + length;
        if end > self.len() {
            return Err(Error::OutOfRange {
                offset,
                end,
                len: self.len(),
            });
        }
        Ok(SubSequence {
            parent: self,
            offset,
            length,
        })
    }
    /// The whole sequence as a view
    pub fn full(&self) -> SubSequence<'_> {
        SubSequence {
            parent: self,
            offset: 0,
            length: self.len(),
        }
    }
    pub fn to_str(&self) -> &str {
        sequence_to_string(&self.symbols)
    }
}

impl AsRef<Symbols> for Sequence {
    fn as_ref(&self) -> &Symbols {
        &self.symbols
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Sequence({:?}, {})", self.to_str(), self.alphabet)
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.symbols))
    }
}

///
/// Non-owning window `parent[offset..offset+length]`
///
#[derive(Clone, Copy)]
pub struct SubSequence<'a> {
    parent: &'a Sequence,
    offset: usize,
    length: usize,
}

impl<'a> SubSequence<'a> {
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn len(&self) -> usize {
        self.length
    }
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
    pub fn parent(&self) -> &'a Sequence {
        self.parent
    }
    pub fn as_bytes(&self) -> &'a Symbols {
        &self.parent.symbols[self.offset..self.offset + self.length]
    }
    ///
    /// Narrow the view further; `offset` is relative to this view.
    ///
    pub fn subseq(&self, offset: usize, length: usize) -> Result<SubSequence<'a>> {
        if offset + length > self.length {
            return Err(Error::OutOfRange {
                offset,
                end: offset + length,
                len: self.length,
            });
        }
        Ok(SubSequence {
            parent: self.parent,
            offset: self.offset + offset,
            length,
        })
    }
}

impl<'a> Deref for SubSequence<'a> {
    type Target = Symbols;
    fn deref(&self) -> &Symbols {
        self.as_bytes()
    }
}

impl<'a> AsRef<Symbols> for SubSequence<'a> {
    fn as_ref(&self) -> &Symbols {
        self.as_bytes()
    }
}

impl<'a> std::fmt::Debug for SubSequence<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "SubSequence({}..{}, {:?})",
            self.offset,
            self.offset + self.length,
            String::from_utf8_lossy(self.as_bytes())
        )
    }
}

/// Convert symbols into &str
/// useful in displaying
pub fn sequence_to_string<T: AsRef<Symbols>>(seq: &T) -> &str {
    std::str::from_utf8(seq.as_ref()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_new() {
        let s = Sequence::new(b"ACGTN", Alphabet::dna()).unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.to_str(), "ACGTN");
        match Sequence::new(b"ACGU", Alphabet::dna()) {
            Err(Error::InvalidSymbol { symbol, position }) => {
                assert_eq!(symbol, b'U');
                assert_eq!(position, 3);
            }
            r => panic!("unexpected {:?}", r),
        }
        let empty = Sequence::new(b"", Alphabet::dna()).unwrap();
        assert!(empty.is_empty());
    }
    #[test]
    fn sequence_subseq() {
        let s = Sequence::new(b"ACGTACGT", Alphabet::dna()).unwrap();
        let sub = s.subseq(2, 4).unwrap();
        assert_eq!(sub.as_bytes(), b"GTAC");
        assert_eq!(sub.offset(), 2);
        let subsub = sub.subseq(1, 2).unwrap();
        assert_eq!(&*subsub, b"TA");
        assert_eq!(subsub.offset(), 3);
        assert!(s.subseq(5, 4).is_err());
        assert!(sub.subseq(3, 2).is_err());
        assert_eq!(s.subseq(8, 0).unwrap().len(), 0);
        assert_eq!(s.full().as_bytes(), s.as_bytes());
    }
}
