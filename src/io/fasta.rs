//!
//! FASTA input of target sequences and output of fragment sequences
//!
use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::seq::Sequence;
use bio::io::fasta;
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;

///
/// A named target sequence
///
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: String,
    pub seq: Sequence,
}

///
/// Uppercase `seq` and fit it into `alphabet`.
///
/// `T` and `U` are swapped when only the other one is in a nucleotide
/// alphabet. Other unknown bytes become the any symbol (with a warning), or
/// are kept as-is if the alphabet has none.
///
pub fn sanitize(seq: &[u8], alphabet: &Alphabet) -> Vec<u8> {
    let nucleotide = alphabet.is_nucleotide();
    seq.iter()
        .enumerate()
        .map(|(i, &c)| {
            let c = c.to_ascii_uppercase();
            if alphabet.is_valid(c) {
                return c;
            }
            match c {
                b'T' if nucleotide && alphabet.has_symbol(b'U') => b'U',
                b'U' if nucleotide && alphabet.has_symbol(b'T') => b'T',
                _ => match alphabet.any_symbol() {
                    Some(any) => {
                        warn!("informal symbol `{}` detected in seq[{}]", c as char, i);
                        any
                    }
                    None => c,
                },
            }
        })
        .collect()
}

///
/// Read every record of a FASTA stream as a target over `alphabet`
///
pub fn parse_targets<R: Read>(reader: R, alphabet: &Arc<Alphabet>) -> Result<Vec<Target>> {
    let reader = fasta::Reader::new(reader);
    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record?;
        let seq = Sequence::new(sanitize(record.seq(), alphabet), alphabet.clone())?;
        targets.push(Target {
            id: record.id().to_string(),
            seq,
        });
    }
    Ok(targets)
}

pub fn read_targets<P: AsRef<Path>>(path: P, alphabet: &Arc<Alphabet>) -> Result<Vec<Target>> {
    let file = File::open(path.as_ref())?;
    let targets = parse_targets(BufReader::new(file), alphabet)?;
    info!(
        "read {} targets from {}",
        targets.len(),
        path.as_ref().display()
    );
    Ok(targets)
}

///
/// Writer of `>id description` records
///
pub struct FastaWriter<W: Write> {
    inner: fasta::Writer<W>,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W) -> FastaWriter<W> {
        FastaWriter {
            inner: fasta::Writer::new(writer),
        }
    }
    pub fn write(&mut self, id: &str, description: Option<&str>, seq: &[u8]) -> Result<()> {
        self.inner.write(id, description, seq)?;
        Ok(())
    }
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
