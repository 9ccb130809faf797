//!
//! GFF3 output of homologous fragments
//!
//! ```text
//! ##gff-version 3
//! target1	profhmm	CDS	4	11	12.5	+	0	Profile=PF00001;Epsilon=0.01
//! ```
//!
use crate::error::Result;
use crate::profile::SearchResult;
use itertools::Itertools;
use std::io::Write;

pub const GFF_HEADER: &str = "##gff-version 3";
pub const SOURCE: &str = "profhmm";
pub const FEATURE_TYPE: &str = "CDS";

///
/// One GFF3 line. `start` and `end` are 1-based and inclusive.
///
#[derive(Debug, Clone, PartialEq)]
pub struct GffRecord {
    pub seqid: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub attributes: Vec<(String, String)>,
}

impl std::fmt::Display for GffRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t+\t0\t{}",
            escape(&self.seqid),
            SOURCE,
            FEATURE_TYPE,
            self.start,
            self.end,
            self.score,
            self.attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, escape(v)))
                .join(";")
        )
    }
}

/// Percent-encode the characters GFF3 reserves in columns and attributes
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' | '\n' | '\r' | '%' | ';' | '=' | '&' | ',' => {
                out.push_str(&format!("%{:02X}", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

///
/// Records of the homologous fragments of `result`
///
pub fn records(target_id: &str, result: &SearchResult, epsilon: Option<f64>) -> Vec<GffRecord> {
    result
        .homologous()
        .map(|fragment| {
            let mut attributes = vec![("Profile".to_string(), result.profile.clone())];
            if let Some(epsilon) = epsilon {
                attributes.push(("Epsilon".to_string(), epsilon.to_string()));
            }
            GffRecord {
                seqid: target_id.to_string(),
                start: fragment.offset + 1,
                end: fragment.offset + fragment.length,
                score: result.score,
                attributes,
            }
        })
        .collect()
}

pub struct GffWriter<W: Write> {
    inner: W,
}

impl<W: Write> GffWriter<W> {
    /// Create a writer and emit the header line
    pub fn new(mut inner: W) -> Result<GffWriter<W>> {
        writeln!(inner, "{}", GFF_HEADER)?;
        Ok(GffWriter { inner })
    }
    pub fn write(&mut self, record: &GffRecord) -> Result<()> {
        writeln!(self.inner, "{}", record)?;
        Ok(())
    }
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a GffRecord>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line() {
        let record = GffRecord {
            seqid: "chr1".to_string(),
            start: 4,
            end: 11,
            score: 12.5,
            attributes: vec![
                ("Profile".to_string(), "PF;1".to_string()),
                ("Epsilon".to_string(), "0.01".to_string()),
            ],
        };
        assert_eq!(
            record.to_string(),
            "chr1\tprofhmm\tCDS\t4\t11\t12.5000\t+\t0\tProfile=PF%3B1;Epsilon=0.01"
        );
    }
    #[test]
    fn writer_emits_header() {
        let mut buffer = Vec::new();
        {
            let mut writer = GffWriter::new(&mut buffer).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(String::from_utf8(buffer).unwrap(), "##gff-version 3\n");
    }
}
