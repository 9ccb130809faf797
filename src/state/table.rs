//!
//! Table emission: explicit map from symbol strings to log-probabilities
//!
use crate::error::{Error, Result};
use crate::prob::{normalize, Prob};
use fnv::FnvHashMap as HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TableEmission {
    entries: HashMap<Vec<u8>, Prob>,
    min_len: usize,
    max_len: usize,
}

impl TableEmission {
    /// Entries are validated against the alphabet by `State::table`
    pub(crate) fn new(entries: HashMap<Vec<u8>, Prob>) -> TableEmission {
        let min_len = entries.keys().map(|k| k.len()).min().unwrap_or(0);
        let max_len = entries.keys().map(|k| k.len()).max().unwrap_or(0);
        TableEmission {
            entries,
            min_len,
            max_len,
        }
    }
    pub fn min_len(&self) -> usize {
        self.min_len
    }
    pub fn max_len(&self) -> usize {
        self.max_len
    }
    pub fn n_entries(&self) -> usize {
        self.entries.len()
    }
    /// Exact lookup; unseen windows are zero
    pub fn lprob(&self, window: &[u8]) -> Prob {
        self.entries.get(window).copied().unwrap_or_else(Prob::zero)
    }
    pub fn normalize(&mut self, name: &str) -> Result<()> {
        let keys: Vec<Vec<u8>> = self.entries.keys().cloned().collect();
        let mut values: Vec<Prob> = keys.iter().map(|k| self.entries[k]).collect();
        normalize(&mut values, name)?;
        for (k, v) in keys.into_iter().zip(values) {
            self.entries.insert(k, v);
        }
        Ok(())
    }
}

///
/// Collect `(key, lprob)` pairs; a key given twice is an error.
///
pub(crate) fn collect_entries<I>(name: &str, entries: I) -> Result<HashMap<Vec<u8>, Prob>>
where
    I: IntoIterator<Item = (Vec<u8>, Prob)>,
{
    let mut map = HashMap::default();
    for (key, lprob) in entries {
        if map.contains_key(&key) {
            return Err(Error::InvalidEmission {
                state: name.to_string(),
                msg: format!("duplicated key `{}`", String::from_utf8_lossy(&key)),
            });
        }
        map.insert(key, lprob);
    }
    Ok(map)
}
