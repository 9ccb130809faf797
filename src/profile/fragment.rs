//!
//! Fragments: segments of a target that a path explains either through the
//! profile core (homologous) or through the background states.
//!
use crate::error::Result;
use crate::hmm::{Path, StateId, Step};
use crate::seq::{Sequence, SubSequence};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub homologous: bool,
    /// position of the first symbol in the target
    pub offset: usize,
    /// number of symbols
    pub length: usize,
    /// the steps explaining `target[offset..offset+length]`
    pub path: Path,
}

impl Fragment {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
    pub fn sequence<'a>(&self, target: &'a Sequence) -> Result<SubSequence<'a>> {
        target.subseq(self.offset, self.length)
    }
    ///
    /// Iterate over `(window, step)` in path order. Mute steps yield an empty
    /// window.
    ///
    pub fn items<'a>(&'a self, target: &'a Sequence) -> Result<FragmentItems<'a>> {
        let symbols = self.sequence(target)?.as_bytes();
        Ok(FragmentItems {
            symbols,
            steps: self.path.iter(),
            pos: 0,
        })
    }
}

pub struct FragmentItems<'a> {
    symbols: &'a [u8],
    steps: std::slice::Iter<'a, Step>,
    pos: usize,
}

impl<'a> Iterator for FragmentItems<'a> {
    type Item = (&'a [u8], Step);
    fn next(&mut self) -> Option<Self::Item> {
        let step = *self.steps.next()?;
        let end = (self.pos + step.seq_len).min(self.symbols.len());
        let window = &self.symbols[self.pos..end];
        self.pos = end;
        Some((window, step))
    }
}

///
/// Split `path` at the boundaries of each hit.
///
/// A homologous fragment opens at the first match step after a
/// non-homologous stretch and closes after `end` (the `E` state). Fragments
/// explaining no symbol are dropped.
///
pub fn split_fragments<F>(path: &Path, is_match: F, end: StateId) -> Vec<Fragment>
where
    F: Fn(StateId) -> bool,
{
    let mut fragments = Vec::new();
    let mut homologous = false;
    let mut first_step = 0;
    let mut offset = 0;
    let mut pos = 0;

    let mut close = |homologous: bool, steps: Range<usize>, offset: usize, pos: usize| {
        if pos > offset {
            fragments.push(Fragment {
                homologous,
                offset,
                length: pos - offset,
                path: path.slice(steps),
            });
        }
    };

    for (i, step) in path.iter().enumerate() {
        if !homologous && is_match(step.state) {
            close(false, first_step..i, offset, pos);
            homologous = true;
            first_step = i;
            offset = pos;
        }
        pos += step.seq_len;
        if homologous && step.state == end {
            close(true, first_step..i + 1, offset, pos);
            homologous = false;
            first_step = i + 1;
            offset = pos;
        }
    }
    close(homologous, first_step..path.len(), offset, pos);
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use petgraph::graph::NodeIndex;

    fn ni(i: usize) -> StateId {
        NodeIndex::new(i)
    }
    // states: 0=S 1=N 2=B 3=M1 4=M2 5=E 6=C 7=T 8=J
    fn toy_path() -> Path {
        [
            (0, 0),
            (1, 1),
            (1, 1),
            (2, 0),
            (3, 1),
            (4, 1),
            (5, 0),
            (8, 1),
            (2, 0),
            (3, 1),
            (5, 0),
            (6, 1),
            (7, 0),
        ]
        .iter()
        .map(|&(s, l)| Step::new(ni(s), l))
        .collect()
    }

    #[test]
    fn split_two_hits() {
        let path = toy_path();
        let fragments = split_fragments(&path, |v| v == ni(3) || v == ni(4), ni(5));
        let summary: Vec<(bool, Range<usize>)> =
            fragments.iter().map(|f| (f.homologous, f.range())).collect();
        assert_eq!(
            summary,
            vec![
                (false, 0..2),
                (true, 2..4),
                (false, 4..5),
                (true, 5..6),
                (false, 6..7)
            ]
        );
        // B belongs to the preceding stretch, E closes the hit
        assert_eq!(fragments[0].path.len(), 4);
        assert_eq!(fragments[1].path.steps().last().unwrap().state, ni(5));
        let total: usize = fragments.iter().map(|f| f.path.len()).sum();
        assert_eq!(total, path.len());
    }
    #[test]
    fn split_drops_empty_fragments() {
        let path: Path = [(0, 0), (2, 0), (3, 1), (5, 0), (7, 0)]
            .iter()
            .map(|&(s, l)| Step::new(ni(s), l))
            .collect();
        let fragments = split_fragments(&path, |v| v == ni(3), ni(5));
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].homologous);
        assert_eq!(fragments[0].range(), 0..1);
        assert!(split_fragments(&Path::default(), |_| false, ni(5)).is_empty());
    }
    #[test]
    fn items_are_restartable() {
        let target = Sequence::new(b"GGACT", Alphabet::dna()).unwrap();
        let fragments = split_fragments(&toy_path(), |v| v == ni(3) || v == ni(4), ni(5));
        let hit = &fragments[1];
        let windows: Vec<&[u8]> = hit.items(&target).unwrap().map(|(w, _)| w).collect();
        assert_eq!(windows, vec![&b"A"[..], &b"C"[..], &b""[..]]);
        // a second pass sees the same items
        assert_eq!(hit.items(&target).unwrap().count(), 3);
        assert_eq!(hit.sequence(&target).unwrap().as_bytes(), b"AC");
    }
}
