//!
//! Decoded path: ordered steps `(state, number of emitted symbols)`
//!
use super::common::StateId;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::ops::Range;

///
/// One step of a path: `state` emits the next `seq_len` symbols.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Step {
    pub state: StateId,
    pub seq_len: usize,
}

///
/// Sequence of steps in start-to-end order
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn new(steps: Vec<Step>) -> Path {
        Path { steps }
    }
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }
    ///
    /// Total number of symbols emitted along the path
    ///
    pub fn seq_len(&self) -> usize {
        self.steps.iter().map(|step| step.seq_len).sum()
    }
    ///
    /// Sub-path of the steps in `range`
    ///
    pub fn slice(&self, range: Range<usize>) -> Path {
        Path::new(self.steps[range].to_vec())
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Step;
    fn index(&self, index: usize) -> &Step {
        &self.steps[index]
    }
}

impl std::iter::FromIterator<Step> for Path {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Path {
        Path::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;
    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
