//!
//! Mock HMMs for testing
//!
use super::common::{Hmm, StateId};
use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::prob::{p, Prob};
use crate::state::State;

/// handles of the states of `mock_linear`
#[derive(Debug, Clone, Copy)]
pub struct LinearIds {
    pub start: StateId,
    pub m1: StateId,
    pub m2: StateId,
    pub end: StateId,
}

///
/// Linear RNA model
///
/// ```text
/// S -> M1 -> M2 -> E
///
/// M1: A .8, C .2
/// M2: A .4, C .6, U .6 (normalized to .25 .375 .375)
/// ```
///
/// Transitions are normalized with a temporary `E -> E` loop, which is
/// removed afterwards so that `E` is terminal.
///
pub fn mock_linear() -> Result<(Hmm, LinearIds)> {
    let abc = Alphabet::rna();
    let mut hmm = Hmm::new("linear");
    let start = hmm.add_state(State::mute("S", abc.clone()), p(1.0))?;
    let m1 = hmm.add_state(
        State::normal_from_pairs("M1", abc.clone(), &[(b'A', p(0.8)), (b'C', p(0.2))])?,
        Prob::zero(),
    )?;
    let mut m2_state = State::normal_from_pairs(
        "M2",
        abc.clone(),
        &[(b'A', p(0.4)), (b'C', p(0.6)), (b'U', p(0.6))],
    )?;
    m2_state.normalize()?;
    let m2 = hmm.add_state(m2_state, Prob::zero())?;
    let end = hmm.add_state(State::mute("E", abc), Prob::zero())?;

    hmm.set_transition(start, m1, p(1.0))?;
    hmm.set_transition(m1, m2, p(1.0))?;
    hmm.set_transition(m2, end, p(1.0))?;
    hmm.set_transition(end, end, p(1.0))?;
    hmm.normalize()?;
    hmm.set_transition(end, end, Prob::zero())?;
    Ok((hmm, LinearIds { start, m1, m2, end }))
}

/// handles of the states of `mock_branching`
#[derive(Debug, Clone, Copy)]
pub struct BranchingIds {
    pub start: StateId,
    pub m1: StateId,
    pub m2: StateId,
    pub d1: StateId,
    pub d2: StateId,
    pub end: StateId,
}

///
/// Two-position DNA profile with match/delete branches
///
/// ```text
///      .8       .8
///   S ---> M1 ---> M2 --\ 1
///   |  .2   \ .2  ^ .8   E
///   \-> D1 --+-> D2 ----/ 1
///         .2
/// ```
///
/// M1: A .8, C .2 / M2: A .4, C .6
///
pub fn mock_branching() -> Result<(Hmm, BranchingIds)> {
    let abc = Alphabet::dna();
    let mut hmm = Hmm::new("branching");
    let start = hmm.add_state(State::mute("S", abc.clone()), p(1.0))?;
    let m1 = hmm.add_state(
        State::normal_from_pairs("M1", abc.clone(), &[(b'A', p(0.8)), (b'C', p(0.2))])?,
        Prob::zero(),
    )?;
    let m2 = hmm.add_state(
        State::normal_from_pairs("M2", abc.clone(), &[(b'A', p(0.4)), (b'C', p(0.6))])?,
        Prob::zero(),
    )?;
    let d1 = hmm.add_state(State::mute("D1", abc.clone()), Prob::zero())?;
    let d2 = hmm.add_state(State::mute("D2", abc.clone()), Prob::zero())?;
    let end = hmm.add_state(State::mute("E", abc), Prob::zero())?;

    hmm.set_transition(start, m1, p(0.8))?;
    hmm.set_transition(start, d1, p(0.2))?;
    hmm.set_transition(m1, m2, p(0.8))?;
    hmm.set_transition(m1, d2, p(0.2))?;
    hmm.set_transition(d1, d2, p(0.2))?;
    hmm.set_transition(d1, m2, p(0.8))?;
    hmm.set_transition(m2, end, p(1.0))?;
    hmm.set_transition(d2, end, p(1.0))?;
    Ok((
        hmm,
        BranchingIds {
            start,
            m1,
            m2,
            d1,
            d2,
            end,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::path::{Path, Step};

    #[test]
    fn linear_likelihood() {
        let (hmm, ids) = mock_linear().unwrap();
        let path = Path::new(vec![
            Step::new(ids.start, 0),
            Step::new(ids.m1, 1),
            Step::new(ids.m2, 1),
            Step::new(ids.end, 0),
        ]);
        assert_abs_diff_eq!(hmm.likelihood(b"AC", &path).unwrap(), p(0.3), epsilon = 1e-12);
        assert!(hmm.likelihood(b"AG", &path).unwrap().is_zero());
        assert!(hmm.transition(ids.end, ids.end).unwrap().is_zero());
        assert_eq!(hmm.transition(ids.m1, ids.m2).unwrap(), p(1.0));
    }
    #[test]
    fn linear_viterbi_matches_likelihood() {
        let (hmm, ids) = mock_linear().unwrap();
        let (score, path) = hmm.viterbi(b"AC", ids.end).unwrap();
        assert_abs_diff_eq!(score, p(0.3), epsilon = 1e-12);
        assert_eq!(path.len(), 4);
    }
}
