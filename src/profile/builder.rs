//!
//! Construction of a `ProfileModel` node by node
//!
//! ```text
//!                 I1      I2          I(M-1)
//!                 ^|      ^|           ^|
//!  S -> N -> B -> M1 ---> M2 -- ... -> MM -> E -> C -> T
//!       ^|   ^     \      /\           /\    |    ^|
//!            |      \-> D2 --- ... -> DM     v
//!            +------------------------------ J
//! ```
//!
//! * phase 1 (`add_node`): states `Mm`, `Im`, `Dm` and the transitions from
//!   node `m - 1` given by its septuple.
//! * phase 2 (`build`): `D1` and `IM` are removed, the local entry `B -> Mm`
//!   is spread over every position and every `Mm -> E` / `Dm -> E` is 1.
//!
use super::model::{CoreIds, ProfileModel, SpecialIds};
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::hmm::{Hmm, StateId};
use crate::prob::{normalize, Prob};
use crate::state::State;
use derive_new::new;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

///
/// Transition septuple of a node
///
/// rows `M: (mm, mi, md)`, `I: (im, ii)` and `D: (dm, dd)`
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, new)]
pub struct Transitions {
    pub mm: Prob,
    pub mi: Prob,
    pub md: Prob,
    pub im: Prob,
    pub ii: Prob,
    pub dm: Prob,
    pub dd: Prob,
}

impl Transitions {
    ///
    /// Normalize each row to sum to 1. Nothing is modified on failure.
    ///
    pub fn normalize(&mut self) -> Result<()> {
        let mut m = [self.mm, self.mi, self.md];
        let mut i = [self.im, self.ii];
        let mut d = [self.dm, self.dd];
        normalize(&mut m, "M transitions")?;
        normalize(&mut i, "I transitions")?;
        normalize(&mut d, "D transitions")?;
        *self = Transitions::new(m[0], m[1], m[2], i[0], i[1], d[0], d[1]);
        Ok(())
    }
}

///
/// `log 2 - log M - log (M + 1)`: local entry weight of each (start, end)
/// pair over `M` positions, with a free exit
///
pub fn local_entry(n_nodes: usize) -> Prob {
    let m = n_nodes as f64;
    Prob::from_log_prob(2f64.ln() - m.ln() - (m + 1.0).ln())
}

///
/// Builder of `ProfileModel`
///
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    name: String,
    alphabet: Arc<Alphabet>,
    hmm: Hmm,
    null: Hmm,
    special: SpecialIds,
    background: StateId,
    core: Vec<CoreIds>,
    prev: Option<Transitions>,
}

impl ProfileBuilder {
    ///
    /// Start a profile whose N, J, C and null states emit like
    /// `background`.
    ///
    pub fn new(name: &str, background: &State) -> Result<ProfileBuilder> {
        let alphabet = background.alphabet().clone();
        let mut hmm = Hmm::new(name);
        let s = hmm.add_state(State::mute("S", alphabet.clone()), Prob::one())?;
        let n = hmm.add_state(background.renamed("N"), Prob::zero())?;
        let b = hmm.add_state(State::mute("B", alphabet.clone()), Prob::zero())?;
        let e = hmm.add_state(State::mute("E", alphabet.clone()), Prob::zero())?;
        let j = hmm.add_state(background.renamed("J"), Prob::zero())?;
        let c = hmm.add_state(background.renamed("C"), Prob::zero())?;
        let t = hmm.add_state(State::mute("T", alphabet.clone()), Prob::zero())?;

        let mut null = Hmm::new(&format!("{}.null", name));
        let r = null.add_state(background.renamed("R"), Prob::one())?;

        Ok(ProfileBuilder {
            name: name.to_string(),
            alphabet,
            hmm,
            null,
            special: SpecialIds { s, n, b, e, j, c, t },
            background: r,
            core: Vec::new(),
            prev: None,
        })
    }
    pub fn n_nodes(&self) -> usize {
        self.core.len()
    }
    ///
    /// Append node `m = n_nodes() + 1`. `match_state` and `insert_state` are
    /// renamed `Mm` and `Im`; `trans` is normalized row by row.
    ///
    pub fn add_node(
        &mut self,
        match_state: State,
        insert_state: State,
        trans: Transitions,
    ) -> Result<()> {
        if match_state.alphabet() != &self.alphabet || insert_state.alphabet() != &self.alphabet
        {
            return Err(Error::InvalidAlphabet(format!(
                "node {} of `{}` is not over `{}`",
                self.core.len() + 1,
                self.name,
                self.alphabet
            )));
        }
        let mut trans = trans;
        trans.normalize()?;

        let k = self.core.len() + 1;
        let m = self
            .hmm
            .add_state(match_state.renamed(&format!("M{}", k)), Prob::zero())?;
        let i = self
            .hmm
            .add_state(insert_state.renamed(&format!("I{}", k)), Prob::zero())?;
        let d = self.hmm.add_state(
            State::mute(&format!("D{}", k), self.alphabet.clone()),
            Prob::zero(),
        )?;
        self.hmm.set_transition(m, i, trans.mi)?;
        self.hmm.set_transition(i, i, trans.ii)?;

        if let (Some(prev), Some(t)) = (self.core.last().copied(), self.prev) {
            // ids of the previous node are all present before `build`
            if let (Some(pi), Some(pd)) = (prev.i, prev.d) {
                self.hmm.set_transition(prev.m, m, t.mm)?;
                self.hmm.set_transition(prev.m, d, t.md)?;
                self.hmm.set_transition(pi, m, t.im)?;
                self.hmm.set_transition(pd, m, t.dm)?;
                self.hmm.set_transition(pd, d, t.dd)?;
            }
        }
        self.core.push(CoreIds {
            m,
            i: Some(i),
            d: Some(d),
        });
        self.prev = Some(trans);
        Ok(())
    }
    ///
    /// Finalize the topology. Fails if no node was added.
    ///
    pub fn build(mut self, multiple_hits: bool) -> Result<ProfileModel> {
        let n_nodes = self.core.len();
        if n_nodes == 0 {
            return Err(Error::InvalidParameter(format!(
                "profile `{}` has no node",
                self.name
            )));
        }
        if let Some(d1) = self.core[0].d.take() {
            self.hmm.del_state(d1)?;
        }
        if let Some(im) = self.core[n_nodes - 1].i.take() {
            self.hmm.del_state(im)?;
        }

        let entry = local_entry(n_nodes);
        let SpecialIds { b, e, .. } = self.special;
        for node in self.core.iter() {
            self.hmm.set_transition(b, node.m, entry)?;
            self.hmm.set_transition(node.m, e, Prob::one())?;
            if let Some(d) = node.d {
                self.hmm.set_transition(d, e, Prob::one())?;
            }
        }
        debug!(
            "built profile `{}`: M={} states={} transitions={}",
            self.name,
            n_nodes,
            self.hmm.n_states(),
            self.hmm.n_transitions()
        );
        ProfileModel::new(
            self.name,
            self.alphabet,
            self.hmm,
            self.null,
            self.special,
            self.background,
            self.core,
            multiple_hits,
        )
    }
}
