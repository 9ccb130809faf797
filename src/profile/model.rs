//!
//! Profile HMM with special states, target-length correction and search
//!
use super::fragment::{split_fragments, Fragment};
use super::result::SearchResult;
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::hmm::{Hmm, Path, StateId};
use crate::prob::Prob;
use crate::seq::Sequence;
use fnv::FnvHashSet as HashSet;
use log::{debug, trace};
use std::sync::Arc;

/// `q`, the probability of another hit after `E` in multi-hit mode
pub const MULTIPLE_HITS_LOOP: f64 = 0.5;

///
/// Handles of the special states
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialIds {
    pub s: StateId,
    pub n: StateId,
    pub b: StateId,
    pub e: StateId,
    pub j: StateId,
    pub c: StateId,
    pub t: StateId,
}

///
/// Handles of the states of node `m`. `D1` and `IM` are `None` once the
/// profile is built.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreIds {
    pub m: StateId,
    pub i: Option<StateId>,
    pub d: Option<StateId>,
}

///
/// Profile HMM (alternative model) and its one-state null model
///
#[derive(Debug, Clone)]
pub struct ProfileModel {
    name: String,
    alphabet: Arc<Alphabet>,
    hmm: Hmm,
    null: Hmm,
    special: SpecialIds,
    background: StateId,
    core: Vec<CoreIds>,
    match_states: HashSet<StateId>,
    multiple_hits: bool,
    target_length: usize,
    window_length: Option<usize>,
}

impl ProfileModel {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        alphabet: Arc<Alphabet>,
        hmm: Hmm,
        null: Hmm,
        special: SpecialIds,
        background: StateId,
        core: Vec<CoreIds>,
        multiple_hits: bool,
    ) -> Result<ProfileModel> {
        let match_states = core.iter().map(|node| node.m).collect();
        let mut model = ProfileModel {
            name,
            alphabet,
            hmm,
            null,
            special,
            background,
            core,
            match_states,
            multiple_hits,
            target_length: 1,
            window_length: None,
        };
        model.set_target_length(1)?;
        Ok(model)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
    /// The alternative (profile) model
    pub fn hmm(&self) -> &Hmm {
        &self.hmm
    }
    /// The null (background) model
    pub fn null(&self) -> &Hmm {
        &self.null
    }
    pub fn special(&self) -> &SpecialIds {
        &self.special
    }
    /// Handle of `R`, the state of the null model
    pub fn background(&self) -> StateId {
        self.background
    }
    pub fn core(&self) -> &[CoreIds] {
        &self.core
    }
    /// Number of positions `M`
    pub fn n_nodes(&self) -> usize {
        self.core.len()
    }
    pub fn is_match(&self, id: StateId) -> bool {
        self.match_states.contains(&id)
    }
    pub fn multiple_hits(&self) -> bool {
        self.multiple_hits
    }
    pub fn set_multiple_hits(&mut self, multiple_hits: bool) -> Result<()> {
        self.multiple_hits = multiple_hits;
        self.set_target_length(self.target_length)
    }
    pub fn target_length(&self) -> usize {
        self.target_length
    }
    pub fn window_length(&self) -> Option<usize> {
        self.window_length
    }
    pub fn set_window_length(&mut self, window_length: Option<usize>) {
        self.window_length = window_length;
    }
    ///
    /// Set the special transitions for a target of `length` symbols
    ///
    /// ```text
    /// q = 0.5 (multiple hits) or 0
    /// p = L / (L + 2 + q / (1 - q))
    /// r = L / (L + 1)
    ///
    /// S->N = p      S->B = 1-p    N->N = p    N->B = 1-p
    /// E->C = (1-q)p E->T = (1-q)(1-p)         C->C = p    C->T = 1-p
    /// E->J = q p    E->B = q (1-p)            J->J = p    J->B = 1-p
    /// R->R = r
    /// ```
    ///
    pub fn set_target_length(&mut self, length: usize) -> Result<()> {
        if length == 0 {
            return Err(Error::InvalidTargetLength);
        }
        let l = length as f64;
        let q = if self.multiple_hits {
            MULTIPLE_HITS_LOOP
        } else {
            0.0
        };
        let p = l / (l + 2.0 + q / (1.0 - q));
        let r = l / (l + 1.0);
        let lp = Prob::from_prob;

        let SpecialIds { s, n, b, e, j, c, t } = self.special;
        let hmm = &mut self.hmm;
        hmm.set_transition(s, n, lp(p))?;
        hmm.set_transition(s, b, lp(1.0 - p))?;
        hmm.set_transition(n, n, lp(p))?;
        hmm.set_transition(n, b, lp(1.0 - p))?;

        hmm.set_transition(e, c, lp((1.0 - q) * p))?;
        hmm.set_transition(e, t, lp((1.0 - q) * (1.0 - p)))?;
        hmm.set_transition(c, c, lp(p))?;
        hmm.set_transition(c, t, lp(1.0 - p))?;

        hmm.set_transition(e, j, lp(q * p))?;
        hmm.set_transition(e, b, lp(q * (1.0 - p)))?;
        hmm.set_transition(j, j, lp(p))?;
        hmm.set_transition(j, b, lp(1.0 - p))?;

        let background = self.background;
        self.null.set_transition(background, background, lp(r))?;
        self.target_length = length;
        trace!("`{}` target length {} (p={:.4} r={:.4})", self.name, length, p, r);
        Ok(())
    }
    ///
    /// Score `seq` against the profile
    ///
    /// The special transitions are set for `seq.len()`, then
    /// `score = viterbi(profile, T) - viterbi(null, R)`. The best path is
    /// split into homologous and non-homologous fragments.
    ///
    pub fn search(&mut self, seq: &Sequence) -> Result<SearchResult> {
        if seq.alphabet() != &self.alphabet {
            return Err(Error::InvalidAlphabet(format!(
                "sequence over `{}` but profile `{}` over `{}`",
                seq.alphabet(),
                self.name,
                self.alphabet
            )));
        }
        self.set_target_length(seq.len())?;
        let (alt_loglik, path) =
            self.hmm
                .viterbi_with_window(seq.as_bytes(), self.special.t, self.window_length)?;
        let (null_loglik, _) =
            self.null
                .viterbi_with_window(seq.as_bytes(), self.background, self.window_length)?;
        let score = alt_loglik.to_log_value() - null_loglik.to_log_value();
        let fragments = self.fragments(&path);
        debug!(
            "`{}` vs {} symbols: score={:.4} fragments={}",
            self.name,
            seq.len(),
            score,
            fragments.len()
        );
        Ok(SearchResult {
            profile: self.name.clone(),
            score,
            alt_loglik,
            null_loglik,
            path,
            fragments,
        })
    }
    ///
    /// Split a path of this profile into fragments
    ///
    pub fn fragments(&self, path: &Path) -> Vec<Fragment> {
        split_fragments(path, |v| self.is_match(v), self.special.e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::mocks::mock_consensus_profile;
    use crate::prob::p;
    use test_case::test_case;

    #[test_case(true, 10 ; "multi hit")]
    #[test_case(false, 10 ; "single hit")]
    #[test_case(true, 1 ; "length one")]
    fn special_transitions_are_normalized(multiple_hits: bool, length: usize) {
        let mut profile = mock_consensus_profile(b"ACGT", multiple_hits).unwrap();
        profile.set_target_length(length).unwrap();
        let hmm = profile.hmm();
        let SpecialIds { s, n, e, j, c, .. } = *profile.special();
        for v in [s, n, e, j, c].iter() {
            let total: Prob = hmm.childs(*v).map(|(_, _, &t)| t).sum();
            assert_abs_diff_eq!(total, p(1.0), epsilon = 1e-12);
        }
        let r = profile.background();
        let l = length as f64;
        assert_abs_diff_eq!(
            profile.null().transition(r, r).unwrap(),
            p(l / (l + 1.0)),
            epsilon = 1e-12
        );
    }
    #[test]
    fn single_hit_has_no_loop() {
        let mut profile = mock_consensus_profile(b"ACGT", true).unwrap();
        let SpecialIds { e, j, b, .. } = *profile.special();
        assert!(!profile.hmm().transition(e, j).unwrap().is_zero());
        profile.set_multiple_hits(false).unwrap();
        assert!(profile.hmm().transition(e, j).unwrap().is_zero());
        assert!(profile.hmm().transition(e, b).unwrap().is_zero());
    }
    #[test]
    fn target_length_zero() {
        let mut profile = mock_consensus_profile(b"ACGT", true).unwrap();
        assert!(matches!(
            profile.set_target_length(0),
            Err(Error::InvalidTargetLength)
        ));
        let empty = Sequence::new(b"", profile.alphabet().clone()).unwrap();
        assert!(matches!(
            profile.search(&empty),
            Err(Error::InvalidTargetLength)
        ));
    }
    #[test]
    fn search_prefix_then_consensus() {
        let consensus = b"ACGTTGCA";
        let mut profile = mock_consensus_profile(consensus, true).unwrap();
        let target = Sequence::new(b"GGGACGTTGCA", Alphabet::dna()).unwrap();
        let result = profile.search(&target).unwrap();
        assert_eq!(result.path.seq_len(), target.len());
        assert_eq!(result.fragments.len(), 2);

        let prefix = &result.fragments[0];
        assert!(!prefix.homologous);
        assert_eq!(prefix.range(), 0..3);
        let core = &result.fragments[1];
        assert!(core.homologous);
        assert_eq!(core.range(), 3..11);
        assert_eq!(core.sequence(&target).unwrap().as_bytes(), consensus);
        let n_match = core.path.iter().filter(|s| profile.is_match(s.state)).count();
        assert_eq!(n_match, 8);

        // the score is the log-odds of the two decodings
        assert_abs_diff_eq!(
            result.score,
            result.alt_loglik.to_log_value() - result.null_loglik.to_log_value(),
            epsilon = 1e-12
        );
    }
    #[test]
    fn search_long_profile_keeps_last_column() {
        let consensus = b"ACGTTGCAGGCTAACG";
        let mut profile = mock_consensus_profile(consensus, true).unwrap();
        let target = Sequence::new(b"GGGACGTTGCAGGCTAACG", Alphabet::dna()).unwrap();
        let result = profile.search(&target).unwrap();
        let hits: Vec<_> = result.homologous().collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].range(), 3..19);
        assert_eq!(hits[0].sequence(&target).unwrap().as_bytes(), consensus);

        // leaves through M16 -> E, not D16 -> E
        let last = profile.core()[15];
        assert!(hits[0].path.iter().any(|s| s.state == last.m));
        assert!(result.path.iter().all(|s| Some(s.state) != last.d));
        let n_match = hits[0].path.iter().filter(|s| profile.is_match(s.state)).count();
        assert_eq!(n_match, 16);
    }
    #[test]
    fn search_two_hits() {
        let mut profile = mock_consensus_profile(b"ACGTTGCA", true).unwrap();
        let target = Sequence::new(b"ACGTTGCATTTTACGTTGCA", Alphabet::dna()).unwrap();
        let result = profile.search(&target).unwrap();
        assert_eq!(result.homologous().count(), 2);

        let mut single = mock_consensus_profile(b"ACGTTGCA", false).unwrap();
        let result = single.search(&target).unwrap();
        assert_eq!(result.homologous().count(), 1);
    }
    #[test]
    fn search_rejects_other_alphabet() {
        let mut profile = mock_consensus_profile(b"ACGT", true).unwrap();
        let target = Sequence::new(b"ACGU", Alphabet::rna()).unwrap();
        assert!(matches!(
            profile.search(&target),
            Err(Error::InvalidAlphabet(_))
        ));
    }
}
