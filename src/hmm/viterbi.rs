//!
//! Viterbi decoding with back-pointers
//!
use super::common::{Hmm, StateId};
use super::path::{Path, Step};
use crate::error::{Error, Result};
use crate::prob::Prob;
use crate::seq::Symbols;
use log::trace;
use petgraph::algo::toposort;
use petgraph::visit::{NodeFiltered, NodeIndexable};

///
/// Where the best path into a cell comes from
///
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pointer {
    Unreached,
    /// entered from the start distribution, emitting `k` symbols
    Start(usize),
    /// entered from `(state, row - k)`, emitting `k` symbols
    From(StateId, usize),
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    score: Prob,
    pointer: Pointer,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            score: Prob::zero(),
            pointer: Pointer::Unreached,
        }
    }
}

impl Cell {
    ///
    /// Keep the candidate if it is strictly better (first maximum wins)
    ///
    fn update(&mut self, score: Prob, pointer: Pointer) -> Result<()> {
        if !score.is_valid() {
            return Err(Error::InvalidProbability("viterbi cell".to_string()));
        }
        if score > self.score {
            self.score = score;
            self.pointer = pointer;
        }
        Ok(())
    }
}

///
/// DP table `best[i][s]` for rows `i = 0..=n`, columns indexed by
/// `StateId::index()`
///
struct ViterbiTable {
    rows: Vec<Vec<Cell>>,
}

impl ViterbiTable {
    fn new(n_rows: usize, n_cols: usize) -> ViterbiTable {
        ViterbiTable {
            rows: vec![vec![Cell::default(); n_cols]; n_rows],
        }
    }
    fn get(&self, i: usize, v: StateId) -> &Cell {
        &self.rows[i][v.index()]
    }
    fn get_mut(&mut self, i: usize, v: StateId) -> &mut Cell {
        &mut self.rows[i][v.index()]
    }
}

impl Hmm {
    ///
    /// States with `min_seq == 0` in an order where every zero-length
    /// predecessor comes first.
    ///
    fn zero_emission_order(&self) -> Result<Vec<StateId>> {
        let subgraph =
            NodeFiltered::from_fn(&self.graph, |v: StateId| self.graph[v].state.min_seq() == 0);
        toposort(&subgraph, None).map_err(|cycle| {
            Error::ZeroEmissionCycle(self.graph[cycle.node_id()].state.name().to_string())
        })
    }
    ///
    /// Most probable path that emits `seq` and ends at `end`.
    ///
    pub fn viterbi(&self, seq: &Symbols, end: StateId) -> Result<(Prob, Path)> {
        self.viterbi_with_window(seq, end, None)
    }
    ///
    /// `viterbi` where no step emits more than `window_length` symbols.
    ///
    pub fn viterbi_with_window(
        &self,
        seq: &Symbols,
        end: StateId,
        window_length: Option<usize>,
    ) -> Result<(Prob, Path)> {
        let end_state = self.state(end)?;
        let n = seq.len();
        let order = self.zero_emission_order()?;
        let emitting: Vec<StateId> = self
            .graph
            .node_indices()
            .filter(|&v| self.graph[v].state.max_seq() > 0)
            .collect();

        let mut table = ViterbiTable::new(n + 1, self.graph.node_bound());
        for i in 0..=n {
            // (1) steps emitting k >= 1 symbols from earlier rows
            for &v in emitting.iter() {
                let node = &self.graph[v];
                let k_min = node.state.min_seq().max(1);
                let mut k_max = node.state.max_seq().min(i);
                if let Some(w) = window_length {
                    k_max = k_max.min(w);
                }
                for k in k_min..=k_max {
                    let e = node.state.lprob(&seq[i - k..i]);
                    if !e.is_valid() {
                        return Err(Error::InvalidProbability(format!(
                            "emission of `{}` at {}..{}",
                            node.state.name(),
                            i - k,
                            i
                        )));
                    }
                    if e.is_zero() {
                        continue;
                    }
                    let mut cell = *table.get(i, v);
                    if i == k {
                        cell.update(node.start * e, Pointer::Start(k))?;
                    }
                    for (_, w, &t) in self.parents(v) {
                        let prev = table.get(i - k, w).score;
                        cell.update(prev * t * e, Pointer::From(w, k))?;
                    }
                    *table.get_mut(i, v) = cell;
                }
            }
            // (2) zero-length steps within row i
            for &v in order.iter() {
                let node = &self.graph[v];
                let e = node.state.lprob(&[]);
                if !e.is_valid() {
                    return Err(Error::InvalidProbability(format!(
                        "emission of `{}` at {}",
                        node.state.name(),
                        i
                    )));
                }
                if e.is_zero() {
                    continue;
                }
                let mut cell = *table.get(i, v);
                if i == 0 {
                    cell.update(node.start * e, Pointer::Start(0))?;
                }
                for (_, w, &t) in self.parents(v) {
                    let prev = table.get(i, w).score;
                    cell.update(prev * t * e, Pointer::From(w, 0))?;
                }
                *table.get_mut(i, v) = cell;
            }
        }

        let score = table.get(n, end).score;
        if !score.is_valid() {
            return Err(Error::InvalidProbability(format!(
                "viterbi score at `{}`",
                end_state.name()
            )));
        }
        if score.is_zero() {
            return Err(Error::NoPath(end_state.name().to_string()));
        }
        trace!("viterbi `{}` n={} score={}", self.name(), n, score);
        let path = traceback(&table, n, end)?;
        Ok((score, path))
    }
}

///
/// Follow back-pointers from `(n, end)` to the start
///
fn traceback(table: &ViterbiTable, n: usize, end: StateId) -> Result<Path> {
    let mut steps = Vec::new();
    let mut i = n;
    let mut v = end;
    loop {
        match table.get(i, v).pointer {
            Pointer::Start(k) => {
                steps.push(Step::new(v, k));
                break;
            }
            Pointer::From(w, k) => {
                steps.push(Step::new(v, k));
                i -= k;
                v = w;
            }
            Pointer::Unreached => {
                return Err(Error::NoPath(format!("broken traceback at row {}", i)));
            }
        }
    }
    steps.reverse();
    Ok(Path::new(steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::hmm::mocks::*;
    use crate::prob::p;
    use crate::state::State;
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn viterbi_branching() {
        let (hmm, ids) = mock_branching().unwrap();
        let (score, path) = hmm.viterbi(b"AC", ids.end).unwrap();
        assert_abs_diff_eq!(score, p(0.3072), epsilon = 1e-9);
        let states: Vec<StateId> = path.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![ids.start, ids.m1, ids.m2, ids.end]);
        assert_eq!(path.seq_len(), 2);

        // M1 then D2 (.128) beats D1 then M2 (.064)
        let (score, path) = hmm.viterbi(b"A", ids.end).unwrap();
        assert_abs_diff_eq!(score, p(0.128), epsilon = 1e-9);
        let states: Vec<StateId> = path.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![ids.start, ids.m1, ids.d2, ids.end]);
        assert_eq!(path[2].seq_len, 0);

        let (score, path) = hmm.viterbi(b"", ids.end).unwrap();
        assert_abs_diff_eq!(score, p(0.04), epsilon = 1e-9);
        let states: Vec<StateId> = path.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![ids.start, ids.d1, ids.d2, ids.end]);
    }
    #[test]
    fn viterbi_score_is_path_likelihood() {
        let (hmm, ids) = mock_branching().unwrap();
        for seq in [&b"AC"[..], b"A", b"C", b"CA", b"AA", b""].iter() {
            let (score, path) = hmm.viterbi(seq, ids.end).unwrap();
            assert_eq!(path.seq_len(), seq.len());
            let lk = hmm.likelihood(seq, &path).unwrap();
            assert_abs_diff_eq!(score, lk, epsilon = 1e-9);
        }
    }
    #[test]
    fn viterbi_no_path() {
        let (hmm, ids) = mock_branching().unwrap();
        assert!(matches!(hmm.viterbi(b"ACA", ids.end), Err(Error::NoPath(_))));
        assert!(matches!(hmm.viterbi(b"GG", ids.end), Err(Error::NoPath(_))));
        // nothing reaches the start state again
        assert!(matches!(hmm.viterbi(b"A", ids.start), Err(Error::NoPath(_))));
    }
    #[test]
    fn viterbi_zero_emission_cycle() {
        let abc = Alphabet::dna();
        let mut hmm = Hmm::new("cycle");
        let a = hmm.add_state(State::mute("a", abc.clone()), p(1.0)).unwrap();
        let b = hmm.add_state(State::mute("b", abc), p(0.0)).unwrap();
        hmm.set_transition(a, b, p(0.5)).unwrap();
        hmm.set_transition(b, a, p(0.5)).unwrap();
        assert!(matches!(
            hmm.viterbi(b"", b),
            Err(Error::ZeroEmissionCycle(_))
        ));
    }
    #[test]
    fn viterbi_mute_chain() {
        // S -> D1 -> D2 -> M -> E, all but M are mute
        let abc = Alphabet::dna();
        let mut hmm = Hmm::new("chain");
        let e = hmm.add_state(State::mute("E", abc.clone()), p(0.0)).unwrap();
        let m = hmm
            .add_state(State::normal("M", abc.clone(), vec![p(0.25); 4]).unwrap(), p(0.0))
            .unwrap();
        let d2 = hmm.add_state(State::mute("D2", abc.clone()), p(0.0)).unwrap();
        let d1 = hmm.add_state(State::mute("D1", abc.clone()), p(0.0)).unwrap();
        let s = hmm.add_state(State::mute("S", abc), p(1.0)).unwrap();
        hmm.set_transition(s, d1, p(0.5)).unwrap();
        hmm.set_transition(d1, d2, p(0.5)).unwrap();
        hmm.set_transition(d2, m, p(0.5)).unwrap();
        hmm.set_transition(m, e, p(0.5)).unwrap();
        hmm.set_transition(d2, e, p(0.1)).unwrap();

        let (score, path) = hmm.viterbi(b"G", e).unwrap();
        assert_abs_diff_eq!(score, p(0.5 * 0.5 * 0.5 * 0.25 * 0.5), epsilon = 1e-12);
        let states: Vec<StateId> = path.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![s, d1, d2, m, e]);

        let (score, path) = hmm.viterbi(b"", e).unwrap();
        assert_abs_diff_eq!(score, p(0.5 * 0.5 * 0.1), epsilon = 1e-12);
        assert_eq!(path.len(), 4);
    }
    #[test]
    fn viterbi_table_state() {
        // S -> T -> E where T emits "A" or "CG"
        let abc = Alphabet::dna();
        let mut hmm = Hmm::new("table");
        let s = hmm.add_state(State::mute("S", abc.clone()), p(1.0)).unwrap();
        let t = hmm
            .add_state(
                State::table(
                    "T",
                    abc.clone(),
                    vec![(b"A".to_vec(), p(0.3)), (b"CG".to_vec(), p(0.7))],
                )
                .unwrap(),
                p(0.0),
            )
            .unwrap();
        let e = hmm.add_state(State::mute("E", abc), p(0.0)).unwrap();
        hmm.set_transition(s, t, p(1.0)).unwrap();
        hmm.set_transition(t, t, p(0.5)).unwrap();
        hmm.set_transition(t, e, p(0.5)).unwrap();

        let (score, path) = hmm.viterbi(b"ACG", e).unwrap();
        assert_abs_diff_eq!(score, p(0.3 * 0.5 * 0.7 * 0.5), epsilon = 1e-12);
        let lens: Vec<usize> = path.iter().map(|s| s.seq_len).collect();
        assert_eq!(lens, vec![0, 1, 2, 0]);
        // windows of length 2 are not allowed
        assert!(matches!(
            hmm.viterbi_with_window(b"ACG", e, Some(1)),
            Err(Error::NoPath(_))
        ));
    }
    #[test]
    fn viterbi_start_at_emitting_state() {
        let abc = Alphabet::dna();
        let mut hmm = Hmm::new("direct");
        let m = hmm
            .add_state(
                State::normal_from_pairs("M", abc.clone(), &[(b'A', p(1.0))]).unwrap(),
                p(1.0),
            )
            .unwrap();
        hmm.set_transition(m, m, p(0.5)).unwrap();
        let (score, path) = hmm.viterbi(b"AAA", m).unwrap();
        assert_abs_diff_eq!(score, p(0.25), epsilon = 1e-12);
        assert_eq!(path.len(), 3);
    }
    #[test]
    fn viterbi_bounds_random_paths() {
        // likelihood of any explicit path <= viterbi score
        let (hmm, ids) = mock_branching().unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let candidates = [
            vec![(ids.m1, 1), (ids.m2, 1)],
            vec![(ids.m1, 1), (ids.d2, 0)],
            vec![(ids.d1, 0), (ids.m2, 1)],
            vec![(ids.d1, 0), (ids.d2, 0)],
        ];
        for _ in 0..20 {
            let len = rng.gen_range(0..=2);
            let seq: Vec<u8> = (0..len).map(|_| *b"ACG".choose(&mut rng).unwrap()).collect();
            let best = match hmm.viterbi(&seq, ids.end) {
                Ok((score, _)) => score,
                Err(_) => Prob::zero(),
            };
            for c in candidates.iter() {
                let path: Path = std::iter::once(Step::new(ids.start, 0))
                    .chain(c.iter().map(|&(v, k)| Step::new(v, k)))
                    .chain(std::iter::once(Step::new(ids.end, 0)))
                    .collect();
                if let Ok(lk) = hmm.likelihood(&seq, &path) {
                    assert!(lk.is_zero() || lk <= best || lk.log_diff(best) < 1e-9);
                }
            }
        }
    }
    #[test]
    fn likelihood_errors() {
        let (hmm, ids) = mock_branching().unwrap();
        let path = Path::new(vec![Step::new(ids.m1, 1), Step::new(ids.end, 0)]);
        assert!(matches!(
            hmm.likelihood(b"AC", &path),
            Err(Error::SequenceLengthMismatch { .. })
        ));
        // M1 is not a start state
        assert!(hmm.likelihood(b"A", &path).unwrap().is_zero());
    }
}
