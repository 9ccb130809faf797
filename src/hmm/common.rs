//!
//! Definition of the state graph of an HMM
//!
//! States are nodes of a `StableDiGraph` and transitions are its edges, so
//! that `StateId`s stay valid after other states are deleted.
//!
use super::iterators::{ChildEdges, NodesIterator, ParentEdges};
use crate::error::{Error, Result};
use crate::prob::{normalize, Prob};
use crate::state::State;
use fnv::FnvHashMap as HashMap;
use log::debug;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

/// Handle of a state in an `Hmm`
pub type StateId = NodeIndex;

///
/// Node weight: the state and its start probability
///
#[derive(Debug, Clone)]
pub struct HmmNode {
    pub state: State,
    pub start: Prob,
}

///
/// HMM as a named directed graph of states
///
/// * node: `HmmNode` (state + start lprob)
/// * edge: transition lprob (absent edge = `Prob::zero()`)
///
#[derive(Debug, Clone)]
pub struct Hmm {
    name: String,
    pub(crate) graph: StableDiGraph<HmmNode, Prob>,
    names: HashMap<String, StateId>,
}

impl Hmm {
    pub fn new(name: &str) -> Hmm {
        Hmm {
            name: name.to_string(),
            graph: StableDiGraph::new(),
            names: HashMap::default(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    ///
    /// Add a state with the start probability `start`.
    /// Fails if another state already has the same name.
    ///
    pub fn add_state(&mut self, state: State, start: Prob) -> Result<StateId> {
        if self.names.contains_key(state.name()) {
            return Err(Error::DuplicateState(state.name().to_string()));
        }
        if !start.is_valid() {
            return Err(Error::InvalidProbability(format!(
                "start of `{}`",
                state.name()
            )));
        }
        let name = state.name().to_string();
        let id = self.graph.add_node(HmmNode { state, start });
        self.names.insert(name, id);
        Ok(id)
    }
    ///
    /// Remove the state together with its transitions and start probability
    ///
    pub fn del_state(&mut self, id: StateId) -> Result<State> {
        let node = self
            .graph
            .remove_node(id)
            .ok_or_else(|| not_found(id))?;
        self.names.remove(node.state.name());
        Ok(node.state)
    }
    fn node(&self, id: StateId) -> Result<&HmmNode> {
        self.graph.node_weight(id).ok_or_else(|| not_found(id))
    }
    pub fn state(&self, id: StateId) -> Result<&State> {
        Ok(&self.node(id)?.state)
    }
    ///
    /// Replace the state at `id` keeping its name, start and transitions.
    ///
    pub fn set_state(&mut self, id: StateId, state: State) -> Result<()> {
        let node = self.graph.node_weight_mut(id).ok_or_else(|| not_found(id))?;
        if node.state.name() != state.name() {
            return Err(Error::InvalidParameter(format!(
                "cannot rename `{}` into `{}`",
                node.state.name(),
                state.name()
            )));
        }
        node.state = state;
        Ok(())
    }
    pub fn state_by_name(&self, name: &str) -> Result<StateId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::StateNotFound(format!("`{}`", name)))
    }
    pub fn has_state(&self, id: StateId) -> bool {
        self.graph.contains_node(id)
    }
    pub fn set_start(&mut self, id: StateId, start: Prob) -> Result<()> {
        if !start.is_valid() {
            return Err(Error::InvalidProbability(format!("start of {:?}", id)));
        }
        let node = self.graph.node_weight_mut(id).ok_or_else(|| not_found(id))?;
        node.start = start;
        Ok(())
    }
    pub fn start(&self, id: StateId) -> Result<Prob> {
        Ok(self.node(id)?.start)
    }
    ///
    /// Set the transition `a -> b`. Setting it to zero removes the edge.
    ///
    pub fn set_transition(&mut self, a: StateId, b: StateId, lprob: Prob) -> Result<()> {
        self.node(a)?;
        self.node(b)?;
        if !lprob.is_valid() {
            return Err(Error::InvalidProbability(format!(
                "transition {} -> {}",
                self.graph[a].state.name(),
                self.graph[b].state.name()
            )));
        }
        if lprob.is_zero() {
            if let Some(e) = self.graph.find_edge(a, b) {
                self.graph.remove_edge(e);
            }
        } else {
            self.graph.update_edge(a, b, lprob);
        }
        Ok(())
    }
    ///
    /// Transition probability `a -> b`, zero if there is no edge
    ///
    pub fn transition(&self, a: StateId, b: StateId) -> Result<Prob> {
        self.node(a)?;
        self.node(b)?;
        Ok(match self.graph.find_edge(a, b) {
            Some(e) => self.graph[e],
            None => Prob::zero(),
        })
    }
    pub fn n_states(&self) -> usize {
        self.graph.node_count()
    }
    pub fn n_transitions(&self) -> usize {
        self.graph.edge_count()
    }
    ///
    /// create iterator of all states
    /// Item of the iterator is `(StateId, &HmmNode)`.
    ///
    pub fn states(&self) -> NodesIterator<HmmNode> {
        NodesIterator::new(&self.graph)
    }
    ///
    /// create iterator of all child edges of the state
    ///
    /// Item of the iterator is `(EdgeIndex, StateId of child, &Prob)`
    ///
    pub fn childs(&self, id: StateId) -> ChildEdges<Prob> {
        ChildEdges::new(&self.graph, id)
    }
    ///
    /// create iterator of all parent edges of the state
    ///
    /// Item of the iterator is `(EdgeIndex, StateId of parent, &Prob)`
    ///
    pub fn parents(&self, id: StateId) -> ParentEdges<Prob> {
        ParentEdges::new(&self.graph, id)
    }
    ///
    /// Normalize the start distribution and the outgoing transitions of
    /// every state.
    ///
    /// Fails with `ZeroMass` if the start vector or any state's outgoing
    /// transitions are all zero. Nothing is modified on failure.
    ///
    pub fn normalize(&mut self) -> Result<()> {
        let ids: Vec<StateId> = self.graph.node_indices().collect();

        let mut starts: Vec<Prob> = ids.iter().map(|&v| self.graph[v].start).collect();
        normalize(&mut starts, &format!("start distribution of `{}`", self.name))?;

        let mut outgoing = Vec::with_capacity(ids.len());
        for &v in ids.iter() {
            let (edges, mut lprobs): (Vec<_>, Vec<_>) =
                self.childs(v).map(|(e, _, &lprob)| (e, lprob)).unzip();
            normalize(
                &mut lprobs,
                &format!("transitions from `{}`", self.graph[v].state.name()),
            )?;
            outgoing.push((edges, lprobs));
        }

        for (&v, start) in ids.iter().zip(starts) {
            self.graph[v].start = start;
        }
        for (edges, lprobs) in outgoing {
            for (e, lprob) in edges.into_iter().zip(lprobs) {
                self.graph[e] = lprob;
            }
        }
        debug!(
            "normalized `{}`: {} states {} transitions",
            self.name,
            self.n_states(),
            self.n_transitions()
        );
        Ok(())
    }
}

fn not_found(id: StateId) -> Error {
    Error::StateNotFound(format!("#{}", id.index()))
}

impl std::fmt::Display for Hmm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "hmm {}", self.name)?;
        for (v, node) in self.states() {
            write!(f, "{} start={}", node.state, node.start)?;
            for (_, w, lprob) in self.childs(v) {
                write!(f, " {}:{}", self.graph[w].state.name(), lprob)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
