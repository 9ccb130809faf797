//!
//! Mock profiles for testing
//!
use super::builder::{ProfileBuilder, Transitions};
use super::model::ProfileModel;
use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::io::hmmer::{HmmerModel, HmmerNode};
use crate::prob::{p, Prob};
use crate::state::State;
use std::sync::Arc;

/// `mm .9 mi .05 md .05 / im .5 ii .5 / dm .5 dd .5`
pub fn mock_transitions() -> Transitions {
    Transitions::new(p(0.9), p(0.05), p(0.05), p(0.5), p(0.5), p(0.5), p(0.5))
}

/// `peak` on `symbol`, the rest spread evenly over the other symbols
fn peaked(alphabet: &Alphabet, symbol: u8, peak: f64) -> Vec<Prob> {
    let rest = (1.0 - peak) / (alphabet.len() - 1) as f64;
    alphabet
        .symbols()
        .iter()
        .map(|&s| if s == symbol { p(peak) } else { p(rest) })
        .collect()
}

fn uniform(alphabet: &Alphabet) -> Vec<Prob> {
    vec![p(1.0 / alphabet.len() as f64); alphabet.len()]
}

///
/// DNA profile with one node per symbol of `consensus`
///
/// * match: the consensus base with 0.97, others 0.01
/// * insert, N, J, C and null: uniform
/// * transitions: `mock_transitions()`
///
pub fn mock_consensus_profile(consensus: &[u8], multiple_hits: bool) -> Result<ProfileModel> {
    let abc = Alphabet::dna();
    let background = State::normal("R", abc.clone(), uniform(&abc))?;
    let mut builder = ProfileBuilder::new("consensus", &background)?;
    for &symbol in consensus {
        let m = State::normal("M", abc.clone(), peaked(&abc, symbol, 0.97))?;
        let i = State::normal("I", abc.clone(), uniform(&abc))?;
        builder.add_node(m, i, mock_transitions())?;
    }
    builder.build(multiple_hits)
}

///
/// Amino-acid HMMER model with one node per residue of `consensus`
/// (0.81 on the consensus residue, 0.01 on the others)
///
pub fn mock_amino_model(consensus: &[u8]) -> Result<HmmerModel> {
    let abc: Arc<Alphabet> = Alphabet::amino();
    let nodes = consensus
        .iter()
        .map(|&residue| HmmerNode {
            match_emission: peaked(&abc, residue, 0.81),
            insert_emission: uniform(&abc),
            trans: mock_transitions(),
        })
        .collect();
    Ok(HmmerModel {
        name: "amino".to_string(),
        accession: None,
        description: None,
        length: consensus.len(),
        compo: None,
        insert0: uniform(&abc),
        trans0: mock_transitions(),
        alphabet: abc,
        nodes,
    })
}
