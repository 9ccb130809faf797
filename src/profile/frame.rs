//!
//! Frame profile: an amino-acid profile searched against nucleotide targets
//!
//! Every emitting state is a Frame state whose hidden codons follow the
//! amino-acid distribution of the HMMER state
//!
//! ```text
//! P(c)    = P(aa(c)) / |sense codons of aa(c)|     (then normalized)
//! base(b) = sum_c P(c) count(b, c) / 3
//! ```
//!
use super::builder::ProfileBuilder;
use super::fragment::Fragment;
use super::model::ProfileModel;
use super::params::SearchParams;
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::gencode::GeneticCode;
use crate::io::hmmer::HmmerModel;
use crate::prob::Prob;
use crate::seq::Sequence;
use crate::state::base::N_BASES;
use crate::state::{BaseTable, Codon, CodonProb, CodonTable, Emission, State};
use fnv::FnvHashMap as HashMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

///
/// Codon table and base composition of a frame state, derived from an
/// amino-acid distribution
///
struct CodonModel<'a> {
    amino: &'a Alphabet,
    target: Arc<Alphabet>,
    /// `(codon, amino acid)` of every sense codon over `target`
    sense: Vec<(Codon, u8)>,
    /// number of sense codons of each amino acid
    degeneracy: HashMap<u8, usize>,
    epsilon: f64,
}

impl<'a> CodonModel<'a> {
    fn new(
        amino: &'a Alphabet,
        target: Arc<Alphabet>,
        gcode: &GeneticCode,
        epsilon: f64,
    ) -> CodonModel<'a> {
        let sense = gcode.sense_codons(&target);
        let mut degeneracy = HashMap::default();
        for (_, aa) in sense.iter() {
            *degeneracy.entry(*aa).or_insert(0) += 1;
        }
        CodonModel {
            amino,
            target,
            sense,
            degeneracy,
            epsilon,
        }
    }
    fn codon_prob(&self, name: &str, aa_lprobs: &[Prob]) -> Result<CodonProb> {
        let mut codonp = CodonProb::new(self.target.clone())?;
        for (codon, aa) in self.sense.iter() {
            let i = match self.amino.symbol_index(*aa) {
                Some(i) => i,
                None => continue,
            };
            let n = self.degeneracy.get(aa).copied().unwrap_or(1);
            codonp.set(codon, aa_lprobs[i] / n)?;
        }
        codonp.normalize().map_err(|_| Error::InvalidEmission {
            state: name.to_string(),
            msg: "no sense codon has a non-zero probability".to_string(),
        })?;
        Ok(codonp)
    }
    fn base_table(&self, codonp: &CodonProb) -> Result<BaseTable> {
        let mut values = [0.0; N_BASES];
        for (codon, lprob) in codonp.iter_nonzero() {
            for &symbol in codon.as_bytes().iter() {
                if let Some(b) = self.target.symbol_index(symbol) {
                    values[b] += lprob.to_value() / 3.0;
                }
            }
        }
        let mut lprobs = [Prob::zero(); N_BASES];
        for (lp, &v) in lprobs.iter_mut().zip(values.iter()) {
            *lp = Prob::from_prob(v);
        }
        let mut base = BaseTable::new(self.target.clone(), lprobs)?;
        base.normalize()?;
        Ok(base)
    }
    fn state(&self, name: &str, aa_lprobs: &[Prob]) -> Result<State> {
        if aa_lprobs.len() != self.amino.len() {
            return Err(Error::InvalidEmission {
                state: name.to_string(),
                msg: format!(
                    "{} probabilities for an alphabet of {} symbols",
                    aa_lprobs.len(),
                    self.amino.len()
                ),
            });
        }
        let codonp = self.codon_prob(name, aa_lprobs)?;
        let base = self.base_table(&codonp)?;
        let codon = CodonTable::new(&codonp)?;
        State::frame(name, base, codon, self.epsilon)
    }
}

///
/// Build the frame profile of the amino-acid `model` for nucleotide targets
/// over `target`.
///
pub fn frame_profile(
    model: &HmmerModel,
    params: &SearchParams,
    target: Arc<Alphabet>,
) -> Result<ProfileModel> {
    if *model.alphabet != *Alphabet::amino() {
        return Err(Error::InvalidAlphabet(format!(
            "frame profile `{}` needs an amino-acid model, got `{}`",
            model.name, model.alphabet
        )));
    }
    if !target.is_nucleotide() {
        return Err(Error::InvalidAlphabet(format!(
            "frame profile `{}` needs a nucleotide target, got `{}`",
            model.name, target
        )));
    }
    let gcode = params.genetic_code()?;
    let codons = CodonModel::new(&model.alphabet, target.clone(), gcode, params.epsilon);

    let background = codons.state("R", &model.insert0)?;
    let mut builder = ProfileBuilder::new(&model.name, &background)?;
    for node in model.nodes.iter() {
        let m = codons.state("M", &node.match_emission)?;
        let i = codons.state("I", &node.insert_emission)?;
        builder.add_node(m, i, node.trans)?;
    }
    let mut profile = builder.build(params.multiple_hits)?;
    profile.set_window_length(params.window_length);
    info!(
        "frame profile `{}` over `{}` with {} nodes (epsilon={} gcode={})",
        model.name,
        target,
        profile.n_nodes(),
        params.epsilon,
        gcode.id
    );
    Ok(profile)
}

///
/// Most probable codon behind one step of a frame fragment
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCodon {
    pub codon: [u8; 3],
    pub amino: u8,
    /// `P(codon) P(window | codon)`
    pub lprob: Prob,
}

///
/// Decode every emitting Frame step of `fragment`
///
pub fn decode_fragment(
    profile: &ProfileModel,
    fragment: &Fragment,
    target: &Sequence,
    gcode: &GeneticCode,
) -> Result<Vec<DecodedCodon>> {
    let mut decoded = Vec::new();
    for (window, step) in fragment.items(target)? {
        let state = profile.hmm().state(step.state)?;
        if window.is_empty() || !matches!(state.emission(), Emission::Frame(_)) {
            continue;
        }
        if let Some((codon, lprob)) = state.decode(window) {
            decoded.push(DecodedCodon {
                codon: *codon.as_bytes(),
                amino: gcode.translate(&codon),
                lprob,
            });
        }
    }
    Ok(decoded)
}

/// Concatenated codons
pub fn codon_string(decoded: &[DecodedCodon]) -> String {
    decoded
        .iter()
        .map(|d| String::from_utf8_lossy(&d.codon).into_owned())
        .collect()
}

/// Translated amino acids
pub fn amino_string(decoded: &[DecodedCodon]) -> String {
    decoded.iter().map(|d| d.amino as char).collect()
}
