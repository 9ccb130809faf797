//!
//! Profile emitting the symbols of its own alphabet
//!
use super::builder::ProfileBuilder;
use super::model::ProfileModel;
use super::params::SearchParams;
use crate::error::Result;
use crate::io::hmmer::HmmerModel;
use crate::prob::Prob;
use crate::state::State;
use log::info;

fn normalized(name: &str, model: &HmmerModel, lprobs: &[Prob]) -> Result<State> {
    let mut state = State::normal(name, model.alphabet.clone(), lprobs.to_vec())?;
    state.normalize()?;
    Ok(state)
}

///
/// Build the standard profile of `model`.
///
/// Match and insert states are Normal states with the (normalized)
/// emissions of each node. `N`, `J`, `C` and the null state emit like the
/// insert state of node 0.
///
pub fn standard_profile(model: &HmmerModel, params: &SearchParams) -> Result<ProfileModel> {
    let background = normalized("R", model, &model.insert0)?;
    let mut builder = ProfileBuilder::new(&model.name, &background)?;
    for node in model.nodes.iter() {
        let m = normalized("M", model, &node.match_emission)?;
        let i = normalized("I", model, &node.insert_emission)?;
        builder.add_node(m, i, node.trans)?;
    }
    let mut profile = builder.build(params.multiple_hits)?;
    profile.set_window_length(params.window_length);
    info!(
        "standard profile `{}` over `{}` with {} nodes",
        model.name,
        model.alphabet,
        profile.n_nodes()
    );
    Ok(profile)
}
