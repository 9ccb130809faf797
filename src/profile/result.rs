use super::fragment::Fragment;
use crate::hmm::Path;
use crate::prob::Prob;
use serde::{Deserialize, Serialize};

///
/// Outcome of scoring one target against one profile
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// name of the profile
    pub profile: String,
    /// `alt_loglik - null_loglik` in nats
    pub score: f64,
    pub alt_loglik: Prob,
    pub null_loglik: Prob,
    /// best path through the profile
    pub path: Path,
    pub fragments: Vec<Fragment>,
}

impl SearchResult {
    pub fn homologous(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(|f| f.homologous)
    }
    pub fn is_hit(&self, threshold: f64) -> bool {
        self.score >= threshold && self.homologous().next().is_some()
    }
}
