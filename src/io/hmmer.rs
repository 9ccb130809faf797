//!
//! Reader of HMMER3 profile files (`.hmm`, text format 3/b to 3/f)
//!
//! ```text
//! HMMER3/f [3.1b2 | February 2015]
//! NAME  PF00001
//! LENG  2
//! ALPH  amino
//! ...
//! HMM          A        C   ...
//!             m->m     m->i     m->d     i->m     i->i     d->m     d->d
//!   COMPO   2.5 ...              (optional)
//!           2.6 ...              insert emissions of node 0
//!           0.01 4.98 ...        transitions of node 0
//!       1   1.9 ...  1 - - -     match emissions of node 1
//!           2.6 ...              insert emissions of node 1
//!           0.01 4.98 ...        transitions of node 1
//! ...
//! //
//! ```
//!
//! Values are negative natural logs of probabilities, `*` is probability 0.
//!
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::prob::Prob;
use crate::profile::builder::Transitions;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

const HEADER_FLAG: &str = "HMMER3";
const NAME_FLAG: &str = "NAME";
const ACCESSION_FLAG: &str = "ACC";
const DESCRIPTION_FLAG: &str = "DESC";
const LENGTH_FLAG: &str = "LENG";
const ALPHABET_FLAG: &str = "ALPH";
const MODEL_START_FLAG: &str = "HMM";
const COMPO_FLAG: &str = "COMPO";
const END_FLAG: &str = "//";
const N_TRANSITIONS: usize = 7;

///
/// Parameters of a node `m = 1..=M`
///
#[derive(Debug, Clone, PartialEq)]
pub struct HmmerNode {
    pub match_emission: Vec<Prob>,
    pub insert_emission: Vec<Prob>,
    pub trans: Transitions,
}

///
/// One profile of a HMMER3 file
///
#[derive(Debug, Clone, PartialEq)]
pub struct HmmerModel {
    pub name: String,
    pub accession: Option<String>,
    pub description: Option<String>,
    pub alphabet: Arc<Alphabet>,
    /// number of nodes (`LENG`)
    pub length: usize,
    /// background composition (`COMPO`)
    pub compo: Option<Vec<Prob>>,
    /// insert emissions of node 0
    pub insert0: Vec<Prob>,
    /// transitions of node 0 (from the begin state)
    pub trans0: Transitions,
    pub nodes: Vec<HmmerNode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParserState {
    Idle,
    Header,
    /// the `m->m m->i ...` line
    TransitionHeader,
    /// `COMPO` line or node 0 insert emissions
    CompoOrInsert0,
    Insert0,
    Trans0,
    MatchEmissions,
    InsertEmissions,
    StateTransitions,
}

///
/// Partially parsed model
///
#[derive(Default)]
struct Draft {
    name: Option<String>,
    accession: Option<String>,
    description: Option<String>,
    alphabet: Option<Arc<Alphabet>>,
    length: Option<usize>,
    compo: Option<Vec<Prob>>,
    insert0: Vec<Prob>,
    trans0: Option<Transitions>,
    nodes: Vec<HmmerNode>,
    match_emission: Vec<Prob>,
    insert_emission: Vec<Prob>,
}

fn parse_error(line: usize, msg: String) -> Error {
    Error::Parse { line, msg }
}

///
/// `-ln p` into `Prob`; `*` is zero
///
fn parse_value(token: &str, line: usize) -> Result<Prob> {
    if token == "*" {
        return Ok(Prob::zero());
    }
    token
        .parse::<f64>()
        .map(|v| Prob::from_log_prob(-v))
        .map_err(|_| parse_error(line, format!("`{}` is not a number", token)))
}

fn parse_values(tokens: &[&str], n: usize, line: usize) -> Result<Vec<Prob>> {
    if tokens.len() < n {
        return Err(parse_error(
            line,
            format!("expected {} values, got {}", n, tokens.len()),
        ));
    }
    tokens[..n].iter().map(|t| parse_value(t, line)).collect()
}

fn parse_transitions(tokens: &[&str], line: usize) -> Result<Transitions> {
    let v = parse_values(tokens, N_TRANSITIONS, line)?;
    Ok(Transitions::new(v[0], v[1], v[2], v[3], v[4], v[5], v[6]))
}

fn parse_alphabet(token: &str, line: usize) -> Result<Arc<Alphabet>> {
    match token.to_ascii_lowercase().as_str() {
        "amino" => Ok(Alphabet::amino()),
        "dna" => Ok(Alphabet::dna()),
        "rna" => Ok(Alphabet::rna()),
        other => Err(parse_error(line, format!("unsupported alphabet `{}`", other))),
    }
}

fn rest_of_line(line: &str, flag: &str) -> String {
    line.trim_start()[flag.len()..].trim().to_string()
}

impl Draft {
    fn alphabet_len(&self, line: usize) -> Result<usize> {
        self.alphabet
            .as_ref()
            .map(|a| a.len())
            .ok_or_else(|| parse_error(line, "`ALPH` must precede `HMM`".to_string()))
    }
    fn finish(self, line: usize) -> Result<HmmerModel> {
        let name = self
            .name
            .ok_or_else(|| parse_error(line, "model without `NAME`".to_string()))?;
        let alphabet = self
            .alphabet
            .ok_or_else(|| parse_error(line, "model without `ALPH`".to_string()))?;
        let trans0 = self
            .trans0
            .ok_or_else(|| parse_error(line, "model without node 0".to_string()))?;
        let length = match self.length {
            Some(length) if length != self.nodes.len() => {
                return Err(parse_error(
                    line,
                    format!("`LENG {}` but {} nodes", length, self.nodes.len()),
                ))
            }
            Some(length) => length,
            None => {
                warn!("model `{}` has no `LENG`", name);
                self.nodes.len()
            }
        };
        Ok(HmmerModel {
            name,
            accession: self.accession,
            description: self.description,
            alphabet,
            length,
            compo: self.compo,
            insert0: self.insert0,
            trans0,
            nodes: self.nodes,
        })
    }
}

///
/// Parse every model of a HMMER3 text stream
///
pub fn parse_hmmer<R: BufRead>(reader: R) -> Result<Vec<HmmerModel>> {
    let mut models = Vec::new();
    let mut state = ParserState::Idle;
    let mut draft = Draft::default();
    let mut line_number = 0;

    for line in reader.lines() {
        let line = line?;
        line_number += 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let flag = match tokens.first() {
            Some(flag) => *flag,
            None => continue,
        };

        state = match state {
            ParserState::Idle => {
                if !flag.starts_with(HEADER_FLAG) {
                    return Err(parse_error(
                        line_number,
                        format!("expected a `{}` header, got `{}`", HEADER_FLAG, flag),
                    ));
                }
                draft = Draft::default();
                ParserState::Header
            }
            ParserState::Header => match flag {
                NAME_FLAG => {
                    draft.name = Some(rest_of_line(&line, flag));
                    ParserState::Header
                }
                ACCESSION_FLAG => {
                    draft.accession = Some(rest_of_line(&line, flag));
                    ParserState::Header
                }
                DESCRIPTION_FLAG => {
                    draft.description = Some(rest_of_line(&line, flag));
                    ParserState::Header
                }
                LENGTH_FLAG => {
                    let token = tokens.get(1).copied().unwrap_or("");
                    draft.length = Some(token.parse::<usize>().map_err(|_| {
                        parse_error(line_number, format!("invalid `LENG` `{}`", token))
                    })?);
                    ParserState::Header
                }
                ALPHABET_FLAG => {
                    let token = tokens.get(1).copied().unwrap_or("");
                    draft.alphabet = Some(parse_alphabet(token, line_number)?);
                    ParserState::Header
                }
                MODEL_START_FLAG => {
                    let k = draft.alphabet_len(line_number)?;
                    if tokens.len() != k + 1 {
                        return Err(parse_error(
                            line_number,
                            format!(
                                "`HMM` line lists {} symbols, expected {}",
                                tokens.len() - 1,
                                k
                            ),
                        ));
                    }
                    ParserState::TransitionHeader
                }
                _ => {
                    debug!("skip header line `{}`", flag);
                    ParserState::Header
                }
            },
            ParserState::TransitionHeader => ParserState::CompoOrInsert0,
            ParserState::CompoOrInsert0 | ParserState::Insert0 => {
                let k = draft.alphabet_len(line_number)?;
                if flag == COMPO_FLAG && state == ParserState::CompoOrInsert0 {
                    draft.compo = Some(parse_values(&tokens[1..], k, line_number)?);
                    ParserState::Insert0
                } else {
                    draft.insert0 = parse_values(&tokens, k, line_number)?;
                    ParserState::Trans0
                }
            }
            ParserState::Trans0 => {
                draft.trans0 = Some(parse_transitions(&tokens, line_number)?);
                ParserState::MatchEmissions
            }
            ParserState::MatchEmissions => {
                if flag == END_FLAG {
                    let model = std::mem::take(&mut draft).finish(line_number)?;
                    debug!("parsed hmmer model `{}` (M={})", model.name, model.length);
                    models.push(model);
                    ParserState::Idle
                } else {
                    let k = draft.alphabet_len(line_number)?;
                    let index: usize = flag.parse().map_err(|_| {
                        parse_error(line_number, format!("expected node number, got `{}`", flag))
                    })?;
                    if index != draft.nodes.len() + 1 {
                        return Err(parse_error(
                            line_number,
                            format!("node {} after node {}", index, draft.nodes.len()),
                        ));
                    }
                    draft.match_emission = parse_values(&tokens[1..], k, line_number)?;
                    ParserState::InsertEmissions
                }
            }
            ParserState::InsertEmissions => {
                let k = draft.alphabet_len(line_number)?;
                draft.insert_emission = parse_values(&tokens, k, line_number)?;
                ParserState::StateTransitions
            }
            ParserState::StateTransitions => {
                let trans = parse_transitions(&tokens, line_number)?;
                let node = HmmerNode {
                    match_emission: std::mem::take(&mut draft.match_emission),
                    insert_emission: std::mem::take(&mut draft.insert_emission),
                    trans,
                };
                draft.nodes.push(node);
                ParserState::MatchEmissions
            }
        };
    }

    if state != ParserState::Idle {
        return Err(parse_error(
            line_number,
            "unexpected end of file (missing `//`)".to_string(),
        ));
    }
    Ok(models)
}

///
/// Parse every model of the HMMER3 file at `path`
///
pub fn read_hmmer_file<P: AsRef<Path>>(path: P) -> Result<Vec<HmmerModel>> {
    let file = File::open(path)?;
    parse_hmmer(BufReader::new(file))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::prob::p;

    pub const DNA_HMM: &str = "HMMER3/f [3.1b2 | February 2015]
NAME  toy
ACC   TY00001.1
DESC  toy dna profile
LENG  2
ALPH  DNA
RF    no
STATS LOCAL MSV      -5.2127  0.71881
HMM          A        C        G        T
            m->m     m->i     m->d     i->m     i->i     d->m     d->d
  COMPO   1.38629  1.38629  1.38629  1.38629
          1.38629  1.38629  1.38629  1.38629
          0.10536  2.30259  *        0.69315  0.69315  0.00000        *
      1   0.10536  3.50656  3.50656  3.50656      1 a - - -
          1.38629  1.38629  1.38629  1.38629
          0.10536  2.99573  2.99573  0.69315  0.69315  0.69315  0.69315
      2   3.50656  0.10536  3.50656  3.50656      2 c - - -
          1.38629  1.38629  1.38629  1.38629
          0.10536  2.30259        *  0.69315  0.69315  0.00000        *
//
";

    #[test]
    fn parse_dna_profile() {
        let models = parse_hmmer(DNA_HMM.as_bytes()).unwrap();
        assert_eq!(models.len(), 1);
        let m = &models[0];
        assert_eq!(m.name, "toy");
        assert_eq!(m.accession.as_deref(), Some("TY00001.1"));
        assert_eq!(m.description.as_deref(), Some("toy dna profile"));
        assert_eq!(m.length, 2);
        assert_eq!(m.nodes.len(), 2);
        assert_eq!(m.alphabet.symbols(), b"ACGT");
        assert!(m.compo.is_some());
        assert_abs_diff_eq!(m.insert0[0], p(0.25), epsilon = 1e-5);
        assert!(m.trans0.md.is_zero());
        assert_abs_diff_eq!(m.nodes[0].match_emission[0], p(0.9), epsilon = 1e-5);
        assert_abs_diff_eq!(m.nodes[1].match_emission[1], p(0.9), epsilon = 1e-5);
        assert!(m.nodes[1].trans.dd.is_zero());
        assert_abs_diff_eq!(m.nodes[1].trans.dm, p(1.0), epsilon = 1e-9);
    }
    #[test]
    fn parse_two_models_without_compo() {
        let without_compo: String = DNA_HMM
            .lines()
            .filter(|l| !l.trim_start().starts_with("COMPO"))
            .map(|l| format!("{}\n", l))
            .collect();
        let twice = format!("{}{}", without_compo, DNA_HMM.replace("NAME  toy", "NAME  toy2"));
        let models = parse_hmmer(twice.as_bytes()).unwrap();
        assert_eq!(models.len(), 2);
        assert!(models[0].compo.is_none());
        assert_eq!(models[1].name, "toy2");
        assert_eq!(models[0].insert0, models[1].insert0);
    }
    #[test]
    fn parse_errors_carry_line_number() {
        let broken = DNA_HMM.replace("0.10536  3.50656  3.50656  3.50656", "0.10536  x  3.50656  3.50656");
        match parse_hmmer(broken.as_bytes()) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 14),
            other => panic!("unexpected {:?}", other.map(|m| m.len())),
        }
        let truncated: String = DNA_HMM.lines().take(15).collect::<Vec<_>>().join("\n");
        assert!(matches!(
            parse_hmmer(truncated.as_bytes()),
            Err(Error::Parse { .. })
        ));
        let wrong_length = DNA_HMM.replace("LENG  2", "LENG  3");
        assert!(matches!(
            parse_hmmer(wrong_length.as_bytes()),
            Err(Error::Parse { .. })
        ));
        assert!(parse_hmmer("NAME x\n".as_bytes()).is_err());
    }
}
