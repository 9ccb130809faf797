//!
//! `profhmm` command line
//!
use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::gencode::GeneticCode;
use crate::hmm;
use crate::io::fasta::{read_targets, FastaWriter, Target};
use crate::io::gff::{records, GffWriter};
use crate::io::hmmer::{read_hmmer_file, HmmerModel};
use crate::profile::frame::{amino_string, codon_string, decode_fragment};
use crate::profile::{frame_profile, standard_profile, ProfileModel, SearchParams, SearchResult};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ParallelProgressIterator, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search every target against every profile and report the hits
    Search {
        #[clap(flatten)]
        search: SearchOpts,
        /// Output GFF3 filename (stdout if not given)
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Output JSON lines filename, one search result per line
        #[clap(long)]
        json: Option<PathBuf>,
        /// Output FASTA of the translated hits (frame profiles)
        #[clap(long)]
        amino: Option<PathBuf>,
        /// Output FASTA of the decoded codons of the hits (frame profiles)
        #[clap(long)]
        codon: Option<PathBuf>,
        /// Minimum score of a reported hit
        #[clap(long, default_value_t = 0.0)]
        min_score: f64,
    },
    /// Print `target profile score` for every pair
    Score {
        #[clap(flatten)]
        search: SearchOpts,
    },
}

#[derive(clap::Args, Debug)]
pub struct SearchOpts {
    /// HMMER3 profile filename
    pub profile: PathBuf,
    /// Target FASTA filename
    pub targets: PathBuf,
    /// Search an amino-acid profile against nucleotide targets
    #[clap(long)]
    pub frame: bool,
    /// Probability of a base insertion or deletion in frame states
    #[clap(short, long, default_value_t = 0.01)]
    pub epsilon: f64,
    /// NCBI genetic code id
    #[clap(short, long, default_value_t = 1)]
    pub gcode: u8,
    /// Allow only one hit per target
    #[clap(long)]
    pub single_hit: bool,
    /// Maximum number of symbols consumed by a single step
    #[clap(short, long)]
    pub window: Option<usize>,
}

impl SearchOpts {
    pub fn params(&self) -> Result<SearchParams> {
        SearchParams::new(!self.single_hit, self.epsilon, self.gcode, self.window)
    }
}

///
/// Profiles built from a HMMER3 file and the alphabet their targets are
/// read in
///
pub struct Profiles {
    pub profiles: Vec<ProfileModel>,
    pub target_alphabet: Arc<Alphabet>,
}

pub fn load_profiles(opts: &SearchOpts, params: &SearchParams) -> anyhow::Result<Profiles> {
    let models: Vec<HmmerModel> = read_hmmer_file(&opts.profile)
        .with_context(|| format!("reading profiles {}", opts.profile.display()))?;
    let first = match models.first() {
        Some(model) => model,
        None => bail!("no profile in {}", opts.profile.display()),
    };
    let target_alphabet = if opts.frame {
        Alphabet::dna()
    } else {
        first.alphabet.clone()
    };
    let mut profiles = Vec::with_capacity(models.len());
    for model in models.iter() {
        let profile = if opts.frame {
            frame_profile(model, params, target_alphabet.clone())?
        } else {
            if model.alphabet != target_alphabet {
                bail!(
                    "profile `{}` is over `{}` but `{}` is over `{}`",
                    model.name,
                    model.alphabet,
                    first.name,
                    first.alphabet
                );
            }
            standard_profile(model, params)?
        };
        profiles.push(profile);
    }
    info!(
        "loaded {} profiles (frame={}) targets over `{}`",
        profiles.len(),
        opts.frame,
        target_alphabet
    );
    Ok(Profiles {
        profiles,
        target_alphabet,
    })
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos:>7}/{len:7} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

///
/// Search every target against every profile
///
/// Targets are processed in parallel. A search sets the target length of the
/// profile, so the profiles are cloned for each rayon split job (`map_init`)
/// rather than shared. Results are in target order, then profile order, and
/// a failed pair does not affect the others.
///
pub fn search_all(
    profiles: &[ProfileModel],
    targets: &[Target],
) -> Vec<Vec<Result<SearchResult>>> {
    targets
        .par_iter()
        .progress_with_style(progress_style())
        .map_init(
            || profiles.to_vec(),
            |profiles, target| {
                profiles
                    .iter_mut()
                    .map(|profile| profile.search(&target.seq))
                    .collect::<Vec<_>>()
            },
        )
        .collect()
}

///
/// Pairs of `search_all` that succeeded. Failures are logged and skipped.
///
fn successes<'a>(
    targets: &'a [Target],
    profiles: &'a [ProfileModel],
    results: &'a [Vec<Result<SearchResult>>],
) -> impl Iterator<Item = (&'a Target, &'a ProfileModel, &'a SearchResult)> {
    targets
        .iter()
        .zip(results.iter())
        .flat_map(move |(target, target_results)| {
            profiles
                .iter()
                .zip(target_results.iter())
                .filter_map(move |(profile, result)| match result {
                    Ok(result) => Some((target, profile, result)),
                    Err(err) => {
                        warn!(
                            "skipping target `{}` against `{}`: {}",
                            target.id,
                            profile.name(),
                            err
                        );
                        None
                    }
                })
        })
}

#[derive(Serialize)]
struct JsonStep<'a> {
    state: &'a str,
    seq_len: usize,
}

#[derive(Serialize)]
struct JsonFragment<'a> {
    homologous: bool,
    offset: usize,
    length: usize,
    path: Vec<JsonStep<'a>>,
}

///
/// A search result as written in JSON lines, with states named
///
#[derive(Serialize)]
struct JsonRecord<'a> {
    target: &'a str,
    profile: &'a str,
    score: f64,
    alt_loglik: f64,
    null_loglik: f64,
    path: Vec<JsonStep<'a>>,
    fragments: Vec<JsonFragment<'a>>,
}

fn json_steps<'a>(profile: &'a ProfileModel, path: &hmm::Path) -> Result<Vec<JsonStep<'a>>> {
    path.iter()
        .map(|step| {
            Ok(JsonStep {
                state: profile.hmm().state(step.state)?.name(),
                seq_len: step.seq_len,
            })
        })
        .collect()
}

impl<'a> JsonRecord<'a> {
    fn new(
        target: &'a Target,
        profile: &'a ProfileModel,
        result: &'a SearchResult,
    ) -> Result<JsonRecord<'a>> {
        let fragments = result
            .fragments
            .iter()
            .map(|fragment| {
                Ok(JsonFragment {
                    homologous: fragment.homologous,
                    offset: fragment.offset,
                    length: fragment.length,
                    path: json_steps(profile, &fragment.path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(JsonRecord {
            target: &target.id,
            profile: &result.profile,
            score: result.score,
            alt_loglik: result.alt_loglik.to_log_value(),
            null_loglik: result.null_loglik.to_log_value(),
            path: json_steps(profile, &result.path)?,
            fragments,
        })
    }
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn run_search(
    opts: &SearchOpts,
    output: Option<&Path>,
    json: Option<&Path>,
    amino: Option<&Path>,
    codon: Option<&Path>,
    min_score: f64,
) -> anyhow::Result<()> {
    let params = opts.params()?;
    let Profiles {
        profiles,
        target_alphabet,
    } = load_profiles(opts, &params)?;
    let targets = read_targets(&opts.targets, &target_alphabet)
        .with_context(|| format!("reading targets {}", opts.targets.display()))?;
    let results = search_all(&profiles, &targets);

    let gff_out: Box<dyn Write> = match output {
        Some(path) => Box::new(create(path)?),
        None => Box::new(std::io::stdout()),
    };
    let mut gff = GffWriter::new(gff_out)?;
    let mut json = json.map(create).transpose()?;
    if !opts.frame && (amino.is_some() || codon.is_some()) {
        warn!("--amino and --codon are only written for frame profiles");
    }
    let decode = opts.frame && (amino.is_some() || codon.is_some());
    let mut amino = match amino {
        Some(path) if opts.frame => Some(FastaWriter::new(create(path)?)),
        _ => None,
    };
    let mut codon = match codon {
        Some(path) if opts.frame => Some(FastaWriter::new(create(path)?)),
        _ => None,
    };
    let gcode: &GeneticCode = params.genetic_code()?;

    let mut n_hits = 0;
    for (target, profile, result) in successes(&targets, &profiles, &results) {
        if let Some(json) = json.as_mut() {
            serde_json::to_writer(&mut *json, &JsonRecord::new(target, profile, result)?)?;
            writeln!(json)?;
        }
        if !result.is_hit(min_score) {
            continue;
        }
        let epsilon = if opts.frame {
            Some(params.epsilon)
        } else {
            None
        };
        gff.write_all(records(&target.id, result, epsilon).iter())?;
        n_hits += 1;

        if !decode {
            continue;
        }
        for fragment in result.homologous() {
            let id = format!(
                "{}:{}-{}|{}",
                target.id,
                fragment.offset + 1,
                fragment.offset + fragment.length,
                result.profile
            );
            let decoded = decode_fragment(profile, fragment, &target.seq, gcode)?;
            if let Some(writer) = amino.as_mut() {
                writer.write(&id, None, amino_string(&decoded).as_bytes())?;
            }
            if let Some(writer) = codon.as_mut() {
                writer.write(&id, None, codon_string(&decoded).as_bytes())?;
            }
        }
    }
    gff.flush()?;
    if let Some(json) = json.as_mut() {
        json.flush()?;
    }
    for writer in amino.iter_mut().chain(codon.iter_mut()) {
        writer.flush()?;
    }
    info!(
        "{} targets x {} profiles: {} hits",
        targets.len(),
        profiles.len(),
        n_hits
    );
    Ok(())
}

pub fn run_score(opts: &SearchOpts) -> anyhow::Result<()> {
    let params = opts.params()?;
    let Profiles {
        profiles,
        target_alphabet,
    } = load_profiles(opts, &params)?;
    let targets = read_targets(&opts.targets, &target_alphabet)?;
    let results = search_all(&profiles, &targets);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (target, _, result) in successes(&targets, &profiles, &results) {
        writeln!(out, "{}\t{}\t{:.4}", target.id, result.profile, result.score)?;
    }
    Ok(())
}

pub fn run(opts: &Opts) -> anyhow::Result<()> {
    match &opts.command {
        Commands::Search {
            search,
            output,
            json,
            amino,
            codon,
            min_score,
        } => run_search(
            search,
            output.as_deref(),
            json.as_deref(),
            amino.as_deref(),
            codon.as_deref(),
            *min_score,
        ),
        Commands::Score { search } => run_score(search),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::profile::mocks::mock_amino_model;
    use crate::seq::Sequence;
    use clap::CommandFactory;

    fn target(id: &str, seq: &[u8]) -> Target {
        Target {
            id: id.to_string(),
            seq: Sequence::new(seq, Alphabet::dna()).unwrap(),
        }
    }

    #[test]
    fn parse_search_args() {
        Opts::command().debug_assert();
        let opts = Opts::try_parse_from(&[
            "profhmm",
            "search",
            "pf.hmm",
            "genome.fa",
            "--frame",
            "-e",
            "0.02",
            "--gcode",
            "11",
            "--single-hit",
            "--json",
            "out.jsonl",
        ])
        .unwrap();
        match opts.command {
            Commands::Search { search, json, .. } => {
                assert!(search.frame);
                assert_eq!(search.gcode, 11);
                assert_eq!(json, Some(PathBuf::from("out.jsonl")));
                let params = search.params().unwrap();
                assert!(!params.multiple_hits);
                assert_abs_diff_eq!(params.epsilon, 0.02);
            }
            _ => panic!("expected search"),
        }
    }
    #[test]
    fn invalid_epsilon_is_rejected() {
        let opts = Opts::try_parse_from(&["profhmm", "score", "a.hmm", "b.fa", "-e", "2"]).unwrap();
        match opts.command {
            Commands::Score { search } => assert!(search.params().is_err()),
            _ => panic!("expected score"),
        }
    }
    #[test]
    fn search_all_keeps_results_of_other_targets() {
        let model = mock_amino_model(b"MKW").unwrap();
        let params = SearchParams::frame(0.0, 1).unwrap();
        let profile = frame_profile(&model, &params, Alphabet::dna()).unwrap();
        let targets = vec![
            target("codons", b"ATGAAATGG"),
            target("shifted", b"ATGAAATGGA"),
            target("again", b"ATGAAATGG"),
        ];
        let profiles = vec![profile];
        let results = search_all(&profiles, &targets);
        assert_eq!(results.len(), 3);
        assert!(results[0][0].is_ok());
        // exact codons cannot explain 10 bases
        assert!(matches!(results[1][0], Err(Error::NoPath(_))));
        assert!(results[2][0].is_ok());

        let ok: Vec<&str> = successes(&targets, &profiles, &results)
            .map(|(target, _, _)| target.id.as_str())
            .collect();
        assert_eq!(ok, vec!["codons", "again"]);
    }
    #[test]
    fn json_record_names_states() {
        let model = mock_amino_model(b"MKW").unwrap();
        let params = SearchParams::frame(0.0, 1).unwrap();
        let mut profile = frame_profile(&model, &params, Alphabet::dna()).unwrap();
        let t = target("codons", b"ATGAAATGG");
        let result = profile.search(&t.seq).unwrap();
        let record = JsonRecord::new(&t, &profile, &result).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["target"], "codons");
        assert_eq!(value["path"][0]["state"], "S");
        let names: Vec<&str> = record.path.iter().map(|s| s.state).collect();
        assert!(names.contains(&"M1"));
        assert!(names.contains(&"M3"));
        assert_eq!(record.path.len(), result.path.len());
    }
}
